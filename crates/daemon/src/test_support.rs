// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test infrastructure: scripted probes, fakes for the oracle,
//! compositor, and notifier, and store builders.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::capture::window::ActiveWindow;
use crate::capture::{CaptureContext, CaptureFuture, CaptureResult, Probe, Sample};
use crate::error::ProbeError;
use crate::focus::compositor::Compositor;
use crate::notify::{Notifier, Urgency};
use crate::oracle::{DecideFuture, DecisionOracle, Verdict};
use crate::store::Store;

/// Build a store rooted in a fresh temp dir. The dir guard must be kept
/// alive for the duration of the test.
#[allow(clippy::panic)]
pub fn temp_store() -> (tempfile::TempDir, Arc<Store>) {
    let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
    let store = Store::open(dir.path()).unwrap_or_else(|e| panic!("open store: {e}"));
    (dir, Arc::new(store))
}

pub fn window(address: &str, class: &str, title: &str) -> ActiveWindow {
    ActiveWindow {
        address: address.to_owned(),
        app_class: class.to_owned(),
        title: title.to_owned(),
        workspace: "1".to_owned(),
        pid: 1000,
        position: (0, 0),
        size: (800, 600),
        fullscreen: false,
    }
}

/// Probe that replays a scripted list of outcomes, returning `Empty` once
/// the script is exhausted.
pub struct FakeProbe {
    name: &'static str,
    interval: Duration,
    available: bool,
    script: Mutex<VecDeque<Result<Sample, ProbeError>>>,
    pub calls: AtomicU32,
}

impl FakeProbe {
    pub fn new(name: &'static str, interval: Duration) -> Self {
        Self {
            name,
            interval,
            available: true,
            script: Mutex::new(VecDeque::new()),
            calls: AtomicU32::new(0),
        }
    }

    pub fn unavailable(name: &'static str, interval: Duration) -> Self {
        Self { available: false, ..Self::new(name, interval) }
    }

    pub fn push(&self, outcome: Result<Sample, ProbeError>) {
        self.script.lock().push_back(outcome);
    }

    pub fn push_result(&self, result: CaptureResult) {
        self.push(Ok(Sample::Changed(result)));
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Probe for FakeProbe {
    fn name(&self) -> &'static str {
        self.name
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn available(&self) -> bool {
        self.available
    }

    fn capture<'a>(&'a self, _ctx: &'a CaptureContext) -> CaptureFuture<'a> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.script.lock().pop_front();
            next.unwrap_or(Ok(Sample::Empty))
        })
    }
}

/// Oracle with a scripted verdict queue; falls back to `default` when the
/// queue is empty.
pub struct FakeOracle {
    script: Mutex<VecDeque<anyhow::Result<Verdict>>>,
    default: Verdict,
    pub calls: AtomicU32,
}

impl FakeOracle {
    pub fn allowing() -> Self {
        Self { script: Mutex::new(VecDeque::new()), default: Verdict::Allow, calls: AtomicU32::new(0) }
    }

    pub fn blocking() -> Self {
        Self { script: Mutex::new(VecDeque::new()), default: Verdict::Block, calls: AtomicU32::new(0) }
    }

    pub fn push(&self, verdict: anyhow::Result<Verdict>) {
        self.script.lock().push_back(verdict);
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DecisionOracle for FakeOracle {
    fn decide<'a>(
        &'a self,
        _purpose: &'a str,
        _app_class: &'a str,
        _title: &'a str,
    ) -> DecideFuture<'a> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.script.lock().pop_front();
            next.unwrap_or(Ok(self.default))
        })
    }
}

type BorderCall = (String, String);

/// Compositor fake: the test sets the active window, the enforcer's actions
/// are recorded for assertion.
#[derive(Default)]
pub struct FakeCompositor {
    active: Mutex<Option<ActiveWindow>>,
    pub borders: Mutex<Vec<BorderCall>>,
    pub closed: Mutex<Vec<String>>,
    pub tabs_closed: Mutex<Vec<String>>,
}

impl FakeCompositor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn focus(&self, win: Option<ActiveWindow>) {
        *self.active.lock() = win;
    }

    pub fn last_border(&self) -> Option<BorderCall> {
        self.borders.lock().last().cloned()
    }

    pub fn border_colors_for(&self, address: &str) -> Vec<String> {
        self.borders
            .lock()
            .iter()
            .filter(|(addr, _)| addr == address)
            .map(|(_, color)| color.clone())
            .collect()
    }
}

type ActionFuture<'a> = std::pin::Pin<Box<dyn std::future::Future<Output = anyhow::Result<()>> + Send + 'a>>;
type WindowFuture<'a> = std::pin::Pin<
    Box<dyn std::future::Future<Output = Result<Option<ActiveWindow>, ProbeError>> + Send + 'a>,
>;

impl Compositor for FakeCompositor {
    fn active_window<'a>(&'a self, _cancel: &'a CancellationToken) -> WindowFuture<'a> {
        let win = self.active.lock().clone();
        Box::pin(async move { Ok(win) })
    }

    fn set_border<'a>(
        &'a self,
        address: &'a str,
        color: &'a str,
        _cancel: &'a CancellationToken,
    ) -> ActionFuture<'a> {
        self.borders.lock().push((address.to_owned(), color.to_owned()));
        Box::pin(async { Ok(()) })
    }

    fn close_window<'a>(
        &'a self,
        address: &'a str,
        _cancel: &'a CancellationToken,
    ) -> ActionFuture<'a> {
        self.closed.lock().push(address.to_owned());
        self.active.lock().take();
        Box::pin(async { Ok(()) })
    }

    fn close_browser_tab<'a>(
        &'a self,
        address: &'a str,
        _cancel: &'a CancellationToken,
    ) -> ActionFuture<'a> {
        self.tabs_closed.lock().push(address.to_owned());
        self.active.lock().take();
        Box::pin(async { Ok(()) })
    }
}

/// Notifier fake recording every toast.
#[derive(Default)]
pub struct FakeNotifier {
    pub notes: Mutex<Vec<(Urgency, String, String)>>,
}

impl FakeNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn count(&self) -> usize {
        self.notes.lock().len()
    }
}

impl Notifier for FakeNotifier {
    fn notify<'a>(
        &'a self,
        urgency: Urgency,
        summary: &'a str,
        body: &'a str,
        _cancel: &'a CancellationToken,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send + 'a>> {
        self.notes.lock().push((urgency, summary.to_owned(), body.to_owned()));
        Box::pin(async {})
    }
}
