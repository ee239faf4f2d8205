// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Capture sources and the probe contract the scheduler drives.

pub mod activity;
pub mod audio;
pub mod biometrics;
pub mod clipboard;
pub mod git;
pub mod integrations;
pub mod screen;
pub mod window;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use indexmap::IndexMap;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::error::ProbeError;

/// Per-tick context handed to a probe: the shared shutdown signal plus the
/// deadline the scheduler will enforce around the whole capture.
#[derive(Debug, Clone)]
pub struct CaptureContext {
    pub cancel: CancellationToken,
    pub deadline: Duration,
}

impl CaptureContext {
    pub fn new(cancel: CancellationToken, deadline: Duration) -> Self {
        Self { cancel, deadline }
    }
}

/// One persisted observation.
///
/// At least one of `raw_blob`, `text`, or a non-empty `metadata` is
/// populated; `timestamp_ms` is monotonically non-decreasing per source
/// (the scheduler clamps it).
#[derive(Debug, Clone, Serialize)]
pub struct CaptureResult {
    pub source: &'static str,
    pub timestamp_ms: u64,
    #[serde(skip)]
    pub raw_blob: Option<Bytes>,
    pub text: Option<String>,
    pub metadata: IndexMap<String, String>,
}

impl CaptureResult {
    pub fn new(source: &'static str) -> Self {
        Self {
            source,
            timestamp_ms: crate::store::now_ms(),
            raw_blob: None,
            text: None,
            metadata: IndexMap::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_blob(mut self, blob: Bytes) -> Self {
        self.raw_blob = Some(blob);
        self
    }

    pub fn meta(mut self, key: &str, value: impl ToString) -> Self {
        self.metadata.insert(key.to_owned(), value.to_string());
        self
    }
}

/// What a capture tick observed.
#[derive(Debug, Clone)]
pub enum Sample {
    /// A new observation worth persisting.
    Changed(CaptureResult),
    /// The source re-observed identical content; nothing is persisted.
    Unchanged,
    /// Nothing to observe this tick (e.g. no focused window). Not an error,
    /// and specifically not a window switch.
    Empty,
}

pub type CaptureFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Sample, ProbeError>> + Send + 'a>>;

/// A capture source.
///
/// `available` must be side-effect free; it gates whether the scheduler
/// starts a loop for this probe at all. `capture` must honor the context's
/// cancellation signal and deadline at every suspension point.
pub trait Probe: Send + Sync + 'static {
    fn name(&self) -> &'static str;
    fn interval(&self) -> Duration;
    fn available(&self) -> bool;
    fn capture<'a>(&'a self, ctx: &'a CaptureContext) -> CaptureFuture<'a>;
}
