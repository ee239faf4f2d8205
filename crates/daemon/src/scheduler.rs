// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Capture scheduler: one timed loop per enabled probe, all hanging off a
//! single cancellation scope, fanning results into the sink and out to
//! subscribed observers.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::analyzer::BehaviorAnalyzer;
use crate::capture::{window, CaptureContext, CaptureResult, Probe, Sample};
use crate::store::Store;

/// Extra headroom on top of the probe interval for the per-tick deadline.
const DEADLINE_SLACK: Duration = Duration::from_secs(2);

/// Deadline for the optional OCR pass over screen blobs.
const OCR_DEADLINE: Duration = Duration::from_secs(10);

const OBSERVER_CHANNEL: usize = 256;

/// Optional text-extraction oracle applied to screen blobs before persist.
pub trait TextExtractor: Send + Sync + 'static {
    fn extract<'a>(
        &'a self,
        image: &'a Bytes,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>>;
}

/// A persisted result fanned out to observers, in order per source.
#[derive(Debug, Clone)]
pub struct CaptureEvent {
    pub result: Arc<CaptureResult>,
}

/// OCR through the platform's recognizer, image on stdin.
pub struct OcrCommand {
    platform: Arc<crate::platform::Platform>,
}

impl OcrCommand {
    pub fn new(platform: Arc<crate::platform::Platform>) -> Self {
        Self { platform }
    }
}

impl TextExtractor for OcrCommand {
    fn extract<'a>(
        &'a self,
        image: &'a Bytes,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let ocr = self.platform.tool_command(crate::platform::Tool::Ocr);
            let out = crate::helper::run_helper_with_input(
                ocr,
                &["stdin", "stdout", "--psm", "6"],
                image,
                OCR_DEADLINE,
                cancel,
            )
            .await?;
            Ok(String::from_utf8_lossy(&out).trim().to_owned())
        })
    }
}

pub struct Scheduler {
    probes: Vec<Arc<dyn Probe>>,
    store: Arc<Store>,
    analyzer: BehaviorAnalyzer,
    ocr: Option<Arc<dyn TextExtractor>>,
    events_tx: broadcast::Sender<CaptureEvent>,
    shutdown: CancellationToken,
}

impl Scheduler {
    pub fn new(store: Arc<Store>, analyzer: BehaviorAnalyzer, shutdown: CancellationToken) -> Self {
        let (events_tx, _) = broadcast::channel(OBSERVER_CHANNEL);
        Self { probes: Vec::new(), store, analyzer, ocr: None, events_tx, shutdown }
    }

    pub fn with_ocr(mut self, ocr: Arc<dyn TextExtractor>) -> Self {
        self.ocr = Some(ocr);
        self
    }

    pub fn add_probe(&mut self, probe: Arc<dyn Probe>) {
        self.probes.push(probe);
    }

    /// Subscribe to persisted results. Per-source order is preserved;
    /// lagging observers drop events rather than blocking capture.
    pub fn subscribe(&self) -> broadcast::Receiver<CaptureEvent> {
        self.events_tx.subscribe()
    }

    /// Spawn one loop per enabled probe. Unavailable probes are disabled for
    /// the process lifetime, not retried.
    pub fn spawn(self) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::new();
        for probe in self.probes {
            if !probe.available() {
                info!(probe = probe.name(), "probe unavailable, disabled");
                continue;
            }
            let loop_ctx = LoopContext {
                store: self.store.clone(),
                analyzer: self.analyzer.clone(),
                ocr: self.ocr.clone(),
                events_tx: self.events_tx.clone(),
                shutdown: self.shutdown.clone(),
            };
            handles.push(tokio::spawn(probe_loop(probe, loop_ctx)));
        }
        handles
    }
}

struct LoopContext {
    store: Arc<Store>,
    analyzer: BehaviorAnalyzer,
    ocr: Option<Arc<dyn TextExtractor>>,
    events_tx: broadcast::Sender<CaptureEvent>,
    shutdown: CancellationToken,
}

async fn probe_loop(probe: Arc<dyn Probe>, ctx: LoopContext) {
    let name = probe.name();
    let interval = probe.interval();
    let deadline = interval + DEADLINE_SLACK;

    // First tick fires immediately; if persistence blocks past a tick the
    // ticker skips it rather than queueing a burst.
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut last_ts = 0u64;
    debug!(probe = name, interval_secs = interval.as_secs(), "probe loop started");

    loop {
        tokio::select! {
            _ = ctx.shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let capture_ctx = CaptureContext::new(ctx.shutdown.clone(), deadline);
        let outcome = tokio::time::timeout(deadline, probe.capture(&capture_ctx)).await;

        let mut result = match outcome {
            Err(_) => {
                warn!(probe = name, "capture exceeded deadline");
                continue;
            }
            Ok(Err(e)) if e.is_cancelled() => break,
            Ok(Err(e)) => {
                warn!(probe = name, err = %e, "capture failed");
                continue;
            }
            Ok(Ok(Sample::Unchanged)) => {
                debug!(probe = name, "unchanged, skipping persist");
                continue;
            }
            Ok(Ok(Sample::Empty)) => continue,
            Ok(Ok(Sample::Changed(result))) => result,
        };

        // Per-source timestamps never go backwards, even if the wall
        // clock does.
        result.timestamp_ms = result.timestamp_ms.max(last_ts);
        last_ts = result.timestamp_ms;

        if name == crate::capture::screen::SOURCE {
            attach_ocr_text(&ctx, &mut result).await;
        }

        match ctx.store.append_capture(&result) {
            Ok(()) => {
                if name == window::SOURCE {
                    ctx.analyzer.record_window_switch(Instant::now());
                }
                let _ = ctx.events_tx.send(CaptureEvent { result: Arc::new(result) });
            }
            Err(e) => {
                // Best-effort telemetry: the record is lost, the loop is not.
                warn!(probe = name, err = %e, "persist failed");
            }
        }
    }

    debug!(probe = name, "probe loop stopped");
}

async fn attach_ocr_text(ctx: &LoopContext, result: &mut CaptureResult) {
    let Some(ocr) = &ctx.ocr else {
        return;
    };
    let Some(blob) = &result.raw_blob else {
        return;
    };
    let extraction =
        tokio::time::timeout(OCR_DEADLINE, ocr.extract(blob, &ctx.shutdown)).await;
    match extraction {
        Ok(Ok(text)) if !text.trim().is_empty() => {
            result.text = Some(text);
        }
        Ok(Ok(_)) => {}
        Ok(Err(e)) => debug!(err = %e, "text extraction failed"),
        Err(_) => debug!("text extraction timed out"),
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
