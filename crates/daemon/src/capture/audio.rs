// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Opt-in audio probe: bounded PCM clips from the system recorder.

use std::time::Duration;

use bytes::Bytes;

use super::{CaptureContext, CaptureFuture, CaptureResult, Probe, Sample};
use crate::helper::{on_path, run_helper_capped};

pub const SOURCE: &str = "audio";

const RECORDER: &str = "pw-record";
const SAMPLE_RATE: u32 = 16_000;
const CHANNELS: u32 = 1;

pub struct AudioProbe {
    enabled: bool,
    clip: Duration,
    interval: Duration,
}

impl AudioProbe {
    pub fn new(enabled: bool, clip: Duration, interval: Duration) -> Self {
        Self { enabled, clip, interval }
    }
}

impl Probe for AudioProbe {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn available(&self) -> bool {
        self.enabled && on_path(RECORDER)
    }

    fn capture<'a>(&'a self, ctx: &'a CaptureContext) -> CaptureFuture<'a> {
        Box::pin(async move {
            let raw = run_helper_capped(
                RECORDER,
                &["--rate", "16000", "--channels", "1", "--format", "s16", "-"],
                self.clip,
                &ctx.cancel,
            )
            .await?;
            if raw.is_empty() {
                return Ok(Sample::Empty);
            }

            // 16-bit mono: two bytes per sample.
            let duration_ms =
                raw.len() as u64 * 1000 / (u64::from(SAMPLE_RATE) * u64::from(CHANNELS) * 2);
            let size = raw.len();
            let result = CaptureResult::new(SOURCE)
                .with_blob(Bytes::from(raw))
                .meta("format", "s16le")
                .meta("rate", SAMPLE_RATE)
                .meta("channels", CHANNELS)
                .meta("duration_ms", duration_ms)
                .meta("size_bytes", size);
            Ok(Sample::Changed(result))
        })
    }
}
