// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Biometrics probe: publishes the analyzer's current stress snapshot.
//!
//! Captures nothing from the host itself; it is the read side of the
//! behavioral analyzer.

use std::time::Duration;

use tracing::info;

use super::{CaptureContext, CaptureFuture, CaptureResult, Probe, Sample};
use crate::analyzer::{BehaviorAnalyzer, StressLevel};

pub const SOURCE: &str = "biometrics";

/// How many indicators make it into the text line.
const TOP_INDICATORS: usize = 3;

pub struct BiometricsProbe {
    analyzer: BehaviorAnalyzer,
    interval: Duration,
}

impl BiometricsProbe {
    pub fn new(analyzer: BehaviorAnalyzer, interval: Duration) -> Self {
        Self { analyzer, interval }
    }
}

impl Probe for BiometricsProbe {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn available(&self) -> bool {
        true
    }

    fn capture<'a>(&'a self, _ctx: &'a CaptureContext) -> CaptureFuture<'a> {
        Box::pin(async move {
            let snap = self.analyzer.analyze();

            if snap.level >= StressLevel::Elevated {
                info!(score = snap.score, level = %snap.level, "stress level elevated");
            }

            let mut result = CaptureResult::new(SOURCE)
                .meta("stress_level", snap.level.as_str())
                .meta("stress_score", snap.score)
                .meta("mouse_jitter", format!("{:.3}", snap.mouse.jitter))
                .meta("mouse_speed_variance", format!("{:.1}", snap.mouse.speed_variance))
                .meta("typing_pauses", snap.keystrokes.pause_count)
                .meta("typing_error_rate", format!("{:.3}", snap.keystrokes.error_rate))
                .meta(
                    "window_switches_pm",
                    format!("{:.2}", snap.context.switches_per_minute),
                )
                .meta("rapid_switches", snap.context.rapid_switches);
            if !snap.indicators.is_empty() {
                let top: Vec<&str> =
                    snap.indicators.iter().take(TOP_INDICATORS).map(String::as_str).collect();
                result = result.with_text(top.join("; "));
            }
            Ok(Sample::Changed(result))
        })
    }
}

#[cfg(test)]
#[path = "biometrics_tests.rs"]
mod tests;
