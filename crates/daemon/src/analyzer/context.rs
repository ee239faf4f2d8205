// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Context-switching and idle statistics.

use std::time::Instant;

use serde::Serialize;

use super::events::IdlePeriod;

/// Adjacent window switches closer than this count as rapid (seconds).
pub(crate) const RAPID_SWITCH_SECS: f64 = 5.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ContextMetrics {
    pub switches_per_minute: f64,
    /// Average seconds spent per window between switches.
    pub avg_window_secs: f64,
    /// Adjacent switch gaps under 5 s.
    pub rapid_switches: u32,
    pub idle_count: u32,
    pub avg_idle_secs: f64,
    pub longest_idle_secs: f64,
}

pub(crate) fn compute(switches: &[Instant], idles: &[IdlePeriod]) -> ContextMetrics {
    let mut metrics = ContextMetrics::default();

    if switches.len() >= 2 {
        let span = switches[switches.len() - 1].duration_since(switches[0]).as_secs_f64();
        if span > 0.0 {
            metrics.switches_per_minute = switches.len() as f64 / (span / 60.0);
            metrics.avg_window_secs = span / (switches.len() - 1) as f64;
        }
        metrics.rapid_switches = switches
            .windows(2)
            .filter(|pair| pair[1].duration_since(pair[0]).as_secs_f64() < RAPID_SWITCH_SECS)
            .count() as u32;
    }

    if !idles.is_empty() {
        let durations: Vec<f64> = idles.iter().map(|i| i.duration.as_secs_f64()).collect();
        metrics.idle_count = idles.len() as u32;
        metrics.avg_idle_secs = durations.iter().sum::<f64>() / durations.len() as f64;
        metrics.longest_idle_secs = durations.iter().copied().fold(0.0, f64::max);
    }

    metrics
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
