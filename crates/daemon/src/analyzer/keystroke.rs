// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Keystroke-timing dynamics. Only hold durations and error flags are
//! available here; key identities never reach the analyzer.

use serde::Serialize;

use super::events::KeystrokeEvent;
use super::mouse::mean_and_variance;

/// Inter-key gap above which a flight counts as a pause (ms).
pub(crate) const PAUSE_THRESHOLD_MS: f64 = 500.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct KeystrokeMetrics {
    pub avg_hold_ms: f64,
    pub hold_variance: f64,
    pub avg_flight_ms: f64,
    pub flight_variance: f64,
    /// Flights longer than 500 ms.
    pub pause_count: u32,
    pub avg_pause_ms: f64,
    pub pause_sd_ms: f64,
    /// Events per minute over the span from first to last event.
    pub keys_per_minute: f64,
    /// Backspace/delete-class events over total events, in [0, 1].
    pub error_rate: f64,
}

pub(crate) fn compute(events: &[KeystrokeEvent]) -> KeystrokeMetrics {
    if events.is_empty() {
        return KeystrokeMetrics::default();
    }

    let holds: Vec<f64> = events.iter().map(|e| e.hold.as_secs_f64() * 1000.0).collect();
    let (avg_hold_ms, hold_variance) = mean_and_variance(&holds);

    let flights: Vec<f64> = events
        .windows(2)
        .map(|pair| pair[1].t.duration_since(pair[0].t).as_secs_f64() * 1000.0)
        .collect();
    let (avg_flight_ms, flight_variance) = mean_and_variance(&flights);

    let pauses: Vec<f64> =
        flights.iter().copied().filter(|&f| f > PAUSE_THRESHOLD_MS).collect();
    let (avg_pause_ms, pause_variance) = mean_and_variance(&pauses);

    let errors = events.iter().filter(|e| e.is_error).count();

    let keys_per_minute = if events.len() < 2 {
        0.0
    } else {
        let span_min =
            events[events.len() - 1].t.duration_since(events[0].t).as_secs_f64() / 60.0;
        if span_min > 0.0 { events.len() as f64 / span_min } else { 0.0 }
    };

    KeystrokeMetrics {
        avg_hold_ms,
        hold_variance,
        avg_flight_ms,
        flight_variance,
        pause_count: pauses.len() as u32,
        avg_pause_ms,
        pause_sd_ms: pause_variance.sqrt(),
        keys_per_minute,
        error_rate: errors as f64 / events.len() as f64,
    }
}

#[cfg(test)]
#[path = "keystroke_tests.rs"]
mod tests;
