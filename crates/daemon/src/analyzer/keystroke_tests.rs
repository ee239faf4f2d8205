// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::{Duration, Instant};

use super::{compute, KeystrokeMetrics};
use crate::analyzer::events::KeystrokeEvent;

fn key(ms: u64, hold_ms: u64, is_error: bool) -> KeystrokeEvent {
    static BASE: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();
    let base = *BASE.get_or_init(Instant::now);
    KeystrokeEvent {
        t: base + Duration::from_millis(ms),
        hold: Duration::from_millis(hold_ms),
        is_error,
    }
}

#[test]
fn empty_is_all_zero() {
    assert_eq!(compute(&[]), KeystrokeMetrics::default());
}

#[test]
fn single_event_has_no_flights_or_rate() {
    let m = compute(&[key(0, 80, false)]);
    assert!((m.avg_hold_ms - 80.0).abs() < 1e-9);
    assert_eq!(m.pause_count, 0);
    assert!(m.keys_per_minute.abs() < 1e-9);
    assert!(m.avg_flight_ms.abs() < 1e-9);
}

#[test]
fn steady_typing_matches_expected_rates() {
    // 120 events spaced 300 ms apart, hold 80 ms, no errors.
    let events: Vec<_> = (0..120).map(|i| key(i * 300, 80, false)).collect();
    let m = compute(&events);
    assert!((m.avg_hold_ms - 80.0).abs() < 1e-9);
    assert!(m.hold_variance.abs() < 1e-9);
    assert!((m.avg_flight_ms - 300.0).abs() < 1e-6);
    assert_eq!(m.pause_count, 0);
    assert!(m.error_rate.abs() < 1e-9);
    // 120 events over 119 * 0.3 s ~= 201.7 per minute.
    assert!((m.keys_per_minute - 200.0).abs() < 5.0, "kpm {}", m.keys_per_minute);
}

#[test]
fn pauses_are_flights_over_500ms() {
    let events = [key(0, 50, false), key(400, 50, false), key(1200, 50, false)];
    let m = compute(&events);
    assert_eq!(m.pause_count, 1);
    assert!((m.avg_pause_ms - 800.0).abs() < 1e-6);
    // Single pause: SD is zero.
    assert!(m.pause_sd_ms.abs() < 1e-9);
}

#[test]
fn exactly_500ms_is_not_a_pause() {
    let events = [key(0, 50, false), key(500, 50, false)];
    assert_eq!(compute(&events).pause_count, 0);
}

#[test]
fn error_rate_counts_error_class_events() {
    let events = [
        key(0, 50, false),
        key(100, 50, true),
        key(200, 50, false),
        key(300, 50, true),
    ];
    let m = compute(&events);
    assert!((m.error_rate - 0.5).abs() < 1e-9);
}

#[test]
fn pause_sd_reflects_spread() {
    // Pauses of 600 and 1000 ms: mean 800, population SD 200.
    let events = [
        key(0, 50, false),
        key(600, 50, false),
        key(700, 50, false),
        key(1700, 50, false),
    ];
    let m = compute(&events);
    assert_eq!(m.pause_count, 2);
    assert!((m.avg_pause_ms - 800.0).abs() < 1e-6);
    assert!((m.pause_sd_ms - 200.0).abs() < 1e-6);
}
