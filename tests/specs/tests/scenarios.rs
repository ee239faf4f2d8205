// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end behavioral scenarios: analyzer pipelines, focus enforcement
//! with fakes, and whole-daemon cancellation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use vigil::analyzer::{BehaviorAnalyzer, KeystrokeEvent, Position, StressLevel};
use vigil::capture::{CaptureResult, Sample};
use vigil::focus::{FocusEnforcer, FocusMode};
use vigil::scheduler::Scheduler;
use vigil::test_support::{temp_store, window, FakeCompositor, FakeNotifier, FakeOracle, FakeProbe};

fn base() -> Instant {
    Instant::now() - Duration::from_secs(60)
}

// -- Analyzer scenarios -------------------------------------------------------

#[test]
fn pure_idle_yields_calm_zero() {
    let analyzer = BehaviorAnalyzer::new();
    let snap = analyzer.analyze();
    assert_eq!(snap.score, 0);
    assert_eq!(snap.level, StressLevel::Calm);
    assert!(snap.indicators.is_empty());
    assert!(snap.mouse.avg_speed.abs() < 1e-9);
    assert!(snap.mouse.jitter.abs() < 1e-9);
    assert!(snap.keystrokes.keys_per_minute.abs() < 1e-9);
    assert!(snap.context.switches_per_minute.abs() < 1e-9);
}

#[test]
fn steady_typing_stays_calm() {
    let analyzer = BehaviorAnalyzer::new();
    let base = base();
    for i in 0..120u64 {
        analyzer.record_keystroke(KeystrokeEvent {
            t: base + Duration::from_millis(i * 300),
            hold: Duration::from_millis(80),
            is_error: false,
        });
    }
    let snap = analyzer.analyze();
    assert!((snap.keystrokes.keys_per_minute - 200.0).abs() < 5.0);
    assert_eq!(snap.keystrokes.pause_count, 0);
    assert!(snap.keystrokes.error_rate.abs() < 1e-9);
    assert_eq!(snap.score, 0);
    assert_eq!(snap.level, StressLevel::Calm);
}

#[test]
fn stressed_typing_scores_twenty_five() {
    let analyzer = BehaviorAnalyzer::new();
    let base = base();
    // 60 events; twelve of the flights are 800 ms pauses, and every 5th
    // event is an error (12 of 60 = 20%).
    let mut t = 0u64;
    for i in 0..60u64 {
        if i > 0 {
            t += if i % 4 == 0 && i <= 48 { 800 } else { 300 };
        }
        analyzer.record_keystroke(KeystrokeEvent {
            t: base + Duration::from_millis(t),
            hold: Duration::from_millis(70),
            is_error: i % 5 == 0,
        });
    }
    let snap = analyzer.analyze();
    assert_eq!(snap.keystrokes.pause_count, 12);
    assert!((snap.keystrokes.error_rate - 0.2).abs() < 1e-9);
    // Pauses (+15) and error rate (+10) fire; all pauses are equal so the
    // pause-SD bucket stays cold.
    assert_eq!(snap.score, 25);
    assert_eq!(snap.level, StressLevel::Normal);
    assert!(snap.indicators.iter().any(|i| i.contains("pauses")));
    assert!(snap.indicators.iter().any(|i| i.contains("error")));
}

#[test]
fn jittery_mouse_raises_the_score() {
    let analyzer = BehaviorAnalyzer::new();
    let base = base();
    let mut ms = 0u64;
    for _ in 0..30 {
        analyzer.record_mouse(Position { x: 0, y: 0, t: base + Duration::from_millis(ms) });
        analyzer.record_mouse(Position { x: 10, y: 0, t: base + Duration::from_millis(ms + 10) });
        ms += 20;
    }
    let snap = analyzer.analyze();
    assert!((snap.mouse.jitter - 1.0).abs() < 1e-9);
    assert!(snap.score >= 15);
    assert!(snap.level >= StressLevel::Normal);
}

// -- Keystroke privacy --------------------------------------------------------

#[test]
fn no_observable_output_carries_key_identities() -> anyhow::Result<()> {
    let analyzer = BehaviorAnalyzer::new();
    let base = base();
    // Holds chosen as if produced by distinct keycodes (14, 30, 111); the
    // event type itself cannot carry the code.
    for (i, hold) in [14u64, 30, 111].iter().enumerate() {
        analyzer.record_keystroke(KeystrokeEvent {
            t: base + Duration::from_millis(i as u64 * 200),
            hold: Duration::from_millis(*hold),
            is_error: i == 0,
        });
    }
    let snap = analyzer.analyze();
    let rendered = serde_json::to_string(&snap)?;
    for forbidden in ["keycode", "key_code", "scancode", "\"code\"", "\"key\""] {
        assert!(!rendered.contains(forbidden), "snapshot leaks {forbidden}: {rendered}");
    }
    Ok(())
}

// -- Focus enforcement --------------------------------------------------------

fn focus_mode() -> FocusMode {
    let mut mode = FocusMode::new("deep-work", "write paper");
    mode.allowed_apps = vec!["code".to_owned()];
    mode.blocked_patterns = vec!["youtube".to_owned()];
    mode
}

#[tokio::test(start_paused = true)]
async fn allowed_app_never_consults_the_oracle() -> anyhow::Result<()> {
    let (_dir, store) = temp_store();
    let comp = FakeCompositor::new();
    let notifier = FakeNotifier::new();
    let oracle = Arc::new(FakeOracle::blocking());
    let shutdown = CancellationToken::new();

    let mode = focus_mode();
    store.insert_mode(&mode)?;
    store.start_session(&mode.id)?;
    comp.focus(Some(window("0xa", "code", "main.rs")));

    let enforcer = FocusEnforcer::new(
        store.clone(),
        comp.clone(),
        notifier.clone(),
        oracle.clone(),
        shutdown.clone(),
    );
    let handle = tokio::spawn(enforcer.run());

    tokio::time::sleep(Duration::from_millis(2_500)).await;
    shutdown.cancel();
    handle.await?;

    assert_eq!(oracle.call_count(), 0);
    assert!(comp.closed.lock().is_empty());
    let colors = comp.border_colors_for("0xa");
    assert!(colors.iter().any(|c| c == vigil::focus::BORDER_ALLOWED), "colors: {colors:?}");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn blocked_browser_window_is_closed_after_countdown() -> anyhow::Result<()> {
    let (_dir, store) = temp_store();
    let comp = FakeCompositor::new();
    let notifier = FakeNotifier::new();
    let oracle = Arc::new(FakeOracle::blocking());
    let shutdown = CancellationToken::new();

    let mode = focus_mode();
    store.insert_mode(&mode)?;
    let session = store.start_session(&mode.id)?;
    comp.focus(Some(window("0xb", "firefox", "YouTube - funny cats")));

    let enforcer = FocusEnforcer::new(
        store.clone(),
        comp.clone(),
        notifier.clone(),
        oracle.clone(),
        shutdown.clone(),
    );
    let handle = tokio::spawn(enforcer.run());

    // One tick to warn plus the five second countdown.
    tokio::time::sleep(Duration::from_secs(8)).await;
    shutdown.cancel();
    handle.await?;

    assert_eq!(comp.tabs_closed.lock().clone(), vec!["0xb".to_owned()]);
    assert!(notifier.count() >= 2);
    let Some(updated) = store.session(&session.id) else {
        panic!("session row vanished");
    };
    assert_eq!(updated.blocks_count, 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn switching_away_during_countdown_avoids_the_close() -> anyhow::Result<()> {
    let (_dir, store) = temp_store();
    let comp = FakeCompositor::new();
    let notifier = FakeNotifier::new();
    let oracle = Arc::new(FakeOracle::blocking());
    let shutdown = CancellationToken::new();

    let mode = focus_mode();
    store.insert_mode(&mode)?;
    let session = store.start_session(&mode.id)?;
    comp.focus(Some(window("0xc", "firefox", "YouTube - funny cats")));

    let enforcer = FocusEnforcer::new(
        store.clone(),
        comp.clone(),
        notifier.clone(),
        oracle.clone(),
        shutdown.clone(),
    );
    let handle = tokio::spawn(enforcer.run());

    // The warn starts after the first 1 s tick; switch focus about 3 s in.
    let comp_flip = comp.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(4_200)).await;
        comp_flip.focus(Some(window("0xd", "kitty", "shell")));
    });

    tokio::time::sleep(Duration::from_secs(10)).await;
    shutdown.cancel();
    handle.await?;

    assert!(comp.tabs_closed.lock().is_empty());
    assert!(comp.closed.lock().is_empty());
    let Some(updated) = store.session(&session.id) else {
        panic!("session row vanished");
    };
    assert_eq!(updated.blocks_count, 0);
    Ok(())
}

// -- Cancellation -------------------------------------------------------------

#[tokio::test]
async fn cancelling_the_scope_stops_scheduler_and_enforcer() -> anyhow::Result<()> {
    let (_dir, store) = temp_store();
    let analyzer = BehaviorAnalyzer::new();
    let shutdown = CancellationToken::new();

    let mut scheduler = Scheduler::new(store.clone(), analyzer, shutdown.clone());
    for name in ["window", "screen", "clipboard", "activity", "biometrics"] {
        let probe = Arc::new(FakeProbe::new(name, Duration::from_millis(10)));
        probe.push(Ok(Sample::Changed(CaptureResult::new(name).with_text("tick"))));
        scheduler.add_probe(probe);
    }
    let mut handles = scheduler.spawn();

    let comp = FakeCompositor::new();
    let enforcer = FocusEnforcer::new(
        store,
        comp,
        FakeNotifier::new(),
        Arc::new(FakeOracle::allowing()),
        shutdown.clone(),
    );
    handles.push(tokio::spawn(enforcer.run()));

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown.cancel();

    let started = std::time::Instant::now();
    for handle in handles {
        tokio::time::timeout(Duration::from_secs(2), handle).await??;
    }
    assert!(started.elapsed() < Duration::from_secs(2));
    Ok(())
}
