// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::{ActivityClock, ActivityProbe};
use crate::analyzer::BehaviorAnalyzer;
use crate::capture::{CaptureContext, Probe, Sample};

fn ctx() -> CaptureContext {
    CaptureContext::new(CancellationToken::new(), Duration::from_secs(1))
}

fn probe_with_threshold(threshold: Duration) -> (Arc<ActivityClock>, BehaviorAnalyzer, ActivityProbe) {
    let clock = Arc::new(ActivityClock::new());
    let analyzer = BehaviorAnalyzer::new();
    let probe = ActivityProbe::with_threshold(
        clock.clone(),
        analyzer.clone(),
        Duration::from_secs(5),
        threshold,
    );
    (clock, analyzer, probe)
}

#[tokio::test]
async fn first_tick_reports_active() -> anyhow::Result<()> {
    let (_clock, _analyzer, probe) = probe_with_threshold(Duration::from_secs(60));
    let sample = probe.capture(&ctx()).await?;
    let Sample::Changed(result) = sample else {
        panic!("expected changed sample, got {sample:?}");
    };
    assert_eq!(result.metadata.get("state").map(String::as_str), Some("active"));
    Ok(())
}

#[tokio::test]
async fn unchanged_state_is_deduplicated() -> anyhow::Result<()> {
    let (_clock, _analyzer, probe) = probe_with_threshold(Duration::from_secs(60));
    let _ = probe.capture(&ctx()).await?;
    let sample = probe.capture(&ctx()).await?;
    assert!(matches!(sample, Sample::Unchanged));
    Ok(())
}

#[tokio::test]
async fn idle_end_records_idle_period() -> anyhow::Result<()> {
    let (clock, analyzer, probe) = probe_with_threshold(Duration::from_millis(10));

    // Fresh clock: active.
    let sample = probe.capture(&ctx()).await?;
    let Sample::Changed(result) = sample else {
        panic!("expected changed sample, got {sample:?}");
    };
    assert_eq!(result.metadata.get("state").map(String::as_str), Some("active"));

    // Let the threshold elapse: idle.
    tokio::time::sleep(Duration::from_millis(30)).await;
    let sample = probe.capture(&ctx()).await?;
    let Sample::Changed(result) = sample else {
        panic!("expected changed sample, got {sample:?}");
    };
    assert_eq!(result.metadata.get("state").map(String::as_str), Some("idle"));
    let (_, _, _, idles_before) = analyzer.depths();
    assert_eq!(idles_before, 0);

    // Input resumes: the completed stretch lands in the analyzer.
    clock.touch();
    let sample = probe.capture(&ctx()).await?;
    let Sample::Changed(result) = sample else {
        panic!("expected changed sample, got {sample:?}");
    };
    assert_eq!(result.metadata.get("state").map(String::as_str), Some("active"));
    let (_, _, _, idles) = analyzer.depths();
    assert_eq!(idles, 1);
    Ok(())
}
