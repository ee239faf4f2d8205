// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::{on_path, run_helper, run_helper_capped};
use crate::error::ProbeError;

#[test]
fn on_path_finds_sh() {
    assert!(on_path("sh"));
}

#[test]
fn on_path_rejects_missing_binary() {
    assert!(!on_path("definitely-not-a-real-helper-binary"));
}

#[tokio::test]
async fn captures_stdout() -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let out = run_helper("echo", &["hello"], Duration::from_secs(5), &cancel).await?;
    assert_eq!(String::from_utf8_lossy(&out).trim(), "hello");
    Ok(())
}

#[tokio::test]
async fn missing_binary_is_helper_error() {
    let cancel = CancellationToken::new();
    let err = run_helper("definitely-not-a-real-helper-binary", &[], Duration::from_secs(1), &cancel)
        .await;
    assert!(matches!(err, Err(ProbeError::Helper { .. })));
}

#[tokio::test]
async fn nonzero_exit_is_helper_error() {
    let cancel = CancellationToken::new();
    let err = run_helper("sh", &["-c", "echo oops >&2; exit 3"], Duration::from_secs(5), &cancel)
        .await;
    match err {
        Err(ProbeError::Helper { tool, detail }) => {
            assert_eq!(tool, "sh");
            assert!(detail.contains("oops"));
        }
        other => panic!("expected helper error, got {other:?}"),
    }
}

#[tokio::test]
async fn deadline_kills_child() {
    let cancel = CancellationToken::new();
    let start = std::time::Instant::now();
    let err = run_helper("sleep", &["30"], Duration::from_millis(100), &cancel).await;
    assert_eq!(err, Err(ProbeError::Timeout));
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn cancellation_kills_child() {
    let cancel = CancellationToken::new();
    let child_cancel = cancel.clone();
    let handle = tokio::spawn(async move {
        run_helper("sleep", &["30"], Duration::from_secs(60), &child_cancel).await
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();
    let res = tokio::time::timeout(Duration::from_secs(2), handle).await;
    assert!(matches!(res, Ok(Ok(Err(ProbeError::Cancelled)))));
}

#[tokio::test]
async fn capped_run_collects_partial_stream() -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    // Emits a line every 50ms forever; the cap bounds what we keep.
    let out = run_helper_capped(
        "sh",
        &["-c", "while true; do echo tick; sleep 0.05; done"],
        Duration::from_millis(300),
        &cancel,
    )
    .await?;
    let text = String::from_utf8_lossy(&out);
    assert!(text.contains("tick"));
    Ok(())
}

#[tokio::test]
async fn capped_run_returns_at_eof() -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let out =
        run_helper_capped("echo", &["done"], Duration::from_secs(5), &cancel).await?;
    assert_eq!(String::from_utf8_lossy(&out).trim(), "done");
    Ok(())
}
