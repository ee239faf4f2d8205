// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Smoke tests spawning the real `vigil` binary for the store-backed
//! subcommands.

use vigil_specs::{run_vigil, stderr_of, stdout_of};

#[test]
fn status_on_fresh_store() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let output = run_vigil(dir.path(), &["status"])?;
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let line = stdout_of(&output);
    assert!(line.contains("no active focus session"), "status: {line}");
    Ok(())
}

#[test]
fn focus_start_status_stop_roundtrip() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;

    let output = run_vigil(
        dir.path(),
        &[
            "focus-start",
            "--name",
            "deep-work",
            "--purpose",
            "write the paper",
            "--allow",
            "code",
            "--block-pattern",
            "youtube,reddit",
        ],
    )?;
    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    assert!(stdout_of(&output).contains("deep-work"));

    let output = run_vigil(dir.path(), &["status"])?;
    assert!(stdout_of(&output).contains("deep-work"));

    let output = run_vigil(dir.path(), &["focus-stop"])?;
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("ended"));

    let output = run_vigil(dir.path(), &["status"])?;
    assert!(stdout_of(&output).contains("no active focus session"));
    Ok(())
}

#[test]
fn second_focus_start_is_refused() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let first = run_vigil(dir.path(), &["focus-start", "--name", "a", "--purpose", "p"])?;
    assert!(first.status.success(), "stderr: {}", stderr_of(&first));

    let second = run_vigil(dir.path(), &["focus-start", "--name", "b", "--purpose", "p"])?;
    assert!(!second.status.success());
    assert!(stderr_of(&second).contains("already active"));
    Ok(())
}

#[test]
fn invalid_config_is_rejected_before_anything_runs() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let output = run_vigil(dir.path(), &["--window-interval", "0", "status"])?;
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("intervals"));
    Ok(())
}
