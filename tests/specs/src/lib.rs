// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test harness for end-to-end scenario tests.
//!
//! The CLI smoke tests spawn the real `vigil` binary against a temp data
//! dir; the behavioral scenarios drive the library surface directly.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Resolve the path to the compiled `vigil` binary.
pub fn vigil_binary() -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    // tests/specs → tests → workspace root
    let workspace = manifest.parent().and_then(|p| p.parent()).unwrap_or(manifest);
    workspace.join("target").join("debug").join("vigil")
}

/// Run a `vigil` subcommand against `data_dir` and return its output.
pub fn run_vigil(data_dir: &Path, args: &[&str]) -> anyhow::Result<Output> {
    let binary = vigil_binary();
    anyhow::ensure!(binary.exists(), "vigil binary not found at {}", binary.display());
    let output = Command::new(&binary)
        .args(args)
        .env("VIGIL_DATA_DIR", data_dir)
        .env("VIGIL_LOG_LEVEL", "warn")
        .output()?;
    Ok(output)
}

pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_owned()
}

pub fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_owned()
}
