// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single subprocess primitive used by every probe and compositor action.
//!
//! All helper invocations go through [`run_helper`] so the cancellation
//! contract is enforced in one place: the child is spawned with
//! `kill_on_drop`, and both deadline expiry and shutdown drop the in-flight
//! future, which kills the child.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::error::ProbeError;

/// Returns `true` when `name` resolves to an executable on `PATH`.
pub fn on_path(name: &str) -> bool {
    let Some(path) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&path).any(|dir| {
        let candidate = dir.join(name);
        match std::fs::metadata(&candidate) {
            Ok(meta) => {
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    meta.is_file() && meta.permissions().mode() & 0o111 != 0
                }
                #[cfg(not(unix))]
                {
                    meta.is_file()
                }
            }
            Err(_) => false,
        }
    })
}

/// Run `program` with `args`, returning its stdout.
///
/// The child is killed when `deadline` expires or `cancel` fires; a non-zero
/// exit maps to [`ProbeError::Helper`] with a stderr snippet.
pub async fn run_helper(
    program: &str,
    args: &[&str],
    deadline: Duration,
    cancel: &CancellationToken,
) -> Result<Vec<u8>, ProbeError> {
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| ProbeError::helper(program, e.to_string()))?;

    // `wait_with_output` owns the child; dropping the future (timeout or
    // cancellation) kills it via kill_on_drop.
    tokio::select! {
        _ = cancel.cancelled() => Err(ProbeError::Cancelled),
        res = tokio::time::timeout(deadline, child.wait_with_output()) => match res {
            Err(_) => Err(ProbeError::Timeout),
            Ok(Err(e)) => Err(ProbeError::helper(program, e.to_string())),
            Ok(Ok(output)) => {
                if output.status.success() {
                    Ok(output.stdout)
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    let detail = stderr.lines().next().unwrap_or("").to_owned();
                    Err(ProbeError::Helper {
                        tool: program.to_owned(),
                        detail: format!("exit {:?}: {detail}", output.status.code()),
                    })
                }
            }
        },
    }
}

/// Run `program` feeding `input` on stdin, returning its stdout.
pub async fn run_helper_with_input(
    program: &str,
    args: &[&str],
    input: &[u8],
    deadline: Duration,
    cancel: &CancellationToken,
) -> Result<Vec<u8>, ProbeError> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| ProbeError::helper(program, e.to_string()))?;

    if let Some(mut stdin) = child.stdin.take() {
        use tokio::io::AsyncWriteExt;
        let write = async {
            let _ = stdin.write_all(input).await;
            drop(stdin);
        };
        tokio::select! {
            _ = cancel.cancelled() => return Err(ProbeError::Cancelled),
            _ = tokio::time::timeout(deadline, write) => {}
        }
    }

    tokio::select! {
        _ = cancel.cancelled() => Err(ProbeError::Cancelled),
        res = tokio::time::timeout(deadline, child.wait_with_output()) => match res {
            Err(_) => Err(ProbeError::Timeout),
            Ok(Err(e)) => Err(ProbeError::helper(program, e.to_string())),
            Ok(Ok(output)) if output.status.success() => Ok(output.stdout),
            Ok(Ok(output)) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(ProbeError::Helper {
                    tool: program.to_owned(),
                    detail: format!("exit {:?}: {}", output.status.code(), stderr.trim()),
                })
            }
        },
    }
}

/// Run a streaming helper for at most `cap`, returning whatever it wrote to
/// stdout in that span. Used for recorders that produce output until killed.
pub async fn run_helper_capped(
    program: &str,
    args: &[&str],
    cap: Duration,
    cancel: &CancellationToken,
) -> Result<Vec<u8>, ProbeError> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| ProbeError::helper(program, e.to_string()))?;

    let Some(mut stdout) = child.stdout.take() else {
        return Err(ProbeError::helper(program, "stdout not captured"));
    };

    let mut collected = Vec::new();
    let mut chunk = [0u8; 8192];
    let stop_at = tokio::time::Instant::now() + cap;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return Err(ProbeError::Cancelled),
            _ = tokio::time::sleep_until(stop_at) => break,
            read = stdout.read(&mut chunk) => match read {
                Ok(0) => break,
                Ok(n) => collected.extend_from_slice(&chunk[..n]),
                Err(e) => return Err(ProbeError::helper(program, e.to_string())),
            },
        }
    }

    let _ = child.start_kill();
    let _ = child.wait().await;
    Ok(collected)
}

#[cfg(test)]
#[path = "helper_tests.rs"]
mod tests;
