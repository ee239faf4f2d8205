// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git probe: branch, head, and dirty state for one watched repository.
//!
//! One probe instance per repository, so change detection and persistence
//! are independent per repo.

use std::path::PathBuf;
use std::time::Duration;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use super::{CaptureContext, CaptureFuture, CaptureResult, Probe, Sample};
use crate::error::ProbeError;
use crate::helper::{on_path, run_helper};

pub const SOURCE: &str = "git";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RepoState {
    pub branch: String,
    pub head: String,
    pub changed_files: Vec<String>,
}

impl RepoState {
    pub(crate) fn dirty(&self) -> usize {
        self.changed_files.len()
    }

    /// De-duplication key: a repo re-persists only when branch, head, or
    /// dirty count moved.
    fn fingerprint(&self) -> (String, String, usize) {
        (self.branch.clone(), self.head.clone(), self.dirty())
    }
}

/// Changed paths from `status --porcelain` output: two status columns, a
/// space, then the path (renames keep only the new side).
pub(crate) fn changed_paths(status: &str) -> Vec<String> {
    status
        .lines()
        .filter(|line| line.len() > 3)
        .map(|line| {
            let path = &line[3..];
            match path.split_once(" -> ") {
                Some((_, renamed)) => renamed.to_owned(),
                None => path.to_owned(),
            }
        })
        .collect()
}

async fn git_line(
    repo: &str,
    args: &[&str],
    deadline: Duration,
    cancel: &CancellationToken,
) -> Result<String, ProbeError> {
    let mut full = vec!["-C", repo];
    full.extend_from_slice(args);
    let out = run_helper("git", &full, deadline, cancel).await?;
    Ok(String::from_utf8_lossy(&out).trim().to_owned())
}

pub(crate) async fn repo_state(
    repo: &str,
    deadline: Duration,
    cancel: &CancellationToken,
) -> Result<RepoState, ProbeError> {
    let branch = git_line(repo, &["rev-parse", "--abbrev-ref", "HEAD"], deadline, cancel).await?;
    let head = git_line(repo, &["log", "-1", "--format=%H"], deadline, cancel).await?;
    let status = git_line(repo, &["status", "--porcelain"], deadline, cancel).await?;
    Ok(RepoState { branch, head, changed_files: changed_paths(&status) })
}

pub struct GitProbe {
    repo: PathBuf,
    interval: Duration,
    last: Mutex<Option<(String, String, usize)>>,
}

impl GitProbe {
    pub fn new(repo: PathBuf, interval: Duration) -> Self {
        Self { repo, interval, last: Mutex::new(None) }
    }
}

impl Probe for GitProbe {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn available(&self) -> bool {
        on_path("git") && self.repo.join(".git").exists()
    }

    fn capture<'a>(&'a self, ctx: &'a CaptureContext) -> CaptureFuture<'a> {
        Box::pin(async move {
            let path = self.repo.to_string_lossy();
            let state = repo_state(&path, ctx.deadline, &ctx.cancel).await?;

            {
                let mut last = self.last.lock();
                let fingerprint = state.fingerprint();
                if last.as_ref() == Some(&fingerprint) {
                    return Ok(Sample::Unchanged);
                }
                *last = Some(fingerprint);
            }

            let dirty = state.dirty();
            let result = CaptureResult::new(SOURCE)
                .with_text(format!("{path}: {} @ {} ({dirty} dirty)", state.branch, state.head))
                .meta("repo", &path)
                .meta("branch", &state.branch)
                .meta("head", &state.head)
                .meta("dirty", dirty)
                .meta("changed_files", state.changed_files.join(","));
            Ok(Sample::Changed(result))
        })
    }
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
