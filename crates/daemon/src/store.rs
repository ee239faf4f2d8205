// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-backed append-only sink for capture results and focus bookkeeping.
//!
//! Captures, modes, and sessions are appended as JSONL under the data
//! directory; blobs land as sidecar files with the path recorded in the
//! row. Session updates append a superseding row; a fold by id yields the
//! current state, and the files are never truncated.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::capture::CaptureResult;
use crate::focus::{FocusMode, FocusSession};

pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// A persisted capture row. The blob itself lives next door under `blobs/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureRow {
    pub source: String,
    pub timestamp_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub metadata: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob_bytes: Option<u64>,
}

pub struct Store {
    captures_path: PathBuf,
    modes_path: PathBuf,
    sessions_path: PathBuf,
    blob_dir: PathBuf,
}

impl Store {
    /// Open (creating as needed) a store rooted at `dir`.
    pub fn open(dir: &Path) -> anyhow::Result<Self> {
        let blob_dir = dir.join("blobs");
        std::fs::create_dir_all(&blob_dir)
            .with_context(|| format!("creating data dir {}", dir.display()))?;
        Ok(Self {
            captures_path: dir.join("captures.jsonl"),
            modes_path: dir.join("modes.jsonl"),
            sessions_path: dir.join("sessions.jsonl"),
            blob_dir,
        })
    }

    fn append_line<T: Serialize>(path: &Path, row: &T) -> anyhow::Result<()> {
        let mut line = serde_json::to_string(row)?;
        line.push('\n');
        let mut file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    fn read_rows<T: for<'de> Deserialize<'de>>(path: &Path) -> Vec<T> {
        let Ok(contents) = std::fs::read_to_string(path) else {
            return vec![];
        };
        contents.lines().filter_map(|line| serde_json::from_str(line).ok()).collect()
    }

    /// Append one capture record. Blobs are written first so a row never
    /// references a missing file.
    pub fn append_capture(&self, result: &CaptureResult) -> anyhow::Result<()> {
        let mut blob_path = None;
        let mut blob_bytes = None;
        if let Some(blob) = &result.raw_blob {
            let name = format!("{}-{}.bin", result.timestamp_ms, result.source);
            let path = self.blob_dir.join(&name);
            std::fs::write(&path, blob)
                .with_context(|| format!("writing blob {}", path.display()))?;
            blob_path = Some(format!("blobs/{name}"));
            blob_bytes = Some(blob.len() as u64);
        }

        let row = CaptureRow {
            source: result.source.to_owned(),
            timestamp_ms: result.timestamp_ms,
            text: result.text.clone(),
            metadata: result.metadata.clone(),
            blob_path,
            blob_bytes,
        };
        Self::append_line(&self.captures_path, &row)
    }

    /// Read back capture rows for `source`, oldest first.
    pub fn captures_for(&self, source: &str) -> Vec<CaptureRow> {
        Self::read_rows::<CaptureRow>(&self.captures_path)
            .into_iter()
            .filter(|r| r.source == source)
            .collect()
    }

    pub fn capture_count(&self) -> usize {
        Self::read_rows::<CaptureRow>(&self.captures_path).len()
    }

    pub fn insert_mode(&self, mode: &FocusMode) -> anyhow::Result<()> {
        Self::append_line(&self.modes_path, mode)
    }

    pub fn mode(&self, id: &str) -> Option<FocusMode> {
        // Later rows supersede earlier ones.
        Self::read_rows::<FocusMode>(&self.modes_path).into_iter().rev().find(|m| m.id == id)
    }

    pub fn mode_by_name(&self, name: &str) -> Option<FocusMode> {
        Self::read_rows::<FocusMode>(&self.modes_path).into_iter().rev().find(|m| m.name == name)
    }

    pub fn list_modes(&self) -> Vec<FocusMode> {
        let mut seen = std::collections::HashSet::new();
        let mut modes: Vec<FocusMode> = Vec::new();
        for mode in Self::read_rows::<FocusMode>(&self.modes_path).into_iter().rev() {
            if seen.insert(mode.id.clone()) {
                modes.push(mode);
            }
        }
        modes.reverse();
        modes
    }

    /// Fold session rows by id; later rows supersede earlier ones.
    fn fold_sessions(&self) -> Vec<FocusSession> {
        let mut order: Vec<String> = Vec::new();
        let mut latest: std::collections::HashMap<String, FocusSession> =
            std::collections::HashMap::new();
        for session in Self::read_rows::<FocusSession>(&self.sessions_path) {
            if !latest.contains_key(&session.id) {
                order.push(session.id.clone());
            }
            latest.insert(session.id.clone(), session);
        }
        order.into_iter().filter_map(|id| latest.remove(&id)).collect()
    }

    /// The at-most-one session with no end timestamp.
    pub fn active_session(&self) -> Option<FocusSession> {
        self.fold_sessions().into_iter().find(FocusSession::is_active)
    }

    pub fn session(&self, id: &str) -> Option<FocusSession> {
        self.fold_sessions().into_iter().find(|s| s.id == id)
    }

    /// Start a session for `mode_id`. Refuses while another session is open.
    pub fn start_session(&self, mode_id: &str) -> anyhow::Result<FocusSession> {
        if let Some(active) = self.active_session() {
            anyhow::bail!("session {} is already active", active.id);
        }
        let session = FocusSession {
            id: uuid::Uuid::new_v4().to_string(),
            mode_id: mode_id.to_owned(),
            started_at_ms: now_ms(),
            ended_at_ms: None,
            blocks_count: 0,
        };
        Self::append_line(&self.sessions_path, &session)?;
        Ok(session)
    }

    /// End the session with `id`. Returns the closed row, or `None` when the
    /// session does not exist or is already closed.
    pub fn end_session(&self, id: &str) -> anyhow::Result<Option<FocusSession>> {
        let Some(mut session) = self.session(id) else {
            return Ok(None);
        };
        if !session.is_active() {
            return Ok(None);
        }
        session.ended_at_ms = Some(now_ms());
        Self::append_line(&self.sessions_path, &session)?;
        Ok(Some(session))
    }

    /// Bump the block counter for an open session.
    pub fn record_block(&self, id: &str) -> anyhow::Result<Option<FocusSession>> {
        let Some(mut session) = self.session(id) else {
            return Ok(None);
        };
        session.blocks_count += 1;
        Self::append_line(&self.sessions_path, &session)?;
        Ok(Some(session))
    }

    /// Resolve a blob path from a capture row against the data dir.
    pub fn blob_path(&self, row: &CaptureRow) -> Option<PathBuf> {
        let rel = row.blob_path.as_deref()?;
        self.blob_dir.parent().map(|dir| dir.join(rel))
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
