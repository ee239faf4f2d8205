// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `focus-start` / `focus-stop` / `status` subcommands. They act through
//! the store; the running daemon picks the session up on its next tick.

use clap::Args;

use super::{BrowserPolicy, FocusMode};
use crate::store::Store;

#[derive(Debug, Args)]
pub struct StartArgs {
    /// Mode name. Reuses a stored mode of the same name unless new policy
    /// flags are given.
    #[arg(long)]
    pub name: String,

    /// What this session is for, judged by the oracle.
    #[arg(long, default_value = "")]
    pub purpose: String,

    /// App classes always allowed.
    #[arg(long = "allow", value_delimiter = ',')]
    pub allowed_apps: Vec<String>,

    /// App classes referred to the oracle.
    #[arg(long = "block", value_delimiter = ',')]
    pub blocked_apps: Vec<String>,

    /// Title substrings referred to the oracle.
    #[arg(long = "block-pattern", value_delimiter = ',')]
    pub blocked_patterns: Vec<String>,

    /// Site substrings always allowed in browser titles.
    #[arg(long = "allow-site", value_delimiter = ',')]
    pub allowed_sites: Vec<String>,

    /// Browser fallthrough policy: ask_oracle, allowlist, block_all.
    #[arg(long, default_value = "ask_oracle")]
    pub browser_policy: String,

    /// Session length in minutes (0 = unlimited).
    #[arg(long, default_value = "0")]
    pub duration: u64,
}

impl StartArgs {
    fn has_policy_flags(&self) -> bool {
        !self.allowed_apps.is_empty()
            || !self.blocked_apps.is_empty()
            || !self.blocked_patterns.is_empty()
            || !self.allowed_sites.is_empty()
            || !self.purpose.is_empty()
    }

    fn browser_policy(&self) -> anyhow::Result<BrowserPolicy> {
        match self.browser_policy.as_str() {
            "ask_oracle" => Ok(BrowserPolicy::AskOracle),
            "allowlist" => Ok(BrowserPolicy::Allowlist),
            "block_all" => Ok(BrowserPolicy::BlockAll),
            other => anyhow::bail!("unknown browser policy: {other}"),
        }
    }
}

/// Start a focus session, creating or updating the mode as needed.
pub fn start(store: &Store, args: &StartArgs) -> anyhow::Result<String> {
    let mode = match store.mode_by_name(&args.name) {
        Some(existing) if !args.has_policy_flags() => existing,
        maybe_existing => {
            let mut mode = FocusMode::new(args.name.as_str(), args.purpose.as_str());
            // Updating keeps the id stable so history folds cleanly.
            if let Some(existing) = maybe_existing {
                mode.id = existing.id;
            }
            mode.allowed_apps = args.allowed_apps.clone();
            mode.blocked_apps = args.blocked_apps.clone();
            mode.blocked_patterns = args.blocked_patterns.clone();
            mode.allowed_sites = args.allowed_sites.clone();
            mode.browser_policy = args.browser_policy()?;
            mode.duration_minutes = args.duration;
            store.insert_mode(&mode)?;
            mode
        }
    };

    let session = store.start_session(&mode.id)?;
    Ok(format!("focus session {} started for mode {}", session.id, mode.name))
}

/// End the active session, if any.
pub fn stop(store: &Store) -> anyhow::Result<String> {
    let Some(active) = store.active_session() else {
        return Ok("no active focus session".to_owned());
    };
    let Some(ended) = store.end_session(&active.id)? else {
        return Ok("no active focus session".to_owned());
    };
    Ok(format!("focus session {} ended ({} blocks)", ended.id, ended.blocks_count))
}

/// One-line daemon status from the sink.
pub fn status(store: &Store) -> String {
    let captures = store.capture_count();
    match store.active_session() {
        Some(session) => {
            let mode = store
                .mode(&session.mode_id)
                .map(|m| m.name)
                .unwrap_or_else(|| session.mode_id.clone());
            format!(
                "{captures} captures; focus session {} active (mode {mode}, {} blocks)",
                session.id, session.blocks_count
            )
        }
        None => format!("{captures} captures; no active focus session"),
    }
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
