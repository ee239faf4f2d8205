// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! External-integration probe: runs configured feed helper commands and
//! captures their output. Transport and auth of the feeds themselves live in
//! the helpers, not here.

use std::time::Duration;

use tracing::debug;

use super::{CaptureContext, CaptureFuture, CaptureResult, Probe, Sample};
use crate::helper::{on_path, run_helper};

pub const SOURCE: &str = "integrations";

/// A named external feed, e.g. `mail=fetch-mail-summary`.
#[derive(Debug, Clone)]
pub struct Integration {
    pub name: String,
    pub command: String,
}

impl Integration {
    /// Parse a `name=command` spec. Returns `None` when either half is empty.
    pub fn parse(spec: &str) -> Option<Self> {
        let (name, command) = spec.split_once('=')?;
        let (name, command) = (name.trim(), command.trim());
        if name.is_empty() || command.is_empty() {
            return None;
        }
        Some(Self { name: name.to_owned(), command: command.to_owned() })
    }
}

pub struct IntegrationsProbe {
    feeds: Vec<Integration>,
    interval: Duration,
}

impl IntegrationsProbe {
    pub fn new(feeds: Vec<Integration>, interval: Duration) -> Self {
        Self { feeds, interval }
    }
}

impl Probe for IntegrationsProbe {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn available(&self) -> bool {
        self.feeds.iter().any(|f| on_path(&f.command))
    }

    fn capture<'a>(&'a self, ctx: &'a CaptureContext) -> CaptureFuture<'a> {
        Box::pin(async move {
            let per_feed = ctx.deadline / self.feeds.len().max(1) as u32;
            let mut sections = Vec::new();
            let mut failed = 0u32;

            for feed in &self.feeds {
                match run_helper(&feed.command, &[], per_feed, &ctx.cancel).await {
                    Ok(out) => {
                        let text = String::from_utf8_lossy(&out);
                        let text = text.trim();
                        if !text.is_empty() {
                            sections.push(format!("[{}]\n{text}", feed.name));
                        }
                    }
                    Err(e) if e.is_cancelled() => return Err(e),
                    Err(e) => {
                        failed += 1;
                        debug!(feed = %feed.name, err = %e, "integration feed failed");
                    }
                }
            }

            if sections.is_empty() {
                return Ok(Sample::Empty);
            }
            let count = sections.len();
            let result = CaptureResult::new(SOURCE)
                .with_text(sections.join("\n\n"))
                .meta("feeds", count)
                .meta("failed", failed);
            Ok(Sample::Changed(result))
        })
    }
}

#[cfg(test)]
#[path = "integrations_tests.rs"]
mod tests;
