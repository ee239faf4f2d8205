// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clipboard probe: reads the current selection, de-duplicates by content
//! hash, truncates oversized payloads, and tags content with an advisory
//! type classifier for downstream filtering.

use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Duration;

use parking_lot::Mutex;
use regex::Regex;
use sha2::{Digest, Sha256};

use super::{CaptureContext, CaptureFuture, CaptureResult, Probe, Sample};
use crate::error::ProbeError;
use crate::helper::run_helper;
use crate::platform::{DisplayServer, Platform, Tool};

pub const SOURCE: &str = "clipboard";

/// Default truncation limit for clipboard payloads.
pub const DEFAULT_MAX_LEN: usize = 10 * 1024;

/// Advisory content classification. Downstream consumers may filter on it;
/// nothing in the core branches on the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Url,
    Path,
    Json,
    Command,
    Code,
    LongText,
    ShortText,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Path => "path",
            Self::Json => "json",
            Self::Command => "command",
            Self::Code => "code",
            Self::LongText => "long-text",
            Self::ShortText => "short-text",
        }
    }
}

fn command_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\$ |sudo |git |cargo |docker |kubectl |ssh |curl |make )").ok()
    })
    .as_ref()
}

fn code_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(fn |def |class |func |impl |=> |\{\n|;\n)").ok()).as_ref()
}

pub(crate) fn classify(content: &str) -> ContentType {
    let trimmed = content.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return ContentType::Url;
    }
    if trimmed.starts_with('/') || trimmed.starts_with("~/") {
        return ContentType::Path;
    }
    if (trimmed.starts_with('{') || trimmed.starts_with('['))
        && serde_json::from_str::<serde_json::Value>(trimmed).is_ok()
    {
        return ContentType::Json;
    }
    if command_re().is_some_and(|re| re.is_match(trimmed)) {
        return ContentType::Command;
    }
    if code_re().is_some_and(|re| re.is_match(trimmed)) {
        return ContentType::Code;
    }
    if trimmed.len() > 500 {
        ContentType::LongText
    } else {
        ContentType::ShortText
    }
}

/// Truncate to at most `max` bytes on a char boundary.
pub(crate) fn truncate_to(content: &str, max: usize) -> &str {
    if content.len() <= max {
        return content;
    }
    let mut end = max;
    while end > 0 && !content.is_char_boundary(end) {
        end -= 1;
    }
    &content[..end]
}

pub struct ClipboardProbe {
    platform: Arc<Platform>,
    interval: Duration,
    max_len: usize,
    last_hash: Mutex<Option<[u8; 32]>>,
}

impl ClipboardProbe {
    pub fn new(platform: Arc<Platform>, interval: Duration, max_len: usize) -> Self {
        Self { platform, interval, max_len, last_hash: Mutex::new(None) }
    }
}

impl Probe for ClipboardProbe {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn available(&self) -> bool {
        self.platform.has(Tool::ClipboardReader)
    }

    fn capture<'a>(&'a self, ctx: &'a CaptureContext) -> CaptureFuture<'a> {
        Box::pin(async move {
            let reader = self.platform.tool_command(Tool::ClipboardReader);
            let args: &[&str] = match self.platform.display_server() {
                DisplayServer::X11 => &["-selection", "clipboard", "-o"],
                _ => &["--no-newline"],
            };
            let raw = match run_helper(reader, args, ctx.deadline, &ctx.cancel).await {
                Ok(raw) => raw,
                // The reader exits non-zero when nothing is copied.
                Err(ProbeError::Helper { .. }) => return Ok(Sample::Empty),
                Err(e) => return Err(e),
            };
            if raw.is_empty() {
                return Ok(Sample::Empty);
            }

            let hash: [u8; 32] = Sha256::digest(&raw).into();
            {
                let mut last = self.last_hash.lock();
                if *last == Some(hash) {
                    return Ok(Sample::Unchanged);
                }
                *last = Some(hash);
            }

            let content = String::from_utf8_lossy(&raw);
            let truncated = content.len() > self.max_len;
            let kept = truncate_to(&content, self.max_len);

            let result = CaptureResult::new(SOURCE)
                .with_text(kept)
                .meta("changed", true)
                .meta("content_type", classify(kept).as_str())
                .meta("length", content.len())
                .meta("truncated", truncated);
            Ok(Sample::Changed(result))
        })
    }
}

#[cfg(test)]
#[path = "clipboard_tests.rs"]
mod tests;
