// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Active-window probe: asks the compositor which window has focus.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use super::{CaptureContext, CaptureFuture, CaptureResult, Probe, Sample};
use crate::error::ProbeError;
use crate::helper::run_helper;
use crate::platform::{Platform, Tool};

pub const SOURCE: &str = "window";

/// Focused-window snapshot as reported by the compositor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveWindow {
    pub address: String,
    pub app_class: String,
    pub title: String,
    pub workspace: String,
    pub pid: i32,
    pub position: (i32, i32),
    pub size: (i32, i32),
    pub fullscreen: bool,
}

// hyprctl activewindow -j layout. Fullscreen switched from a bool to a mode
// integer across compositor releases; accept both.
#[derive(Debug, Deserialize)]
struct RawWindow {
    #[serde(default)]
    address: String,
    #[serde(default)]
    class: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    workspace: RawWorkspace,
    #[serde(default)]
    pid: i32,
    #[serde(default)]
    at: (i32, i32),
    #[serde(default)]
    size: (i32, i32),
    #[serde(default)]
    fullscreen: RawFullscreen,
}

#[derive(Debug, Default, Deserialize)]
struct RawWorkspace {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawFullscreen {
    Flag(bool),
    Mode(u8),
}

impl Default for RawFullscreen {
    fn default() -> Self {
        Self::Flag(false)
    }
}

impl RawFullscreen {
    fn active(&self) -> bool {
        match self {
            Self::Flag(flag) => *flag,
            Self::Mode(mode) => *mode != 0,
        }
    }
}

pub(crate) fn parse_active_window(raw: &[u8]) -> Result<Option<ActiveWindow>, ProbeError> {
    let text = String::from_utf8_lossy(raw);
    let trimmed = text.trim();
    // The inspector prints "Invalid" (or nothing) when no window has focus.
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("invalid") {
        return Ok(None);
    }
    let raw: RawWindow =
        serde_json::from_str(trimmed).map_err(|e| ProbeError::Parse(e.to_string()))?;
    if raw.class.is_empty() && raw.title.is_empty() {
        return Ok(None);
    }
    Ok(Some(ActiveWindow {
        address: raw.address,
        app_class: raw.class,
        title: raw.title,
        workspace: raw.workspace.name,
        pid: raw.pid,
        position: raw.at,
        size: raw.size,
        fullscreen: raw.fullscreen.active(),
    }))
}

/// Query the compositor for the focused window. Shared by the window probe
/// and the focus enforcer's 1 Hz sampler.
pub async fn query_active_window(
    platform: &Platform,
    deadline: Duration,
    cancel: &CancellationToken,
) -> Result<Option<ActiveWindow>, ProbeError> {
    if !platform.can_capture_window() {
        return Err(ProbeError::Unavailable);
    }
    let inspector = platform.tool_command(Tool::WindowInspector);
    let out = run_helper(inspector, &["activewindow", "-j"], deadline, cancel).await?;
    parse_active_window(&out)
}

pub struct WindowProbe {
    platform: Arc<Platform>,
    interval: Duration,
    last: Mutex<Option<(String, String)>>,
}

impl WindowProbe {
    pub fn new(platform: Arc<Platform>, interval: Duration) -> Self {
        Self { platform, interval, last: Mutex::new(None) }
    }
}

impl Probe for WindowProbe {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn available(&self) -> bool {
        self.platform.can_capture_window()
    }

    fn capture<'a>(&'a self, ctx: &'a CaptureContext) -> CaptureFuture<'a> {
        Box::pin(async move {
            let Some(win) =
                query_active_window(&self.platform, ctx.deadline, &ctx.cancel).await?
            else {
                return Ok(Sample::Empty);
            };

            let key = (win.app_class.clone(), win.title.clone());
            {
                let mut last = self.last.lock();
                if last.as_ref() == Some(&key) {
                    return Ok(Sample::Unchanged);
                }
                *last = Some(key);
            }

            let result = CaptureResult::new(SOURCE)
                .with_text(win.title.as_str())
                .meta("app_class", &win.app_class)
                .meta("title", &win.title)
                .meta("workspace", &win.workspace)
                .meta("pid", win.pid)
                .meta("x", win.position.0)
                .meta("y", win.position.1)
                .meta("width", win.size.0)
                .meta("height", win.size.1)
                .meta("fullscreen", win.fullscreen);
            Ok(Sample::Changed(result))
        })
    }
}

#[cfg(test)]
#[path = "window_tests.rs"]
mod tests;
