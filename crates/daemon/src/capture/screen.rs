// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Screen probe: full or focused-output screenshots via the platform
//! screenshotter, PNG header sniffed for dimensions (never a full decode).

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{CaptureContext, CaptureFuture, CaptureResult, Probe, Sample};
use crate::error::ProbeError;
use crate::helper::run_helper;
use crate::platform::{DisplayServer, Platform, Tool};

pub const SOURCE: &str = "screen";

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// Width and height from a PNG IHDR header, if `data` starts with one.
pub(crate) fn png_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < 24 || data[..8] != PNG_SIGNATURE || &data[12..16] != b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
    let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);
    Some((width, height))
}

#[derive(Debug, Deserialize)]
struct Monitor {
    name: String,
    #[serde(default)]
    focused: bool,
}

pub(crate) fn focused_output(monitors_json: &[u8]) -> Option<String> {
    let monitors: Vec<Monitor> = serde_json::from_slice(monitors_json).ok()?;
    monitors.into_iter().find(|m| m.focused).map(|m| m.name)
}

pub struct ScreenProbe {
    platform: Arc<Platform>,
    interval: Duration,
}

impl ScreenProbe {
    pub fn new(platform: Arc<Platform>, interval: Duration) -> Self {
        Self { platform, interval }
    }

    /// Ask the compositor which output has focus so the shot can be scoped.
    /// Any failure falls back to full-compositor capture.
    async fn scoped_output(&self, cancel: &CancellationToken) -> Option<String> {
        if self.platform.display_server() != DisplayServer::Hyprland {
            return None;
        }
        let inspector = self.platform.tool_command(Tool::WindowInspector);
        match run_helper(inspector, &["monitors", "-j"], Duration::from_secs(2), cancel).await {
            Ok(out) => focused_output(&out),
            Err(e) => {
                debug!(err = %e, "output enumeration failed, capturing all outputs");
                None
            }
        }
    }
}

impl Probe for ScreenProbe {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn available(&self) -> bool {
        self.platform.can_capture_screen()
    }

    fn capture<'a>(&'a self, ctx: &'a CaptureContext) -> CaptureFuture<'a> {
        Box::pin(async move {
            let shooter = self.platform.tool_command(Tool::Screenshotter);
            let output = self.scoped_output(&ctx.cancel).await;

            let raw = match (self.platform.display_server(), &output) {
                (DisplayServer::X11, _) => {
                    run_helper(shooter, &["-z", "-o", "/dev/stdout"], ctx.deadline, &ctx.cancel)
                        .await?
                }
                (_, Some(name)) => {
                    run_helper(shooter, &["-o", name, "-"], ctx.deadline, &ctx.cancel).await?
                }
                (_, None) => run_helper(shooter, &["-"], ctx.deadline, &ctx.cancel).await?,
            };

            let Some((width, height)) = png_dimensions(&raw) else {
                return Err(ProbeError::Parse("screenshot is not a PNG".to_owned()));
            };

            let size = raw.len();
            let mut result = CaptureResult::new(SOURCE)
                .with_blob(Bytes::from(raw))
                .meta("format", "png")
                .meta("width", width)
                .meta("height", height)
                .meta("size_bytes", size);
            if let Some(name) = output {
                result = result.meta("output", name);
            }
            Ok(Sample::Changed(result))
        })
    }
}

#[cfg(test)]
#[path = "screen_tests.rs"]
mod tests;
