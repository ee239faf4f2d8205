// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host capability detection.
//!
//! Runs once at startup; the result is immutable for the process lifetime.
//! Detection can yield [`DisplayServer::Unknown`] without aborting anything;
//! probes that need a missing capability disable themselves instead.

use std::collections::HashMap;

use crate::helper::on_path;

/// Display server classification for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayServer {
    /// Hyprland Wayland compositor (window-level introspection available).
    Hyprland,
    /// Some other Wayland compositor.
    Wayland,
    X11,
    MacOs,
    Unknown,
}

impl DisplayServer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hyprland => "hyprland",
            Self::Wayland => "wayland",
            Self::X11 => "x11",
            Self::MacOs => "macos",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for DisplayServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// External helpers the daemon may shell out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    WindowInspector,
    Screenshotter,
    RegionSelector,
    ClipboardReader,
    Ocr,
    Notifier,
    TextInjector,
}

impl Tool {
    pub const ALL: [Tool; 7] = [
        Tool::WindowInspector,
        Tool::Screenshotter,
        Tool::RegionSelector,
        Tool::ClipboardReader,
        Tool::Ocr,
        Tool::Notifier,
        Tool::TextInjector,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WindowInspector => "window-inspector",
            Self::Screenshotter => "screenshotter",
            Self::RegionSelector => "region-selector",
            Self::ClipboardReader => "clipboard-reader",
            Self::Ocr => "ocr",
            Self::Notifier => "notifier",
            Self::TextInjector => "text-injector",
        }
    }
}

/// Resolve the helper binary implementing `tool` on `display`.
fn binary_for(display: DisplayServer, tool: Tool) -> &'static str {
    match (display, tool) {
        (_, Tool::WindowInspector) => "hyprctl",
        (DisplayServer::X11, Tool::Screenshotter) => "scrot",
        (_, Tool::Screenshotter) => "grim",
        (_, Tool::RegionSelector) => "slurp",
        (DisplayServer::X11, Tool::ClipboardReader) => "xclip",
        (_, Tool::ClipboardReader) => "wl-paste",
        (_, Tool::Ocr) => "tesseract",
        (_, Tool::Notifier) => "notify-send",
        (DisplayServer::X11, Tool::TextInjector) => "xdotool",
        (_, Tool::TextInjector) => "wtype",
    }
}

/// Immutable snapshot of host capabilities.
#[derive(Debug, Clone)]
pub struct Platform {
    display: DisplayServer,
    tools: HashMap<Tool, bool>,
}

impl Platform {
    /// Classify the host from environment variables and `PATH`.
    pub fn detect() -> Self {
        let display = detect_display_server();
        let tools = Tool::ALL
            .iter()
            .map(|&tool| (tool, on_path(binary_for(display, tool))))
            .collect();
        Self { display, tools }
    }

    /// Construct a fixed platform for tests.
    pub fn fixed(display: DisplayServer, available: &[Tool]) -> Self {
        let tools =
            Tool::ALL.iter().map(|&tool| (tool, available.contains(&tool))).collect();
        Self { display, tools }
    }

    pub fn display_server(&self) -> DisplayServer {
        self.display
    }

    pub fn is_wayland(&self) -> bool {
        matches!(self.display, DisplayServer::Hyprland | DisplayServer::Wayland)
    }

    /// Active-window introspection needs a compositor that exposes it.
    pub fn can_capture_window(&self) -> bool {
        self.display == DisplayServer::Hyprland && self.has(Tool::WindowInspector)
    }

    pub fn can_capture_screen(&self) -> bool {
        match self.display {
            DisplayServer::Hyprland | DisplayServer::Wayland | DisplayServer::X11 => {
                self.has(Tool::Screenshotter)
            }
            DisplayServer::MacOs | DisplayServer::Unknown => false,
        }
    }

    /// `false` when the helper implementing `tool` is not on `PATH`.
    pub fn has(&self, tool: Tool) -> bool {
        self.tools.get(&tool).copied().unwrap_or(false)
    }

    /// The helper binary name implementing `tool` on this host.
    pub fn tool_command(&self, tool: Tool) -> &'static str {
        binary_for(self.display, tool)
    }
}

fn detect_display_server() -> DisplayServer {
    if cfg!(target_os = "macos") {
        return DisplayServer::MacOs;
    }
    if env_set("HYPRLAND_INSTANCE_SIGNATURE") {
        return DisplayServer::Hyprland;
    }
    let session_type = std::env::var("XDG_SESSION_TYPE").unwrap_or_default();
    if env_set("WAYLAND_DISPLAY") || env_set("SWAYSOCK") || session_type == "wayland" {
        return DisplayServer::Wayland;
    }
    if env_set("DISPLAY") {
        return DisplayServer::X11;
    }
    DisplayServer::Unknown
}

fn env_set(name: &str) -> bool {
    std::env::var(name).map(|v| !v.is_empty()).unwrap_or(false)
}

#[cfg(test)]
#[path = "platform_tests.rs"]
mod tests;
