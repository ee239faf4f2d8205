// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Focus mode domain types and session lifecycle.

pub mod commands;
pub mod compositor;
pub mod enforcer;

use serde::{Deserialize, Serialize};

pub use compositor::{Compositor, HyprlandCompositor};
pub use enforcer::{EnforcerConfig, FocusEnforcer};

// Border palette for compositor property updates.
pub const BORDER_ALLOWED: &str = "rgba(00ff00aa)";
pub const BORDER_WARNED: &str = "rgba(ff5500ff)";
pub const BORDER_BLOCKED: &str = "rgba(ff0000ff)";
pub const BORDER_DEFAULT: &str = "rgba(33ccffee)";

/// How a browser window is treated when neither allowed sites nor blocked
/// patterns matched its title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowserPolicy {
    AskOracle,
    Allowlist,
    BlockAll,
}

impl Default for BrowserPolicy {
    fn default() -> Self {
        Self::AskOracle
    }
}

/// A user-declared focus intent plus its app/site policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusMode {
    pub id: String,
    pub name: String,
    pub purpose: String,
    #[serde(default)]
    pub allowed_apps: Vec<String>,
    #[serde(default)]
    pub blocked_apps: Vec<String>,
    #[serde(default)]
    pub blocked_patterns: Vec<String>,
    #[serde(default)]
    pub browser_policy: BrowserPolicy,
    #[serde(default)]
    pub allowed_sites: Vec<String>,
    /// 0 means unlimited.
    #[serde(default)]
    pub duration_minutes: u64,
    pub created_at_ms: u64,
}

impl FocusMode {
    pub fn new(name: impl Into<String>, purpose: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            purpose: purpose.into(),
            allowed_apps: Vec::new(),
            blocked_apps: Vec::new(),
            blocked_patterns: Vec::new(),
            browser_policy: BrowserPolicy::default(),
            allowed_sites: Vec::new(),
            duration_minutes: 0,
            created_at_ms: crate::store::now_ms(),
        }
    }
}

/// One run of a focus mode. At most one session is ever open
/// (`ended_at_ms == None`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusSession {
    pub id: String,
    pub mode_id: String,
    pub started_at_ms: u64,
    #[serde(default)]
    pub ended_at_ms: Option<u64>,
    #[serde(default)]
    pub blocks_count: u32,
}

impl FocusSession {
    pub fn is_active(&self) -> bool {
        self.ended_at_ms.is_none()
    }
}

/// What the enforcer decided for a focused window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub action: DecisionAction,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionAction {
    Allow,
    Warn,
    Close,
}

impl Decision {
    pub fn allow(reason: impl Into<String>) -> Self {
        Self { allowed: true, action: DecisionAction::Allow, reason: reason.into() }
    }

    pub fn warn(reason: impl Into<String>) -> Self {
        Self { allowed: false, action: DecisionAction::Warn, reason: reason.into() }
    }
}

/// Window classes treated as browsers for site/pattern evaluation.
const BROWSER_CLASSES: &[&str] = &[
    "firefox",
    "firefox-esr",
    "librewolf",
    "zen",
    "chromium",
    "chromium-browser",
    "google-chrome",
    "brave-browser",
    "vivaldi",
    "opera",
    "microsoft-edge",
];

pub(crate) fn is_browser(class: &str) -> bool {
    let class = class.to_lowercase();
    BROWSER_CLASSES.iter().any(|b| class == *b)
}

#[cfg(test)]
#[path = "focus_tests.rs"]
mod tests;
