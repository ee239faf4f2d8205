// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

/// Failure taxonomy for capture probes.
///
/// `Unavailable` means the capability is missing on this host and the probe
/// is disabled for the rest of the process lifetime. Everything else is
/// transient: the scheduler logs it and the loop continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// The capability does not exist on this host.
    Unavailable,
    /// An external helper failed to spawn or exited non-zero.
    Helper { tool: String, detail: String },
    /// Helper output could not be parsed.
    Parse(String),
    /// The per-tick deadline expired before the capture finished.
    Timeout,
    /// Shutdown was observed mid-capture.
    Cancelled,
}

impl ProbeError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unavailable => "UNAVAILABLE",
            Self::Helper { .. } => "HELPER",
            Self::Parse(_) => "PARSE",
            Self::Timeout => "TIMEOUT",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// True when the error is the shared shutdown signal rather than a
    /// genuine capture failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn helper(tool: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Helper { tool: tool.into(), detail: detail.into() }
    }
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => f.write_str("capability unavailable on this host"),
            Self::Helper { tool, detail } => write!(f, "helper {tool} failed: {detail}"),
            Self::Parse(detail) => write!(f, "unparseable helper output: {detail}"),
            Self::Timeout => f.write_str("capture deadline expired"),
            Self::Cancelled => f.write_str("capture cancelled"),
        }
    }
}

impl std::error::Error for ProbeError {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
