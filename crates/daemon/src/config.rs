// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Personal telemetry daemon with AI-moderated focus enforcement.
#[derive(Debug, Parser)]
#[command(name = "vigil", version, about)]
pub struct Config {
    /// Data directory for captures, modes, and sessions.
    #[arg(long, env = "VIGIL_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log format (json or text).
    #[arg(long, env = "VIGIL_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "VIGIL_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Behavioral analysis window in seconds.
    #[arg(long, env = "VIGIL_ANALYSIS_WINDOW", default_value = "300")]
    pub analysis_window: u64,

    /// Decision oracle endpoint for focus mode. Focus decisions fail open
    /// when unset.
    #[arg(long, env = "VIGIL_ORACLE_URL")]
    pub oracle_url: Option<String>,

    /// Bearer token for the oracle endpoint.
    #[arg(long, env = "VIGIL_ORACLE_TOKEN")]
    pub oracle_token: Option<String>,

    /// Enable audio capture (off unless explicitly requested).
    #[arg(long, env = "VIGIL_AUDIO")]
    pub audio: bool,

    /// Audio clip length in seconds.
    #[arg(long, env = "VIGIL_AUDIO_CLIP", default_value = "5")]
    pub audio_clip: u64,

    /// Disable OCR of screen captures.
    #[arg(long, env = "VIGIL_NO_OCR")]
    pub no_ocr: bool,

    /// Git repositories to watch (comma separated or repeated).
    #[arg(long = "git-repo", env = "VIGIL_GIT_REPOS", value_delimiter = ',')]
    pub git_repos: Vec<PathBuf>,

    /// External integration feeds as name=command (comma separated or
    /// repeated).
    #[arg(long = "integration", env = "VIGIL_INTEGRATIONS", value_delimiter = ',')]
    pub integrations: Vec<String>,

    /// Clipboard truncation limit in bytes.
    #[arg(long, env = "VIGIL_CLIPBOARD_MAX", default_value = "10240")]
    pub clipboard_max: usize,

    /// Capture intervals in seconds.
    #[arg(long, env = "VIGIL_WINDOW_INTERVAL", default_value = "5")]
    pub window_interval: u64,

    #[arg(long, env = "VIGIL_SCREEN_INTERVAL", default_value = "60")]
    pub screen_interval: u64,

    #[arg(long, env = "VIGIL_GIT_INTERVAL", default_value = "30")]
    pub git_interval: u64,

    #[arg(long, env = "VIGIL_CLIPBOARD_INTERVAL", default_value = "5")]
    pub clipboard_interval: u64,

    #[arg(long, env = "VIGIL_ACTIVITY_INTERVAL", default_value = "5")]
    pub activity_interval: u64,

    #[arg(long, env = "VIGIL_AUDIO_INTERVAL", default_value = "300")]
    pub audio_interval: u64,

    #[arg(long, env = "VIGIL_BIOMETRICS_INTERVAL", default_value = "30")]
    pub biometrics_interval: u64,

    #[arg(long, env = "VIGIL_INTEGRATIONS_INTERVAL", default_value = "300")]
    pub integrations_interval: u64,
}

impl Config {
    /// Validate the configuration after parsing.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.log_format != "json" && self.log_format != "text" {
            anyhow::bail!("--log-format must be json or text");
        }
        if self.analysis_window == 0 {
            anyhow::bail!("--analysis-window must be positive");
        }
        for interval in [
            self.window_interval,
            self.screen_interval,
            self.git_interval,
            self.clipboard_interval,
            self.activity_interval,
            self.audio_interval,
            self.biometrics_interval,
            self.integrations_interval,
        ] {
            if interval == 0 {
                anyhow::bail!("capture intervals must be positive");
            }
        }
        if self.oracle_token.is_some() && self.oracle_url.is_none() {
            anyhow::bail!("--oracle-token requires --oracle-url");
        }
        Ok(())
    }

    /// Resolve the data directory, defaulting under the home directory.
    pub fn resolved_data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_owned());
        PathBuf::from(home).join(".local/share/vigil")
    }

    pub fn analysis_window(&self) -> Duration {
        Duration::from_secs(self.analysis_window)
    }

    pub fn audio_clip(&self) -> Duration {
        Duration::from_secs(self.audio_clip)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
