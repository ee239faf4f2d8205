// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Composite stress scoring over the three metric groups.
//!
//! Additive weighted buckets, capped at 100. Each severe/mild pair is
//! exclusive: the severe threshold suppresses its mild sibling.

use serde::Serialize;

use super::context::ContextMetrics;
use super::keystroke::KeystrokeMetrics;
use super::mouse::MouseMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StressLevel {
    Calm,
    Normal,
    Elevated,
    High,
    Anxious,
}

impl StressLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=14 => Self::Calm,
            15..=34 => Self::Normal,
            35..=54 => Self::Elevated,
            55..=74 => Self::High,
            _ => Self::Anxious,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calm => "calm",
            Self::Normal => "normal",
            Self::Elevated => "elevated",
            Self::High => "high",
            Self::Anxious => "anxious",
        }
    }
}

impl std::fmt::Display for StressLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of all derived behavior metrics plus the composite score.
#[derive(Debug, Clone, Serialize)]
pub struct StressSnapshot {
    pub mouse: MouseMetrics,
    pub keystrokes: KeystrokeMetrics,
    pub context: ContextMetrics,
    pub score: u32,
    pub level: StressLevel,
    /// Human-readable contributors in bucket order.
    pub indicators: Vec<String>,
}

pub(crate) fn score(
    mouse: &MouseMetrics,
    keys: &KeystrokeMetrics,
    ctx: &ContextMetrics,
) -> (u32, Vec<String>) {
    let mut total = 0u32;
    let mut indicators: Vec<String> = Vec::new();
    let mut add = |weight: u32, label: &str| {
        indicators.push(label.to_owned());
        weight
    };

    if mouse.jitter > 0.30 {
        total += add(15, "erratic mouse movement");
    } else if mouse.jitter > 0.15 {
        total += add(8, "jittery mouse movement");
    }

    if mouse.speed_variance > 50_000.0 {
        total += add(10, "highly variable mouse speed");
    } else if mouse.speed_variance > 20_000.0 {
        total += add(5, "variable mouse speed");
    }

    if mouse.directness > 3.0 {
        total += add(5, "indirect mouse paths");
    }

    if keys.pause_count > 10 {
        total += add(15, "many typing pauses");
    } else if keys.pause_count > 5 {
        total += add(8, "frequent typing pauses");
    }

    if keys.pause_sd_ms > 1000.0 {
        total += add(10, "irregular pause durations");
    }

    if keys.error_rate > 0.15 {
        total += add(10, "high typing error rate");
    } else if keys.error_rate > 0.08 {
        total += add(5, "elevated typing error rate");
    }

    if keys.keys_per_minute > 0.0 && keys.keys_per_minute < 30.0 {
        total += add(5, "slow typing rate");
    }

    if ctx.rapid_switches > 10 {
        total += add(15, "many rapid window switches");
    } else if ctx.rapid_switches > 5 {
        total += add(8, "frequent rapid window switches");
    }

    if ctx.switches_per_minute > 3.0 {
        total += add(10, "high window switch rate");
    } else if ctx.switches_per_minute > 1.5 {
        total += add(5, "elevated window switch rate");
    }

    if ctx.avg_window_secs > 0.0 && ctx.avg_window_secs < 10.0 {
        total += add(5, "brief window focus");
    }

    (total.min(100), indicators)
}

#[cfg(test)]
#[path = "score_tests.rs"]
mod tests;
