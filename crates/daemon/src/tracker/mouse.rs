// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mouse tracker: polls the compositor for cursor coordinates at ~20 Hz.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::analyzer::{BehaviorAnalyzer, Position};
use crate::capture::activity::ActivityClock;
use crate::helper::run_helper;
use crate::platform::{Platform, Tool};

/// Base polling period; each iteration adds a small random jitter.
const BASE_PERIOD: Duration = Duration::from_millis(45);
const JITTER_MS: u64 = 10;

/// Parse `hyprctl cursorpos` output: `x, y`.
pub(crate) fn parse_cursorpos(raw: &str) -> Option<(i32, i32)> {
    let (x, y) = raw.trim().split_once(',')?;
    Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
}

pub struct MouseTracker {
    platform: Arc<Platform>,
    analyzer: BehaviorAnalyzer,
    clock: Arc<ActivityClock>,
}

impl MouseTracker {
    pub fn new(
        platform: Arc<Platform>,
        analyzer: BehaviorAnalyzer,
        clock: Arc<ActivityClock>,
    ) -> Self {
        Self { platform, analyzer, clock }
    }

    pub fn available(&self) -> bool {
        self.platform.can_capture_window()
    }

    /// Poll until the scope is cancelled. Failed polls are skipped silently.
    pub async fn run(self, cancel: CancellationToken) {
        let inspector = self.platform.tool_command(Tool::WindowInspector);
        let mut last: Option<(i32, i32)> = None;

        debug!("mouse tracker started");
        loop {
            let jitter = rand::rng().random_range(0..=JITTER_MS);
            let period = BASE_PERIOD + Duration::from_millis(jitter);
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(period) => {}
            }

            let Ok(out) =
                run_helper(inspector, &["cursorpos"], Duration::from_secs(1), &cancel).await
            else {
                continue;
            };
            let Some((x, y)) = parse_cursorpos(&String::from_utf8_lossy(&out)) else {
                continue;
            };

            if last != Some((x, y)) {
                self.clock.touch();
                last = Some((x, y));
            }
            self.analyzer.record_mouse(Position { x, y, t: Instant::now() });
        }
        debug!("mouse tracker stopped");
    }
}

#[cfg(test)]
#[path = "mouse_tests.rs"]
mod tests;
