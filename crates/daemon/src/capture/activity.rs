// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Activity probe: samples the shared last-input clock, publishes the
//! active/idle state, and feeds completed idle periods to the analyzer.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use super::{CaptureContext, CaptureFuture, CaptureResult, Probe, Sample};
use crate::analyzer::{BehaviorAnalyzer, IdlePeriod};

pub const SOURCE: &str = "activity";

/// Inactivity stretch that counts as idle.
pub const IDLE_THRESHOLD: Duration = Duration::from_secs(60);

/// Last-observed-input instant, shared between the trackers (writers) and
/// the activity probe (reader).
pub struct ActivityClock {
    last_input: Mutex<Instant>,
}

impl Default for ActivityClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityClock {
    pub fn new() -> Self {
        Self { last_input: Mutex::new(Instant::now()) }
    }

    /// Record that user input was just observed.
    pub fn touch(&self) {
        *self.last_input.lock() = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_input.lock().elapsed()
    }

    pub fn last_input(&self) -> Instant {
        *self.last_input.lock()
    }
}

struct ActivityState {
    idle_since: Option<Instant>,
    last_reported_idle: Option<bool>,
}

pub struct ActivityProbe {
    clock: Arc<ActivityClock>,
    analyzer: BehaviorAnalyzer,
    threshold: Duration,
    interval: Duration,
    state: Mutex<ActivityState>,
}

impl ActivityProbe {
    pub fn new(clock: Arc<ActivityClock>, analyzer: BehaviorAnalyzer, interval: Duration) -> Self {
        Self::with_threshold(clock, analyzer, interval, IDLE_THRESHOLD)
    }

    pub fn with_threshold(
        clock: Arc<ActivityClock>,
        analyzer: BehaviorAnalyzer,
        interval: Duration,
        threshold: Duration,
    ) -> Self {
        Self {
            clock,
            analyzer,
            threshold,
            interval,
            state: Mutex::new(ActivityState { idle_since: None, last_reported_idle: None }),
        }
    }
}

impl Probe for ActivityProbe {
    fn name(&self) -> &'static str {
        SOURCE
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn available(&self) -> bool {
        true
    }

    fn capture<'a>(&'a self, _ctx: &'a CaptureContext) -> CaptureFuture<'a> {
        Box::pin(async move {
            let idle_for = self.clock.idle_for();
            let is_idle = idle_for >= self.threshold;

            let flipped = {
                let mut state = self.state.lock();
                if is_idle {
                    if state.idle_since.is_none() {
                        // The stretch started when input stopped, not now.
                        state.idle_since = Some(Instant::now() - idle_for);
                    }
                } else if let Some(start) = state.idle_since.take() {
                    let end = self.clock.last_input();
                    if let Some(duration) =
                        end.checked_duration_since(start).filter(|d| !d.is_zero())
                    {
                        self.analyzer.record_idle(IdlePeriod { start, duration });
                    }
                }
                let flipped = state.last_reported_idle != Some(is_idle);
                state.last_reported_idle = Some(is_idle);
                flipped
            };

            if !flipped {
                return Ok(Sample::Unchanged);
            }

            let result = CaptureResult::new(SOURCE)
                .meta("state", if is_idle { "idle" } else { "active" })
                .meta("idle_seconds", idle_for.as_secs());
            Ok(Sample::Changed(result))
        })
    }
}

#[cfg(test)]
#[path = "activity_tests.rs"]
mod tests;
