// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Windowed behavioral analyzer.
//!
//! A passive data structure: trackers and the scheduler append events, the
//! biometrics probe asks for a [`StressSnapshot`]. One exclusive lock
//! serializes all mutation and analysis, so a snapshot always observes a
//! consistent prefix of every stream. The analyzer never calls back into
//! its producers.

pub mod context;
pub mod events;
pub mod keystroke;
pub mod mouse;
pub mod score;

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

pub use context::ContextMetrics;
pub use events::{IdlePeriod, KeystrokeEvent, Position};
pub use keystroke::KeystrokeMetrics;
pub use mouse::MouseMetrics;
pub use score::{StressLevel, StressSnapshot};

/// Default analysis window.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(300);

// Soft pre-allocated capacities; growth is allowed, pruning keeps the
// window bound regardless.
const MOUSE_CAPACITY: usize = 1000;
const KEY_CAPACITY: usize = 1000;
const SWITCH_CAPACITY: usize = 100;
const IDLE_CAPACITY: usize = 100;

struct Buffers {
    window: Duration,
    mouse: VecDeque<Position>,
    keys: VecDeque<KeystrokeEvent>,
    switches: VecDeque<Instant>,
    idles: VecDeque<IdlePeriod>,
}

impl Buffers {
    fn new(window: Duration) -> Self {
        Self {
            window,
            mouse: VecDeque::with_capacity(MOUSE_CAPACITY),
            keys: VecDeque::with_capacity(KEY_CAPACITY),
            switches: VecDeque::with_capacity(SWITCH_CAPACITY),
            idles: VecDeque::with_capacity(IDLE_CAPACITY),
        }
    }

    /// Drop every event at or before `now - window`. Buffers are appended
    /// in timestamp order, so popping from the front suffices.
    fn prune(&mut self, now: Instant) {
        let Some(cutoff) = now.checked_sub(self.window) else {
            return;
        };
        while self.mouse.front().is_some_and(|p| p.t <= cutoff) {
            self.mouse.pop_front();
        }
        while self.keys.front().is_some_and(|k| k.t <= cutoff) {
            self.keys.pop_front();
        }
        while self.switches.front().is_some_and(|&t| t <= cutoff) {
            self.switches.pop_front();
        }
        while self.idles.front().is_some_and(|i| i.start <= cutoff) {
            self.idles.pop_front();
        }
    }
}

/// Cloneable handle to the shared analyzer state.
#[derive(Clone)]
pub struct BehaviorAnalyzer {
    inner: Arc<Mutex<Buffers>>,
}

impl Default for BehaviorAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl BehaviorAnalyzer {
    pub fn new() -> Self {
        Self::with_window(DEFAULT_WINDOW)
    }

    pub fn with_window(window: Duration) -> Self {
        Self { inner: Arc::new(Mutex::new(Buffers::new(window))) }
    }

    pub fn record_mouse(&self, position: Position) {
        let mut buffers = self.inner.lock();
        buffers.prune(Instant::now());
        buffers.mouse.push_back(position);
    }

    pub fn record_keystroke(&self, event: KeystrokeEvent) {
        let mut buffers = self.inner.lock();
        buffers.prune(Instant::now());
        buffers.keys.push_back(event);
    }

    pub fn record_window_switch(&self, t: Instant) {
        let mut buffers = self.inner.lock();
        buffers.prune(Instant::now());
        buffers.switches.push_back(t);
    }

    pub fn record_idle(&self, period: IdlePeriod) {
        let mut buffers = self.inner.lock();
        buffers.prune(Instant::now());
        buffers.idles.push_back(period);
    }

    /// Compute a consistent snapshot of all metrics and the composite score.
    pub fn analyze(&self) -> StressSnapshot {
        let mut buffers = self.inner.lock();
        buffers.prune(Instant::now());

        let mouse = mouse::compute(buffers.mouse.make_contiguous());
        let keystrokes = keystroke::compute(buffers.keys.make_contiguous());
        let Buffers { switches, idles, .. } = &mut *buffers;
        let context = context::compute(switches.make_contiguous(), idles.make_contiguous());

        let (score, indicators) = score::score(&mouse, &keystrokes, &context);
        StressSnapshot {
            mouse,
            keystrokes,
            context,
            score,
            level: StressLevel::from_score(score),
            indicators,
        }
    }

    /// Number of buffered events per stream, post-prune. Test observability.
    pub fn depths(&self) -> (usize, usize, usize, usize) {
        let mut buffers = self.inner.lock();
        buffers.prune(Instant::now());
        (buffers.mouse.len(), buffers.keys.len(), buffers.switches.len(), buffers.idles.len())
    }
}

#[cfg(test)]
#[path = "analyzer_tests.rs"]
mod tests;
