// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Keyboard tracker: event-stream reader for the primary keyboard device.
//!
//! Privacy invariant: keycodes exist only inside this module's press-time
//! map. Everything published downstream is a [`KeystrokeEvent`] carrying
//! hold duration and the error-class flag, nothing else.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::analyzer::{BehaviorAnalyzer, KeystrokeEvent};
use crate::capture::activity::ActivityClock;

/// Linux input event type for key events.
const EV_KEY: u16 = 0x01;
const KEY_PRESS: i32 = 1;
const KEY_RELEASE: i32 = 0;

const KEY_BACKSPACE: u16 = 14;
const KEY_DELETE: u16 = 111;

/// One 24-byte record from the kernel event interface:
/// 16 bytes timeval, then type, code, value, little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RawInputEvent {
    pub kind: u16,
    pub code: u16,
    pub value: i32,
}

pub(crate) fn parse_event(buf: &[u8; 24]) -> RawInputEvent {
    RawInputEvent {
        kind: u16::from_le_bytes([buf[16], buf[17]]),
        code: u16::from_le_bytes([buf[18], buf[19]]),
        value: i32::from_le_bytes([buf[20], buf[21], buf[22], buf[23]]),
    }
}

/// Find the primary keyboard's event device, if one is visible.
pub fn locate_device() -> Option<PathBuf> {
    for dir in ["/dev/input/by-path", "/dev/input/by-id"] {
        let Ok(entries) = std::fs::read_dir(dir) else {
            continue;
        };
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with("-event-kbd"))
            })
            .collect();
        paths.sort();
        if let Some(path) = paths.into_iter().next() {
            return Some(path);
        }
    }
    None
}

pub struct KeyboardTracker {
    device: PathBuf,
    analyzer: BehaviorAnalyzer,
    clock: Arc<ActivityClock>,
}

impl KeyboardTracker {
    pub fn new(device: PathBuf, analyzer: BehaviorAnalyzer, clock: Arc<ActivityClock>) -> Self {
        Self { device, analyzer, clock }
    }

    /// Whether the device can actually be opened. Permission failures are a
    /// disabled capability, not an error.
    pub fn available(device: &Path) -> bool {
        std::fs::File::open(device).is_ok()
    }

    pub async fn run(self, cancel: CancellationToken) {
        let mut file = match tokio::fs::File::open(&self.device).await {
            Ok(file) => file,
            Err(e) => {
                info!(device = %self.device.display(), err = %e, "keyboard tracking disabled");
                return;
            }
        };

        debug!(device = %self.device.display(), "keyboard tracker started");
        let mut pressed: HashMap<u16, Instant> = HashMap::new();
        let mut buf = [0u8; 24];

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                read = file.read_exact(&mut buf) => {
                    if read.is_err() {
                        break;
                    }
                }
            }

            let event = parse_event(&buf);
            if event.kind != EV_KEY {
                continue;
            }
            match event.value {
                KEY_PRESS => {
                    self.clock.touch();
                    pressed.insert(event.code, Instant::now());
                }
                KEY_RELEASE => {
                    let Some(down) = pressed.remove(&event.code) else {
                        continue;
                    };
                    let is_error = matches!(event.code, KEY_BACKSPACE | KEY_DELETE);
                    // The keycode stops here.
                    self.analyzer.record_keystroke(KeystrokeEvent {
                        t: Instant::now(),
                        hold: down.elapsed(),
                        is_error,
                    });
                }
                _ => {}
            }
        }
        debug!("keyboard tracker stopped");
    }
}

#[cfg(test)]
#[path = "keyboard_tests.rs"]
mod tests;
