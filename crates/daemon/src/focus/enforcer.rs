// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Focus enforcer: samples the focused window at 1 Hz while a session is
//! active, classifies it against the mode, and escalates misaligned windows
//! from a colored border through a warning countdown to a forced close.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::compositor::Compositor;
use super::{
    is_browser, BrowserPolicy, Decision, DecisionAction, FocusMode, FocusSession,
    BORDER_ALLOWED, BORDER_BLOCKED, BORDER_DEFAULT, BORDER_WARNED,
};
use crate::capture::window::ActiveWindow;
use crate::notify::{Notifier, Urgency};
use crate::oracle::{DecisionOracle, Verdict, ORACLE_DEADLINE};
use crate::store::{now_ms, Store};

#[derive(Debug, Clone)]
pub struct EnforcerConfig {
    pub tick: Duration,
    pub warn_countdown: Duration,
    pub countdown_step: Duration,
    /// Minimum gap before the same window address is warned again.
    pub rewarn_after: Duration,
    pub oracle_deadline: Duration,
}

impl Default for EnforcerConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            warn_countdown: Duration::from_secs(5),
            countdown_step: Duration::from_millis(500),
            rewarn_after: Duration::from_secs(30),
            oracle_deadline: ORACLE_DEADLINE,
        }
    }
}

/// Pre-oracle classification of a focused window under a mode.
///
/// The branch order is user-visible semantics: allowed apps beat blocked
/// apps, and browser site allowlists beat pattern checks. Do not reorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Evaluation {
    Allow(&'static str),
    AskOracle { cache_key: String },
}

pub(crate) fn evaluate_window(mode: &FocusMode, class: &str, title: &str) -> Evaluation {
    let class_lc = class.to_lowercase();
    let title_lc = title.to_lowercase();

    if mode.allowed_apps.iter().any(|a| a.to_lowercase() == class_lc) {
        return Evaluation::Allow("app allowed by mode");
    }
    if mode.blocked_apps.iter().any(|a| a.to_lowercase() == class_lc) {
        // The app list alone never auto-blocks; the oracle judges intent.
        return Evaluation::AskOracle { cache_key: format!("{class}|{title}") };
    }
    if is_browser(class) {
        if mode.allowed_sites.iter().any(|s| title_lc.contains(&s.to_lowercase())) {
            return Evaluation::Allow("site allowed by mode");
        }
        if mode.blocked_patterns.iter().any(|p| title_lc.contains(&p.to_lowercase())) {
            return Evaluation::AskOracle { cache_key: title.to_owned() };
        }
        return match mode.browser_policy {
            BrowserPolicy::AskOracle => {
                Evaluation::AskOracle { cache_key: format!("{class}|{title}") }
            }
            BrowserPolicy::Allowlist | BrowserPolicy::BlockAll => {
                Evaluation::Allow("browser policy fallthrough")
            }
        };
    }
    if mode.blocked_patterns.iter().any(|p| title_lc.contains(&p.to_lowercase())) {
        return Evaluation::AskOracle { cache_key: title.to_owned() };
    }
    Evaluation::Allow("no rule matched")
}

pub(crate) fn session_expired(session: &FocusSession, mode: &FocusMode, now: u64) -> bool {
    mode.duration_minutes > 0
        && now >= session.started_at_ms + mode.duration_minutes * 60_000
}

/// Per-session working state, discarded when the session ends.
struct ActiveState {
    session: FocusSession,
    mode: FocusMode,
    cache: HashMap<String, Decision>,
    warned: HashMap<String, tokio::time::Instant>,
    applied_border: Option<(String, &'static str)>,
}

impl ActiveState {
    fn new(session: FocusSession, mode: FocusMode) -> Self {
        Self {
            session,
            mode,
            cache: HashMap::new(),
            warned: HashMap::new(),
            applied_border: None,
        }
    }
}

pub struct FocusEnforcer {
    store: Arc<Store>,
    compositor: Arc<dyn Compositor>,
    notifier: Arc<dyn Notifier>,
    oracle: Arc<dyn DecisionOracle>,
    cfg: EnforcerConfig,
    shutdown: CancellationToken,
    session: Option<ActiveState>,
}

impl FocusEnforcer {
    pub fn new(
        store: Arc<Store>,
        compositor: Arc<dyn Compositor>,
        notifier: Arc<dyn Notifier>,
        oracle: Arc<dyn DecisionOracle>,
        shutdown: CancellationToken,
    ) -> Self {
        Self::with_config(store, compositor, notifier, oracle, shutdown, EnforcerConfig::default())
    }

    pub fn with_config(
        store: Arc<Store>,
        compositor: Arc<dyn Compositor>,
        notifier: Arc<dyn Notifier>,
        oracle: Arc<dyn DecisionOracle>,
        shutdown: CancellationToken,
        cfg: EnforcerConfig,
    ) -> Self {
        Self { store, compositor, notifier, oracle, cfg, shutdown, session: None }
    }

    /// Run until the scope is cancelled. Any border applied during an active
    /// session is reverted on the way out.
    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.cfg.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        debug!("focus enforcer started");

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }
            self.tick().await;
        }

        if let Some(mut state) = self.session.take() {
            if let Some((addr, _)) = state.applied_border.take() {
                // The shared scope is already cancelled; revert with a
                // short-lived local one.
                let revert = CancellationToken::new();
                let _ = self.compositor.set_border(&addr, BORDER_DEFAULT, &revert).await;
            }
        }
        debug!("focus enforcer stopped");
    }

    async fn tick(&mut self) {
        if !self.sync_session().await {
            return;
        }

        let win = match self.compositor.active_window(&self.shutdown).await {
            Ok(Some(win)) => win,
            Ok(None) => return,
            Err(e) => {
                debug!(err = %e, "active window query failed");
                return;
            }
        };

        let decision = self.evaluate(&win).await;
        self.enforce(win, decision).await;
    }

    /// Reconcile with the sink's at-most-one active session. Returns `true`
    /// when a session is live after reconciliation.
    async fn sync_session(&mut self) -> bool {
        let active = self.store.active_session();
        let current = self.session.take();

        match (current, active) {
            (Some(mut state), Some(session)) if state.session.id == session.id => {
                state.session = session;
                if session_expired(&state.session, &state.mode, now_ms()) {
                    info!(session = %state.session.id, "focus session reached its duration");
                    if let Err(e) = self.store.end_session(&state.session.id) {
                        warn!(err = %e, "failed to end expired session");
                    }
                    self.revert_border(&mut state).await;
                    false
                } else {
                    self.session = Some(state);
                    true
                }
            }
            (old, Some(session)) => {
                if let Some(mut old) = old {
                    self.revert_border(&mut old).await;
                }
                let Some(mode) = self.store.mode(&session.mode_id) else {
                    warn!(mode_id = %session.mode_id, "active session references unknown mode");
                    return false;
                };
                info!(
                    session = %session.id,
                    mode = %mode.name,
                    purpose = %mode.purpose,
                    "focus session active"
                );
                self.session = Some(ActiveState::new(session, mode));
                true
            }
            (Some(mut old), None) => {
                info!(session = %old.session.id, "focus session ended");
                self.revert_border(&mut old).await;
                false
            }
            (None, None) => false,
        }
    }

    async fn evaluate(&mut self, win: &ActiveWindow) -> Decision {
        let evaluation = {
            let Some(state) = self.session.as_ref() else {
                return Decision::allow("no active session");
            };
            evaluate_window(&state.mode, &win.app_class, &win.title)
        };

        let cache_key = match evaluation {
            Evaluation::Allow(reason) => return Decision::allow(reason),
            Evaluation::AskOracle { cache_key } => cache_key,
        };

        if let Some(hit) = self.session.as_ref().and_then(|s| s.cache.get(&cache_key)) {
            return hit.clone();
        }

        let purpose =
            self.session.as_ref().map(|s| s.mode.purpose.clone()).unwrap_or_default();
        let call = self.oracle.decide(&purpose, &win.app_class, &win.title);
        let verdict = tokio::select! {
            _ = self.shutdown.cancelled() => None,
            res = tokio::time::timeout(self.cfg.oracle_deadline, call) => match res {
                Ok(Ok(verdict)) => Some(verdict),
                Ok(Err(e)) => {
                    warn!(err = %e, "oracle call failed, allowing");
                    None
                }
                Err(_) => {
                    warn!("oracle call timed out, allowing");
                    None
                }
            },
        };

        match verdict {
            Some(Verdict::Allow) => {
                let decision = Decision::allow("aligned with purpose");
                if let Some(state) = self.session.as_mut() {
                    state.cache.insert(cache_key, decision.clone());
                }
                decision
            }
            Some(Verdict::Block) => {
                let decision = Decision::warn("not aligned with purpose");
                if let Some(state) = self.session.as_mut() {
                    state.cache.insert(cache_key, decision.clone());
                }
                decision
            }
            // Fail open: allow, and never cache the failure.
            None => Decision::allow("oracle unavailable"),
        }
    }

    async fn enforce(&mut self, win: ActiveWindow, decision: Decision) {
        match decision.action {
            DecisionAction::Allow => {
                self.apply_border(&win.address, BORDER_ALLOWED).await;
            }
            DecisionAction::Warn | DecisionAction::Close => {
                let now = tokio::time::Instant::now();
                let recently_warned = self
                    .session
                    .as_ref()
                    .and_then(|s| s.warned.get(&win.address))
                    .is_some_and(|&t| now.duration_since(t) < self.cfg.rewarn_after);
                if recently_warned {
                    debug!(window = %win.title, "warned recently, skipping");
                    return;
                }
                if let Some(state) = self.session.as_mut() {
                    state.warned.insert(win.address.clone(), now);
                }
                self.warn_then_close(win, &decision.reason).await;
            }
        }
    }

    /// Warn with a colored border and notification, count down, and close
    /// the window if it still has focus at the end.
    async fn warn_then_close(&mut self, win: ActiveWindow, reason: &str) {
        self.apply_border(&win.address, BORDER_BLOCKED).await;
        let countdown = self.cfg.warn_countdown.as_secs();
        let body = format!("{}: {reason}; closing in {countdown} s", win.title);
        self.notifier.notify(Urgency::Low, "Focus mode", &body, &self.shutdown).await;

        let steps =
            (self.cfg.warn_countdown.as_millis() / self.cfg.countdown_step.as_millis()).max(1);
        for step in 0..steps {
            tokio::select! {
                // Cancellation interrupts the countdown; no close is issued.
                _ = self.shutdown.cancelled() => return,
                _ = tokio::time::sleep(self.cfg.countdown_step) => {}
            }

            let color = if step % 2 == 0 { BORDER_WARNED } else { BORDER_BLOCKED };
            self.apply_border(&win.address, color).await;

            match self.compositor.active_window(&self.shutdown).await {
                Ok(Some(current)) if current.address == win.address => {}
                Ok(_) => {
                    debug!(window = %win.title, "focus moved during countdown, not closing");
                    self.apply_border(&win.address, BORDER_DEFAULT).await;
                    return;
                }
                // Can't tell; keep counting rather than closing blind.
                Err(_) => {}
            }
        }

        let close = if is_browser(&win.app_class) {
            self.compositor.close_browser_tab(&win.address, &self.shutdown).await
        } else {
            self.compositor.close_window(&win.address, &self.shutdown).await
        };

        match close {
            Ok(()) => {
                let session_id = self.session.as_ref().map(|s| s.session.id.clone());
                if let Some(id) = session_id {
                    match self.store.record_block(&id) {
                        Ok(Some(updated)) => {
                            if let Some(state) = self.session.as_mut() {
                                state.session = updated;
                                state.applied_border = None;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => warn!(err = %e, "failed to record block"),
                    }
                }
                info!(window = %win.title, "blocked window closed");
                let body = format!("closed {}", win.title);
                self.notifier.notify(Urgency::Normal, "Focus mode", &body, &self.shutdown).await;
            }
            Err(e) => {
                warn!(err = %e, window = %win.title, "failed to close blocked window");
                self.apply_border(&win.address, BORDER_DEFAULT).await;
            }
        }
    }

    /// Set `color` on `address`, restoring the previous window's border to
    /// the default when focus moved. No-ops when already applied.
    async fn apply_border(&mut self, address: &str, color: &'static str) {
        let prev = {
            let Some(state) = self.session.as_mut() else {
                return;
            };
            if state.applied_border.as_ref().is_some_and(|(a, c)| a == address && *c == color) {
                return;
            }
            let prev = state.applied_border.take();
            state.applied_border = Some((address.to_owned(), color));
            prev
        };

        if let Some((prev_addr, _)) = prev {
            if prev_addr != address {
                let _ =
                    self.compositor.set_border(&prev_addr, BORDER_DEFAULT, &self.shutdown).await;
            }
        }
        if let Err(e) = self.compositor.set_border(address, color, &self.shutdown).await {
            debug!(err = %e, "border update failed");
        }
    }

    async fn revert_border(&self, state: &mut ActiveState) {
        if let Some((addr, _)) = state.applied_border.take() {
            if let Err(e) = self.compositor.set_border(&addr, BORDER_DEFAULT, &self.shutdown).await
            {
                debug!(err = %e, "border revert failed");
            }
        }
    }
}

#[cfg(test)]
#[path = "enforcer_tests.rs"]
mod tests;
