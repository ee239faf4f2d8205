// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Desktop notification transport, thin by design.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::helper::run_helper;
use crate::platform::{Platform, Tool};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Low,
    Normal,
}

impl Urgency {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
        }
    }
}

pub trait Notifier: Send + Sync + 'static {
    fn notify<'a>(
        &'a self,
        urgency: Urgency,
        summary: &'a str,
        body: &'a str,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;
}

/// Shells out to the platform notifier. Failures are logged and dropped;
/// a missed toast never matters to the core.
pub struct CommandNotifier {
    platform: Arc<Platform>,
}

impl CommandNotifier {
    pub fn new(platform: Arc<Platform>) -> Self {
        Self { platform }
    }
}

impl Notifier for CommandNotifier {
    fn notify<'a>(
        &'a self,
        urgency: Urgency,
        summary: &'a str,
        body: &'a str,
        cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            if !self.platform.has(Tool::Notifier) {
                return;
            }
            let notifier = self.platform.tool_command(Tool::Notifier);
            let args = ["-a", "vigil", "-u", urgency.as_str(), summary, body];
            if let Err(e) = run_helper(notifier, &args, Duration::from_secs(3), cancel).await {
                debug!(err = %e, "notification failed");
            }
        })
    }
}

/// Swallows everything. Used when the platform has no notifier and in tests.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify<'a>(
        &'a self,
        _urgency: Urgency,
        _summary: &'a str,
        _body: &'a str,
        _cancel: &'a CancellationToken,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async {})
    }
}
