// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Windowing-system primitives the enforcer drives: focus sampling, border
//! colors, and window closing.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::capture::window::{query_active_window, ActiveWindow};
use crate::error::ProbeError;
use crate::helper::run_helper;
use crate::platform::{Platform, Tool};

type ActionFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;
type WindowFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Option<ActiveWindow>, ProbeError>> + Send + 'a>>;

pub trait Compositor: Send + Sync + 'static {
    fn active_window<'a>(&'a self, cancel: &'a CancellationToken) -> WindowFuture<'a>;

    fn set_border<'a>(
        &'a self,
        address: &'a str,
        color: &'a str,
        cancel: &'a CancellationToken,
    ) -> ActionFuture<'a>;

    /// Ask the compositor to close the window outright.
    fn close_window<'a>(
        &'a self,
        address: &'a str,
        cancel: &'a CancellationToken,
    ) -> ActionFuture<'a>;

    /// Inject a close-tab chord into a browser window instead of killing
    /// the whole browser.
    fn close_browser_tab<'a>(
        &'a self,
        address: &'a str,
        cancel: &'a CancellationToken,
    ) -> ActionFuture<'a>;
}

const ACTION_DEADLINE: Duration = Duration::from_secs(2);

pub struct HyprlandCompositor {
    platform: Arc<Platform>,
}

impl HyprlandCompositor {
    pub fn new(platform: Arc<Platform>) -> Self {
        Self { platform }
    }

    async fn hyprctl(&self, args: &[&str], cancel: &CancellationToken) -> anyhow::Result<()> {
        let inspector = self.platform.tool_command(Tool::WindowInspector);
        run_helper(inspector, args, ACTION_DEADLINE, cancel).await?;
        Ok(())
    }
}

impl Compositor for HyprlandCompositor {
    fn active_window<'a>(&'a self, cancel: &'a CancellationToken) -> WindowFuture<'a> {
        Box::pin(async move { query_active_window(&self.platform, ACTION_DEADLINE, cancel).await })
    }

    fn set_border<'a>(
        &'a self,
        address: &'a str,
        color: &'a str,
        cancel: &'a CancellationToken,
    ) -> ActionFuture<'a> {
        Box::pin(async move {
            let target = format!("address:{address}");
            self.hyprctl(&["setprop", &target, "activebordercolor", color], cancel).await
        })
    }

    fn close_window<'a>(
        &'a self,
        address: &'a str,
        cancel: &'a CancellationToken,
    ) -> ActionFuture<'a> {
        Box::pin(async move {
            let target = format!("address:{address}");
            self.hyprctl(&["dispatch", "closewindow", &target], cancel).await
        })
    }

    fn close_browser_tab<'a>(
        &'a self,
        address: &'a str,
        cancel: &'a CancellationToken,
    ) -> ActionFuture<'a> {
        Box::pin(async move {
            let chord = format!("CTRL,W,address:{address}");
            self.hyprctl(&["dispatch", "sendshortcut", &chord], cancel).await
        })
    }
}
