// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Top-level daemon assembly: platform detection, probe wiring, trackers,
//! scheduler, enforcer, and the shutdown path.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::analyzer::BehaviorAnalyzer;
use crate::capture::activity::{ActivityClock, ActivityProbe};
use crate::capture::audio::AudioProbe;
use crate::capture::biometrics::BiometricsProbe;
use crate::capture::clipboard::ClipboardProbe;
use crate::capture::git::GitProbe;
use crate::capture::integrations::{Integration, IntegrationsProbe};
use crate::capture::screen::ScreenProbe;
use crate::capture::window::WindowProbe;
use crate::config::Config;
use crate::focus::compositor::{Compositor, HyprlandCompositor};
use crate::focus::FocusEnforcer;
use crate::notify::{CommandNotifier, Notifier, NullNotifier};
use crate::oracle::{DecisionOracle, HttpOracle, NullOracle};
use crate::platform::{Platform, Tool};
use crate::scheduler::{OcrCommand, Scheduler};
use crate::store::Store;
use crate::tracker::{keyboard, KeyboardTracker, MouseTracker};

/// How long tasks get to observe cancellation before we stop waiting.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

pub fn init_logging(config: &Config) {
    use tracing_subscriber::fmt;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));
    let result = match config.log_format.as_str() {
        "json" => fmt::fmt().with_env_filter(filter).json().try_init(),
        _ => fmt::fmt().with_env_filter(filter).try_init(),
    };
    // A second init (tests, embedding) is fine.
    let _ = result;
}

fn secs(value: u64) -> Duration {
    Duration::from_secs(value)
}

/// Run the daemon until interrupted.
pub async fn run(config: Config) -> anyhow::Result<()> {
    init_logging(&config);

    let platform = Arc::new(Platform::detect());
    info!(
        display = %platform.display_server(),
        window_capture = platform.can_capture_window(),
        screen_capture = platform.can_capture_screen(),
        "platform detected"
    );

    let data_dir = config.resolved_data_dir();
    let store = Arc::new(Store::open(&data_dir)?);
    let analyzer = BehaviorAnalyzer::with_window(config.analysis_window());
    let clock = Arc::new(ActivityClock::new());
    let shutdown = CancellationToken::new();

    let mut handles = Vec::new();

    // High-frequency trackers.
    let mouse = MouseTracker::new(platform.clone(), analyzer.clone(), clock.clone());
    if mouse.available() {
        handles.push(tokio::spawn(mouse.run(shutdown.clone())));
    } else {
        info!("mouse tracking unavailable");
    }
    match keyboard::locate_device() {
        Some(device) if KeyboardTracker::available(&device) => {
            let tracker = KeyboardTracker::new(device, analyzer.clone(), clock.clone());
            handles.push(tokio::spawn(tracker.run(shutdown.clone())));
        }
        Some(device) => {
            info!(device = %device.display(), "keyboard device not readable, tracking disabled");
        }
        None => info!("no keyboard event device found, tracking disabled"),
    }

    // Capture probes. Unavailable ones are skipped at spawn.
    let mut scheduler = Scheduler::new(store.clone(), analyzer.clone(), shutdown.clone());
    if !config.no_ocr && platform.has(Tool::Ocr) {
        scheduler = scheduler.with_ocr(Arc::new(OcrCommand::new(platform.clone())));
    }
    scheduler.add_probe(Arc::new(WindowProbe::new(
        platform.clone(),
        secs(config.window_interval),
    )));
    scheduler.add_probe(Arc::new(ScreenProbe::new(
        platform.clone(),
        secs(config.screen_interval),
    )));
    scheduler.add_probe(Arc::new(ClipboardProbe::new(
        platform.clone(),
        secs(config.clipboard_interval),
        config.clipboard_max,
    )));
    for repo in &config.git_repos {
        scheduler.add_probe(Arc::new(GitProbe::new(repo.clone(), secs(config.git_interval))));
    }
    scheduler.add_probe(Arc::new(ActivityProbe::new(
        clock.clone(),
        analyzer.clone(),
        secs(config.activity_interval),
    )));
    scheduler.add_probe(Arc::new(AudioProbe::new(
        config.audio,
        config.audio_clip(),
        secs(config.audio_interval),
    )));
    scheduler.add_probe(Arc::new(BiometricsProbe::new(
        analyzer.clone(),
        secs(config.biometrics_interval),
    )));
    let feeds: Vec<Integration> =
        config.integrations.iter().filter_map(|s| Integration::parse(s)).collect();
    scheduler.add_probe(Arc::new(IntegrationsProbe::new(
        feeds,
        secs(config.integrations_interval),
    )));
    handles.extend(scheduler.spawn());

    // Focus enforcement needs compositor introspection.
    if platform.can_capture_window() {
        let compositor: Arc<dyn Compositor> = Arc::new(HyprlandCompositor::new(platform.clone()));
        let notifier: Arc<dyn Notifier> = if platform.has(Tool::Notifier) {
            Arc::new(CommandNotifier::new(platform.clone()))
        } else {
            Arc::new(NullNotifier)
        };
        let oracle: Arc<dyn DecisionOracle> = match &config.oracle_url {
            Some(url) => Arc::new(HttpOracle::new(url.clone(), config.oracle_token.clone())?),
            None => {
                info!("no oracle configured, focus decisions fail open");
                Arc::new(NullOracle)
            }
        };
        let enforcer =
            FocusEnforcer::new(store.clone(), compositor, notifier, oracle, shutdown.clone());
        handles.push(tokio::spawn(enforcer.run()));
    } else {
        info!("focus enforcement disabled: compositor introspection unavailable");
    }

    info!(data_dir = %data_dir.display(), "vigil daemon running");
    tokio::signal::ctrl_c().await?;
    info!("shutdown requested");
    shutdown.cancel();

    let drain = futures_util::future::join_all(handles);
    if tokio::time::timeout(SHUTDOWN_GRACE, drain).await.is_err() {
        warn!("some tasks did not stop within the shutdown grace period");
    }
    Ok(())
}
