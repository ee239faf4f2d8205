// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{is_browser, BrowserPolicy, Decision, DecisionAction, FocusMode, FocusSession};

#[test]
fn browser_detection_is_case_insensitive() {
    assert!(is_browser("firefox"));
    assert!(is_browser("Firefox"));
    assert!(is_browser("google-chrome"));
    assert!(is_browser("LibreWolf"));
    assert!(!is_browser("kitty"));
    assert!(!is_browser("code"));
    // Substring is not enough: the class must match exactly.
    assert!(!is_browser("firefox-launcher"));
}

#[test]
fn browser_policy_serializes_snake_case() -> anyhow::Result<()> {
    assert_eq!(serde_json::to_string(&BrowserPolicy::AskOracle)?, r#""ask_oracle""#);
    assert_eq!(serde_json::to_string(&BrowserPolicy::BlockAll)?, r#""block_all""#);
    let parsed: BrowserPolicy = serde_json::from_str(r#""allowlist""#)?;
    assert_eq!(parsed, BrowserPolicy::Allowlist);
    Ok(())
}

#[test]
fn mode_roundtrips_through_json() -> anyhow::Result<()> {
    let mut mode = FocusMode::new("writing", "draft the essay");
    mode.allowed_apps = vec!["obsidian".to_owned()];
    mode.duration_minutes = 50;

    let json = serde_json::to_string(&mode)?;
    let parsed: FocusMode = serde_json::from_str(&json)?;
    assert_eq!(parsed.id, mode.id);
    assert_eq!(parsed.purpose, "draft the essay");
    assert_eq!(parsed.allowed_apps, vec!["obsidian".to_owned()]);
    assert_eq!(parsed.duration_minutes, 50);
    Ok(())
}

#[test]
fn minimal_mode_json_gets_defaults() -> anyhow::Result<()> {
    let json = r#"{"id": "m1", "name": "n", "purpose": "p", "created_at_ms": 1}"#;
    let mode: FocusMode = serde_json::from_str(json)?;
    assert!(mode.allowed_apps.is_empty());
    assert_eq!(mode.browser_policy, BrowserPolicy::AskOracle);
    assert_eq!(mode.duration_minutes, 0);
    Ok(())
}

#[test]
fn session_activity_tracks_end_timestamp() {
    let mut session = FocusSession {
        id: "s1".to_owned(),
        mode_id: "m1".to_owned(),
        started_at_ms: 10,
        ended_at_ms: None,
        blocks_count: 0,
    };
    assert!(session.is_active());
    session.ended_at_ms = Some(20);
    assert!(!session.is_active());
}

#[test]
fn decision_constructors() {
    let allow = Decision::allow("fine");
    assert!(allow.allowed);
    assert_eq!(allow.action, DecisionAction::Allow);

    let warn = Decision::warn("not aligned with purpose");
    assert!(!warn.allowed);
    assert_eq!(warn.action, DecisionAction::Warn);
    assert_eq!(warn.reason, "not aligned with purpose");
}
