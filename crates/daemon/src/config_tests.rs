// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;

use super::Config;

fn parse(args: &[&str]) -> Config {
    let mut full = vec!["vigil"];
    full.extend_from_slice(args);
    Config::try_parse_from(full).unwrap_or_else(|e| panic!("parse failed: {e}"))
}

#[test]
fn defaults_match_documented_intervals() -> anyhow::Result<()> {
    let config = parse(&[]);
    config.validate()?;
    assert_eq!(config.window_interval, 5);
    assert_eq!(config.screen_interval, 60);
    assert_eq!(config.git_interval, 30);
    assert_eq!(config.clipboard_interval, 5);
    assert_eq!(config.activity_interval, 5);
    assert_eq!(config.audio_interval, 300);
    assert_eq!(config.biometrics_interval, 30);
    assert_eq!(config.integrations_interval, 300);
    assert_eq!(config.clipboard_max, 10 * 1024);
    assert!(!config.audio);
    Ok(())
}

#[test]
fn zero_intervals_are_rejected() {
    let config = parse(&["--window-interval", "0"]);
    assert!(config.validate().is_err());
}

#[test]
fn zero_analysis_window_is_rejected() {
    let config = parse(&["--analysis-window", "0"]);
    assert!(config.validate().is_err());
}

#[test]
fn bad_log_format_is_rejected() {
    let config = parse(&["--log-format", "yaml"]);
    assert!(config.validate().is_err());
}

#[test]
fn oracle_token_requires_url() {
    let config = parse(&["--oracle-token", "secret"]);
    assert!(config.validate().is_err());
    let config = parse(&["--oracle-url", "https://oracle.local/v1", "--oracle-token", "secret"]);
    assert!(config.validate().is_ok());
}

#[test]
fn repeated_and_delimited_lists_parse() {
    let config = parse(&[
        "--git-repo",
        "/src/a,/src/b",
        "--git-repo",
        "/src/c",
        "--integration",
        "mail=fetch-mail",
    ]);
    assert_eq!(config.git_repos.len(), 3);
    assert_eq!(config.integrations.len(), 1);
}

#[test]
fn explicit_data_dir_wins() {
    let config = parse(&["--data-dir", "/tmp/vigil-test"]);
    assert_eq!(config.resolved_data_dir(), std::path::PathBuf::from("/tmp/vigil-test"));
}
