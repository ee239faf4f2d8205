// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serial_test::serial;

use super::{detect_display_server, DisplayServer, Platform, Tool};

fn clear_display_env() {
    for var in [
        "HYPRLAND_INSTANCE_SIGNATURE",
        "WAYLAND_DISPLAY",
        "SWAYSOCK",
        "XDG_SESSION_TYPE",
        "DISPLAY",
    ] {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn hyprland_signature_wins() {
    clear_display_env();
    std::env::set_var("HYPRLAND_INSTANCE_SIGNATURE", "abc123");
    std::env::set_var("WAYLAND_DISPLAY", "wayland-1");
    assert_eq!(detect_display_server(), DisplayServer::Hyprland);
    clear_display_env();
}

#[test]
#[serial]
fn wayland_display_without_signature() {
    clear_display_env();
    std::env::set_var("WAYLAND_DISPLAY", "wayland-1");
    assert_eq!(detect_display_server(), DisplayServer::Wayland);
    clear_display_env();
}

#[test]
#[serial]
fn session_type_alone_is_wayland() {
    clear_display_env();
    std::env::set_var("XDG_SESSION_TYPE", "wayland");
    assert_eq!(detect_display_server(), DisplayServer::Wayland);
    clear_display_env();
}

#[test]
#[serial]
fn x11_display_fallback() {
    clear_display_env();
    std::env::set_var("DISPLAY", ":0");
    assert_eq!(detect_display_server(), DisplayServer::X11);
    clear_display_env();
}

#[test]
#[serial]
fn empty_vars_mean_unknown() {
    clear_display_env();
    std::env::set_var("WAYLAND_DISPLAY", "");
    if cfg!(target_os = "macos") {
        assert_eq!(detect_display_server(), DisplayServer::MacOs);
    } else {
        assert_eq!(detect_display_server(), DisplayServer::Unknown);
    }
    clear_display_env();
}

#[test]
fn fixed_platform_gates_capabilities() {
    let p = Platform::fixed(DisplayServer::Hyprland, &[Tool::WindowInspector]);
    assert!(p.can_capture_window());
    assert!(!p.can_capture_screen());
    assert!(p.has(Tool::WindowInspector));
    assert!(!p.has(Tool::Screenshotter));
}

#[test]
fn window_capture_needs_hyprland() {
    let p = Platform::fixed(DisplayServer::Wayland, &[Tool::WindowInspector]);
    assert!(!p.can_capture_window());
    assert!(p.is_wayland());
}

#[test]
fn screen_capture_allowed_on_generic_wayland() {
    let p = Platform::fixed(DisplayServer::Wayland, &[Tool::Screenshotter]);
    assert!(p.can_capture_screen());
}

#[test]
fn x11_resolves_x11_helpers() {
    let p = Platform::fixed(DisplayServer::X11, &[]);
    assert_eq!(p.tool_command(Tool::Screenshotter), "scrot");
    assert_eq!(p.tool_command(Tool::ClipboardReader), "xclip");
    assert_eq!(p.tool_command(Tool::TextInjector), "xdotool");
}

#[test]
fn wayland_resolves_wayland_helpers() {
    let p = Platform::fixed(DisplayServer::Hyprland, &[]);
    assert_eq!(p.tool_command(Tool::Screenshotter), "grim");
    assert_eq!(p.tool_command(Tool::ClipboardReader), "wl-paste");
    assert_eq!(p.tool_command(Tool::TextInjector), "wtype");
}
