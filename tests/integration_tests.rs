//! Integration tests for the deer-guide CLI

use std::process::{Command, Output};

fn deer_guide(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_deer-guide"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .env_remove("DEERGUIDE_CONFIG")
        .args(args)
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI describes itself with --help
#[test]
fn test_cli_help() {
    let output = deer_guide(&["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Whitetail hunting recommendations"));
    assert!(stdout.contains("--once"));
    assert!(stdout.contains("--config"));
}

#[test]
fn test_cli_version() {
    let output = deer_guide(&["--version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

/// An empty location is rejected before any request is made
#[test]
fn test_once_with_empty_location_fails() {
    let output = deer_guide(&["--config", "config/default.toml", "--once", ""]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Analysis failed"));
    assert!(stderr.contains("Location cannot be empty"));
}

#[test]
fn test_invalid_config_override_is_rejected() {
    let output = Command::new(env!("CARGO_BIN_EXE_deer-guide"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .env("DEERGUIDE_HTTP__TIMEOUT_SECONDS", "9000")
        .args(["--config", "config/default.toml", "--once"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("HTTP timeout cannot exceed 300 seconds"));
}

#[test]
fn test_unknown_log_format_is_rejected() {
    let output = Command::new(env!("CARGO_BIN_EXE_deer-guide"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .env("DEERGUIDE_LOGGING__FORMAT", "xml")
        .args(["--config", "config/default.toml", "--once"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Configuration error"));
}
