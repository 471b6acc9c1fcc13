//! CLI binary integration tests.
//!
//! These tests exercise the compiled `talentwire` binary to verify that
//! top-level command routing, help text, and error handling work as expected.

use std::path::PathBuf;
use std::process::Command;

/// Locate the compiled `talentwire` binary in the workspace target directory.
///
/// Cargo sets `CARGO_MANIFEST_DIR` to the manifest directory of the package
/// being tested. We navigate up to the workspace root and look inside
/// `target/debug/`.
fn talentwire_bin() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    // tests/integration -> workspace root
    let workspace_root = manifest_dir
        .parent()
        .expect("tests/ parent")
        .parent()
        .expect("workspace root");
    let bin = workspace_root.join("target").join("debug").join("talentwire");
    assert!(
        bin.exists(),
        "talentwire binary not found at {}; run `cargo build -p talentwire-cli` first",
        bin.display()
    );
    bin
}

fn talentwire_cmd() -> Command {
    Command::new(talentwire_bin())
}

#[test]
fn test_cli_version() {
    let output = talentwire_cmd()
        .arg("version")
        .output()
        .expect("failed to run talentwire");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("talentwire"));
}

#[test]
fn test_cli_help_lists_commands() {
    let output = talentwire_cmd()
        .arg("--help")
        .output()
        .expect("failed to run talentwire");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("serve"));
    assert!(stdout.contains("send"));
    assert!(stdout.contains("status"));
    assert!(stdout.contains("contacts"));
}

#[test]
fn test_cli_unknown_subcommand_fails() {
    let output = talentwire_cmd()
        .arg("frobnicate")
        .output()
        .expect("failed to run talentwire");

    assert!(!output.status.success());
}

#[test]
fn test_cli_send_requires_content() {
    let output = talentwire_cmd()
        .args(["send", "ana"])
        .output()
        .expect("failed to run talentwire");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--template") || stderr.contains("--text"));
}

#[test]
fn test_cli_status_with_no_providers() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = dir.path().join("empty.json5");
    std::fs::write(&config, "{}").unwrap();

    let output = talentwire_cmd()
        .args(["--config", config.to_str().unwrap(), "status"])
        .output()
        .expect("failed to run talentwire");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("no providers configured"));
    assert!(stdout.contains("deliveries:"));
}
