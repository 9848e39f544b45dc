//! Integration tests for esmc CLI

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Run esmc against `root` with an empty config and a clean environment
fn esmc(root: &Path, args: &[&str]) -> Output {
    let config = root.join("esmc-test.toml");
    std::fs::write(&config, "").unwrap();
    Command::new(env!("CARGO_BIN_EXE_esmc"))
        .arg("--root")
        .arg(root)
        .arg("--config")
        .arg(&config)
        .args(args)
        .env_remove("ESMC_VERBOSE")
        .env_remove("ESMC_ROOT")
        .env_remove("ESMC_COLOR")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute esmc")
}

fn write_license(root: &Path, json: &str) {
    let dir = root.join(".esmc");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(".esmc-license.json"), json).unwrap();
}

#[test]
fn test_cli_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_esmc"))
        .arg("--version")
        .output()
        .expect("Failed to execute esmc");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("esmc"));
}

#[test]
fn test_no_args_prints_usage_and_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_esmc"))
        .output()
        .expect("Failed to execute esmc");

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tier"));
    assert!(stdout.contains("status"));
}

#[test]
fn test_help_command_fails() {
    let temp = TempDir::new().unwrap();
    let output = esmc(temp.path(), &["help"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Usage"));
}

#[test]
fn test_unknown_command() {
    let output = Command::new(env!("CARGO_BIN_EXE_esmc"))
        .arg("frobnicate")
        .output()
        .expect("Failed to execute esmc");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("frobnicate"));
}

#[test]
fn test_tier_not_configured() {
    let temp = TempDir::new().unwrap();
    let output = esmc(temp.path(), &["tier"]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "Not configured");
}

#[test]
fn test_tier_prints_stored_tier() {
    let temp = TempDir::new().unwrap();
    write_license(temp.path(), r#"{"email":"a@b.c","tier":"PRO"}"#);

    let output = esmc(temp.path(), &["tier"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "PRO");
}

#[test]
fn test_tier_expired_is_free_and_succeeds() {
    let temp = TempDir::new().unwrap();
    write_license(
        temp.path(),
        r#"{"email":"a@b.c","tier":"MAX","subscriptionEndDate":"2001-01-01"}"#,
    );

    let output = esmc(temp.path(), &["tier"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "FREE");
}

#[test]
fn test_tier_rejected_license_reason_on_stderr() {
    let temp = TempDir::new().unwrap();
    write_license(temp.path(), r#"{"email":"a@b.c","tier":"PRO","blessing":"one"}"#);
    std::fs::write(
        temp.path().join(".esmc/.esmc-guardian-blessing.json"),
        r#"{"token":"two"}"#,
    )
    .unwrap();

    let output = esmc(temp.path(), &["tier"]);
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "Not configured");
    assert!(String::from_utf8_lossy(&output.stderr)
        .contains("Blessing validation failed (tampered license detected)"));
}

#[test]
fn test_tier_json_output() {
    let temp = TempDir::new().unwrap();
    write_license(temp.path(), r#"{"email":"a@b.c","tier":"PRO"}"#);

    let output = esmc(temp.path(), &["--json", "tier"]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["valid"], true);
    assert_eq!(json["tier"], "PRO");
    assert_eq!(json["expired"], false);
    assert!(json["error"].is_null());
}

#[test]
fn test_status_for_tampered_license() {
    let temp = TempDir::new().unwrap();
    write_license(temp.path(), r#"{"email":"a@b.c","tier":"PRO","blessing":"one"}"#);
    std::fs::write(
        temp.path().join(".esmc/.esmc-guardian-blessing.json"),
        r#"{"token":"two"}"#,
    )
    .unwrap();

    let output = esmc(temp.path(), &["--color", "never", "status"]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Blessing validation failed (tampered license detected)"));
}

#[test]
fn test_status_reports_facts() {
    let temp = TempDir::new().unwrap();
    write_license(
        temp.path(),
        r#"{"email":"a@b.c","tier":"PRO","displayName":"Ada",
            "issuedAt":"2024-05-01T00:00:00Z"}"#,
    );

    let output = esmc(temp.path(), &["--color", "never", "status"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Ada"));
    assert!(stdout.contains("a@b.c"));
    assert!(stdout.contains("PRO"));
    assert!(stdout.contains("Active"));
    assert!(stdout.contains("Never"));
    assert!(stdout.contains("2024-05-01"));
}

#[test]
fn test_verbose_shows_degraded_blessing_warning() {
    let temp = TempDir::new().unwrap();
    write_license(temp.path(), r#"{"email":"a@b.c","tier":"PRO","blessing":"tok"}"#);

    let quiet = esmc(temp.path(), &["--color", "never", "tier"]);
    assert!(quiet.status.success());
    assert!(!String::from_utf8_lossy(&quiet.stderr).contains("blessing"));

    let verbose = esmc(temp.path(), &["--color", "never", "--verbose", "tier"]);
    assert!(verbose.status.success());
    assert!(String::from_utf8_lossy(&verbose.stderr).contains("blessing file not found"));
}

#[test]
fn test_unreadable_license_json_error() {
    let temp = TempDir::new().unwrap();
    // A directory where the license file should be cannot be read
    std::fs::create_dir_all(temp.path().join(".esmc/.esmc-license.json")).unwrap();

    let output = esmc(temp.path(), &["--json", "tier"]);
    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains(".esmc-license.json"));
    assert_eq!(json["code"], "error.io");
    assert_eq!(json["retryable"], false);
}

#[test]
fn test_unreadable_license_error_printed_once() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join(".esmc/.esmc-license.json")).unwrap();

    let output = esmc(temp.path(), &["tier"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches(".esmc-license.json").count(), 1);
    assert!(stderr.starts_with("Error: "));
    assert!(!stderr.contains("Retry"));
}
