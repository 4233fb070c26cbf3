//! Startup behavior of the binary
//!
//! Configuration validation must happen before any network I/O, so a bare
//! environment exits 1 immediately with the missing variables named.

use std::process::Command;

#[test]
fn test_missing_config_exits_one_before_any_network() {
    let output = Command::new(env!("CARGO_BIN_EXE_truenas-backup"))
        .env_clear()
        .output()
        .expect("failed to execute truenas-backup");

    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"), "stderr was: {stderr}");
    assert!(stderr.contains("S3_BUCKET"), "stderr was: {stderr}");
    assert!(stderr.contains("TRUENAS_API_KEY"), "stderr was: {stderr}");
}

#[test]
fn test_partial_config_names_only_missing_variables() {
    let output = Command::new(env!("CARGO_BIN_EXE_truenas-backup"))
        .env_clear()
        .env("TRUENAS_URL", "https://truenas.local")
        .env("TRUENAS_API_KEY", "1-key")
        .env("S3_ENDPOINT", "https://s3.example.com")
        .env("S3_ACCESS_KEY", "AK")
        .env("S3_SECRET_KEY", "SK")
        .output()
        .expect("failed to execute truenas-backup");

    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("S3_BUCKET"), "stderr was: {stderr}");
    assert!(!stderr.contains("TRUENAS_API_KEY"), "stderr was: {stderr}");
}
