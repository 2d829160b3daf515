//! Corruption recovery tests for bgcast.
//!
//! These tests verify the system can handle:
//! - Broken or invalid config files
//! - Malformed meal estimate input

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cli(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("bgcast"));
    cmd.env("XDG_CONFIG_HOME", home.join("config"));
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

#[test]
fn test_corrupted_config_is_reported() {
    let temp_dir = setup_test_dir();
    let config_path = temp_dir.path().join("broken.toml");
    fs::write(&config_path, "[profile\ntotal_daily_dose = ").unwrap();

    cli(temp_dir.path())
        .args(["ratios", "--config", config_path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Toml"));
}

#[test]
fn test_invalid_profile_in_config_is_reported() {
    let temp_dir = setup_test_dir();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[profile]\ncorrection_factor = -2.0\n").unwrap();

    cli(temp_dir.path())
        .args(["ratios", "--config", config_path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("correction factor"));
}

#[test]
fn test_malformed_input_file() {
    let temp_dir = setup_test_dir();
    let input = temp_dir.path().join("meal.json");
    fs::write(&input, r#"{"foodName": "soup""#).unwrap();

    cli(temp_dir.path())
        .args(["forecast", "--input", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Json"));
}
