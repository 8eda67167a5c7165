//! CLI tests for the `instabot` binary.
//!
//! Spawns the binary against a temporary config and fixture snapshot and
//! verifies exit codes and the printed report.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use instabot::exit_codes;

const CONFIG: &str = r#"
comments = ["Nice!"]

[limits.like]
min = 10
max = 10000

[limits.follow]
min = 100
max = 5000

[limits.comment]
min = 100
max = 5000

[tags.travel]
like = 2

[retry]
max_attempts = 2
base_delay_secs = 0
"#;

const FIXTURE: &str = r#"{
  "account": "tester",
  "following": ["A", "B", "C"],
  "followers": ["B"],
  "tags": {
    "travel": [
      {"username": "a", "post_id": "p1", "follower_count": 500},
      {"username": "b", "post_id": "p2", "follower_count": 3},
      {"username": "c", "post_id": "p3", "follower_count": 800},
      {"username": "d", "post_id": "p4", "follower_count": 900}
    ]
  }
}"#;

fn write_inputs(dir: &Path, config: &str) -> (PathBuf, PathBuf) {
    let config_path = dir.join("config.toml");
    let fixture_path = dir.join("fixture.json");
    fs::write(&config_path, config).expect("write config");
    fs::write(&fixture_path, FIXTURE).expect("write fixture");
    (config_path, fixture_path)
}

fn instabot(dir: &Path, config: &Path, fixture: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_instabot"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(config)
        .arg("--fixture")
        .arg(fixture)
        .arg("--nomail")
        .args(args)
        .output()
        .expect("spawn instabot")
}

#[test]
fn run_prints_report_and_exits_ok() {
    let temp = tempfile::tempdir().expect("tempdir");
    let (config, fixture) = write_inputs(temp.path(), CONFIG);

    let output = instabot(temp.path(), &config, &fixture, &["run"]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("#travel has been liked 2 times"), "{stdout}");
}

#[test]
fn sync_reports_unfollowed_accounts() {
    let temp = tempfile::tempdir().expect("tempdir");
    let (config, fixture) = write_inputs(temp.path(), CONFIG);

    let output = instabot(temp.path(), &config, &fixture, &["sync"]);

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 users have been unfollowed"), "{stdout}");
}

#[test]
fn randtag_amount_larger_than_tag_list_is_invalid() {
    let temp = tempfile::tempdir().expect("tempdir");
    let (config, fixture) = write_inputs(temp.path(), CONFIG);

    let output = instabot(
        temp.path(),
        &config,
        &fixture,
        &["run", "--randtag", "--amount", "3"],
    );

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
}

#[test]
fn invalid_limits_are_reported_once_with_invalid_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let broken = CONFIG.replacen("min = 100", "min = 1", 1);
    let (config, fixture) = write_inputs(temp.path(), &broken);

    let output = instabot(temp.path(), &config, &fixture, &["run"]);

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("limits.follow").count(), 1, "{stderr}");
}

#[test]
fn missing_config_file_is_invalid() {
    let temp = tempfile::tempdir().expect("tempdir");
    let (_, fixture) = write_inputs(temp.path(), CONFIG);

    let output = instabot(temp.path(), &temp.path().join("absent.toml"), &fixture, &["run"]);

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
}
