//! End-to-end integration tests for roulette-cli
//!
//! These tests shell out to cargo and are gated behind the `integration`
//! feature flag. Run with:
//!
//! ```sh
//! cargo test -p roulette-cli --features integration
//! ```

#![cfg(feature = "integration")]

use std::process::Command;

use tempfile::TempDir;

fn roulette(args: &[&str], project_dir: &TempDir) -> std::process::Output {
    Command::new("cargo")
        .args(["run", "-q", "-p", "roulette-cli", "--"])
        .args(args)
        .env("ROULETTE_PROJECT_CONFIG_DIR", project_dir.path())
        .env_remove("ROULETTE_API_TOKEN")
        .output()
        .expect("Failed to run roulette")
}

/// Test that roulette --help lists every command
#[test]
fn roulette_help_works() {
    let dir = TempDir::new().unwrap();
    let output = roulette(&["--help"], &dir);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Pick who goes first at the daily"));
    for command in ["spin", "pool", "history", "reset", "filter", "config"] {
        assert!(stdout.contains(command), "missing {command}");
    }
}

/// Test that roulette spin --help shows its flags
#[test]
fn roulette_spin_help_shows_flags() {
    let dir = TempDir::new().unwrap();
    let output = roulette(&["spin", "--help"], &dir);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--filter"));
    assert!(stdout.contains("--seed"));
    assert!(stdout.contains("--yes"));
}

/// Test that roulette config show works without config file
#[test]
fn roulette_config_show_works_without_config() {
    let dir = TempDir::new().unwrap();
    let output = roulette(&["config", "show"], &dir);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[remote]"));
    assert!(stdout.contains("[wheel]"));
    assert!(stdout.contains("reveal_delay_ms = 3000"));
}

/// Test that the project config layer is applied and the token is masked
#[test]
fn roulette_config_show_reads_project_config() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[remote]\ntoken = \"s3cret\"\n\n[wheel]\nauto_reset = false\n",
    )
    .unwrap();

    let output = roulette(&["config", "show"], &dir);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("auto_reset = false"));
    assert!(!stdout.contains("s3cret"));
}

/// Test that roulette config path shows paths
#[test]
fn roulette_config_path_shows_paths() {
    let dir = TempDir::new().unwrap();
    let output = roulette(&["config", "path"], &dir);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("User config:"));
    assert!(stdout.contains("Project config:"));
    assert!(stdout.contains("preferences.json"));
}

/// Test that an unreachable service is reported as an error
#[test]
fn roulette_pool_fails_without_service() {
    let dir = TempDir::new().unwrap();
    let output = roulette(&["--server", "http://127.0.0.1:9", "pool"], &dir);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Could not reach the participants service"));
}
