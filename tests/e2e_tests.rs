//! End-to-end tests for the prodomo binary.
//!
//! These tests run the compiled binary against a temporary settings file
//! and data directory:
//! - `config` and `set` round trips through the settings file
//! - an interactive session driven over stdin
//! - shell completion output

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// ============================================================================
// Test Helpers
// ============================================================================

/// Builds a command isolated to `dir`.
fn prodomo(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("prodomo").unwrap();
    cmd.arg("--settings-file")
        .arg(dir.join("settings.json"))
        .arg("--data-dir")
        .arg(dir.join("data"))
        .env("RUST_LOG", "off");
    cmd
}

// ============================================================================
// config / set
// ============================================================================

mod settings_flow {
    use super::*;

    #[test]
    fn tc_e_001_config_shows_defaults() {
        let dir = TempDir::new().unwrap();
        prodomo(dir.path())
            .arg("config")
            .assert()
            .success()
            .stdout(predicate::str::contains("\"workMinutes\": 40"))
            .stdout(predicate::str::contains("\"breakMinutes\": 10"))
            .stdout(predicate::str::contains("sound_mp3"));
    }

    #[test]
    fn tc_e_002_set_then_config() {
        let dir = TempDir::new().unwrap();
        prodomo(dir.path())
            .args(["set", "--work", "25", "--break", "0", "--sound", "none"])
            .assert()
            .success();

        prodomo(dir.path())
            .arg("config")
            .assert()
            .success()
            .stdout(predicate::str::contains("\"workMinutes\": 25"))
            .stdout(predicate::str::contains("\"breakMinutes\": 1"))
            .stdout(predicate::str::contains("\"none\""));
    }

    #[test]
    fn tc_e_003_set_without_values_fails() {
        let dir = TempDir::new().unwrap();
        prodomo(dir.path())
            .arg("set")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Nothing to set"));
    }

    #[test]
    fn tc_e_004_set_unknown_sound_fails() {
        let dir = TempDir::new().unwrap();
        prodomo(dir.path())
            .args(["set", "--sound", "kazoo"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown sound: kazoo"));
    }

    #[test]
    fn tc_e_005_set_sound_file_copies_into_data_dir() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("bell.wav");
        std::fs::write(&source, b"RIFF").unwrap();

        prodomo(dir.path())
            .arg("set")
            .arg("--sound-file")
            .arg(&source)
            .assert()
            .success()
            .stdout(predicate::str::contains("bell.wav"));

        let stored = std::fs::read_dir(dir.path().join("data").join("sounds"))
            .unwrap()
            .count();
        assert_eq!(stored, 1);
    }
}

// ============================================================================
// run
// ============================================================================

mod session_flow {
    use super::*;

    #[test]
    fn tc_e_010_status_then_quit() {
        let dir = TempDir::new().unwrap();
        prodomo(dir.path())
            .args(["run", "--no-sound", "--no-notification"])
            .write_stdin("status\nquit\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("Status:    Idle"))
            .stdout(predicate::str::contains("Remaining: 40:00"));
    }

    #[test]
    fn tc_e_011_console_edits_persist() {
        let dir = TempDir::new().unwrap();
        prodomo(dir.path())
            .args(["run", "--no-sound", "--no-notification"])
            .write_stdin("work 25\nbreak 3\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("Work duration set to 25 min [Idle 25:00]"));

        prodomo(dir.path())
            .arg("config")
            .assert()
            .success()
            .stdout(predicate::str::contains("\"workMinutes\": 25"))
            .stdout(predicate::str::contains("\"breakMinutes\": 3"));
    }

    #[test]
    fn tc_e_012_start_and_pause() {
        let dir = TempDir::new().unwrap();
        prodomo(dir.path())
            .args(["run", "--no-sound", "--no-notification"])
            .write_stdin("start\npause\nquit\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("Timer started"))
            .stdout(predicate::str::contains("Timer paused"));
    }

    #[test]
    fn tc_e_013_bad_console_input_is_reported() {
        let dir = TempDir::new().unwrap();
        prodomo(dir.path())
            .args(["run", "--no-sound", "--no-notification"])
            .write_stdin("jump\nwork abc\nquit\n")
            .assert()
            .success()
            .stderr(predicate::str::contains("unknown command 'jump'"))
            .stderr(predicate::str::contains("'abc' is not a whole number"));
    }
}

// ============================================================================
// completions
// ============================================================================

#[test]
fn tc_e_020_completions_bash() {
    Command::cargo_bin("prodomo")
        .unwrap()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("prodomo"));
}
