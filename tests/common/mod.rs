#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use assert_cmd::Command;
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// A fresh data home that outlives the test body.
pub fn temp_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

/// The shell binary in script mode, reading commands from `script`.
pub fn run_script(home: &PathBuf, script: &str) -> assert_cmd::assert::Assert {
    Command::cargo_bin("expense_tracker_cli")
        .expect("binary built")
        .env("EXPENSE_TRACKER_CLI_SCRIPT", "1")
        .env("EXPENSE_TRACKER_HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .write_stdin(script.to_string())
        .assert()
}
