//! Common test helpers shared across integration tests

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(dead_code)] // Not all helpers are used by every test file

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Package version for testing the `version` built-in
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Helper to get the compiled binary path
pub fn get_binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_imake"))
}

/// Helper to create a temporary directory for tests
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::TempDir::new().unwrap()
}

/// Helper to create a .imake file in a directory
pub fn create_config(dir: &Path, content: &str) {
    fs::write(dir.join(".imake"), content).unwrap();
}

/// Run the binary with `args` inside `dir`, with logging and colors off
pub fn run_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(get_binary_path())
        .args(args)
        .current_dir(dir)
        .env_remove("IMAKE_LOG")
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute command")
}

pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
