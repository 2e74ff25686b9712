//! # imake
//!
//! Run named groups of shell commands declared in a `.imake` file.
//!
//! ## Usage
//!
//! - Run a group: `imake build`
//! - Run it without messages or command output: `imake build --quiet`
//! - Show what a group does: `imake build --desc`
//! - Scaffold a configuration file: `imake init`
//!
//! See README.md for more details and examples.

use std::process::ExitCode;

/// Entry point for the CLI tool.
fn main() -> ExitCode {
    imake::cli::run_cli()
}
