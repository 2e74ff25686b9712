//! # imake
//!
//! A lightweight task runner, a simpler alternative to a Makefile for project-local scripts.
//! Command groups are declared in a `.imake` TOML file and invoked by name: `imake build`.

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod output;

/// Program name shown in help and messages.
pub const NAME: &str = "imake";

/// Organization credited in the help epilog.
pub const ORG: &str = "Snakypy Organization <https://github.com/snakypy>";
