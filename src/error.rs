//! Errors that end an invocation.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use thiserror::Error;

use crate::config::{CONFIG_FILE, ConfigError};
use crate::output::Category;

/// Fatal conditions of a run. Every variant terminates the process with status 1.
#[derive(Error, Debug)]
pub enum ImakeError {
    #[error("Configuration file does not exist. Create the \"{}\" file.", CONFIG_FILE)]
    ConfigurationAbsent,
    #[error("The configuration file is poorly defined. Fix it!")]
    ConfigurationMalformed(#[source] ConfigError),
    #[error("Unable to read the configuration file \"{}\": {source}", path.display())]
    ConfigurationUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid option \"{0}\": configuration not found.")]
    UnknownCommand(String),
    #[error("The configuration file needs the \"commands\" key in [{0}]. Aborted.")]
    MissingCommandsField(String),
    #[error("The \"commands\" key of [{0}] must be an array of commands. Aborted.")]
    MalformedCommandsField(String),
    #[error("The [{group}] command group is poorly defined: {reason}. Aborted.")]
    InvalidGroup { group: String, reason: String },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<ConfigError> for ImakeError {
    fn from(error: ConfigError) -> Self {
        match error {
            ConfigError::NotFound(_) => ImakeError::ConfigurationAbsent,
            ConfigError::Read { path, source } => {
                ImakeError::ConfigurationUnreadable { path, source }
            }
            syntax @ ConfigError::Syntax(_) => ImakeError::ConfigurationMalformed(syntax),
        }
    }
}

impl ImakeError {
    /// How the message is styled when reported.
    #[must_use]
    pub fn category(&self) -> Category {
        match self {
            ImakeError::UnknownCommand(_) => Category::Warning,
            _ => Category::Error,
        }
    }

    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::FAILURE
    }
}
