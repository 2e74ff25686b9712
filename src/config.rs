//! Configuration file (`.imake`) loading and the command group registry.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::cli::BUILTINS;

/// Name of the configuration file, looked up in the current working directory.
pub const CONFIG_FILE: &str = ".imake";

/// Errors that can occur while loading the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("unable to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unable to parse configuration: {0}")]
    Syntax(#[from] toml::de::Error),
}

/// The `commands` field of a group, as found in the file.
///
/// The shape is only checked when the group is executed, so a broken group
/// does not prevent running or describing the others.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Commands {
    #[default]
    Missing,
    /// Present, but not an array made only of strings.
    Malformed,
    List(Vec<String>),
}

impl From<Option<toml::Value>> for Commands {
    fn from(value: Option<toml::Value>) -> Self {
        match value {
            None => Commands::Missing,
            Some(toml::Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    toml::Value::String(command) => Some(command),
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()
                .map_or(Commands::Malformed, Commands::List),
            Some(_) => Commands::Malformed,
        }
    }
}

/// A named bundle of shell commands plus optional messages.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandGroup {
    pub description: Option<String>,
    /// Printed before the commands run, unless quiet.
    pub initial_message: Option<String>,
    /// Printed after the commands ran, unless quiet.
    pub final_message: Option<String>,
    pub commands: Commands,
    /// Why the group table could not be read, e.g. both `header` and
    /// `initial_message` given. Reported only when the group is used.
    pub problem: Option<String>,
}

#[derive(Deserialize)]
struct RawGroup {
    description: Option<toml::Value>,
    #[serde(alias = "header")]
    initial_message: Option<toml::Value>,
    #[serde(alias = "footer")]
    final_message: Option<toml::Value>,
    commands: Option<toml::Value>,
}

/// A text field of a group. Blank strings count as absent; other value types
/// are ignored with a warning.
fn text_field(group: &str, field: &str, value: Option<toml::Value>) -> Option<String> {
    match value? {
        toml::Value::String(text) => Some(text).filter(|t| !t.trim().is_empty()),
        other => {
            warn!(
                "Ignoring `{field}` of [{group}]: expected a string, found {}",
                other.type_str()
            );
            None
        }
    }
}

impl CommandGroup {
    fn from_raw(name: &str, raw: RawGroup) -> Self {
        CommandGroup {
            description: text_field(name, "description", raw.description),
            initial_message: text_field(name, "initial_message", raw.initial_message),
            final_message: text_field(name, "final_message", raw.final_message),
            commands: raw.commands.into(),
            problem: None,
        }
    }
}

/// The parsed configuration: group name to group, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    groups: IndexMap<String, CommandGroup>,
}

impl Configuration {
    /// Parse the text of a configuration file.
    ///
    /// Top-level tables become command groups. Other top-level values, the empty
    /// key, and groups named after a built-in are skipped.
    ///
    /// Problems inside a single group never fail the whole file: they are kept
    /// on that group and surface when it is run or described.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Syntax` if the text is not valid TOML.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let document: toml::Table = toml::from_str(text)?;
        let mut groups = IndexMap::new();

        for (name, value) in document {
            if name.trim().is_empty() {
                debug!("Skipping unnamed top-level table");
                continue;
            }
            if !value.is_table() {
                debug!("Skipping top-level key `{name}`: not a table");
                continue;
            }
            if BUILTINS.contains(&name.as_str()) {
                warn!("Command group `{name}` is shadowed by the built-in command of the same name");
                continue;
            }
            let group = match value.try_into::<RawGroup>() {
                Ok(raw) => CommandGroup::from_raw(&name, raw),
                Err(e) => CommandGroup {
                    problem: Some(e.message().to_string()),
                    ..CommandGroup::default()
                },
            };
            groups.insert(name, group);
        }

        Ok(Configuration { groups })
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CommandGroup> {
        self.groups.get(name)
    }

    /// Group names in file order.
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &CommandGroup)> {
        self.groups.iter().map(|(name, group)| (name.as_str(), group))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Read and parse the configuration file at `path`.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if there is no file at `path`, and the
/// errors of [`Configuration::parse`] if its content is invalid.
pub fn load(path: &Path) -> Result<Configuration, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let config = Configuration::parse(&text)?;
    debug!(
        "Loaded {} command group(s) from {}",
        config.len(),
        path.display()
    );
    Ok(config)
}

/// Path of the configuration file for the current working directory.
#[must_use]
pub fn default_path() -> PathBuf {
    PathBuf::from(CONFIG_FILE)
}
