//! The `init` and `version` built-ins.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// Version baked into the binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Content written by `imake init`.
pub const SCAFFOLD: &str = r#"# Command groups for imake. Run one with `imake <group>`.

[build]
description = ""
initial_message = ""
final_message = ""
commands = []
"#;

/// What `init` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Created,
    /// A file was already there and was left untouched.
    AlreadyExists,
}

/// Write the scaffold configuration to `path` unless a file already exists there.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written for any reason
/// other than already existing.
pub fn init(path: &Path) -> io::Result<InitOutcome> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Ok(InitOutcome::AlreadyExists);
        }
        Err(e) => return Err(e),
    };
    file.write_all(SCAFFOLD.as_bytes())?;
    Ok(InitOutcome::Created)
}
