//! Dispatch of a resolved invocation and sequential execution of command groups.

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

use log::{debug, warn};

use crate::bootstrap::{self, InitOutcome, VERSION};
use crate::cli::{INIT_COMMAND, ResolvedIntent, VERSION_COMMAND};
use crate::config::{CommandGroup, Commands, ConfigError, Configuration};
use crate::error::ImakeError;
use crate::output::{Category, Printer};

/// Runs a single shell command to completion.
pub trait CommandRunner {
    /// Run `command` and wait for it, discarding its stdout and stderr when `quiet`.
    ///
    /// Returns the exit code, or `None` if the process was terminated by a signal.
    ///
    /// # Errors
    ///
    /// Returns an error if the shell could not be spawned.
    fn run(&self, command: &str, quiet: bool) -> io::Result<Option<i32>>;
}

/// Runs commands through the host shell: `sh -c` on Unix, `cmd /C` on Windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str, quiet: bool) -> io::Result<Option<i32>> {
        let (shell, flag) = if cfg!(windows) {
            ("cmd", "/C")
        } else {
            ("sh", "-c")
        };

        let mut cmd = Command::new(shell);
        cmd.arg(flag).arg(command);
        if quiet {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        } else {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        }

        Ok(cmd.status()?.code())
    }
}

/// Carries out a [`ResolvedIntent`] against the loaded configuration.
pub struct Executor<'a> {
    runner: &'a dyn CommandRunner,
    printer: &'a mut Printer,
    config_path: &'a Path,
}

impl<'a> Executor<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        printer: &'a mut Printer,
        config_path: &'a Path,
    ) -> Self {
        Executor {
            runner,
            printer,
            config_path,
        }
    }

    /// Execute the intent. Built-ins never look at `config`, so a missing or
    /// broken configuration file only matters for group commands.
    ///
    /// # Errors
    ///
    /// Returns the fatal condition that ends the invocation: configuration
    /// absent or malformed, unknown command, or a group whose `commands` key is
    /// missing or not an array of strings, or whose table could not be read.
    pub fn execute(
        &mut self,
        intent: &ResolvedIntent,
        config: Result<Configuration, ConfigError>,
    ) -> Result<(), ImakeError> {
        if intent.list {
            return self.list(&config?);
        }

        let Some(name) = intent.command.as_deref() else {
            return Ok(());
        };

        match name {
            VERSION_COMMAND => {
                self.printer
                    .print_labeled("Version:", Category::Question, VERSION)?;
                Ok(())
            }
            INIT_COMMAND => self.init(),
            _ => {
                let config = config?;
                let group = config
                    .get(name)
                    .ok_or_else(|| ImakeError::UnknownCommand(name.to_string()))?;
                if let Some(reason) = &group.problem {
                    return Err(ImakeError::InvalidGroup {
                        group: name.to_string(),
                        reason: reason.clone(),
                    });
                }
                if intent.show_description {
                    self.describe(group)
                } else {
                    self.run_group(name, group, intent.quiet)
                }
            }
        }
    }

    fn init(&mut self) -> Result<(), ImakeError> {
        let path = self.config_path;
        let file = path.display();
        match bootstrap::init(path)? {
            InitOutcome::Created => self.printer.print(
                Category::Finish,
                &format!("Configuration file \"{file}\" created."),
            )?,
            InitOutcome::AlreadyExists => self.printer.print(
                Category::Warning,
                &format!("The configuration file \"{file}\" already exists."),
            )?,
        }
        Ok(())
    }

    fn describe(&mut self, group: &CommandGroup) -> Result<(), ImakeError> {
        match &group.description {
            Some(description) => {
                self.printer
                    .print_labeled("Description:", Category::Info, description)?;
            }
            None => self.printer.print(
                Category::Warning,
                "There is no description of this command.",
            )?,
        }
        Ok(())
    }

    fn list(&mut self, config: &Configuration) -> Result<(), ImakeError> {
        if config.is_empty() {
            self.printer
                .print(Category::Info, "No command groups defined.")?;
            return Ok(());
        }

        self.printer.print(Category::Info, "Available commands:")?;
        for (name, group) in config.groups() {
            let line = match &group.description {
                Some(description) => format!("  {name}: {description}"),
                None => format!("  {name}"),
            };
            self.printer.print(Category::Info, &line)?;
        }
        Ok(())
    }

    /// Run every command of the group in order. Exit codes of the commands are
    /// logged but never stop the loop nor change the outcome.
    fn run_group(
        &mut self,
        name: &str,
        group: &CommandGroup,
        quiet: bool,
    ) -> Result<(), ImakeError> {
        let commands = match &group.commands {
            Commands::List(commands) => commands,
            Commands::Missing => {
                return Err(ImakeError::MissingCommandsField(name.to_string()));
            }
            Commands::Malformed => {
                return Err(ImakeError::MalformedCommandsField(name.to_string()));
            }
        };

        if !quiet && let Some(message) = &group.initial_message {
            self.printer.print(Category::Question, message)?;
        }

        let total = commands.len();
        for (index, command) in commands.iter().enumerate() {
            debug!("[{name}] {}/{total}: {command}", index + 1);
            match self.runner.run(command, quiet) {
                Ok(Some(0)) => {}
                Ok(Some(code)) => debug!("[{name}] `{command}` exited with status {code}"),
                Ok(None) => debug!("[{name}] `{command}` was terminated by a signal"),
                Err(e) => warn!("[{name}] unable to run `{command}`: {e}"),
            }
        }

        if !quiet && let Some(message) = &group.final_message {
            self.printer.print(Category::Finish, message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::config::CONFIG_FILE;
    use crate::output::testing::SharedBuffer;
    use std::cell::RefCell;
    use std::path::PathBuf;

    /// Records commands instead of running them.
    #[derive(Default)]
    struct RecordingRunner {
        calls: RefCell<Vec<(String, bool)>>,
        exit_code: Option<i32>,
        fail_spawn: bool,
    }

    impl CommandRunner for RecordingRunner {
        fn run(&self, command: &str, quiet: bool) -> io::Result<Option<i32>> {
            self.calls.borrow_mut().push((command.to_string(), quiet));
            if self.fail_spawn {
                return Err(io::Error::new(io::ErrorKind::NotFound, "no shell"));
            }
            Ok(self.exit_code.or(Some(0)))
        }
    }

    struct Harness {
        out: SharedBuffer,
        err: SharedBuffer,
        printer: Printer,
        path: PathBuf,
    }

    impl Harness {
        fn new() -> Self {
            let out = SharedBuffer::default();
            let err = SharedBuffer::default();
            Harness {
                printer: Printer::new(out.clone(), err.clone()),
                out,
                err,
                path: PathBuf::from(CONFIG_FILE),
            }
        }

        fn execute(
            &mut self,
            runner: &RecordingRunner,
            intent: &ResolvedIntent,
            config: Result<Configuration, ConfigError>,
        ) -> Result<(), ImakeError> {
            Executor::new(runner, &mut self.printer, &self.path).execute(intent, config)
        }
    }

    fn intent(command: &str) -> ResolvedIntent {
        ResolvedIntent {
            command: Some(command.to_string()),
            ..Default::default()
        }
    }

    fn build_config() -> Configuration {
        Configuration::parse(
            r#"
[build]
description = "Build everything"
initial_message = "Building"
final_message = "Done"
commands = ["echo one", "false", "echo three"]

[bare]
commands = ["echo bare"]

[nocommands]
initial_message = "Should not print"

[badcommands]
initial_message = "Should not print"
commands = "echo hi"

[twice]
header = "one"
initial_message = "two"
commands = ["echo twice"]

[oddtext]
description = 5
commands = ["echo odd"]
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_verbose_run_prints_messages_around_commands() {
        let mut harness = Harness::new();
        let runner = RecordingRunner::default();

        harness
            .execute(&runner, &intent("build"), Ok(build_config()))
            .unwrap();

        assert_eq!(harness.out.contents(), "Building\nDone\n");
        assert_eq!(
            *runner.calls.borrow(),
            vec![
                ("echo one".to_string(), false),
                ("false".to_string(), false),
                ("echo three".to_string(), false),
            ]
        );
    }

    #[test]
    fn test_quiet_run_still_executes_commands() {
        let mut harness = Harness::new();
        let runner = RecordingRunner::default();
        let quiet = ResolvedIntent {
            quiet: true,
            ..intent("build")
        };

        harness.execute(&runner, &quiet, Ok(build_config())).unwrap();

        assert_eq!(harness.out.contents(), "");
        assert_eq!(runner.calls.borrow().len(), 3);
        assert!(runner.calls.borrow().iter().all(|(_, quiet)| *quiet));
    }

    #[test]
    fn test_failing_commands_do_not_stop_the_group() {
        let mut harness = Harness::new();
        let runner = RecordingRunner {
            exit_code: Some(1),
            ..Default::default()
        };

        harness
            .execute(&runner, &intent("build"), Ok(build_config()))
            .unwrap();

        assert_eq!(runner.calls.borrow().len(), 3);
        assert!(harness.out.contents().ends_with("Done\n"));
    }

    #[test]
    fn test_spawn_failures_do_not_stop_the_group() {
        let mut harness = Harness::new();
        let runner = RecordingRunner {
            fail_spawn: true,
            ..Default::default()
        };

        harness
            .execute(&runner, &intent("build"), Ok(build_config()))
            .unwrap();

        assert_eq!(runner.calls.borrow().len(), 3);
    }

    #[test]
    fn test_group_without_messages() {
        let mut harness = Harness::new();
        let runner = RecordingRunner::default();

        harness
            .execute(&runner, &intent("bare"), Ok(build_config()))
            .unwrap();

        assert_eq!(harness.out.contents(), "");
        assert_eq!(runner.calls.borrow().len(), 1);
    }

    #[test]
    fn test_missing_commands_aborts_before_messages() {
        let mut harness = Harness::new();
        let runner = RecordingRunner::default();

        let error = harness
            .execute(&runner, &intent("nocommands"), Ok(build_config()))
            .unwrap_err();

        assert!(matches!(error, ImakeError::MissingCommandsField(ref g) if g == "nocommands"));
        assert_eq!(harness.out.contents(), "");
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn test_malformed_commands_aborts_before_messages() {
        let mut harness = Harness::new();
        let runner = RecordingRunner::default();

        let error = harness
            .execute(&runner, &intent("badcommands"), Ok(build_config()))
            .unwrap_err();

        assert!(matches!(error, ImakeError::MalformedCommandsField(_)));
        assert_eq!(harness.out.contents(), "");
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn test_unreadable_group_fails_only_when_used() {
        let mut harness = Harness::new();
        let runner = RecordingRunner::default();

        let error = harness
            .execute(&runner, &intent("twice"), Ok(build_config()))
            .unwrap_err();
        assert!(matches!(error, ImakeError::InvalidGroup { ref group, .. } if group == "twice"));
        assert!(runner.calls.borrow().is_empty());

        harness
            .execute(&runner, &intent("bare"), Ok(build_config()))
            .unwrap();
        assert_eq!(
            *runner.calls.borrow(),
            vec![("echo bare".to_string(), false)]
        );
    }

    #[test]
    fn test_wrong_typed_description_is_treated_as_missing() {
        let mut harness = Harness::new();
        let runner = RecordingRunner::default();
        let describe = ResolvedIntent {
            show_description: true,
            ..intent("oddtext")
        };

        harness.execute(&runner, &describe, Ok(build_config())).unwrap();
        harness
            .execute(&runner, &intent("oddtext"), Ok(build_config()))
            .unwrap();

        assert!(harness.err.contents().contains("There is no description"));
        assert_eq!(runner.calls.borrow().len(), 1);
    }

    #[test]
    fn test_describe_replaces_execution() {
        let mut harness = Harness::new();
        let runner = RecordingRunner::default();
        let describe = ResolvedIntent {
            show_description: true,
            ..intent("build")
        };

        harness.execute(&runner, &describe, Ok(build_config())).unwrap();

        assert_eq!(harness.out.contents(), "Description: Build everything\n");
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn test_describe_without_description_warns() {
        let mut harness = Harness::new();
        let runner = RecordingRunner::default();
        let describe = ResolvedIntent {
            show_description: true,
            ..intent("bare")
        };

        harness.execute(&runner, &describe, Ok(build_config())).unwrap();

        assert_eq!(
            harness.err.contents(),
            "There is no description of this command.\n"
        );
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn test_unknown_command() {
        let mut harness = Harness::new();
        let runner = RecordingRunner::default();

        let error = harness
            .execute(&runner, &intent("deploy"), Ok(build_config()))
            .unwrap_err();

        assert!(matches!(error, ImakeError::UnknownCommand(ref c) if c == "deploy"));
    }

    #[test]
    fn test_configuration_errors_surface_for_groups() {
        let mut harness = Harness::new();
        let runner = RecordingRunner::default();

        let error = harness
            .execute(
                &runner,
                &intent("build"),
                Err(ConfigError::NotFound(PathBuf::from(CONFIG_FILE))),
            )
            .unwrap_err();

        assert!(matches!(error, ImakeError::ConfigurationAbsent));
    }

    #[test]
    fn test_version_ignores_configuration() {
        let mut harness = Harness::new();
        let runner = RecordingRunner::default();

        harness
            .execute(
                &runner,
                &intent("version"),
                Err(ConfigError::NotFound(PathBuf::from(CONFIG_FILE))),
            )
            .unwrap();

        assert_eq!(harness.out.contents(), format!("Version: {VERSION}\n"));
    }

    #[test]
    fn test_init_twice() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut harness = Harness::new();
        harness.path = dir.path().join(CONFIG_FILE);
        let runner = RecordingRunner::default();
        let missing = Err(ConfigError::NotFound(harness.path.clone()));

        harness.execute(&runner, &intent("init"), missing).unwrap();
        let first = std::fs::read_to_string(&harness.path).unwrap();
        harness
            .execute(&runner, &intent("init"), Ok(Configuration::default()))
            .unwrap();

        assert_eq!(std::fs::read_to_string(&harness.path).unwrap(), first);
        assert!(harness.out.contents().contains("created"));
        assert!(harness.err.contents().contains("already exists"));
    }

    #[test]
    fn test_list_groups() {
        let mut harness = Harness::new();
        let runner = RecordingRunner::default();
        let list = ResolvedIntent {
            list: true,
            ..Default::default()
        };

        harness.execute(&runner, &list, Ok(build_config())).unwrap();

        let out = harness.out.contents();
        assert!(out.starts_with("Available commands:\n"));
        assert!(out.contains("  build: Build everything\n"));
        assert!(out.contains("  bare\n"));
        assert!(runner.calls.borrow().is_empty());
    }
}
