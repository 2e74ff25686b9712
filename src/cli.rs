//! Command line parsing and the process entry point.
//!
//! The set of valid commands depends on the configuration file, so the clap
//! command is built at runtime from the configured group names.

use std::error::Error as _;
use std::ffi::OsString;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory, FromArgMatches, Parser as ClapParser};
use log::debug;

use crate::bootstrap::VERSION;
use crate::executor::{Executor, ShellRunner};
use crate::output::Printer;
use crate::{NAME, ORG, config};

/// Built-in that prints the version.
pub const VERSION_COMMAND: &str = "version";
/// Built-in that scaffolds a configuration file.
pub const INIT_COMMAND: &str = "init";
/// Command names that are never looked up in the configuration.
pub const BUILTINS: [&str; 2] = [VERSION_COMMAND, INIT_COMMAND];

/// CLI arguments for imake.
#[derive(ClapParser, Debug)]
#[command(name = NAME)]
#[command(version = VERSION)]
#[command(
    about = "A command line tool to simplify project commands, without the ceremony of a Makefile",
    long_about = None
)]
struct Cli {
    /// Command group to run, or one of the built-ins `version` and `init`
    #[arg(value_name = "COMMAND")]
    command: Option<String>,

    /// Show the description (if any) of the command instead of running it
    #[arg(short, long)]
    desc: bool,

    /// Do not show messages nor the output of the commands
    #[arg(short, long)]
    quiet: bool,

    /// List the command groups defined in the configuration file
    #[arg(short, long, conflicts_with_all = ["command", "desc", "quiet"])]
    list: bool,
}

/// What the user asked for on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedIntent {
    /// Requested group or built-in. `None` means "show help".
    pub command: Option<String>,
    pub show_description: bool,
    pub quiet: bool,
    pub list: bool,
}

/// Build the clap command, listing `group_names` and the built-ins in the help.
pub fn command<'a>(group_names: impl IntoIterator<Item = &'a str>) -> clap::Command {
    let valid: Vec<&str> = group_names.into_iter().chain(BUILTINS).collect();
    Cli::command().after_help(format!(
        "One of these commands must be invoked:\n  [{}]\n\n(c) {ORG}",
        valid.join(", ")
    ))
}

/// Parse `argv` (program name first) into a [`ResolvedIntent`].
///
/// The command value is not checked against the configured groups here.
///
/// # Errors
///
/// Returns the clap error for malformed arguments and for `--help`/`--version`
/// display requests.
pub fn resolve<'a, I, T>(
    group_names: impl IntoIterator<Item = &'a str>,
    argv: I,
) -> Result<ResolvedIntent, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command(group_names).try_get_matches_from(argv)?;
    let cli = Cli::from_arg_matches(&matches)?;
    Ok(ResolvedIntent {
        command: cli.command.filter(|c| !c.is_empty()),
        show_description: cli.desc,
        quiet: cli.quiet,
        list: cli.list,
    })
}

fn init_logging() {
    let env = env_logger::Env::default().filter_or("IMAKE_LOG", "warn");
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}

/// Print a clap error or display request and pick the exit status for it.
fn report_parse_error(error: &clap::Error) -> ExitCode {
    let _ = error.print();
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
        _ => ExitCode::from(2),
    }
}

/// Main CLI logic: load the configuration, resolve arguments, execute.
pub fn run_cli() -> ExitCode {
    init_logging();

    let path = config::default_path();
    let loaded = config::load(&path);
    let group_names: Vec<String> = match &loaded {
        Ok(config) => config.group_names().map(str::to_owned).collect(),
        Err(e) => {
            debug!("Configuration unavailable: {e}");
            Vec::new()
        }
    };
    let names = || group_names.iter().map(String::as_str);

    let intent = match resolve(names(), std::env::args_os()) {
        Ok(intent) => intent,
        Err(e) => return report_parse_error(&e),
    };

    if intent.command.is_none() && !intent.list {
        if let Err(e) = command(names()).print_help() {
            debug!("Unable to print help: {e}");
            return ExitCode::FAILURE;
        }
        return ExitCode::SUCCESS;
    }

    let runner = ShellRunner;
    let mut printer = Printer::stdio();
    let result = Executor::new(&runner, &mut printer, &path).execute(&intent, loaded);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(source) = e.source() {
                debug!("{e}: {source}");
            }
            let _ = printer.print(e.category(), &e.to_string());
            e.exit_code()
        }
    }
}
