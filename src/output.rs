//! Terminal messages with a semantic category.

use std::env;
use std::io::{self, IsTerminal, Write};

use anstyle::{AnsiColor, Reset, Style};

const ERROR_STYLE: Style = Style::new().fg_color(Some(anstyle::Color::Ansi(AnsiColor::Red)));
const WARNING_STYLE: Style =
    Style::new().fg_color(Some(anstyle::Color::Ansi(AnsiColor::Yellow)));
const FINISH_STYLE: Style = Style::new().fg_color(Some(anstyle::Color::Ansi(AnsiColor::Green)));
const QUESTION_STYLE: Style = Style::new().fg_color(Some(anstyle::Color::Ansi(AnsiColor::Cyan)));
const LABEL_STYLE: Style = Style::new()
    .fg_color(Some(anstyle::Color::Ansi(AnsiColor::Blue)))
    .bold();

/// What a message means, which decides its color and stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Info,
    Error,
    Warning,
    /// Closing message of a command group.
    Finish,
    /// Opening message of a command group.
    Question,
}

impl Category {
    fn style(self) -> Style {
        match self {
            Category::Info => Style::new(),
            Category::Error => ERROR_STYLE,
            Category::Warning => WARNING_STYLE,
            Category::Finish => FINISH_STYLE,
            Category::Question => QUESTION_STYLE,
        }
    }

    /// Errors and warnings go to stderr, everything else to stdout.
    fn is_diagnostic(self) -> bool {
        matches!(self, Category::Error | Category::Warning)
    }
}

struct Stream {
    writer: Box<dyn Write>,
    color: bool,
}

impl Stream {
    fn write_line(&mut self, label: Option<&str>, style: Style, text: &str) -> io::Result<()> {
        let label = match label {
            Some(label) if self.color => format!("{LABEL_STYLE}{label}{Reset} "),
            Some(label) => format!("{label} "),
            None => String::new(),
        };
        if self.color {
            writeln!(self.writer, "{label}{style}{text}{Reset}")?;
        } else {
            writeln!(self.writer, "{label}{text}")?;
        }
        // Lines must reach the terminal before a spawned command writes its own output.
        self.writer.flush()
    }
}

/// Prints categorized lines to a pair of output streams.
pub struct Printer {
    out: Stream,
    err: Stream,
}

fn color_enabled(is_terminal: bool) -> bool {
    is_terminal && env::var_os("NO_COLOR").is_none()
}

impl Printer {
    /// A printer on the process stdout/stderr, styled only for terminals.
    #[must_use]
    pub fn stdio() -> Self {
        let stdout = io::stdout();
        let stderr = io::stderr();
        Printer {
            out: Stream {
                color: color_enabled(stdout.is_terminal()),
                writer: Box::new(stdout),
            },
            err: Stream {
                color: color_enabled(stderr.is_terminal()),
                writer: Box::new(stderr),
            },
        }
    }

    /// A printer on arbitrary writers, without styling.
    pub fn new(out: impl Write + 'static, err: impl Write + 'static) -> Self {
        Printer {
            out: Stream {
                writer: Box::new(out),
                color: false,
            },
            err: Stream {
                writer: Box::new(err),
                color: false,
            },
        }
    }

    fn stream(&mut self, category: Category) -> &mut Stream {
        if category.is_diagnostic() {
            &mut self.err
        } else {
            &mut self.out
        }
    }

    /// Print one message line.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying stream cannot be written.
    pub fn print(&mut self, category: Category, text: &str) -> io::Result<()> {
        self.stream(category).write_line(None, category.style(), text)
    }

    /// Print a message line preceded by a highlighted label, e.g. `Description: ...`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying stream cannot be written.
    pub fn print_labeled(&mut self, label: &str, category: Category, text: &str) -> io::Result<()> {
        self.stream(category)
            .write_line(Some(label), category.style(), text)
    }
}
