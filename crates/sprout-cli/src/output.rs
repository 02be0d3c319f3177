//! Everything the commands print to stdout, plus the clone spinner on stderr.

use std::io::{self, IsTerminal};
use std::time::Duration;

use console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::{OwoColorize, Style};
use serde::Serialize;

use crate::cli::global::{GlobalArgs, OutputFormat};
use crate::config::AppConfig;

pub struct OutputManager {
    format: OutputFormat,
    quiet: bool,
    color: bool,
    term: Term,
}

impl OutputManager {
    /// The `--format` flag wins over `[output] format`; `auto` on both
    /// picks human output on a terminal and plain output otherwise.
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        let format = match (args.format, OutputFormat::from_config(&config.output.format)) {
            (OutputFormat::Auto, OutputFormat::Auto) if io::stdout().is_terminal() => {
                OutputFormat::Human
            }
            (OutputFormat::Auto, OutputFormat::Auto) => OutputFormat::Plain,
            (OutputFormat::Auto, configured) => configured,
            (flag, _) => flag,
        };

        Self {
            format,
            quiet: args.quiet,
            color: format == OutputFormat::Human && !args.no_color && !config.output.no_color,
            term: Term::stdout(),
        }
    }

    pub fn print(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.term.write_line(msg)
    }

    /// `✓ msg`
    pub fn success(&self, msg: &str) -> io::Result<()> {
        self.status('\u{2713}', Style::new().green(), msg)
    }

    /// `⚠ msg`
    pub fn warning(&self, msg: &str) -> io::Result<()> {
        self.status('\u{26a0}', Style::new().yellow(), msg)
    }

    /// `ℹ msg`
    pub fn info(&self, msg: &str) -> io::Result<()> {
        self.status('\u{2139}', Style::new().blue(), msg)
    }

    pub fn header(&self, text: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        if self.color {
            self.term.write_line(&text.style(Style::new().cyan().bold()).to_string())
        } else {
            self.term.write_line(text)
        }
    }

    /// Pretty JSON on stdout. Not affected by `--quiet`.
    pub fn json<T: Serialize>(&self, value: &T) -> io::Result<()> {
        let text = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        self.term.write_line(&text)
    }

    /// Spinner on stderr around a blocking step. Hidden when quiet, for JSON
    /// output and when stderr is not a terminal.
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        if self.quiet || self.is_json() || !io::stderr().is_terminal() {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(msg.to_owned());
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    fn status(&self, symbol: char, style: Style, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.color {
            format!("{} {}", symbol.style(style.bold()), msg.style(style))
        } else {
            format!("{symbol} {msg}")
        };
        self.term.write_line(&line)
    }
}
