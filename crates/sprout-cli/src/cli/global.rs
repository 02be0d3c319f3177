//! Flags accepted before or after any subcommand.

use std::path::PathBuf;

use clap::{ArgAction, Args, ValueEnum};

#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Log more: -v info, -vv debug, -vvv trace. RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print errors. Spinners and progress lines are hidden too.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable ANSI colors (also honours NO_COLOR).
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Read configuration from FILE instead of the platform config directory.
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// How results are printed. `auto` defers to `[output] format` in the
    /// config, then to whether stdout is a terminal.
    #[arg(
        long,
        visible_alias = "output-format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Auto
    )]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Auto,
    /// Colored, with status symbols.
    Human,
    /// No ANSI codes.
    Plain,
    /// Machine-readable documents on stdout.
    Json,
}

impl OutputFormat {
    /// Parse the `[output] format` config value; unknown values mean `auto`.
    pub fn from_config(value: &str) -> Self {
        Self::from_str(value, true).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_values_are_case_insensitive() {
        assert_eq!(OutputFormat::from_config("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::from_config("plain"), OutputFormat::Plain);
    }

    #[test]
    fn unknown_config_value_is_auto() {
        assert_eq!(OutputFormat::from_config("yaml"), OutputFormat::Auto);
    }
}
