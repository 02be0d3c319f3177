//! Tracing subscriber setup. The library crates only emit events; this is
//! the one place a subscriber is installed.

use std::io::IsTerminal as _;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::GlobalArgs;

/// Crates whose events are shown; dependencies stay silent.
const CRATES: [&str; 3] = ["sprout", "sprout_core", "sprout_adapters"];

/// Install the stderr subscriber. `RUST_LOG`, when set, replaces the
/// flag-derived filter entirely.
pub fn init_logging(args: &GlobalArgs) -> anyhow::Result<()> {
    let level = level_for(args);
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(directive(level))?,
    };

    // Targets and source locations only help once debugging.
    let detailed = level >= LevelFilter::DEBUG;
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(!args.no_color && std::io::stderr().is_terminal())
        .with_target(detailed)
        .with_file(detailed)
        .with_line_number(detailed)
        .without_time();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("could not install the log subscriber: {e}"))
}

fn level_for(args: &GlobalArgs) -> LevelFilter {
    if args.quiet {
        return LevelFilter::ERROR;
    }
    match args.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn directive(level: LevelFilter) -> String {
    let level = level.to_string().to_lowercase();
    CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;

    fn args(verbose: u8, quiet: bool) -> GlobalArgs {
        GlobalArgs {
            verbose,
            quiet,
            no_color: true,
            config: None,
            format: OutputFormat::Auto,
        }
    }

    #[test]
    fn warnings_by_default() {
        assert_eq!(level_for(&args(0, false)), LevelFilter::WARN);
    }

    #[test]
    fn each_v_raises_the_level() {
        assert_eq!(level_for(&args(1, false)), LevelFilter::INFO);
        assert_eq!(level_for(&args(2, false)), LevelFilter::DEBUG);
        assert_eq!(level_for(&args(3, false)), LevelFilter::TRACE);
        assert_eq!(level_for(&args(9, false)), LevelFilter::TRACE);
    }

    #[test]
    fn quiet_wins() {
        assert_eq!(level_for(&args(0, true)), LevelFilter::ERROR);
        assert_eq!(level_for(&args(3, true)), LevelFilter::ERROR);
    }

    #[test]
    fn directive_names_every_workspace_crate() {
        assert_eq!(
            directive(LevelFilter::DEBUG),
            "sprout=debug,sprout_core=debug,sprout_adapters=debug"
        );
    }

    #[test]
    fn directive_parses() {
        assert!(EnvFilter::try_new(directive(LevelFilter::INFO)).is_ok());
    }
}
