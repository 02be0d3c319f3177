//! `sprout`: generate projects from git template repositories.
//!
//! Exit codes: 0 success, 1 internal, 2 bad input, 3 not found,
//! 4 configuration.

use std::io::IsTerminal as _;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, instrument};

use crate::{
    cli::{Cli, Commands},
    config::AppConfig,
    error::{CliError, CliResult},
    logging::init_logging,
    output::OutputManager,
};

mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod output;
#[cfg(feature = "interactive")]
mod prompt;

fn main() -> ExitCode {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version end up here as well.
            let _ = e.print();
            return ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(2));
        }
    };

    if let Err(e) = init_logging(&cli.global) {
        eprintln!("sprout: {e:#}");
        return ExitCode::from(1);
    }

    let verbose = cli.global.verbose > 0;
    let color = !cli.global.no_color && std::io::stderr().is_terminal();

    match start(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            err.log();
            // stderr, so the message survives a redirected stdout.
            eprint!("{}", err.render(verbose, color));
            ExitCode::from(err.exit_code())
        }
    }
}

/// Load configuration, then hand off to the subcommand.
fn start(cli: Cli) -> CliResult<()> {
    let config = AppConfig::load(cli.global.config.as_ref()).map_err(|e| CliError::ConfigError {
        message: format!("{e:#}"),
        source: None,
    })?;
    debug!(
        repository = config.defaults.repository.as_deref().unwrap_or("-"),
        cache_enabled = config.cache.enabled,
        ttl = %config.cache.ttl,
        "configuration loaded"
    );

    let output = OutputManager::new(&cli.global, &config);
    dispatch(cli, config, output)
}

#[instrument(skip_all, fields(command = cli.command.name()))]
fn dispatch(cli: Cli, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let config_file = cli.global.config.as_ref();
    match cli.command {
        Commands::New(cmd) => commands::new::execute(cmd, config, output),
        Commands::Cache(cmd) => commands::cache::execute(cmd, config, output),
        Commands::Init(cmd) => commands::init::execute(cmd, config_file, output),
        Commands::Completions(cmd) => commands::completions::execute(cmd),
        Commands::Config(cmd) => commands::config::execute(cmd, config_file, config, output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn version_comes_from_the_manifest() {
        assert_eq!(Cli::command().get_version(), Some(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn subcommand_names_feed_the_dispatch_span() {
        let cli = Cli::try_parse_from(["sprout", "cache", "path"]).unwrap();
        assert_eq!(cli.command.name(), "cache");
    }
}
