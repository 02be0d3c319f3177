//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value parsers.  No business logic lives here.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

/// TTL used by `--ttl` without a value.
pub const DEFAULT_TTL: &str = "7d";

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "sprout",
    bin_name = "sprout",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "\u{1f331} Generate projects from git template repositories",
    long_about = "Sprout clones a template repository (cached locally), asks for \
                  every ____placeholder____ it finds, and writes the rendered \
                  project.",
    after_help = "EXAMPLES:\n\
        \x20 sprout new my-cli --repo acme/templates --template cli\n\
        \x20 sprout new --repo git@github.com:acme/templates.git --path rust --set author=Alice\n\
        \x20 sprout new api --repo acme/templates --no-tty -- --projectName api\n\
        \x20 sprout cache list",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a new project from a template repository.
    #[command(
        visible_alias = "n",
        about = "Create a new project",
        after_help = "EXAMPLES:\n\
            \x20 sprout new my-app --repo acme/templates\n\
            \x20 sprout new my-app --repo acme/templates --branch next --template web\n\
            \x20 sprout new my-app --repo acme/templates --ttl 1d\n\
            \x20 sprout new my-app --repo acme/templates --no-tty -- --author Alice --year 2026"
    )]
    New(NewArgs),

    /// Inspect and clear the repository cache.
    #[command(
        about = "Repository cache management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 sprout cache list\n\
            \x20 sprout cache status --repo acme/templates\n\
            \x20 sprout cache clear --repo acme/templates --branch next\n\
            \x20 sprout cache clear"
    )]
    Cache(CacheCommands),

    /// Initialise a Sprout configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 sprout init\n\
            \x20 sprout init --force\n\
            \x20 sprout --config ./sprout.toml init"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 sprout completions bash > ~/.local/share/bash-completion/completions/sprout\n\
            \x20 sprout completions zsh  > ~/.zfunc/_sprout\n\
            \x20 sprout completions fish > ~/.config/fish/completions/sprout.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the Sprout configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 sprout config get cache.ttl\n\
            \x20 sprout config list\n\
            \x20 sprout config path"
    )]
    Config(ConfigCommands),
}

impl Commands {
    /// Subcommand name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Self::New(_) => "new",
            Self::Cache(_) => "cache",
            Self::Init(_) => "init",
            Self::Completions(_) => "completions",
            Self::Config(_) => "config",
        }
    }
}

// ── new ───────────────────────────────────────────────────────────────────────

/// Arguments for `sprout new`.
#[derive(Debug, Args)]
pub struct NewArgs {
    /// Output directory. Defaults to `./<template>`.
    #[arg(value_name = "OUTPUT", help = "Output directory (default: ./<template>)")]
    pub output: Option<PathBuf>,

    /// Template repository: `owner/repo`, an https URL or an ssh URL.
    #[arg(
        short = 'r',
        long = "repo",
        value_name = "URL",
        help = "Template repository (owner/repo, https or ssh URL)"
    )]
    pub repo: Option<String>,

    /// Branch to clone.
    #[arg(short = 'b', long = "branch", value_name = "BRANCH", help = "Branch to clone")]
    pub branch: Option<String>,

    /// Directory inside the repository that holds the templates.
    #[arg(
        short = 'p',
        long = "path",
        value_name = "DIR",
        help = "Directory inside the repository holding the templates"
    )]
    pub path: Option<PathBuf>,

    /// Template (subdirectory) to use.
    #[arg(
        short = 't',
        long = "template",
        value_name = "NAME",
        help = "Template to use"
    )]
    pub template: Option<String>,

    /// Overwrite an existing directory (destructive).
    #[arg(long = "force", help = "Overwrite existing output directory")]
    pub force: bool,

    /// Never prompt; unanswered required questions are an error.
    #[arg(long = "no-tty", help = "Disable interactive prompts")]
    pub no_tty: bool,

    /// Clone into a temporary directory instead of the cache.
    #[arg(long = "no-cache", help = "Bypass the repository cache")]
    pub no_cache: bool,

    /// Maximum age of a cached checkout.
    #[arg(
        long = "ttl",
        value_name = "DURATION",
        num_args = 0..=1,
        default_missing_value = DEFAULT_TTL,
        value_parser = parse_ttl,
        conflicts_with = "no_ttl",
        help = "Cache TTL: <n> seconds or <n>s|m|h|d|w (default 7d, 0 disables)"
    )]
    pub ttl: Option<Duration>,

    /// Never expire cached checkouts.
    #[arg(long = "no-ttl", help = "Disable cache expiry")]
    pub no_ttl: bool,

    /// Answer a question up front. Repeatable.
    #[arg(
        short = 's',
        long = "set",
        value_name = "KEY=VALUE",
        value_parser = parse_key_value,
        help = "Answer a question (repeatable)"
    )]
    pub set: Vec<(String, String)>,

    /// Answers as `--KEY value` pairs after `--`.
    #[arg(last = true, value_name = "ANSWERS", help = "Answers as --KEY value pairs")]
    pub answers: Vec<String>,
}

// ── cache ─────────────────────────────────────────────────────────────────────

/// Repository selection shared by cache subcommands.
#[derive(Debug, Args)]
pub struct RepoSelector {
    /// Template repository.
    #[arg(short = 'r', long = "repo", value_name = "URL", help = "Template repository")]
    pub repo: String,

    /// Branch.
    #[arg(short = 'b', long = "branch", value_name = "BRANCH", help = "Branch")]
    pub branch: Option<String>,
}

/// Subcommands for `sprout cache`.
#[derive(Debug, Subcommand)]
pub enum CacheCommands {
    /// Remove one cached checkout, or all of them.
    Clear {
        /// Only the checkout for this repository.
        #[arg(short = 'r', long = "repo", value_name = "URL")]
        repo: Option<String>,

        /// Branch of `--repo`.
        #[arg(short = 'b', long = "branch", value_name = "BRANCH", requires = "repo")]
        branch: Option<String>,
    },
    /// List cached checkouts.
    #[command(visible_alias = "ls")]
    List,
    /// Print the cache directory.
    Path,
    /// Show whether a repository is cached, fresh or expired.
    Status(RepoSelector),
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `sprout init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `sprout completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `sprout config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `cache.ttl`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the active configuration file.
    Path,
}

// ── value parsers ─────────────────────────────────────────────────────────────

/// Parse a TTL: `<n>` seconds or `<n>` followed by `s`, `m`, `h`, `d` or `w`.
///
/// `0` parses to a zero duration, which disables expiry.
pub fn parse_ttl(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);

    if digits.is_empty() {
        return Err(format!("invalid duration '{raw}': expected <n>[s|m|h|d|w]"));
    }
    let amount: u64 = digits
        .parse()
        .map_err(|e| format!("invalid duration '{raw}': {e}"))?;

    let scale = match unit {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        "w" => 7 * 24 * 60 * 60,
        other => return Err(format!("invalid duration unit '{other}': use s, m, h, d or w")),
    };

    amount
        .checked_mul(scale)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{raw}' is too large"))
}

/// Parse `KEY=VALUE`. The value may itself contain `=`.
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{raw}'"));
    }
    Ok((key.to_owned(), value.to_owned()))
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ttl_units() {
        assert_eq!(parse_ttl("90"), Ok(Duration::from_secs(90)));
        assert_eq!(parse_ttl("30s"), Ok(Duration::from_secs(30)));
        assert_eq!(parse_ttl("5m"), Ok(Duration::from_secs(300)));
        assert_eq!(parse_ttl("2h"), Ok(Duration::from_secs(7200)));
        assert_eq!(parse_ttl("7d"), Ok(Duration::from_secs(604_800)));
        assert_eq!(parse_ttl("1w"), Ok(Duration::from_secs(604_800)));
        assert_eq!(parse_ttl("0"), Ok(Duration::ZERO));
    }

    #[test]
    fn ttl_rejects_garbage() {
        assert!(parse_ttl("").is_err());
        assert!(parse_ttl("d").is_err());
        assert!(parse_ttl("3y").is_err());
        assert!(parse_ttl("-1").is_err());
        assert!(parse_ttl("99999999999999999999w").is_err());
    }

    #[test]
    fn key_value_keeps_later_equals() {
        assert_eq!(
            parse_key_value("url=https://x?a=b"),
            Ok(("url".into(), "https://x?a=b".into()))
        );
        assert_eq!(parse_key_value("empty="), Ok(("empty".into(), String::new())));
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=v").is_err());
    }

    #[test]
    fn parse_new_command() {
        let cli = Cli::parse_from([
            "sprout", "new", "out", "--repo", "acme/t", "--branch", "dev", "--set", "a=1",
            "--set", "b=2", "--", "--author", "Alice",
        ]);
        let Commands::New(args) = cli.command else {
            panic!("expected New command");
        };
        assert_eq!(args.output, Some(PathBuf::from("out")));
        assert_eq!(args.repo.as_deref(), Some("acme/t"));
        assert_eq!(args.branch.as_deref(), Some("dev"));
        assert_eq!(args.set.len(), 2);
        assert_eq!(args.answers, vec!["--author", "Alice"]);
    }

    #[test]
    fn bare_ttl_uses_default() {
        let cli = Cli::parse_from(["sprout", "new", "--repo", "acme/t", "--ttl"]);
        let Commands::New(args) = cli.command else {
            panic!("expected New command");
        };
        assert_eq!(args.ttl, Some(Duration::from_secs(604_800)));
    }

    #[test]
    fn ttl_and_no_ttl_conflict() {
        let result = Cli::try_parse_from(["sprout", "new", "--ttl", "1d", "--no-ttl"]);
        assert!(result.is_err());
    }

    #[test]
    fn cache_clear_branch_requires_repo() {
        assert!(Cli::try_parse_from(["sprout", "cache", "clear", "--branch", "dev"]).is_err());
        assert!(Cli::try_parse_from(["sprout", "cache", "clear"]).is_ok());
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["sprout", "--quiet", "--verbose", "cache", "list"]);
        assert!(result.is_err());
    }
}
