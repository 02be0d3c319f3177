//! CLI errors: the core error plus the failures only the binary can hit
//! (argument parsing, config files, output directory checks).

use std::error::Error;
use std::fmt::Write as _;
use std::path::PathBuf;

use owo_colors::OwoColorize;
use thiserror::Error;

use sprout_core::error::SproutError;

pub use sprout_core::error::ErrorCategory as CoreCategory;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// A flag or trailing answer could not be understood.
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// `new` was run without `--repo` and no default repository is set.
    #[error("No template repository given")]
    MissingRepository,

    /// Output directory exists and `--force` was not given.
    #[error("Output directory already exists: {path}")]
    OutputExists { path: PathBuf },

    /// The config file could not be read, parsed or written.
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An error propagated from `sprout-core` or an adapter.
    #[error("{0}")]
    Core(#[from] SproutError),

    /// Terminal or filesystem I/O outside the core pipeline.
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

impl CliError {
    /// Hints printed under the error message.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidInput { .. } => vec![
                "Run the command with --help to see accepted arguments".into(),
            ],

            Self::MissingRepository => vec![
                "Pass a repository: sprout new --repo owner/repo".into(),
                "Or set one in the config file under [defaults] repository".into(),
            ],

            Self::OutputExists { path } => vec![
                format!("The directory '{}' already exists", path.display()),
                "Pass --force to replace it (its current contents are deleted)".into(),
                "Choose a different output directory".into(),
            ],

            Self::ConfigError { .. } => vec![
                "Show the config file location with 'sprout config path'".into(),
                "Use 'sprout init --force' to write a default config".into(),
            ],

            Self::Core(core_err) => core_err.suggestions(),

            Self::IoError { .. } => vec![
                "Check permissions and free space on the target directory".into(),
            ],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } | Self::MissingRepository | Self::OutputExists { .. } => {
                ErrorCategory::UserError
            }
            Self::ConfigError { .. } => ErrorCategory::Configuration,
            Self::Core(core) => match core.category() {
                CoreCategory::Validation => ErrorCategory::UserError,
                CoreCategory::NotFound => ErrorCategory::NotFound,
                CoreCategory::Configuration => ErrorCategory::Configuration,
                CoreCategory::Network | CoreCategory::Internal => ErrorCategory::Internal,
            },
            Self::IoError { .. } => ErrorCategory::Internal,
        }
    }

    /// 2 bad input, 3 not found, 4 configuration, 1 anything else.
    pub fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::UserError => 2,
            ErrorCategory::NotFound => 3,
            ErrorCategory::Configuration => 4,
            ErrorCategory::Internal => 1,
        }
    }

    /// Render the error for stderr: headline, cause chain (verbose only) and
    /// suggestions. ANSI styling only when `color` is set.
    pub fn render(&self, verbose: bool, color: bool) -> String {
        let paint = |text: &str, style: fn(&str) -> String| {
            if color { style(text) } else { text.to_owned() }
        };

        let mut out = String::new();
        let _ = writeln!(
            out,
            "\n{} {}",
            paint("error:", |t| t.red().bold().to_string()),
            paint(&self.to_string(), |t| t.red().to_string())
        );

        if verbose {
            let mut cause = self.source();
            while let Some(err) = cause {
                let _ = writeln!(
                    out,
                    "  {} {}",
                    paint("caused by:", |t| t.dimmed().to_string()),
                    err
                );
                cause = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            let _ = writeln!(out, "\n{}", paint("hint:", |t| t.yellow().bold().to_string()));
            for suggestion in suggestions {
                let _ = writeln!(out, "  {suggestion}");
            }
        }

        if !verbose && self.source().is_some() {
            let _ = writeln!(
                out,
                "\n{}",
                paint("Run again with -v to see the underlying cause.", |t| t
                    .dimmed()
                    .to_string())
            );
        }

        out
    }

    /// Emit the error as a structured tracing event.
    pub fn log(&self) {
        let category = self.category();
        match category {
            ErrorCategory::UserError | ErrorCategory::NotFound => {
                tracing::warn!(?category, error = %self, "command failed")
            }
            ErrorCategory::Configuration | ErrorCategory::Internal => {
                tracing::error!(?category, error = %self, "command failed")
            }
        }
        if let Some(cause) = self.source() {
            tracing::debug!(cause = %cause, "underlying error");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    UserError,
    NotFound,
    Configuration,
    Internal,
}

/// `.with_cli_context(|| "...")` for foreign results, in the spirit of
/// `anyhow::Context`.
pub trait IntoCli<T> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IntoCli<T> for Result<T, std::io::Error> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| CliError::IoError {
            message: f().into(),
            source: e,
        })
    }
}

impl<T> IntoCli<T> for Result<T, toml::ser::Error> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| CliError::ConfigError {
            message: format!("{}: {e}", f().into()),
            source: Some(Box::new(e)),
        })
    }
}
