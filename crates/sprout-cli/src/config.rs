//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `SPROUT_CACHE__TTL=1d` sets `cache.ttl`
//! 3. Config file (`--config FILE`, else the platform config directory)
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use ::config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::cli::DEFAULT_TTL;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Fallbacks for `sprout new` flags.
    pub defaults: Defaults,
    /// Repository cache settings.
    pub cache: CacheConfig,
    /// Output settings.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Defaults {
    pub repository: Option<String>,
    pub branch: Option<String>,
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Name of the tool directory, `<base_dir>/.<tool_name>`.
    pub tool_name: String,
    /// Parent of the tool directory. The home directory when unset.
    pub base_dir: Option<PathBuf>,
    /// Same syntax as `--ttl`.
    pub ttl: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub no_color: bool,
    /// `auto`, `human`, `plain` or `json`; `--format` overrides it.
    pub format: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            defaults: Defaults::default(),
            cache: CacheConfig {
                enabled: true,
                tool_name: "sprout".into(),
                base_dir: None,
                ttl: DEFAULT_TTL.into(),
            },
            output: OutputConfig {
                no_color: false,
                format: "auto".into(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration, layering file and environment over the defaults.
    ///
    /// An explicit `config_file` must exist; the default location is optional.
    pub fn load(config_file: Option<&PathBuf>) -> anyhow::Result<Self> {
        let defaults = toml::to_string(&Self::default())?;

        let file = match config_file {
            Some(path) => File::from(path.as_path()).required(true),
            None => File::from(Self::config_path()).required(false),
        };

        let config = Config::builder()
            .add_source(File::from_str(&defaults, FileFormat::Toml))
            .add_source(file.format(FileFormat::Toml))
            .add_source(
                Environment::with_prefix("SPROUT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.sprout.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "sprout", "sprout")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".sprout.toml"))
    }

    /// File `init` writes to and `config path` reports.
    pub fn active_path(config_file: Option<&PathBuf>) -> PathBuf {
        config_file.cloned().unwrap_or_else(Self::config_path)
    }

    /// Directory the cache tool directory lives in.
    pub fn cache_base_dir(&self) -> PathBuf {
        self.cache
            .base_dir
            .clone()
            .or_else(|| directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()))
            .unwrap_or_else(|| Path::new(".").to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_ttl_is_a_week() {
        assert_eq!(AppConfig::default().cache.ttl, "7d");
    }

    #[test]
    fn default_cache_is_enabled() {
        let cfg = AppConfig::default();
        assert!(cfg.cache.enabled);
        assert_eq!(cfg.cache.tool_name, "sprout");
    }

    #[test]
    fn file_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sprout.toml");
        fs::write(
            &path,
            "[defaults]\nrepository = \"acme/templates\"\n\n[cache]\nttl = \"1d\"\n",
        )
        .unwrap();

        let cfg = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.defaults.repository.as_deref(), Some("acme/templates"));
        assert_eq!(cfg.cache.ttl, "1d");
        assert!(cfg.cache.enabled);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.toml");
        assert!(AppConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn explicit_base_dir_wins() {
        let mut cfg = AppConfig::default();
        cfg.cache.base_dir = Some(PathBuf::from("/srv/cache"));
        assert_eq!(cfg.cache_base_dir(), PathBuf::from("/srv/cache"));
    }

    #[test]
    fn config_path_is_not_empty() {
        let p = AppConfig::config_path();
        assert!(!p.as_os_str().is_empty());
    }
}
