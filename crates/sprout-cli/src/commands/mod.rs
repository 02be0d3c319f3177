//! Command handlers, one module per subcommand.

pub mod cache;
pub mod completions;
pub mod config;
pub mod init;
pub mod new;

use std::time::Duration;

use sprout_adapters::{DiskCacheStore, GitCloner};
use sprout_core::application::RepositoryCache;

use crate::{
    cli::parse_ttl,
    config::AppConfig,
    error::{CliError, CliResult},
};

/// Cache store described by `[cache]`.
pub(crate) fn cache_store(config: &AppConfig) -> DiskCacheStore {
    DiskCacheStore::new(config.cache_base_dir(), &config.cache.tool_name)
}

/// Repository cache backed by `git`, expiring after `ttl`.
pub(crate) fn repository_cache(config: &AppConfig, ttl: Option<Duration>) -> RepositoryCache {
    RepositoryCache::new(Box::new(cache_store(config)), Box::new(GitCloner::new())).with_ttl(ttl)
}

/// `cache.ttl` from the configuration.
pub(crate) fn configured_ttl(config: &AppConfig) -> CliResult<Option<Duration>> {
    parse_ttl(&config.cache.ttl)
        .map(Some)
        .map_err(|message| CliError::ConfigError {
            message: format!("cache.ttl: {message}"),
            source: None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_ttl_parses_default() {
        let ttl = configured_ttl(&AppConfig::default()).unwrap();
        assert_eq!(ttl, Some(Duration::from_secs(7 * 24 * 60 * 60)));
    }

    #[test]
    fn bad_configured_ttl_is_a_config_error() {
        let mut config = AppConfig::default();
        config.cache.ttl = "soon".into();
        assert!(matches!(
            configured_ttl(&config),
            Err(CliError::ConfigError { .. })
        ));
    }

    #[test]
    fn zero_ttl_disables_expiry() {
        let mut config = AppConfig::default();
        config.cache.ttl = "0".into();
        let cache = repository_cache(&config, configured_ttl(&config).unwrap());
        assert_eq!(cache.ttl(), None);
    }
}
