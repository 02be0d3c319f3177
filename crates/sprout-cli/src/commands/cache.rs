//! `sprout cache` - inspect and clear cached checkouts.

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;

use sprout_core::{
    application::RepositoryCache,
    domain::{CacheEntry, CacheState, RepositoryRef},
};

use crate::{
    cli::CacheCommands,
    commands::{configured_ttl, repository_cache},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

/// Dispatch to the correct cache subcommand.
pub fn execute(cmd: CacheCommands, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let cache = repository_cache(&config, configured_ttl(&config)?);

    match cmd {
        CacheCommands::Clear {
            repo: Some(url),
            branch,
        } => {
            let repository = RepositoryRef::new(url, branch);
            if cache.clear(&repository.cache_key())? {
                output.success(&format!("Removed cached checkout of {repository}"))?;
            } else {
                output.info(&format!("{repository} is not cached"))?;
            }
        }

        CacheCommands::Clear { repo: None, .. } => {
            let removed = cache.clear_all()?;
            output.success(&format!("Removed {removed} cached checkout(s)"))?;
        }

        CacheCommands::List => list(&cache, &output)?,

        CacheCommands::Path => {
            output.print(&cache.store().repos_dir().display().to_string())?;
        }

        CacheCommands::Status(selector) => {
            let repository = RepositoryRef::new(selector.repo, selector.branch);
            let key = repository.cache_key();
            let state = cache.state(&key)?;

            if output.is_json() {
                output.json(&StatusView {
                    repository: repository.to_string(),
                    key: key.to_string(),
                    state: state.as_str(),
                    entry: state.entry(),
                })?;
            } else {
                output.print(&status_line(&repository, &state))?;
            }
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct StatusView<'a> {
    repository: String,
    key: String,
    state: &'static str,
    entry: Option<&'a CacheEntry>,
}

fn list(cache: &RepositoryCache, output: &OutputManager) -> CliResult<()> {
    let entries = cache.list()?;

    if output.is_json() {
        output.json(&entries)?;
        return Ok(());
    }

    if entries.is_empty() {
        output.info("No cached repositories")?;
        return Ok(());
    }

    output.header("Cached repositories:")?;
    let now = Utc::now();
    for entry in &entries {
        let expired = if cache.check_expiration(entry) {
            " (expired)"
        } else {
            ""
        };
        output.print(&format!(
            "  {}  {}  updated {} ago{}",
            entry.key,
            source_label(entry),
            format_age(entry.age_at(now)),
            expired
        ))?;
    }
    Ok(())
}

fn source_label(entry: &CacheEntry) -> String {
    match (&entry.url, &entry.branch) {
        (Some(url), Some(branch)) => format!("{url}#{branch}"),
        (Some(url), None) => url.clone(),
        (None, _) => "(unknown source)".into(),
    }
}

fn status_line(repository: &RepositoryRef, state: &CacheState) -> String {
    match state.entry() {
        Some(entry) => format!(
            "{repository}: {} ({})",
            state.as_str(),
            entry.path.display()
        ),
        None => format!("{repository}: {}", state.as_str()),
    }
}

/// Coarsest non-zero unit: `42s`, `5m`, `3h`, `2d`.
fn format_age(age: Duration) -> String {
    let secs = age.as_secs();
    match secs {
        s if s < 60 => format!("{s}s"),
        s if s < 60 * 60 => format!("{}m", s / 60),
        s if s < 24 * 60 * 60 => format!("{}h", s / 3600),
        s => format!("{}d", s / 86_400),
    }
}
