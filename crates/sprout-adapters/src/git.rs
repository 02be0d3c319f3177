//! Git adapters: cloning and reading global git configuration.

use std::path::Path;
use std::process::Command;

use tracing::{debug, instrument};

use sprout_core::{
    application::{
        ApplicationError,
        ports::{CloneOptions, RepositoryCloner},
    },
    domain::DefaultResolverRegistry,
    error::SproutResult,
};

/// Clones with the `git` executable found on `PATH`.
#[derive(Debug, Clone)]
pub struct GitCloner {
    program: String,
}

impl GitCloner {
    pub fn new() -> Self {
        Self {
            program: "git".into(),
        }
    }

    /// Use a different git executable.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments for `git clone`, without the program name.
    pub fn clone_args(url: &str, destination: &Path, options: &CloneOptions) -> Vec<String> {
        let mut args = vec!["clone".to_string()];
        if let Some(branch) = &options.branch {
            args.extend(["--branch".into(), branch.clone(), "--single-branch".into()]);
        }
        if let Some(depth) = options.depth {
            args.extend(["--depth".into(), depth.to_string()]);
        }
        // Everything after `--` is positional, even if it starts with `-`.
        args.push("--".into());
        args.push(url.to_string());
        args.push(destination.to_string_lossy().into_owned());
        args
    }
}

impl Default for GitCloner {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryCloner for GitCloner {
    #[instrument(skip(self, options), fields(destination = %destination.display()))]
    fn clone_repository(
        &self,
        url: &str,
        destination: &Path,
        options: &CloneOptions,
    ) -> SproutResult<()> {
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ApplicationError::CloneFailed {
                url: url.to_string(),
                reason: format!("cannot create {}: {}", parent.display(), e),
            })?;
        }

        let args = Self::clone_args(url, destination, options);
        debug!(program = %self.program, ?args, "Running git clone");

        let output = Command::new(&self.program)
            .args(&args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .map_err(|e| ApplicationError::CloneFailed {
                url: url.to_string(),
                reason: format!("failed to run {}: {}", self.program, e),
            })?;

        if !output.status.success() {
            return Err(ApplicationError::CloneFailed {
                url: url.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Value of `git config --global <key>`, if set and non-empty.
pub fn git_config_value(key: &str) -> Option<String> {
    let output = Command::new("git")
        .args(["config", "--global", key])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!value.is_empty()).then_some(value)
}

/// Register `git.user.name` and `git.user.email`.
pub fn register_git_resolvers(registry: &mut DefaultResolverRegistry) {
    registry.register("git.user.name", || git_config_value("user.name"));
    registry.register("git.user.email", || git_config_value("user.email"));
}
