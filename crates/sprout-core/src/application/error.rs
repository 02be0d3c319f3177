//! Application layer errors.
//!
//! Failures in orchestration (I/O, processes, prompting), as opposed to the
//! rule violations in `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// `git clone` (or the configured cloner) failed. No cache entry exists.
    #[error("Failed to clone {url}: {reason}")]
    CloneFailed { url: String, reason: String },

    /// The requested sub-path does not exist in the repository checkout.
    #[error("Template path \"{path}\" does not exist in repository {repository}")]
    TemplatePathNotFound { path: String, repository: String },

    /// Output directory exists and overwrite was not authorized.
    #[error("Output directory already exists: {path}")]
    OutputExists { path: PathBuf },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// Cache metadata or layout could not be read or written.
    #[error("Cache error: {reason}")]
    CacheError { reason: String },

    /// Another request in this process is materializing the same key.
    #[error("Cache entry {key} is being populated by another request")]
    CacheBusy { key: String },

    /// The prompt collaborator failed or was cancelled.
    #[error("Prompt failed: {reason}")]
    PromptFailed { reason: String },

    /// Port/Adapter not configured.
    #[error("Required adapter not configured: {name}")]
    AdapterNotConfigured { name: &'static str },

    /// The selection directory has no candidate templates.
    #[error("No templates found in {path}")]
    NoTemplates { path: PathBuf },

    /// A named template is not among the candidates.
    #[error("Template \"{name}\" not found")]
    TemplateNotFound { name: String, available: Vec<String> },

    /// Template rendering failed.
    #[error("Template rendering failed: {reason}")]
    RenderingFailed { reason: String },

    /// Rollback failed (best-effort cleanup failed).
    #[error("Rollback failed for {path}: {reason}")]
    RollbackFailed { path: PathBuf, reason: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::CloneFailed { url, .. } => vec![
                format!("Could not clone: {}", url),
                "Check the repository URL and your network connection".into(),
                "For private repositories, make sure git can authenticate".into(),
            ],
            Self::TemplatePathNotFound { path, .. } => vec![
                format!("No directory '{}' in the repository", path),
                "Check --path, or omit it to use the repository root".into(),
            ],
            Self::OutputExists { path } => vec![
                format!("Directory already exists: {}", path.display()),
                "Use --force to overwrite (destructive)".into(),
                "Or choose a different output directory".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::CacheError { .. } => vec![
                "The template cache may be corrupted".into(),
                "Try: sprout cache clear".into(),
            ],
            Self::CacheBusy { .. } => vec![
                "Another generation is fetching the same repository".into(),
                "Try again in a moment".into(),
            ],
            Self::PromptFailed { .. } => vec![
                "Run with --no-tty and pass answers with --set KEY=VALUE".into(),
            ],
            Self::AdapterNotConfigured { name } => vec![
                format!("Required component not configured: {}", name),
                "This build may lack the 'interactive' feature; use --no-tty".into(),
            ],
            Self::NoTemplates { path } => vec![
                format!("'{}' has no template directories", path.display()),
                "Check --path".into(),
            ],
            Self::TemplateNotFound { available, .. } => {
                let mut s = vec!["Available templates:".to_string()];
                s.extend(available.iter().map(|a| format!("  {}", a)));
                s
            }
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::CloneFailed { .. } => ErrorCategory::Network,
            Self::TemplatePathNotFound { .. }
            | Self::NoTemplates { .. }
            | Self::TemplateNotFound { .. } => ErrorCategory::NotFound,
            Self::OutputExists { .. } => ErrorCategory::Validation,
            Self::AdapterNotConfigured { .. } => ErrorCategory::Configuration,
            Self::PromptFailed { .. } => ErrorCategory::Validation,
            Self::FilesystemError { .. }
            | Self::CacheError { .. }
            | Self::CacheBusy { .. }
            | Self::RenderingFailed { .. }
            | Self::RollbackFailed { .. } => ErrorCategory::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_not_found_lists_choices() {
        let err = ApplicationError::TemplateNotFound {
            name: "web".into(),
            available: vec!["cli".into(), "lib".into()],
        };
        let s = err.suggestions();
        assert!(s.contains(&"  cli".to_string()));
        assert!(s.contains(&"  lib".to_string()));
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn template_path_message() {
        let err = ApplicationError::TemplatePathNotFound {
            path: "missing".into(),
            repository: "acme/starter".into(),
        };
        assert_eq!(
            err.to_string(),
            "Template path \"missing\" does not exist in repository acme/starter"
        );
    }
}
