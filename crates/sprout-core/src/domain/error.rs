// ============================================================================
// domain/error.rs - DOMAIN ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (for retry logic)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors (400-level equivalent)
    // ========================================================================
    #[error("Invalid variable name '{name}': {reason}")]
    InvalidVariableName { name: String, reason: String },

    #[error("Invalid repository URL '{url}': {reason}")]
    InvalidRepositoryUrl { url: String, reason: String },

    #[error("Invalid question manifest: {0}")]
    InvalidManifest(String),

    #[error("Duplicate path in project structure: {path}")]
    DuplicatePath { path: String },

    #[error("Absolute paths not allowed: {path}")]
    AbsolutePathNotAllowed { path: String },

    /// A rendered path climbs out of the output directory via `..`.
    #[error("Path escapes the output directory: {path}")]
    PathEscapesOutput { path: String },

    // ========================================================================
    // Constraint Violations
    // ========================================================================
    /// Every required question that ended up without a value, in question
    /// order. Reported once for the whole request.
    #[error("Missing required arguments: {}", names.join(", "))]
    MissingRequiredAnswers { names: Vec<String> },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidVariableName { name, .. } => vec![
                format!("'{}' is not a valid placeholder name", name),
                "Placeholder names use letters, digits and '_', and cannot start with a digit"
                    .into(),
            ],
            Self::InvalidRepositoryUrl { url, .. } => vec![
                format!("Could not use repository '{}'", url),
                "Use owner/repo, https://host/owner/repo.git or git@host:owner/repo.git".into(),
            ],
            Self::InvalidManifest(msg) => vec![
                "Check the template's .questions.json".into(),
                format!("Details: {}", msg),
            ],
            Self::PathEscapesOutput { path } => vec![
                format!("'{}' contains a '..' segment after substitution", path),
                "Answers used in file or directory names cannot contain '..'".into(),
            ],
            Self::MissingRequiredAnswers { names } => {
                let mut suggestions = vec!["Provide a value for each missing argument:".into()];
                for name in names {
                    suggestions.push(format!("  --set {}=<value>", name));
                }
                suggestions.push("Or run in a terminal without --no-tty to be prompted".into());
                suggestions
            }
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidVariableName { .. }
            | Self::InvalidRepositoryUrl { .. }
            | Self::MissingRequiredAnswers { .. }
            | Self::PathEscapesOutput { .. } => ErrorCategory::Validation,
            Self::InvalidManifest(_) => ErrorCategory::Validation,
            Self::DuplicatePath { .. } | Self::AbsolutePathNotAllowed { .. } => {
                ErrorCategory::Internal
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Internal,
}
