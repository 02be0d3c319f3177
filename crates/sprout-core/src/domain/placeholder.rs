//! Placeholder tokens: `____name____`.
//!
//! The four-underscore boundary is part of the template format and is not
//! configurable. A variable name starts with a letter or `_` and continues
//! with letters, digits or `_`.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex::{NoExpand, Regex};

use crate::domain::error::DomainError;

/// Marker placed on both sides of a variable name.
pub const PLACEHOLDER_BOUNDARY: &str = "____";

static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "{b}([A-Za-z_][A-Za-z0-9_]*){b}",
        b = PLACEHOLDER_BOUNDARY
    ))
    .expect("placeholder pattern is valid")
});

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[A-Za-z_][A-Za-z0-9_]*$").expect("name pattern is valid"));

/// Every variable name mentioned in `text`, in order of appearance.
///
/// Duplicates are kept; callers deduplicate.
pub fn scan(text: &str) -> impl Iterator<Item = &str> {
    TOKEN_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

/// A discovered variable together with the pattern that matches its token.
///
/// Used for both path segments (file replacers) and file bodies (content
/// replacers).
#[derive(Debug, Clone)]
pub struct Replacer {
    variable: String,
    pattern: Regex,
}

impl Replacer {
    /// Build a replacer for `variable`.
    pub fn new(variable: impl Into<String>) -> Result<Self, DomainError> {
        let variable = variable.into();
        if !NAME_PATTERN.is_match(&variable) {
            return Err(DomainError::InvalidVariableName {
                name: variable,
                reason: "expected [A-Za-z_][A-Za-z0-9_]*".into(),
            });
        }

        // Name characters are never regex metacharacters.
        let pattern = Regex::new(&format!(
            "{b}{variable}{b}",
            b = PLACEHOLDER_BOUNDARY
        ))
        .map_err(|e| DomainError::InvalidVariableName {
            name: variable.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self { variable, pattern })
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// The literal token, e.g. `____name____`.
    pub fn token(&self) -> String {
        format!("{b}{}{b}", self.variable, b = PLACEHOLDER_BOUNDARY)
    }

    /// Replace every occurrence of the token in `text` with `value`.
    ///
    /// `value` is inserted literally; `$` has no special meaning.
    pub fn apply(&self, text: &str, value: &str) -> String {
        self.pattern.replace_all(text, NoExpand(value)).into_owned()
    }
}

impl PartialEq for Replacer {
    fn eq(&self, other: &Self) -> bool {
        self.variable == other.variable
    }
}

impl Eq for Replacer {}

impl fmt::Display for Replacer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

/// Insertion-ordered set of replacers, unique by variable name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacerSet {
    replacers: Vec<Replacer>,
    seen: HashSet<String>,
}

impl ReplacerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `variable` unless already present.
    ///
    /// Returns `true` when the variable was new.
    pub fn register(&mut self, variable: &str) -> Result<bool, DomainError> {
        if self.seen.contains(variable) {
            return Ok(false);
        }
        self.replacers.push(Replacer::new(variable)?);
        self.seen.insert(variable.to_owned());
        Ok(true)
    }

    /// Register every token found in `text`.
    pub fn register_all(&mut self, text: &str) -> Result<(), DomainError> {
        for name in scan(text) {
            self.register(name)?;
        }
        Ok(())
    }

    pub fn contains(&self, variable: &str) -> bool {
        self.seen.contains(variable)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Replacer> {
        self.replacers.iter()
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.replacers.iter().map(Replacer::variable)
    }

    pub fn len(&self) -> usize {
        self.replacers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replacers.is_empty()
    }
}

impl<'a> IntoIterator for &'a ReplacerSet {
    type Item = &'a Replacer;
    type IntoIter = std::slice::Iter<'a, Replacer>;

    fn into_iter(self) -> Self::IntoIter {
        self.replacers.iter()
    }
}
