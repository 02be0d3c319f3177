//! Domain value objects: repository URLs and cache keys.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Branch component hashed when no branch is requested.
pub const DEFAULT_BRANCH_SENTINEL: &str = "default";

static SHORTHAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w-]+/[\w-]+$").expect("shorthand pattern is valid"));

/// Expand `owner/repo` to a GitHub HTTPS URL.
///
/// `git@…`, `http://…` and `https://…` pass through unchanged, as does
/// anything else that is not the two-segment shorthand (local paths,
/// `file://` URLs).
pub fn normalize_repository_url(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("git@") || url.starts_with("https://") || url.starts_with("http://") {
        return url.to_owned();
    }
    if SHORTHAND.is_match(url) {
        return format!("https://github.com/{url}.git");
    }
    url.to_owned()
}

// ── CacheKey ─────────────────────────────────────────────────────────────────

/// Deterministic identifier of a cached checkout.
///
/// First 16 bytes of `SHA-256(normalized_url + "#" + branch)`, lowercase hex.
/// Safe to use as a directory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub const LEN: usize = 32;

    pub fn derive(url: &str, branch: Option<&str>) -> Self {
        let normalized = normalize_repository_url(url);
        let branch = branch
            .filter(|b| !b.is_empty())
            .unwrap_or(DEFAULT_BRANCH_SENTINEL);

        let mut hasher = Sha256::new();
        hasher.update(normalized.as_bytes());
        hasher.update(b"#");
        hasher.update(branch.as_bytes());
        let digest = hasher.finalize();

        Self(hex::encode(&digest[..16]))
    }

    /// Accept a key read back from disk (a directory name).
    ///
    /// Returns `None` for anything that is not 32 lowercase hex characters.
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = raw.len() == Self::LEN
            && raw
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        valid.then(|| Self(raw.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ── RepositoryRef ────────────────────────────────────────────────────────────

/// A repository as requested by the user: URL (or shorthand) plus branch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl RepositoryRef {
    /// Empty branch names count as "no branch".
    pub fn new(url: impl Into<String>, branch: Option<String>) -> Self {
        Self {
            url: url.into(),
            branch: branch.filter(|b| !b.is_empty()),
        }
    }

    /// URL handed to the cloner.
    pub fn clone_url(&self) -> String {
        normalize_repository_url(&self.url)
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::derive(&self.url, self.branch.as_deref())
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.branch {
            Some(b) => write!(f, "{}#{}", self.url, b),
            None => f.write_str(&self.url),
        }
    }
}
