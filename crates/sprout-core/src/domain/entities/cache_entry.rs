use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::CacheKey;

/// A cached checkout on disk.
///
/// Exists only after a clone has succeeded and been promoted into the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub path: PathBuf,
    pub last_updated: DateTime<Utc>,
    /// Source repository as given by the user, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
}

impl CacheEntry {
    pub fn new(key: CacheKey, path: impl Into<PathBuf>, last_updated: DateTime<Utc>) -> Self {
        Self {
            key,
            path: path.into(),
            last_updated,
            url: None,
            branch: None,
        }
    }

    pub fn with_source(mut self, url: impl Into<String>, branch: Option<String>) -> Self {
        self.url = Some(url.into());
        self.branch = branch;
        self
    }

    /// Expired iff a TTL is set and strictly more than `ttl` has passed.
    ///
    /// A timestamp in the future (clock skew) is never expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>, ttl: Option<Duration>) -> bool {
        let Some(ttl) = ttl else {
            return false;
        };
        match (now - self.last_updated).to_std() {
            Ok(age) => age > ttl,
            Err(_) => false,
        }
    }

    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        (now - self.last_updated).to_std().unwrap_or_default()
    }
}

/// Outcome of looking up a key under a TTL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheState {
    Missing,
    Fresh(CacheEntry),
    Expired(CacheEntry),
}

impl CacheState {
    pub fn classify(entry: Option<CacheEntry>, now: DateTime<Utc>, ttl: Option<Duration>) -> Self {
        match entry {
            None => Self::Missing,
            Some(e) if e.is_expired_at(now, ttl) => Self::Expired(e),
            Some(e) => Self::Fresh(e),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Fresh(_) => "fresh",
            Self::Expired(_) => "expired",
        }
    }

    pub fn entry(&self) -> Option<&CacheEntry> {
        match self {
            Self::Missing => None,
            Self::Fresh(e) | Self::Expired(e) => Some(e),
        }
    }
}

/// Where a template tree came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateOrigin {
    /// Reused a fresh cache entry without touching the network.
    Cached,
    /// Cloned into the cache during this request.
    Cloned,
    /// Cloned into a scratch directory that is removed after the request.
    Ephemeral,
}

/// A template tree ready to be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSource {
    pub directory: PathBuf,
    pub origin: TemplateOrigin,
    pub key: CacheKey,
}

impl TemplateSource {
    pub fn cache_used(&self) -> bool {
        self.origin == TemplateOrigin::Cached
    }
}
