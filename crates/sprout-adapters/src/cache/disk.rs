//! On-disk repository cache.
//!
//! Layout under the tool directory (`~/.sprout` by default):
//!
//! ```text
//! .sprout/
//! └── cache/
//!     └── repos/
//!         ├── <key>/               ← checkout, without .git
//!         ├── <key>.meta.json      ← {key, url, branch, last_updated}
//!         └── .<key>.staging-<id>/ ← clone in progress
//! ```
//!
//! A checkout directory without a sidecar (older cache, interrupted write)
//! is still an entry; its modification time stands in for `last_updated`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use sprout_core::{
    application::{ApplicationError, ports::CacheStore},
    domain::{CacheEntry, CacheKey, RepositoryRef},
    error::{SproutError, SproutResult},
};

const VCS_DIR: &str = ".git";
const METADATA_EXTENSION: &str = "meta.json";

/// Contents of `<key>.meta.json`.
#[derive(Debug, Serialize, Deserialize)]
struct Sidecar {
    key: CacheKey,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    branch: Option<String>,
    last_updated: DateTime<Utc>,
}

/// Cache store rooted at `<base>/.<tool>`.
#[derive(Debug, Clone)]
pub struct DiskCacheStore {
    root: PathBuf,
    scratch_root: PathBuf,
}

impl DiskCacheStore {
    /// Store for `tool` under `base` (usually the home directory).
    pub fn new(base: impl AsRef<Path>, tool: &str) -> Self {
        Self {
            root: base.as_ref().join(format!(".{tool}")),
            scratch_root: std::env::temp_dir(),
        }
    }

    /// Put uncached clones under `dir` instead of the system temp directory.
    pub fn with_scratch_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_root = dir.into();
        self
    }

    /// The tool directory, `<base>/.<tool>`.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn metadata_path(&self, key: &CacheKey) -> PathBuf {
        self.repos_dir()
            .join(format!("{}.{}", key, METADATA_EXTENSION))
    }

    fn ensure_repos_dir(&self) -> SproutResult<PathBuf> {
        let dir = self.repos_dir();
        fs::create_dir_all(&dir).map_err(|e| cache_error(&dir, "create cache directory", e))?;
        Ok(dir)
    }

    fn read_sidecar(&self, key: &CacheKey) -> Option<Sidecar> {
        let path = self.metadata_path(key);
        let raw = fs::read_to_string(&path).ok()?;
        match serde_json::from_str::<Sidecar>(&raw) {
            Ok(sidecar) => Some(sidecar),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable cache metadata");
                None
            }
        }
    }

    fn write_sidecar(&self, entry: &CacheEntry) -> SproutResult<()> {
        let sidecar = Sidecar {
            key: entry.key.clone(),
            url: entry.url.clone(),
            branch: entry.branch.clone(),
            last_updated: entry.last_updated,
        };
        let path = self.metadata_path(&entry.key);
        let json = serde_json::to_string_pretty(&sidecar).map_err(|e| {
            SproutError::from(ApplicationError::CacheError {
                reason: format!("failed to encode cache metadata: {e}"),
            })
        })?;
        fs::write(&path, json).map_err(|e| cache_error(&path, "write cache metadata", e))
    }

    /// Keys of every checkout directory in the cache.
    fn keys(&self) -> SproutResult<Vec<CacheKey>> {
        let dir = self.repos_dir();
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let read_dir = fs::read_dir(&dir).map_err(|e| cache_error(&dir, "read cache", e))?;
        let mut keys = Vec::new();
        for entry in read_dir.flatten() {
            if !entry.path().is_dir() {
                continue;
            }
            if let Some(key) = CacheKey::parse(&entry.file_name().to_string_lossy()) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}

impl CacheStore for DiskCacheStore {
    fn repos_dir(&self) -> PathBuf {
        self.root.join("cache").join("repos")
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.repos_dir().join(key.as_str())
    }

    fn load(&self, key: &CacheKey) -> SproutResult<Option<CacheEntry>> {
        let path = self.entry_path(key);
        if !path.is_dir() {
            return Ok(None);
        }

        if let Some(sidecar) = self.read_sidecar(key) {
            let mut entry = CacheEntry::new(key.clone(), path, sidecar.last_updated);
            entry.url = sidecar.url;
            entry.branch = sidecar.branch;
            return Ok(Some(entry));
        }

        let modified = fs::metadata(&path)
            .and_then(|m| m.modified())
            .map_err(|e| cache_error(&path, "read cache entry time", e))?;
        debug!(key = %key, "No cache metadata, using directory mtime");
        Ok(Some(CacheEntry::new(
            key.clone(),
            path,
            DateTime::<Utc>::from(modified),
        )))
    }

    fn staging_path(&self, key: &CacheKey) -> SproutResult<PathBuf> {
        let dir = self.ensure_repos_dir()?;
        Ok(dir.join(format!(".{}.staging-{}", key, Uuid::new_v4().simple())))
    }

    fn scratch_path(&self) -> SproutResult<PathBuf> {
        fs::create_dir_all(&self.scratch_root)
            .map_err(|e| cache_error(&self.scratch_root, "create scratch directory", e))?;
        Ok(self
            .scratch_root
            .join(format!("sprout-{}", Uuid::new_v4().simple())))
    }

    fn strip_metadata(&self, checkout: &Path) -> SproutResult<()> {
        let git_dir = checkout.join(VCS_DIR);
        if git_dir.exists() {
            fs::remove_dir_all(&git_dir)
                .map_err(|e| cache_error(&git_dir, "remove .git directory", e))?;
        }
        Ok(())
    }

    fn commit(
        &self,
        key: &CacheKey,
        staging: &Path,
        repository: &RepositoryRef,
    ) -> SproutResult<CacheEntry> {
        self.strip_metadata(staging)?;
        self.ensure_repos_dir()?;

        let target = self.entry_path(key);
        if target.exists() {
            fs::remove_dir_all(&target)
                .map_err(|e| cache_error(&target, "replace stale cache entry", e))?;
        }
        fs::rename(staging, &target).map_err(|e| cache_error(&target, "promote clone", e))?;

        let entry = CacheEntry::new(key.clone(), target, Utc::now())
            .with_source(repository.url.clone(), repository.branch.clone());
        self.write_sidecar(&entry)?;
        Ok(entry)
    }

    fn discard(&self, path: &Path) -> SproutResult<()> {
        if path.exists() {
            fs::remove_dir_all(path).map_err(|e| cache_error(path, "remove directory", e))?;
        }
        Ok(())
    }

    fn remove(&self, key: &CacheKey) -> SproutResult<bool> {
        let path = self.entry_path(key);
        let meta = self.metadata_path(key);
        let mut removed = false;

        if path.exists() {
            fs::remove_dir_all(&path).map_err(|e| cache_error(&path, "remove cache entry", e))?;
            removed = true;
        }
        if meta.exists() {
            fs::remove_file(&meta).map_err(|e| cache_error(&meta, "remove cache metadata", e))?;
        }

        Ok(removed)
    }

    fn remove_all(&self) -> SproutResult<usize> {
        let keys = self.keys()?;
        let mut removed = 0;
        for key in &keys {
            if self.remove(key)? {
                removed += 1;
            }
        }

        // Leftovers: abandoned staging directories, orphaned sidecars.
        let dir = self.repos_dir();
        if let Ok(read_dir) = fs::read_dir(&dir) {
            for entry in read_dir.flatten() {
                let path = entry.path();
                let name = entry.file_name().to_string_lossy().into_owned();
                let result = if path.is_dir() && name.starts_with('.') {
                    fs::remove_dir_all(&path)
                } else if name.ends_with(METADATA_EXTENSION) {
                    fs::remove_file(&path)
                } else {
                    continue;
                };
                if let Err(e) = result {
                    warn!(path = %path.display(), error = %e, "Failed to remove cache leftover");
                }
            }
        }

        Ok(removed)
    }

    fn list(&self) -> SproutResult<Vec<CacheEntry>> {
        let mut entries = Vec::new();
        for key in self.keys()? {
            if let Some(entry) = self.load(&key)? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }
}

fn cache_error(path: &Path, operation: &str, e: std::io::Error) -> SproutError {
    ApplicationError::CacheError {
        reason: format!("failed to {} at {}: {}", operation, path.display(), e),
    }
    .into()
}
