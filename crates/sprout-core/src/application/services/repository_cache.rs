//! Repository cache - reuse or refresh cached checkouts.
//!
//! Policy: a fresh entry is reused without touching the network. A missing
//! or expired entry is cleared and cloned again from scratch. Updates are
//! never incremental.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{CacheStore, CloneOptions, RepositoryCloner},
    },
    domain::{CacheEntry, CacheKey, CacheState, RepositoryRef, TemplateOrigin, TemplateSource},
    error::SproutResult,
};

/// Keyed, TTL-bound cache of repository checkouts.
pub struct RepositoryCache {
    store: Box<dyn CacheStore>,
    cloner: Box<dyn RepositoryCloner>,
    ttl: Option<Duration>,
    in_flight: Mutex<HashSet<CacheKey>>,
}

impl RepositoryCache {
    /// Cache without expiry.
    pub fn new(store: Box<dyn CacheStore>, cloner: Box<dyn RepositoryCloner>) -> Self {
        Self {
            store,
            cloner,
            ttl: None,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Entries older than `ttl` are treated as expired. `None` disables expiry.
    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl.filter(|t| !t.is_zero());
        self
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    pub fn store(&self) -> &dyn CacheStore {
        self.store.as_ref()
    }

    pub fn derive_key(repository: &RepositoryRef) -> CacheKey {
        repository.cache_key()
    }

    /// The entry for `key`, if its checkout exists on disk.
    pub fn lookup(&self, key: &CacheKey) -> SproutResult<Option<CacheEntry>> {
        self.store.load(key)
    }

    /// Whether `entry` is older than the configured TTL.
    pub fn check_expiration(&self, entry: &CacheEntry) -> bool {
        entry.is_expired_at(Utc::now(), self.ttl)
    }

    pub fn state(&self, key: &CacheKey) -> SproutResult<CacheState> {
        let entry = self.lookup(key)?;
        Ok(CacheState::classify(entry, Utc::now(), self.ttl))
    }

    /// Clone `repository` into the cache under its key.
    ///
    /// The clone lands in a staging directory first; only a successful clone
    /// is promoted to the entry path.
    #[instrument(skip(self), fields(repository = %repository))]
    pub fn materialize_entry(&self, repository: &RepositoryRef) -> SproutResult<CacheEntry> {
        let key = repository.cache_key();
        let _guard = self.claim(&key)?;

        let staging = self.store.staging_path(&key)?;
        let options = CloneOptions::shallow(repository.branch.clone());

        info!(key = %key, "Cloning repository into cache");
        if let Err(e) = self
            .cloner
            .clone_repository(&repository.clone_url(), &staging, &options)
        {
            self.discard_quietly(&staging);
            return Err(e);
        }

        match self.store.commit(&key, &staging, repository) {
            Ok(entry) => {
                debug!(path = %entry.path.display(), "Cache entry committed");
                Ok(entry)
            }
            Err(e) => {
                self.discard_quietly(&staging);
                Err(e)
            }
        }
    }

    /// Remove one entry. Returns whether it existed.
    pub fn clear(&self, key: &CacheKey) -> SproutResult<bool> {
        let removed = self.store.remove(key)?;
        if removed {
            info!(key = %key, "Cleared cache entry");
        }
        Ok(removed)
    }

    /// Remove every entry. Returns how many were removed.
    pub fn clear_all(&self) -> SproutResult<usize> {
        let removed = self.store.remove_all()?;
        info!(removed, "Cleared cache");
        Ok(removed)
    }

    pub fn list(&self) -> SproutResult<Vec<CacheEntry>> {
        self.store.list()
    }

    /// A checkout of `repository`, from the cache when fresh.
    #[instrument(skip(self), fields(repository = %repository))]
    pub fn fetch(&self, repository: &RepositoryRef) -> SproutResult<TemplateSource> {
        let key = repository.cache_key();

        match self.state(&key)? {
            CacheState::Fresh(entry) => {
                info!(key = %key, "Using cached repository");
                return Ok(TemplateSource {
                    directory: entry.path,
                    origin: TemplateOrigin::Cached,
                    key,
                });
            }
            CacheState::Expired(entry) => {
                info!(key = %key, last_updated = %entry.last_updated, "Cache entry expired");
                self.store.remove(&key)?;
            }
            CacheState::Missing => {
                debug!(key = %key, "Cache miss");
                // A directory without an entry (interrupted promotion) would
                // block the rename.
                self.store.remove(&key)?;
            }
        }

        let entry = self.materialize_entry(repository)?;
        Ok(TemplateSource {
            directory: entry.path,
            origin: TemplateOrigin::Cloned,
            key,
        })
    }

    /// A throwaway checkout of `repository` that bypasses the cache.
    ///
    /// Pass the result to [`release`](Self::release) when done.
    #[instrument(skip(self), fields(repository = %repository))]
    pub fn fetch_uncached(&self, repository: &RepositoryRef) -> SproutResult<TemplateSource> {
        let key = repository.cache_key();
        let scratch = self.store.scratch_path()?;
        let options = CloneOptions::shallow(repository.branch.clone());

        info!("Cloning repository without cache");
        let cloned = self
            .cloner
            .clone_repository(&repository.clone_url(), &scratch, &options)
            .and_then(|()| self.store.strip_metadata(&scratch));
        if let Err(e) = cloned {
            self.discard_quietly(&scratch);
            return Err(e);
        }

        Ok(TemplateSource {
            directory: scratch,
            origin: TemplateOrigin::Ephemeral,
            key,
        })
    }

    /// Drop a source obtained from this cache. Only ephemeral checkouts are
    /// removed; cached ones stay for the next request.
    pub fn release(&self, source: &TemplateSource) {
        if source.origin == TemplateOrigin::Ephemeral {
            debug!(path = %source.directory.display(), "Removing scratch checkout");
            self.discard_quietly(&source.directory);
        }
    }

    fn discard_quietly(&self, path: &std::path::Path) {
        if let Err(e) = self.store.discard(path) {
            warn!(error = %e, path = %path.display(), "Failed to remove temporary checkout");
        }
    }

    /// Mark `key` as being materialized by this process.
    fn claim(&self, key: &CacheKey) -> SproutResult<InFlight<'_>> {
        let mut set = self
            .in_flight
            .lock()
            .map_err(|_| ApplicationError::CacheError {
                reason: "in-flight set lock poisoned".into(),
            })?;

        if !set.insert(key.clone()) {
            return Err(ApplicationError::CacheBusy {
                key: key.to_string(),
            }
            .into());
        }

        Ok(InFlight {
            set: &self.in_flight,
            key: key.clone(),
        })
    }
}

/// Releases an in-flight claim when dropped.
struct InFlight<'a> {
    set: &'a Mutex<HashSet<CacheKey>>,
    key: CacheKey,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Ok(mut set) = self.set.lock() {
            set.remove(&self.key);
        }
    }
}
