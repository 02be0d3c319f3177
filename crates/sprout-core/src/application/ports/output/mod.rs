//! Driven (output) ports - implemented by infrastructure.

use std::path::{Path, PathBuf};

use crate::domain::{
    AnswerMap, CacheEntry, CacheKey, ExtractedVariables, Permissions, ProjectStructure, Question,
    RepositoryRef,
};
use crate::error::SproutResult;

/// Port for filesystem operations on the output side.
///
/// Implemented by:
/// - `sprout_adapters::filesystem::LocalFilesystem` (production)
/// - `sprout_adapters::filesystem::MemoryFilesystem` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> SproutResult<()>;

    /// Write bytes to a file, replacing it if present.
    fn write_file(&self, path: &Path, content: &[u8]) -> SproutResult<()>;

    /// Apply permission bits. A no-op where the platform has no mode bits.
    fn set_permissions(&self, path: &Path, permissions: Permissions) -> SproutResult<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Remove a directory and all contents.
    fn remove_dir_all(&self, path: &Path) -> SproutResult<()>;

    /// Names of the immediate subdirectories of `path`, unsorted.
    fn list_dirs(&self, path: &Path) -> SproutResult<Vec<String>>;
}

/// Port for the persisted repository cache.
///
/// The store knows the layout; the freshness policy lives in
/// `RepositoryCache`.
#[cfg_attr(test, mockall::automock)]
pub trait CacheStore: Send + Sync {
    /// Directory holding every cached checkout.
    fn repos_dir(&self) -> PathBuf;

    /// Where the checkout for `key` lives (whether or not it exists).
    fn entry_path(&self, key: &CacheKey) -> PathBuf;

    /// Entry for `key` if its directory exists.
    fn load(&self, key: &CacheKey) -> SproutResult<Option<CacheEntry>>;

    /// Fresh, not-yet-existing directory next to the entry path, for a clone
    /// that must not be visible under the key until it succeeds.
    fn staging_path(&self, key: &CacheKey) -> SproutResult<PathBuf>;

    /// Fresh, not-yet-existing directory for a clone that bypasses the cache.
    fn scratch_path(&self) -> SproutResult<PathBuf>;

    /// Remove version-control metadata (`.git`) from a checkout.
    fn strip_metadata(&self, checkout: &Path) -> SproutResult<()>;

    /// Strip version-control metadata from `staging`, move it to the entry
    /// path and record the timestamp.
    fn commit(
        &self,
        key: &CacheKey,
        staging: &Path,
        repository: &RepositoryRef,
    ) -> SproutResult<CacheEntry>;

    /// Remove a staging or scratch directory. Missing paths are fine.
    fn discard(&self, path: &Path) -> SproutResult<()>;

    /// Remove the entry for `key`. Returns whether anything was removed.
    fn remove(&self, key: &CacheKey) -> SproutResult<bool>;

    /// Remove every entry. Returns how many were removed.
    fn remove_all(&self) -> SproutResult<usize>;

    /// Every entry currently on disk.
    fn list(&self) -> SproutResult<Vec<CacheEntry>>;
}

/// Options for a clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneOptions {
    pub branch: Option<String>,
    /// Shallow clone depth; `None` for full history.
    pub depth: Option<u32>,
}

impl CloneOptions {
    /// Depth-1 clone, restricted to `branch` when one is given.
    pub fn shallow(branch: Option<String>) -> Self {
        Self {
            branch,
            depth: Some(1),
        }
    }
}

/// Port for fetching a repository into a local directory.
///
/// Implemented by `sprout_adapters::git::GitCloner`.
#[cfg_attr(test, mockall::automock)]
pub trait RepositoryCloner: Send + Sync {
    /// Clone `url` into `destination`, which must not exist yet.
    fn clone_repository(
        &self,
        url: &str,
        destination: &Path,
        options: &CloneOptions,
    ) -> SproutResult<()>;
}

/// Port for discovering template variables.
///
/// Implemented by `sprout_adapters::extractor::FilesystemExtractor`.
#[cfg_attr(test, mockall::automock)]
pub trait TemplateScanner: Send + Sync {
    fn extract(&self, template_root: &Path) -> SproutResult<ExtractedVariables>;
}

/// Port for template rendering.
///
/// Implemented by `sprout_adapters::renderer::PlaceholderRenderer`.
#[cfg_attr(test, mockall::automock)]
pub trait TemplateRenderer: Send + Sync {
    /// Render the tree under `template_root` into a project structure rooted
    /// at `output_root`. Nothing is written.
    fn render(
        &self,
        template_root: &Path,
        extracted: &ExtractedVariables,
        answers: &AnswerMap,
        output_root: &Path,
    ) -> SproutResult<ProjectStructure>;
}

/// Port for asking the user.
///
/// Implemented by the CLI (`dialoguer`).
#[cfg_attr(test, mockall::automock)]
pub trait Prompter: Send + Sync {
    /// Ask `questions`, with `initial` holding what is already known.
    /// Returns the answers given.
    fn prompt(&self, initial: &AnswerMap, questions: &[Question]) -> SproutResult<AnswerMap>;
}
