//! In-memory filesystem adapter for testing.

use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock},
};

use sprout_core::{
    application::{ApplicationError, ports::Filesystem},
    domain::Permissions,
    error::{SproutError, SproutResult},
};

/// In-memory filesystem for testing.
///
/// Clones share the same storage, so a test can keep a handle while the
/// service owns another.
#[derive(Debug, Clone)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: HashMap<PathBuf, Vec<u8>>,
    directories: HashSet<PathBuf>,
    executables: HashSet<PathBuf>,
    /// Writes to these paths fail, for rollback tests.
    failing: HashSet<PathBuf>,
}

fn lock_error<T>(_: PoisonError<T>) -> SproutError {
    ApplicationError::FilesystemError {
        path: PathBuf::new(),
        reason: "memory filesystem lock poisoned".into(),
    }
    .into()
}

impl MemoryFilesystem {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryFilesystemInner::default())),
        }
    }

    /// Read a file's content as text (testing helper).
    pub fn read_file(&self, path: &Path) -> Option<String> {
        self.read_bytes(path)
            .and_then(|bytes| String::from_utf8(bytes).ok())
    }

    pub fn read_bytes(&self, path: &Path) -> Option<Vec<u8>> {
        let inner = self.inner.read().ok()?;
        inner.files.get(path).cloned()
    }

    pub fn is_executable(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.executables.contains(path))
            .unwrap_or(false)
    }

    /// All file paths, sorted.
    pub fn list_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self
            .inner
            .read()
            .map(|inner| inner.files.keys().cloned().collect())
            .unwrap_or_default();
        files.sort();
        files
    }

    /// Make every later write to `path` fail.
    pub fn fail_writes_to(&self, path: impl Into<PathBuf>) {
        if let Ok(mut inner) = self.inner.write() {
            inner.failing.insert(path.into());
        }
    }
}

impl Default for MemoryFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for MemoryFilesystem {
    fn create_dir_all(&self, path: &Path) -> SproutResult<()> {
        let mut inner = self.inner.write().map_err(lock_error)?;

        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            inner.directories.insert(current.clone());
        }

        Ok(())
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> SproutResult<()> {
        let mut inner = self.inner.write().map_err(lock_error)?;

        if inner.failing.contains(path) {
            return Err(ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                reason: "injected write failure".into(),
            }
            .into());
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !inner.directories.contains(parent) {
                return Err(ApplicationError::FilesystemError {
                    path: path.to_path_buf(),
                    reason: "Parent directory does not exist".into(),
                }
                .into());
            }
        }

        inner.files.insert(path.to_path_buf(), content.to_vec());
        Ok(())
    }

    fn set_permissions(&self, path: &Path, permissions: Permissions) -> SproutResult<()> {
        let mut inner = self.inner.write().map_err(lock_error)?;

        if permissions.executable_flag() {
            inner.executables.insert(path.to_path_buf());
        } else {
            inner.executables.remove(path);
        }

        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.files.contains_key(path) || inner.directories.contains(path))
            .unwrap_or(false)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.directories.contains(path))
            .unwrap_or(false)
    }

    fn remove_dir_all(&self, path: &Path) -> SproutResult<()> {
        let mut inner = self.inner.write().map_err(lock_error)?;

        inner.directories.retain(|p| !p.starts_with(path));
        inner.files.retain(|p, _| !p.starts_with(path));
        inner.executables.retain(|p| !p.starts_with(path));

        Ok(())
    }

    fn list_dirs(&self, path: &Path) -> SproutResult<Vec<String>> {
        let inner = self.inner.read().map_err(lock_error)?;
        Ok(inner
            .directories
            .iter()
            .filter(|d| d.parent() == Some(path))
            .filter_map(|d| d.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_requires_parent() {
        let fs = MemoryFilesystem::new();
        assert!(fs.write_file(Path::new("/out/a.txt"), b"x").is_err());
        fs.create_dir_all(Path::new("/out")).unwrap();
        fs.write_file(Path::new("/out/a.txt"), b"x").unwrap();
        assert_eq!(fs.read_file(Path::new("/out/a.txt")).as_deref(), Some("x"));
    }

    #[test]
    fn remove_dir_all_drops_descendants() {
        let fs = MemoryFilesystem::new();
        fs.create_dir_all(Path::new("/out/src")).unwrap();
        fs.write_file(Path::new("/out/src/main.rs"), b"").unwrap();
        fs.remove_dir_all(Path::new("/out")).unwrap();
        assert!(!fs.exists(Path::new("/out")));
        assert!(!fs.exists(Path::new("/out/src/main.rs")));
        assert!(fs.exists(Path::new("/")));
    }

    #[test]
    fn lists_immediate_subdirectories() {
        let fs = MemoryFilesystem::new();
        fs.create_dir_all(Path::new("/repo/cli/src")).unwrap();
        fs.create_dir_all(Path::new("/repo/web")).unwrap();
        let mut dirs = fs.list_dirs(Path::new("/repo")).unwrap();
        dirs.sort();
        assert_eq!(dirs, vec!["cli", "web"]);
    }

    #[test]
    fn injected_failure() {
        let fs = MemoryFilesystem::new();
        fs.create_dir_all(Path::new("/out")).unwrap();
        fs.fail_writes_to("/out/b.txt");
        assert!(fs.write_file(Path::new("/out/b.txt"), b"").is_err());
    }
}
