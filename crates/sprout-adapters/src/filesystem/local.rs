//! Local filesystem adapter using std::fs.

use std::path::Path;

use sprout_core::{application::ports::Filesystem, domain::Permissions, error::SproutResult};

use super::map_io_error;

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> SproutResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> SproutResult<()> {
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn set_permissions(&self, path: &Path, permissions: Permissions) -> SproutResult<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if permissions.executable_flag() {
                let metadata =
                    std::fs::metadata(path).map_err(|e| map_io_error(path, e, "get metadata"))?;
                let mut perms = metadata.permissions();
                perms.set_mode(perms.mode() | 0o111);
                std::fs::set_permissions(path, perms)
                    .map_err(|e| map_io_error(path, e, "set permissions"))?;
            }
        }
        #[cfg(not(unix))]
        {
            let _ = (path, permissions);
        }
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn remove_dir_all(&self, path: &Path) -> SproutResult<()> {
        std::fs::remove_dir_all(path).map_err(|e| map_io_error(path, e, "remove directory"))
    }

    fn list_dirs(&self, path: &Path) -> SproutResult<Vec<String>> {
        let read_dir =
            std::fs::read_dir(path).map_err(|e| map_io_error(path, e, "read directory"))?;

        let mut names = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| map_io_error(path, e, "read directory entry"))?;
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if is_dir {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_bytes_and_lists_directories() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();

        fs.create_dir_all(&temp.path().join("a/b")).unwrap();
        fs.create_dir_all(&temp.path().join("c")).unwrap();
        fs.write_file(&temp.path().join("file.bin"), &[0, 159, 146, 150])
            .unwrap();

        let mut dirs = fs.list_dirs(temp.path()).unwrap();
        dirs.sort();
        assert_eq!(dirs, vec!["a", "c"]);
        assert_eq!(
            std::fs::read(temp.path().join("file.bin")).unwrap(),
            vec![0, 159, 146, 150]
        );
    }

    #[cfg(unix)]
    #[test]
    fn sets_executable_bit() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("run.sh");
        let fs = LocalFilesystem::new();
        fs.write_file(&path, b"#!/bin/sh\n").unwrap();
        fs.set_permissions(&path, Permissions::full()).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[test]
    fn missing_directory_is_a_filesystem_error() {
        let fs = LocalFilesystem::new();
        assert!(fs.list_dirs(Path::new("/definitely/not/here")).is_err());
    }
}
