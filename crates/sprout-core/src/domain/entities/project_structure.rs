use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use crate::domain::{entities::common::Permissions, error::DomainError};

/// Rendered project, ready to be written.
///
/// Output of the template renderer. Entries are relative to `root` and kept
/// in the order they must be created: a directory always precedes the files
/// inside it.
#[derive(Debug, Clone)]
pub struct ProjectStructure {
    pub(crate) root: PathBuf,
    pub(crate) entries: Vec<FsEntry>,
}

impl ProjectStructure {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: Vec::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn add_file(
        &mut self,
        path: impl Into<PathBuf>,
        content: FileContent,
        perms: Permissions,
    ) {
        self.entries.push(FsEntry::File(FileToWrite {
            path: path.into(),
            content,
            permissions: perms,
        }));
    }

    pub fn add_directory(&mut self, path: impl Into<PathBuf>, perms: Permissions) {
        self.entries.push(FsEntry::Directory(DirectoryToCreate {
            path: path.into(),
            permissions: perms,
        }));
    }

    pub fn with_file(
        mut self,
        path: impl Into<PathBuf>,
        content: FileContent,
        perms: Permissions,
    ) -> Self {
        self.add_file(path, content, perms);
        self
    }

    pub fn with_directory(mut self, path: impl Into<PathBuf>, perms: Permissions) -> Self {
        self.add_directory(path, perms);
        self
    }

    /// Paths must be relative, stay below the root and be unique.
    ///
    /// Two template paths can collapse onto one output path when placeholders
    /// render to the same text (or to nothing); that is reported here rather
    /// than silently overwriting.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut seen = HashSet::new();
        for entry in &self.entries {
            let path = entry.path();

            if path.is_absolute() {
                return Err(DomainError::AbsolutePathNotAllowed {
                    path: path.display().to_string(),
                });
            }

            if path.components().any(|c| matches!(c, Component::ParentDir)) {
                return Err(DomainError::PathEscapesOutput {
                    path: path.display().to_string(),
                });
            }

            let path_str = path.display().to_string();
            if !seen.insert(path_str.clone()) {
                return Err(DomainError::DuplicatePath { path: path_str });
            }
        }

        Ok(())
    }

    pub fn entries(&self) -> &[FsEntry] {
        &self.entries
    }

    pub fn files(&self) -> impl Iterator<Item = &FileToWrite> {
        self.entries.iter().filter_map(|e| match e {
            FsEntry::File(f) => Some(f),
            _ => None,
        })
    }

    pub fn directories(&self) -> impl Iterator<Item = &DirectoryToCreate> {
        self.entries.iter().filter_map(|e| match e {
            FsEntry::Directory(d) => Some(d),
            _ => None,
        })
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug, Clone)]
pub enum FsEntry {
    File(FileToWrite),
    Directory(DirectoryToCreate),
}

impl FsEntry {
    pub fn path(&self) -> &Path {
        match self {
            Self::File(f) => &f.path,
            Self::Directory(d) => &d.path,
        }
    }
}

/// File body. Text bodies have been rendered; binary bodies are copied as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Text(String),
    Binary(Vec<u8>),
}

impl FileContent {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(s) => s.as_bytes(),
            Self::Binary(b) => b,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Binary(_) => None,
        }
    }
}

impl From<&str> for FileContent {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for FileContent {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

#[derive(Debug, Clone)]
pub struct FileToWrite {
    pub path: PathBuf,
    pub content: FileContent,
    pub permissions: Permissions,
}

impl FileToWrite {
    pub fn is_empty(&self) -> bool {
        self.content.as_bytes().is_empty()
    }

    pub fn size(&self) -> usize {
        self.content.as_bytes().len()
    }
}

#[derive(Debug, Clone)]
pub struct DirectoryToCreate {
    pub path: PathBuf,
    pub permissions: Permissions,
}
