//! Placeholder substitution over a template tree.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use sprout_core::{
    application::{ApplicationError, ports::TemplateRenderer},
    domain::{
        AnswerMap, ExtractedVariables, FileContent, Permissions, ProjectStructure, ReplacerSet,
        is_root_manifest,
    },
    error::SproutResult,
};

use crate::extractor::relative_path_string;

/// Renders a template tree into a [`ProjectStructure`].
///
/// Paths go through the file replacers one segment at a time; UTF-8 bodies
/// go through the content replacers. Anything else is copied byte for byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderRenderer;

impl PlaceholderRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render a `/`-separated relative path. Segments that render to nothing
    /// are dropped.
    pub fn render_path(relative: &str, replacers: &ReplacerSet, answers: &AnswerMap) -> PathBuf {
        relative
            .split('/')
            .map(|segment| substitute(segment, replacers, answers))
            .filter(|segment| !segment.is_empty())
            .collect()
    }

    pub fn render_text(text: &str, replacers: &ReplacerSet, answers: &AnswerMap) -> String {
        substitute(text, replacers, answers)
    }
}

impl TemplateRenderer for PlaceholderRenderer {
    #[instrument(skip(self, extracted, answers), fields(root = %template_root.display()))]
    fn render(
        &self,
        template_root: &Path,
        extracted: &ExtractedVariables,
        answers: &AnswerMap,
        output_root: &Path,
    ) -> SproutResult<ProjectStructure> {
        let mut structure = ProjectStructure::new(output_root);
        let mut directories = HashSet::new();

        for entry in WalkDir::new(template_root)
            .min_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| ApplicationError::RenderingFailed {
                reason: format!("directory walk error: {e}"),
            })?;

            let Ok(relative) = entry.path().strip_prefix(template_root) else {
                continue;
            };
            let relative = relative_path_string(relative);
            let target = Self::render_path(&relative, &extracted.file_replacers, answers);

            if target.as_os_str().is_empty() {
                warn!(path = %relative, "Path renders to nothing, skipping");
                continue;
            }

            let file_type = entry.file_type();
            if file_type.is_dir() {
                if directories.insert(target.clone()) {
                    structure.add_directory(target, Permissions::read_write());
                }
                continue;
            }
            if !file_type.is_file() || is_root_manifest(&relative) {
                continue;
            }

            let bytes = fs::read(entry.path()).map_err(|e| ApplicationError::RenderingFailed {
                reason: format!("failed to read {}: {e}", entry.path().display()),
            })?;
            let content = match String::from_utf8(bytes) {
                Ok(text) => FileContent::Text(Self::render_text(
                    &text,
                    &extracted.content_replacers,
                    answers,
                )),
                Err(e) => {
                    debug!(path = %relative, "Copying non-UTF-8 file verbatim");
                    FileContent::Binary(e.into_bytes())
                }
            };

            structure.add_file(target, content, Permissions::for_source(is_executable(entry.path())));
        }

        debug!(entries = structure.entry_count(), "Render complete");
        Ok(structure)
    }
}

fn substitute(text: &str, replacers: &ReplacerSet, answers: &AnswerMap) -> String {
    replacers.iter().fold(text.to_owned(), |acc, replacer| {
        replacer.apply(&acc, &answers.rendered(replacer.variable()))
    })
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::FilesystemExtractor;
    use sprout_core::application::ports::TemplateScanner;
    use sprout_core::domain::{DomainError, FsEntry};
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn render(root: &Path, answers: &AnswerMap) -> ProjectStructure {
        let extracted = FilesystemExtractor::new().extract(root).unwrap();
        PlaceholderRenderer::new()
            .render(root, &extracted, answers, Path::new("/out"))
            .unwrap()
    }

    fn file<'a>(structure: &'a ProjectStructure, path: &str) -> &'a FileContent {
        &structure
            .files()
            .find(|f| f.path == Path::new(path))
            .unwrap_or_else(|| panic!("no file {path}"))
            .content
    }

    #[test]
    fn substitutes_paths_and_contents() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "____name____.txt", b"____name____ loves ____name____");

        let answers = AnswerMap::new().with("name", "Alice");
        let structure = render(temp.path(), &answers);

        assert_eq!(file(&structure, "Alice.txt").as_text(), Some("Alice loves Alice"));
        assert_eq!(structure.root(), Path::new("/out"));
    }

    #[test]
    fn directories_precede_their_files() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "src/____module____/mod.rs", b"");

        let answers = AnswerMap::new().with("module", "parser");
        let structure = render(temp.path(), &answers);

        let paths: Vec<_> = structure.entries().iter().map(FsEntry::path).collect();
        assert_eq!(
            paths,
            vec![
                Path::new("src"),
                Path::new("src/parser"),
                Path::new("src/parser/mod.rs")
            ]
        );
    }

    #[test]
    fn root_manifest_is_not_rendered() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), ".questions.json", br#"{"questions": []}"#);
        write(temp.path(), "README.md", b"hi");

        let structure = render(temp.path(), &AnswerMap::new());
        assert_eq!(structure.files().count(), 1);
    }

    #[test]
    fn missing_answer_renders_empty() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.txt", b"[____x____]");
        let structure = render(temp.path(), &AnswerMap::new());
        assert_eq!(file(&structure, "a.txt").as_text(), Some("[]"));
    }

    #[test]
    fn non_string_answers_render_as_json() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.txt", b"____n____ ____b____");
        let answers = AnswerMap::new().with("n", 3).with("b", true);
        let structure = render(temp.path(), &answers);
        assert_eq!(file(&structure, "a.txt").as_text(), Some("3 true"));
    }

    #[test]
    fn binary_content_is_copied_verbatim() {
        let temp = TempDir::new().unwrap();
        let bytes = b"\xff\x00____name____\xfe".to_vec();
        write(temp.path(), "logo.bin", &bytes);

        let answers = AnswerMap::new().with("name", "Alice");
        let structure = render(temp.path(), &answers);
        assert_eq!(file(&structure, "logo.bin"), &FileContent::Binary(bytes));
    }

    #[test]
    fn collapsing_paths_fail_validation() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "____a____.txt", b"");
        write(temp.path(), "____b____.txt", b"");

        let answers = AnswerMap::new().with("a", "same").with("b", "same");
        let structure = render(temp.path(), &answers);
        assert!(structure.validate().is_err());
    }

    #[test]
    fn answers_cannot_climb_out_of_the_output() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "____name____.txt", b"");

        let answers = AnswerMap::new().with("name", "../../escaped");
        let structure = render(temp.path(), &answers);
        assert!(matches!(
            structure.validate(),
            Err(DomainError::PathEscapesOutput { .. })
        ));
    }

    #[test]
    fn render_path_drops_empty_segments() {
        let mut replacers = ReplacerSet::new();
        replacers.register("dir").unwrap();
        let path = PlaceholderRenderer::render_path("____dir____/file.txt", &replacers, &AnswerMap::new());
        assert_eq!(path, PathBuf::from("file.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn executable_bit_is_preserved() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        write(temp.path(), "run.sh", b"#!/bin/sh\n");
        write(temp.path(), "plain.txt", b"");
        fs::set_permissions(temp.path().join("run.sh"), fs::Permissions::from_mode(0o755)).unwrap();

        let structure = render(temp.path(), &AnswerMap::new());
        let perms = |p: &str| {
            structure
                .files()
                .find(|f| f.path == Path::new(p))
                .unwrap()
                .permissions
        };
        assert!(perms("run.sh").executable_flag());
        assert!(!perms("plain.txt").executable_flag());
    }
}
