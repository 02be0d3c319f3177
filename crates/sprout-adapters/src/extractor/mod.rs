//! Template variable extraction from a directory tree.

mod manifest;

pub use manifest::load_manifest;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use sprout_core::{
    application::{ApplicationError, ports::TemplateScanner},
    domain::{ExtractedVariables, ReplacerSet, is_root_manifest},
    error::SproutResult,
};

/// Walks a template tree in file-name order and scans every file's relative
/// path and contents for placeholder tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilesystemExtractor;

impl FilesystemExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateScanner for FilesystemExtractor {
    #[instrument(skip(self), fields(root = %template_root.display()))]
    fn extract(&self, template_root: &Path) -> SproutResult<ExtractedVariables> {
        let manifest = load_manifest(template_root);

        let mut file_replacers = ReplacerSet::new();
        let mut content_replacers = ReplacerSet::new();

        for entry in WalkDir::new(template_root)
            .min_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| ApplicationError::FilesystemError {
                path: e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| template_root.to_path_buf()),
                reason: format!("directory walk error: {e}"),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(template_root) else {
                continue;
            };
            let relative = relative_path_string(relative);
            if is_root_manifest(&relative) {
                continue;
            }

            file_replacers.register_all(&relative)?;
            scan_contents(entry.path(), &mut content_replacers)?;
        }

        debug!(
            file_replacers = file_replacers.len(),
            content_replacers = content_replacers.len(),
            "Scan complete"
        );

        Ok(ExtractedVariables {
            file_replacers,
            content_replacers,
            manifest,
        })
    }
}

/// `/`-separated form of a template-relative path.
pub fn relative_path_string(relative: &Path) -> String {
    relative.to_string_lossy().replace('\\', "/")
}

/// Scan a file line by line. Tokens never span lines. Unreadable files
/// contribute whatever was read before the error.
fn scan_contents(path: &Path, replacers: &mut ReplacerSet) -> SproutResult<()> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Skipping unreadable file");
            return Ok(());
        }
    };

    let mut reader = BufReader::new(file);
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => break,
            Ok(_) => replacers.register_all(&String::from_utf8_lossy(&line))?,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Stopped reading file");
                break;
            }
        }
    }
    Ok(())
}
