//! Generate Service - main application orchestrator.
//!
//! One request runs strictly in sequence:
//! 1. Fetch the repository (cache or scratch clone)
//! 2. Extract variables from the template tree
//! 3. Resolve answers
//! 4. Render and write the output directory

use std::path::{Component, Path, PathBuf};

use tracing::{info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, TemplateRenderer, TemplateScanner},
        services::{answer_resolver::AnswerResolver, repository_cache::RepositoryCache},
    },
    domain::{AnswerMap, FsEntry, ProjectStructure, RepositoryRef, TemplateOrigin, TemplateSource},
    error::{SproutError, SproutResult},
};

/// Everything needed to generate one project.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub repository: RepositoryRef,
    /// Directory inside the repository used as the template root.
    pub sub_path: Option<PathBuf>,
    pub output: PathBuf,
    pub answers: AnswerMap,
    pub interactive: bool,
    /// Remove an existing output directory instead of failing.
    pub overwrite: bool,
    pub use_cache: bool,
}

impl GenerateRequest {
    pub fn new(repository: RepositoryRef, output: impl Into<PathBuf>) -> Self {
        Self {
            repository,
            sub_path: None,
            output: output.into(),
            answers: AnswerMap::new(),
            interactive: false,
            overwrite: false,
            use_cache: true,
        }
    }
}

/// What a successful generation did.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateReport {
    pub output: PathBuf,
    pub origin: TemplateOrigin,
    pub cache_used: bool,
    pub answers: AnswerMap,
    pub files_written: usize,
    pub directories_created: usize,
}

/// Main generation service.
pub struct GenerateService {
    cache: RepositoryCache,
    scanner: Box<dyn TemplateScanner>,
    resolver: AnswerResolver,
    renderer: Box<dyn TemplateRenderer>,
    filesystem: Box<dyn Filesystem>,
}

impl GenerateService {
    pub fn new(
        cache: RepositoryCache,
        scanner: Box<dyn TemplateScanner>,
        resolver: AnswerResolver,
        renderer: Box<dyn TemplateRenderer>,
        filesystem: Box<dyn Filesystem>,
    ) -> Self {
        Self {
            cache,
            scanner,
            resolver,
            renderer,
            filesystem,
        }
    }

    pub fn cache(&self) -> &RepositoryCache {
        &self.cache
    }

    /// Fetch the repository, through the cache unless `use_cache` is off.
    pub fn prepare(&self, repository: &RepositoryRef, use_cache: bool) -> SproutResult<TemplateSource> {
        if use_cache {
            self.cache.fetch(repository)
        } else {
            self.cache.fetch_uncached(repository)
        }
    }

    /// Give back a source obtained from [`prepare`](Self::prepare).
    pub fn release(&self, source: &TemplateSource) {
        self.cache.release(source);
    }

    /// Candidate template names under `path`: immediate, non-hidden
    /// subdirectories, sorted.
    pub fn list_templates(
        &self,
        source: &TemplateSource,
        path: Option<&Path>,
        repository: &RepositoryRef,
    ) -> SproutResult<Vec<String>> {
        let root = self.template_root(source, path, repository)?;
        let mut names: Vec<String> = self
            .filesystem
            .list_dirs(&root)?
            .into_iter()
            .filter(|n| !n.starts_with('.'))
            .collect();
        names.sort();

        if names.is_empty() {
            return Err(ApplicationError::NoTemplates { path: root }.into());
        }
        Ok(names)
    }

    /// Fetch, generate, and release the source.
    #[instrument(
        skip_all,
        fields(
            repository = %request.repository,
            output = %request.output.display()
        )
    )]
    pub fn generate(&self, request: &GenerateRequest) -> SproutResult<GenerateReport> {
        // Nothing is cloned for a request that cannot be written.
        self.check_output(request)?;

        let source = self.prepare(&request.repository, request.use_cache)?;
        let result = self.generate_from(&source, request);
        self.release(&source);
        result
    }

    /// Generate from an already fetched source.
    #[instrument(
        skip_all,
        fields(
            source = %source.directory.display(),
            output = %request.output.display()
        )
    )]
    pub fn generate_from(
        &self,
        source: &TemplateSource,
        request: &GenerateRequest,
    ) -> SproutResult<GenerateReport> {
        self.check_output(request)?;

        let template_root =
            self.template_root(source, request.sub_path.as_deref(), &request.repository)?;

        info!("Extracting template variables");
        let extracted = self.scanner.extract(&template_root)?;
        info!(
            file_replacers = extracted.file_replacers.len(),
            content_replacers = extracted.content_replacers.len(),
            manifest_questions = extracted.manifest.as_ref().map_or(0, |m| m.len()),
            "Variables extracted"
        );

        let answers = self
            .resolver
            .resolve(&extracted, &request.answers, request.interactive)?;

        let structure =
            self.renderer
                .render(&template_root, &extracted, &answers, &request.output)?;
        structure.validate()?;

        if request.overwrite && self.filesystem.exists(&request.output) {
            info!("Removing existing output directory");
            self.filesystem.remove_dir_all(&request.output)?;
        }

        self.write_structure(&structure)?;

        info!("Project generated");
        Ok(GenerateReport {
            output: request.output.clone(),
            origin: source.origin,
            cache_used: source.cache_used(),
            answers,
            files_written: structure.files().count(),
            directories_created: structure.directories().count(),
        })
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn check_output(&self, request: &GenerateRequest) -> SproutResult<()> {
        if !request.overwrite && self.filesystem.exists(&request.output) {
            return Err(ApplicationError::OutputExists {
                path: request.output.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// `source` joined with `path`, which must stay inside the checkout and
    /// name an existing directory.
    fn template_root(
        &self,
        source: &TemplateSource,
        path: Option<&Path>,
        repository: &RepositoryRef,
    ) -> SproutResult<PathBuf> {
        let not_found = |p: &Path| -> SproutError {
            ApplicationError::TemplatePathNotFound {
                path: p.display().to_string(),
                repository: repository.url.clone(),
            }
            .into()
        };

        let Some(path) = path else {
            return Ok(source.directory.clone());
        };

        let mut root = source.directory.clone();
        for component in path.components() {
            match component {
                Component::CurDir => {}
                Component::Normal(segment) => root.push(segment),
                _ => return Err(not_found(path)),
            }
        }

        if !self.filesystem.is_dir(&root) {
            return Err(not_found(path));
        }
        Ok(root)
    }

    /// Write project structure to filesystem with rollback on failure.
    fn write_structure(&self, structure: &ProjectStructure) -> SproutResult<()> {
        if self.filesystem.exists(structure.root()) {
            return Err(ApplicationError::OutputExists {
                path: structure.root().to_path_buf(),
            }
            .into());
        }

        match self.write_all(structure) {
            Ok(()) => {
                info!(entries = structure.entry_count(), "Wrote all files");
                Ok(())
            }
            Err(e) => {
                warn!("Write failed, attempting rollback");
                self.rollback(structure.root());
                Err(e)
            }
        }
    }

    fn write_all(&self, structure: &ProjectStructure) -> SproutResult<()> {
        let root = structure.root();
        self.filesystem.create_dir_all(root)?;

        for entry in structure.entries() {
            match entry {
                FsEntry::Directory(dir) => {
                    self.filesystem.create_dir_all(&root.join(&dir.path))?;
                }
                FsEntry::File(file) => {
                    let path = root.join(&file.path);
                    if let Some(parent) = path.parent() {
                        self.filesystem.create_dir_all(parent)?;
                    }
                    self.filesystem.write_file(&path, file.content.as_bytes())?;
                    if file.permissions.executable_flag() {
                        self.filesystem.set_permissions(&path, file.permissions)?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Best-effort rollback on failure.
    fn rollback(&self, root: &Path) {
        if let Err(e) = self.filesystem.remove_dir_all(root) {
            warn!(
                error = %e,
                path = %root.display(),
                "Rollback failed"
            );
        } else {
            info!("Rollback successful");
        }
    }
}
