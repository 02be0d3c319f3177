//! Core domain layer for Sprout.
//!
//! Pure template logic: placeholder tokens, identifier matching, answer
//! reconciliation, cache keys and freshness. No filesystem, network or
//! terminal access; those sit behind the ports in the application layer.

pub mod answers;
pub mod defaults;
pub mod entities;
pub mod error;
pub mod identifier;
pub mod placeholder;
pub mod value_objects;

pub use answers::{AnswerMap, render_value};
pub use defaults::{DefaultResolver, DefaultResolverRegistry};
pub use entities::{
    cache_entry::{CacheEntry, CacheState, TemplateOrigin, TemplateSource},
    common::Permissions,
    extracted::{
        ExtractedVariables, MANIFEST_FILES, SCRIPT_MANIFEST_FILE, is_root_manifest,
    },
    project_structure::{DirectoryToCreate, FileContent, FileToWrite, FsEntry, ProjectStructure},
    question::{Question, QuestionKind, QuestionManifest, normalize_question_name},
};
pub use error::{DomainError, ErrorCategory};
pub use identifier::{identifiers_match, names_match, normalize_identifier};
pub use placeholder::{PLACEHOLDER_BOUNDARY, Replacer, ReplacerSet};
pub use value_objects::{CacheKey, RepositoryRef, normalize_repository_url};
