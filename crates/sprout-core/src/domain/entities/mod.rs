pub mod cache_entry;
pub mod common;
pub mod extracted;
pub mod project_structure;
pub mod question;

pub use crate::domain::DomainError;
pub use cache_entry::{CacheEntry, CacheState, TemplateOrigin, TemplateSource};
pub use extracted::ExtractedVariables;
pub use project_structure::ProjectStructure;
pub use question::{Question, QuestionKind, QuestionManifest};
