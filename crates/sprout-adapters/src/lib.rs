//! Infrastructure adapters for Sprout.
//!
//! This crate implements the ports defined in `sprout-core::application::ports`.
//! It contains all external process calls and I/O operations.

pub mod cache;
pub mod extractor;
pub mod filesystem;
pub mod git;
pub mod renderer;

// Re-export commonly used adapters
pub use cache::DiskCacheStore;
pub use extractor::FilesystemExtractor;
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use git::{GitCloner, register_git_resolvers};
pub use renderer::PlaceholderRenderer;
