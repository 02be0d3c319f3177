//! Application ports (traits) for external dependencies.
//!
//! Driven ports are called by the services and implemented in
//! `sprout-adapters` (or, for the prompter, in `sprout-cli`):
//!
//! - `Filesystem`: writing the rendered project
//! - `CacheStore`: on-disk layout of cached checkouts
//! - `RepositoryCloner`: fetching a repository
//! - `TemplateScanner`: discovering placeholders and the question manifest
//! - `TemplateRenderer`: turning a template tree into a `ProjectStructure`
//! - `Prompter`: asking the user for missing answers

pub mod output;

pub use output::{
    CacheStore, CloneOptions, Filesystem, Prompter, RepositoryCloner, TemplateRenderer,
    TemplateScanner,
};

#[cfg(test)]
pub use output::{
    MockCacheStore, MockFilesystem, MockPrompter, MockRepositoryCloner, MockTemplateRenderer,
    MockTemplateScanner,
};
