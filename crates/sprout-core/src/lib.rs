//! Sprout Core - template materialization engine.
//!
//! Domain and application layers for the Sprout project generator,
//! following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            sprout-cli (CLI)             │
//! │   (argument parsing, prompts, output)   │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │          Application Services           │
//! │  (RepositoryCache, AnswerResolver,      │
//! │   GenerateService)                      │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Application Ports (Traits)       │
//! │ (CacheStore, RepositoryCloner, Scanner, │
//! │  Renderer, Filesystem, Prompter)        │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     sprout-adapters (Infrastructure)    │
//! │ (DiskCacheStore, GitCloner, Extractor,  │
//! │  PlaceholderRenderer, LocalFilesystem)  │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Domain Layer (Pure Logic)        │
//! │ (placeholders, identifier matching,     │
//! │  answers, cache keys, ProjectStructure) │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sprout_core::prelude::*;
//!
//! let cache = RepositoryCache::new(store, cloner).with_ttl(Some(week));
//! let resolver = AnswerResolver::new(DefaultResolverRegistry::with_builtin());
//! let service = GenerateService::new(cache, scanner, resolver, renderer, filesystem);
//!
//! let mut request = GenerateRequest::new(RepositoryRef::new("acme/starter", None), "./out");
//! request.answers = AnswerMap::new().with("name", "Alice");
//! let report = service.generate(&request)?;
//! ```

pub mod domain;

pub mod application;

pub mod error;

/// Public API - what external crates should use.
pub mod prelude {
    pub use crate::application::{
        AnswerResolver, GenerateReport, GenerateRequest, GenerateService, RepositoryCache,
        ports::{
            CacheStore, CloneOptions, Filesystem, Prompter, RepositoryCloner, TemplateRenderer,
            TemplateScanner,
        },
    };
    pub use crate::domain::{
        AnswerMap, CacheEntry, CacheKey, CacheState, DefaultResolverRegistry,
        ExtractedVariables, ProjectStructure, Question, QuestionKind, RepositoryRef,
        TemplateOrigin, TemplateSource,
    };
    pub use crate::error::{SproutError, SproutResult};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
