//! Application layer for Sprout.
//!
//! - **Services**: `RepositoryCache`, `AnswerResolver`, `GenerateService`
//! - **Ports**: traits for the outside world (filesystem, cache store,
//!   cloner, scanner, renderer, prompter)
//! - **Errors**: orchestration failures
//!
//! Template rules live in `crate::domain`; this layer only sequences them.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{
    AnswerResolver, GenerateReport, GenerateRequest, GenerateService, RepositoryCache,
};

pub use ports::{
    CacheStore, CloneOptions, Filesystem, Prompter, RepositoryCloner, TemplateRenderer,
    TemplateScanner,
};

pub use error::ApplicationError;
