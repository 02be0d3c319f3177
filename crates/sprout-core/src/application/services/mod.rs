//! Application services - orchestrate use cases.

pub mod answer_resolver;
pub mod generate_service;
pub mod repository_cache;

pub use answer_resolver::AnswerResolver;
pub use generate_service::{GenerateReport, GenerateRequest, GenerateService};
pub use repository_cache::RepositoryCache;
