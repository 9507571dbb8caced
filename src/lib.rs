pub mod api;
pub mod config;
pub mod errors;
pub mod fallback;
pub mod llm_providers;
pub mod llm_service;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod response_parser;
pub mod schema;
pub mod tasks;

pub use config::{Config, CredentialStatus};
pub use errors::*;
pub use llm_providers::{CompletionClient, CompletionOutcome, CompletionRequest, ModelCatalog, ModelInfo, OpenRouterProvider};
pub use llm_service::LLMService;
pub use models::*;
pub use pipeline::{run_pipeline, GenerationTask};
pub use response_parser::JsonResponseParser;
