//! Text-generation collaborator
//!
//! Both the query synthesizer and the entity extractor talk to a language
//! model only through [`TextGenerator`], so the live HTTP client and test
//! doubles are interchangeable.

pub mod client;

use crate::config::{AssistantConfig, Mode};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub use client::LlmClient;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM API error: {0}")]
    ApiError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type LlmResult<T> = Result<T, LlmError>;

/// A model that turns a prompt into free-form text.
///
/// Failures are returned, never panicked; callers decide how to degrade.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Complete `prompt` and return the raw model output
    async fn complete(&self, prompt: &str) -> LlmResult<String>;

    /// Model identifier used for completions
    fn model(&self) -> &str;
}

/// Build the text generator selected by `config.generation`.
///
/// Offline mode has no generator: components use their deterministic paths.
pub fn from_config(config: &AssistantConfig) -> LlmResult<Option<Arc<dyn TextGenerator>>> {
    match config.generation {
        Mode::Offline => Ok(None),
        Mode::Live => {
            let client = LlmClient::new(&config.llm)?;
            Ok(Some(Arc::new(client)))
        }
    }
}
