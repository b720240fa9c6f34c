//! Assistant configuration
//!
//! Every toggle the pipelines need (live vs. offline model, live vs. offline
//! database, limits) is an explicit value on [`AssistantConfig`] and is
//! injected into components at construction time.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid YAML for this schema
    #[error("Parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// LLM Provider options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum LLMProvider {
    #[default]
    OpenAI,
    Ollama,
    Gemini,
}

/// Whether a collaborator is the real network-backed one or the
/// deterministic offline substitute.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Offline,
    Live,
}

impl Mode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "live" | "real" => Some(Mode::Live),
            "offline" | "mock" => Some(Mode::Offline),
            _ => None,
        }
    }
}

/// Text-generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// The LLM provider to use
    pub provider: LLMProvider,
    /// Model name (e.g., "gpt-4o", "llama3")
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// API Key (optional for Ollama)
    pub api_key: Option<String>,
    /// API Base URL (defaults per provider)
    pub api_base_url: Option<String>,
    /// System prompt for the LLM
    pub system_prompt: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LLMProvider::OpenAI,
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.3,
            api_key: None,
            api_base_url: None,
            system_prompt: None,
            timeout_secs: 60,
            max_tokens: 1000,
        }
    }
}

/// Neo4j connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// HTTP base URL of the server
    pub uri: String,
    /// Database name
    pub database: String,
    pub user: String,
    pub password: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: "http://localhost:7474".to_string(),
            database: "neo4j".to_string(),
            user: "neo4j".to_string(),
            password: None,
            timeout_secs: 30,
        }
    }
}

/// Top-level configuration for both pipelines
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Live model or offline synthesis
    pub generation: Mode,
    /// Live database or offline in-memory graph
    pub database: Mode,
    pub llm: LlmConfig,
    pub neo4j: DatabaseConfig,
    /// Maximum number of worked examples in a prompt
    pub max_examples: usize,
    /// Maximum number of statements in a generated batch
    pub max_statements: usize,
    /// Estimated token budget for a single statement-generation call
    pub batch_token_threshold: usize,
    /// Entities per generation call once the token budget is exceeded
    pub entity_batch_size: usize,
    /// Precomputed schema description that overrides live discovery
    pub schema_file: Option<PathBuf>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            generation: Mode::Offline,
            database: Mode::Offline,
            llm: LlmConfig::default(),
            neo4j: DatabaseConfig::default(),
            max_examples: 10,
            max_statements: 150,
            batch_token_threshold: 3000,
            entity_batch_size: 25,
            schema_file: None,
        }
    }
}

impl AssistantConfig {
    /// Load a YAML config file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }

    /// Parse YAML; missing keys take their defaults
    pub fn from_yaml_str(raw: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    ///
    /// Pass `|k| std::env::var(k).ok()` at the process edge; tests pass a map.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("GRAPHWISE_GENERATION") {
            self.generation = Mode::parse(&v)
                .ok_or_else(|| ConfigError::Invalid(format!("GRAPHWISE_GENERATION: {}", v)))?;
        }
        if let Some(v) = lookup("GRAPHWISE_DATABASE") {
            self.database = Mode::parse(&v)
                .ok_or_else(|| ConfigError::Invalid(format!("GRAPHWISE_DATABASE: {}", v)))?;
        }
        if let Some(v) = lookup("OPENAI_API_KEY") {
            self.llm.api_key = Some(v);
        }
        if let Some(v) = lookup("GRAPHWISE_MODEL") {
            self.llm.model = v;
        }
        if let Some(v) = lookup("GRAPHWISE_TEMPERATURE") {
            self.llm.temperature = v
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("GRAPHWISE_TEMPERATURE: {}", v)))?;
        }
        if let Some(v) = lookup("NEO4J_URI") {
            self.neo4j.uri = v;
        }
        if let Some(v) = lookup("NEO4J_USER") {
            self.neo4j.user = v;
        }
        if let Some(v) = lookup("NEO4J_PASSWORD") {
            self.neo4j.password = Some(v);
        }
        if let Some(v) = lookup("GRAPHWISE_SCHEMA_FILE") {
            self.schema_file = Some(PathBuf::from(v));
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::Invalid(format!(
                "temperature must be within [0, 2], got {}",
                self.llm.temperature
            )));
        }
        if self.max_statements == 0 {
            return Err(ConfigError::Invalid("max_statements must be positive".to_string()));
        }
        if self.entity_batch_size == 0 {
            return Err(ConfigError::Invalid("entity_batch_size must be positive".to_string()));
        }
        if self.batch_token_threshold == 0 {
            return Err(ConfigError::Invalid("batch_token_threshold must be positive".to_string()));
        }
        Ok(())
    }
}
