//! Graphwise
//!
//! Natural-language access to a property graph, in two directions:
//!
//! - **Query path**: a question becomes a schema-grounded, read-only Cypher
//!   query. The schema is discovered from the live database, folded into a
//!   prompt with worked examples, synthesized by a model (or an offline
//!   intent table) and passed through a safety gate that refuses anything
//!   mutating.
//! - **Build path**: unstructured text becomes entity/relationship records,
//!   an inferred schema and a deduplicated, capped batch of idempotent
//!   `MERGE` statements ready for ingestion.
//!
//! Models and databases are collaborators behind the [`llm::TextGenerator`]
//! and [`graph::GraphExecutor`] traits, each with a deterministic offline
//! implementation.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use graphwise::{AssistantConfig, NLQPipeline};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = NLQPipeline::from_config(&AssistantConfig::default())?;
//! let query = pipeline.answer("Which people live in which country?").await;
//! assert!(query.as_str().starts_with("MATCH"));
//!
//! let refused = pipeline.answer("Delete all nodes").await;
//! assert!(refused.is_refusal());
//! # Ok(())
//! # }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod config;
pub mod graph;
pub mod llm;
pub mod nlq;
pub mod schema;

// Re-export main types for convenience
pub use config::{
    AssistantConfig, ConfigError, ConfigResult, DatabaseConfig, LLMProvider, LlmConfig, Mode,
};

pub use graph::{
    AttributeValue, GraphError, GraphExecutor, GraphResult, HttpGraphClient, OfflineGraph, Record,
};

pub use llm::{LlmClient, LlmError, LlmResult, TextGenerator};

pub use schema::{
    GraphStats, SchemaContext, SchemaDescription, SchemaDiscovery, WorkedExample,
};

pub use nlq::{
    CandidateQuery, NLQError, NLQPipeline, NLQResult, PromptComposer, QueryAnswer,
    QuerySynthesizer, SafetyGate, REFUSAL,
};

pub use builder::{
    BuildError, BuildOutput, BuildResult, EntityExtractor, ExtractedRecord, GraphBuilder,
    InferredSchema, IngestReport, StatementBatch, StatementGenerator,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
