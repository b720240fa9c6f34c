//! Graph building from unstructured text
//!
//! Extraction, schema inference and statement generation, plus hand-off of
//! the finished statements to an ingestion executor.

pub mod extract;
pub mod infer;
pub mod statements;

use crate::config::{AssistantConfig, ConfigError};
use crate::graph::{self, GraphError, GraphExecutor};
use crate::llm::{self, LlmError};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

pub use extract::{EntityExtractor, ExtractedRecord};
pub use infer::{infer_schema, EdgeSignature, InferredSchema, PLACEHOLDER_TYPE};
pub use statements::{sanitize_property_name, StatementBatch, StatementGenerator};

/// Default chunk size in characters
pub const DEFAULT_CHUNK_SIZE: usize = 2000;

/// Errors building a builder. Generation itself never fails.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type BuildResult<T> = Result<T, BuildError>;

/// Pack whitespace-separated words into chunks of at most `chunk_size`
/// characters. A single longer word becomes its own chunk.
pub fn chunk_text(text: &str, chunk_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut length = 0;

    for word in text.split_whitespace() {
        let word_length = word.chars().count() + 1;
        if length + word_length > chunk_size && !current.is_empty() {
            chunks.push(current.join(" "));
            current.clear();
            length = 0;
        }
        current.push(word);
        length += word_length;
    }
    if !current.is_empty() {
        chunks.push(current.join(" "));
    }
    chunks
}

/// Everything a build produced, for callers that want to inspect it
#[derive(Debug, Clone, Serialize)]
pub struct BuildOutput {
    pub records: Vec<ExtractedRecord>,
    pub schema: InferredSchema,
    pub batch: StatementBatch,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestFailure {
    pub statement: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub executed: usize,
    pub failed: Vec<IngestFailure>,
}

impl IngestReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct GraphBuilder {
    extractor: EntityExtractor,
    generator: StatementGenerator,
    executor: Arc<dyn GraphExecutor>,
}

impl GraphBuilder {
    pub fn new(
        extractor: EntityExtractor,
        generator: StatementGenerator,
        executor: Arc<dyn GraphExecutor>,
    ) -> Self {
        Self {
            extractor,
            generator,
            executor,
        }
    }

    pub fn from_config(config: &AssistantConfig) -> BuildResult<Self> {
        config.validate()?;
        let text_generator = llm::from_config(config)?;
        Ok(Self::new(
            EntityExtractor::new(text_generator.clone()),
            StatementGenerator::from_config(config, text_generator),
            graph::connect(config)?,
        ))
    }

    /// Extract, infer and generate for all chunks
    pub async fn build<S: AsRef<str>>(&self, chunks: &[S]) -> BuildOutput {
        let records = self.extractor.extract_all(chunks).await;
        let schema = infer_schema(&records);
        info!(
            "Inferred {} node types and {} edge types",
            schema.nodes.len(),
            schema.edges.len()
        );
        let batch = self.generator.generate(&schema, &records).await;
        BuildOutput {
            records,
            schema,
            batch,
        }
    }

    pub async fn build_statements<S: AsRef<str>>(&self, chunks: &[S]) -> StatementBatch {
        self.build(chunks).await.batch
    }

    /// Execute statements one by one; failures are collected, not fatal
    pub async fn ingest(&self, batch: &StatementBatch) -> IngestReport {
        let mut report = IngestReport::default();
        for statement in &batch.statements {
            match self.executor.try_execute(statement).await {
                Ok(_) => report.executed += 1,
                Err(e) => {
                    warn!("Ingestion failed for statement {}: {}", statement, e);
                    report.failed.push(IngestFailure {
                        statement: statement.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        info!(
            "Ingested {} statements ({} failed)",
            report.executed,
            report.failed.len()
        );
        report
    }
}
