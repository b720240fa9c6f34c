//! Natural Language Querying (NLQ)
//!
//! Turns a question into a schema-grounded, read-only Cypher query:
//! discovery, prompt composition, synthesis, then the safety gate. The gate
//! runs on every path, model-backed or offline.

pub mod intents;
pub mod prompt;
pub mod safety;
pub mod synth;

use crate::config::{AssistantConfig, ConfigError};
use crate::graph::{self, is_error_record, GraphError, GraphExecutor, Record};
use crate::llm::{self, LlmError};
use crate::schema::examples::examples_for;
use crate::schema::SchemaDiscovery;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

pub use intents::{Intent, IntentRule, IntentTable};
pub use prompt::{PromptComposer, PromptDocument};
pub use safety::{CandidateQuery, SafetyGate, REFUSAL};
pub use synth::{extract_query, QuerySynthesizer};

/// Errors building a pipeline. Answering a question never fails.
#[derive(Error, Debug)]
pub enum NLQError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type NLQResult<T> = Result<T, NLQError>;

/// A question, the query it became and whatever the database returned
#[derive(Debug, Clone)]
pub struct QueryAnswer {
    pub question: String,
    pub query: CandidateQuery,
    pub records: Vec<Record>,
}

impl QueryAnswer {
    pub fn is_refusal(&self) -> bool {
        self.query.is_refusal()
    }

    /// The structured database error record, if execution failed
    pub fn error(&self) -> Option<&Record> {
        self.records.iter().find(|r| is_error_record(r))
    }
}

pub struct NLQPipeline {
    discovery: SchemaDiscovery,
    composer: PromptComposer,
    synthesizer: QuerySynthesizer,
    gate: SafetyGate,
    executor: Arc<dyn GraphExecutor>,
}

impl NLQPipeline {
    pub fn new(
        executor: Arc<dyn GraphExecutor>,
        composer: PromptComposer,
        synthesizer: QuerySynthesizer,
    ) -> Self {
        Self {
            discovery: SchemaDiscovery::new(executor.clone()),
            composer,
            synthesizer,
            gate: SafetyGate::default(),
            executor,
        }
    }

    /// Collaborators chosen by the live/offline toggles
    pub fn from_config(config: &AssistantConfig) -> NLQResult<Self> {
        config.validate()?;
        let executor = graph::connect(config)?;
        let synthesizer = QuerySynthesizer::from_generator(llm::from_config(config)?);
        let composer = PromptComposer::new(config.max_examples);
        let mut pipeline = Self::new(executor, composer, synthesizer);
        pipeline.discovery = SchemaDiscovery::new(pipeline.executor.clone())
            .with_schema_file(config.schema_file.clone());
        Ok(pipeline)
    }

    pub fn with_gate(mut self, gate: SafetyGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_discovery(mut self, discovery: SchemaDiscovery) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn discovery(&self) -> &SchemaDiscovery {
        &self.discovery
    }

    /// Gated query for `question`: a read query or the refusal sentence
    pub async fn answer(&self, question: &str) -> CandidateQuery {
        let schema = self.discovery.describe_schema().await;
        let examples = examples_for(&schema);
        let prompt = self.composer.build_prompt(question, &schema, &examples);

        let candidate = self.synthesizer.generate_query(&prompt).await;
        let query = self.gate.enforce(candidate);

        if !query.is_refusal() {
            if let Some(description) = schema.description().filter(|d| !d.is_empty()) {
                let unknown = description.unknown_elements(query.as_str());
                if !unknown.is_empty() {
                    warn!("Query references elements not in the schema: {:?}", unknown);
                }
            }
        }
        info!("Synthesized query: {}", query);
        query
    }

    /// Answer and execute. Refusals never reach the executor.
    pub async fn ask(&self, question: &str) -> QueryAnswer {
        let query = self.answer(question).await;
        let records = if query.is_refusal() {
            Vec::new()
        } else {
            self.executor.execute(query.as_str()).await
        };
        QueryAnswer {
            question: question.to_string(),
            query,
            records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::OfflineGraph;

    fn offline_pipeline() -> NLQPipeline {
        NLQPipeline::new(
            Arc::new(OfflineGraph::sample()),
            PromptComposer::default(),
            QuerySynthesizer::offline(),
        )
    }

    #[tokio::test]
    async fn test_answer_offline() {
        let pipeline = offline_pipeline();
        let query = pipeline.answer("Which people live in which country?").await;
        assert_eq!(
            query.as_str(),
            "MATCH (p:Person)-[:LIVES_IN]->(c:Country) RETURN p.name, c.name"
        );
    }

    #[tokio::test]
    async fn test_write_request_refused() {
        let pipeline = offline_pipeline();
        let answer = pipeline.ask("Delete all nodes").await;
        assert!(answer.is_refusal());
        assert!(answer.records.is_empty());
    }

    #[tokio::test]
    async fn test_custom_gate_applies_to_offline_path() {
        let gate = SafetyGate::new().with_additional(["LIMIT"]);
        let pipeline = offline_pipeline().with_gate(gate);
        assert!(pipeline.answer("tell me anything").await.is_refusal());
        assert!(pipeline.answer("Delete all nodes").await.is_refusal());
    }

    #[tokio::test]
    async fn test_ask_returns_rows() {
        let pipeline = offline_pipeline();
        let answer = pipeline.ask("show me something").await;
        assert_eq!(answer.query.as_str(), "MATCH (n) RETURN n LIMIT 10");
        assert!(!answer.records.is_empty());
        assert!(answer.error().is_none());
    }

    #[test]
    fn test_from_default_config() {
        assert!(NLQPipeline::from_config(&AssistantConfig::default()).is_ok());
    }
}
