//! Graph query collaborator
//!
//! The pipelines never talk to a database driver directly. They hand Cypher
//! text to a [`GraphExecutor`] and get rows back as JSON maps:
//! - [`HttpGraphClient`] talks to a live Neo4j server
//! - [`OfflineGraph`] answers from an in-memory fixture

pub mod http;
pub mod offline;
pub mod value;

use crate::config::{AssistantConfig, Mode};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

pub use http::HttpGraphClient;
pub use offline::OfflineGraph;
pub use value::AttributeValue;

/// One result row: column name to value
pub type Record = serde_json::Map<String, Value>;

/// `status` value of the structured error record
pub const DATABASE_ERROR_STATUS: &str = "database_error";

/// Graph collaborator errors
#[derive(Error, Debug)]
pub enum GraphError {
    /// Server unreachable or transport failure
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Credentials rejected
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// Server rejected the statement
    #[error("Query error: {0}")]
    QueryError(String),

    /// Response could not be decoded
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl GraphError {
    /// Stable name used as `error_type` in the structured error record
    pub fn error_type(&self) -> &'static str {
        match self {
            GraphError::ConnectionError(_) => "connection_error",
            GraphError::AuthError(_) => "auth_error",
            GraphError::QueryError(_) => "query_error",
            GraphError::SerializationError(_) => "serialization_error",
        }
    }

    fn message(&self) -> &str {
        match self {
            GraphError::ConnectionError(m)
            | GraphError::AuthError(m)
            | GraphError::QueryError(m)
            | GraphError::SerializationError(m) => m,
        }
    }
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Build `{status: "database_error", error_type, message}`
pub fn error_record(err: &GraphError) -> Record {
    let mut record = Record::new();
    record.insert("status".to_string(), Value::from(DATABASE_ERROR_STATUS));
    record.insert("error_type".to_string(), Value::from(err.error_type()));
    record.insert("message".to_string(), Value::from(err.message()));
    record
}

/// Whether a row is the structured error record
pub fn is_error_record(record: &Record) -> bool {
    record.get("status").and_then(Value::as_str) == Some(DATABASE_ERROR_STATUS)
}

/// Turn an in-band error record back into an error
pub fn check_records(records: Vec<Record>) -> GraphResult<Vec<Record>> {
    let Some(record) = records.iter().find(|r| is_error_record(r)) else {
        return Ok(records);
    };
    let message = record
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown database error")
        .to_string();
    Err(match record.get("error_type").and_then(Value::as_str) {
        Some("connection_error") => GraphError::ConnectionError(message),
        Some("auth_error") => GraphError::AuthError(message),
        Some("serialization_error") => GraphError::SerializationError(message),
        _ => GraphError::QueryError(message),
    })
}

/// Executes Cypher against a graph database.
///
/// Implementors provide `try_execute`; callers that must not fail use
/// `execute`, which reports failures as a single structured error record.
#[async_trait]
pub trait GraphExecutor: Send + Sync {
    /// Execute a query, surfacing failures as errors
    async fn try_execute(&self, query: &str) -> GraphResult<Vec<Record>>;

    /// Execute a query; failures become one `database_error` record
    async fn execute(&self, query: &str) -> Vec<Record> {
        match self.try_execute(query).await {
            Ok(records) => records,
            Err(e) => {
                warn!("Graph query failed ({}): {}", e.error_type(), e);
                vec![error_record(&e)]
            }
        }
    }
}

/// Build the executor selected by `config.database`
pub fn connect(config: &AssistantConfig) -> GraphResult<Arc<dyn GraphExecutor>> {
    match config.database {
        Mode::Offline => Ok(Arc::new(OfflineGraph::sample())),
        Mode::Live => Ok(Arc::new(HttpGraphClient::new(&config.neo4j)?)),
    }
}
