//! HttpGraphClient: Neo4j transactional HTTP endpoint
//!
//! Sends each query as a single auto-commit transaction to
//! `POST {uri}/db/{database}/tx/commit`.

use crate::config::DatabaseConfig;
use crate::graph::{GraphError, GraphExecutor, GraphResult, Record};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Network client for a running Neo4j server
pub struct HttpGraphClient {
    endpoint: String,
    user: String,
    password: Option<String>,
    http_client: Client,
}

#[derive(Debug, Deserialize)]
struct TxResponse {
    #[serde(default)]
    results: Vec<TxResult>,
    #[serde(default)]
    errors: Vec<TxError>,
}

#[derive(Debug, Deserialize)]
struct TxResult {
    columns: Vec<String>,
    #[serde(default)]
    data: Vec<TxRow>,
}

#[derive(Debug, Deserialize)]
struct TxRow {
    row: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct TxError {
    code: String,
    message: String,
}

impl HttpGraphClient {
    pub fn new(config: &DatabaseConfig) -> GraphResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GraphError::ConnectionError(e.to_string()))?;

        Ok(Self {
            endpoint: format!(
                "{}/db/{}/tx/commit",
                config.uri.trim_end_matches('/'),
                config.database
            ),
            user: config.user.clone(),
            password: config.password.clone(),
            http_client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Flatten a transactional response into column-keyed records
fn records_from_response(response: TxResponse) -> GraphResult<Vec<Record>> {
    if let Some(err) = response.errors.into_iter().next() {
        return Err(if err.code.contains("Security") {
            GraphError::AuthError(format!("{}: {}", err.code, err.message))
        } else {
            GraphError::QueryError(format!("{}: {}", err.code, err.message))
        });
    }

    let mut records = Vec::new();
    for result in response.results {
        for row in result.data {
            let record: Record = result
                .columns
                .iter()
                .cloned()
                .zip(row.row)
                .collect();
            records.push(record);
        }
    }
    Ok(records)
}

#[async_trait]
impl GraphExecutor for HttpGraphClient {
    async fn try_execute(&self, query: &str) -> GraphResult<Vec<Record>> {
        debug!("Executing against {}: {}", self.endpoint, query);
        let body = serde_json::json!({ "statements": [{ "statement": query }] });

        let response = self
            .http_client
            .post(&self.endpoint)
            .basic_auth(&self.user, self.password.as_deref())
            .json(&body)
            .send()
            .await
            .map_err(|e| GraphError::ConnectionError(e.to_string()))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(GraphError::AuthError(format!(
                    "server returned {}",
                    response.status()
                )));
            }
            status if !status.is_success() => {
                return Err(GraphError::ConnectionError(format!("server returned {}", status)));
            }
            _ => {}
        }

        let parsed: TxResponse = response
            .json()
            .await
            .map_err(|e| GraphError::SerializationError(e.to_string()))?;
        records_from_response(parsed)
    }
}
