//! Schema discovery against a graph executor

use crate::graph::{check_records, GraphExecutor, GraphResult, Record};
use crate::schema::{SchemaContext, SchemaDescription};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Groups nodes by label set and key set
pub const NODE_TYPES_QUERY: &str = "MATCH (n) WITH labels(n) AS labels, keys(n) AS props, count(*) AS count WHERE size(labels) > 0 RETURN labels, props, count ORDER BY count DESC";

/// Groups connections by primary endpoint labels; unlabeled endpoints come back null
pub const RELATIONSHIP_PATTERNS_QUERY: &str = "MATCH (a)-[r]->(b) RETURN head(labels(a)) AS from_label, type(r) AS rel_type, head(labels(b)) AS to_label, count(*) AS count ORDER BY count DESC";

pub const TOTAL_NODES_QUERY: &str = "MATCH (n) RETURN count(n) AS total_nodes";

pub const TOTAL_RELATIONSHIPS_QUERY: &str = "MATCH ()-[r]->() RETURN count(r) AS total_relationships";

/// Database-wide counts alongside the discovered schema
#[derive(Debug, Clone, PartialEq)]
pub struct GraphStats {
    /// Includes unlabeled nodes
    pub total_nodes: u64,
    pub total_relationships: u64,
    pub schema: SchemaDescription,
}

pub struct SchemaDiscovery {
    executor: Arc<dyn GraphExecutor>,
    schema_file: Option<PathBuf>,
}

fn strings(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn count(record: &Record, column: &str) -> u64 {
    record.get(column).and_then(Value::as_u64).unwrap_or(0)
}

impl SchemaDiscovery {
    pub fn new(executor: Arc<dyn GraphExecutor>) -> Self {
        Self {
            executor,
            schema_file: None,
        }
    }

    /// Prefer a precomputed schema file over live discovery when it can be read
    pub fn with_schema_file(mut self, path: Option<PathBuf>) -> Self {
        self.schema_file = path;
        self
    }

    /// Run both aggregation queries and fold them into a description
    pub async fn discover(&self) -> GraphResult<SchemaDescription> {
        let mut schema = SchemaDescription::default();

        let node_rows = check_records(self.executor.execute(NODE_TYPES_QUERY).await)?;
        for row in &node_rows {
            let labels = strings(row.get("labels"));
            // first label is the primary type; unlabeled groups are not listed
            let Some(primary) = labels.first() else {
                continue;
            };
            schema.add_node_group(primary, &strings(row.get("props")), count(row, "count"));
        }

        let rel_rows = check_records(self.executor.execute(RELATIONSHIP_PATTERNS_QUERY).await)?;
        for row in &rel_rows {
            let Some(rel_type) = row.get("rel_type").and_then(Value::as_str) else {
                continue;
            };
            schema.add_connection(
                rel_type,
                row.get("from_label").and_then(Value::as_str),
                row.get("to_label").and_then(Value::as_str),
                count(row, "count"),
            );
        }

        info!(
            "Discovered {} node types and {} relationship types",
            schema.nodes.len(),
            schema.relationships.len()
        );
        Ok(schema)
    }

    async fn read_schema_file(&self) -> Option<String> {
        let path = self.schema_file.as_ref()?;
        match tokio::fs::read_to_string(path).await {
            Ok(text) if !text.trim().is_empty() => {
                debug!("Using static schema from {}", path.display());
                Some(text)
            }
            Ok(_) => None,
            Err(e) => {
                debug!("Static schema {} unavailable: {}", path.display(), e);
                None
            }
        }
    }

    /// Schema for prompting. Never fails: a discovery error becomes
    /// `SchemaContext::Unavailable`.
    pub async fn describe_schema(&self) -> SchemaContext {
        if let Some(text) = self.read_schema_file().await {
            return SchemaContext::Static(text);
        }
        match self.discover().await {
            Ok(schema) => SchemaContext::Discovered(schema),
            Err(e) => {
                warn!("Schema discovery failed: {}", e);
                SchemaContext::Unavailable(format!("schema discovery failed: {}", e))
            }
        }
    }

    async fn single_count(&self, query: &str, column: &str) -> GraphResult<u64> {
        let rows = check_records(self.executor.execute(query).await)?;
        Ok(rows.first().map(|r| count(r, column)).unwrap_or(0))
    }

    pub async fn stats(&self) -> GraphResult<GraphStats> {
        Ok(GraphStats {
            total_nodes: self.single_count(TOTAL_NODES_QUERY, "total_nodes").await?,
            total_relationships: self
                .single_count(TOTAL_RELATIONSHIPS_QUERY, "total_relationships")
                .await?,
            schema: self.discover().await?,
        })
    }
}
