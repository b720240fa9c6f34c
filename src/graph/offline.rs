//! OfflineGraph: in-memory stand-in for a live database
//!
//! Answers the schema discovery queries from a small fixture, returns sample
//! rows for other reads and journals every write it is handed.

use crate::graph::{GraphExecutor, GraphResult, Record};
use crate::nlq::safety::SafetyGate;
use crate::schema::discovery::{
    NODE_TYPES_QUERY, RELATIONSHIP_PATTERNS_QUERY, TOTAL_NODES_QUERY, TOTAL_RELATIONSHIPS_QUERY,
};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// A fixture node: zero or more labels plus properties
#[derive(Debug, Clone)]
pub struct FixtureNode {
    pub labels: Vec<String>,
    pub properties: Record,
}

/// A directed fixture relationship between node indices
#[derive(Debug, Clone)]
pub struct FixtureEdge {
    pub from: usize,
    pub rel_type: String,
    pub to: usize,
}

pub struct OfflineGraph {
    nodes: Vec<FixtureNode>,
    edges: Vec<FixtureEdge>,
    gate: SafetyGate,
    writes: Mutex<Vec<String>>,
    sample_limit: usize,
}

fn row<const N: usize>(columns: [(&str, Value); N]) -> Record {
    columns
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

impl OfflineGraph {
    /// Empty graph
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            gate: SafetyGate::default(),
            writes: Mutex::new(Vec::new()),
            sample_limit: 3,
        }
    }

    /// People living in countries and buying products, plus one unlabeled node
    pub fn sample() -> Self {
        let mut graph = Self::new();
        let alice = graph.add_node(&["Person"], serde_json::json!({"name": "Alice", "age": 30}));
        let bob = graph.add_node(&["Person"], serde_json::json!({"name": "Bob", "age": 25}));
        let charlie = graph.add_node(
            &["Person"],
            serde_json::json!({"name": "Charlie", "age": 35, "email": "charlie@example.com"}),
        );
        let france = graph.add_node(&["Country"], serde_json::json!({"name": "France"}));
        let usa = graph.add_node(&["Country"], serde_json::json!({"name": "USA"}));
        let laptop = graph.add_node(
            &["Product"],
            serde_json::json!({"name": "Laptop", "price": 999.0}),
        );
        let phone = graph.add_node(
            &["Product"],
            serde_json::json!({"name": "Phone", "price": 599.0}),
        );
        graph.add_node(&[], serde_json::json!({"name": "orphan"}));

        graph.add_edge(alice, "LIVES_IN", france);
        graph.add_edge(bob, "LIVES_IN", usa);
        graph.add_edge(charlie, "LIVES_IN", france);
        graph.add_edge(alice, "BUYS", laptop);
        graph.add_edge(bob, "BUYS", phone);
        graph.add_edge(charlie, "BUYS", laptop);
        graph.add_edge(alice, "KNOWS", bob);
        graph
    }

    /// Add a node; non-object `properties` are treated as empty
    pub fn add_node(&mut self, labels: &[&str], properties: Value) -> usize {
        let properties = match properties {
            Value::Object(map) => map,
            _ => Record::new(),
        };
        self.nodes.push(FixtureNode {
            labels: labels.iter().map(|l| l.to_string()).collect(),
            properties,
        });
        self.nodes.len() - 1
    }

    pub fn add_edge(&mut self, from: usize, rel_type: &str, to: usize) {
        self.edges.push(FixtureEdge {
            from,
            rel_type: rel_type.to_string(),
            to,
        });
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Mutating queries received so far, in order
    pub fn executed_writes(&self) -> Vec<String> {
        self.journal().clone()
    }

    fn journal(&self) -> MutexGuard<'_, Vec<String>> {
        self.writes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn node_type_rows(&self) -> Vec<Record> {
        let mut groups: IndexMap<(Vec<String>, Vec<String>), u64> = IndexMap::new();
        for node in self.nodes.iter().filter(|n| !n.labels.is_empty()) {
            let keys = node.properties.keys().cloned().collect();
            *groups.entry((node.labels.clone(), keys)).or_insert(0) += 1;
        }
        let mut groups: Vec<_> = groups.into_iter().collect();
        groups.sort_by(|a, b| b.1.cmp(&a.1));

        groups
            .into_iter()
            .map(|((labels, props), count)| {
                row([
                    ("labels", Value::from(labels)),
                    ("props", Value::from(props)),
                    ("count", Value::from(count)),
                ])
            })
            .collect()
    }

    fn relationship_rows(&self) -> Vec<Record> {
        let primary = |idx: usize| {
            self.nodes
                .get(idx)
                .and_then(|n| n.labels.first())
                .map_or(Value::Null, |l| Value::from(l.as_str()))
        };

        let mut groups: IndexMap<(String, String, String), (Value, Value, u64)> = IndexMap::new();
        for edge in &self.edges {
            let (from, to) = (primary(edge.from), primary(edge.to));
            let key = (from.to_string(), edge.rel_type.clone(), to.to_string());
            groups.entry(key).or_insert((from, to, 0)).2 += 1;
        }
        let mut groups: Vec<_> = groups.into_iter().collect();
        groups.sort_by(|a, b| b.1 .2.cmp(&a.1 .2));

        groups
            .into_iter()
            .map(|((_, rel_type, _), (from, to, count))| {
                row([
                    ("from_label", from),
                    ("rel_type", Value::from(rel_type)),
                    ("to_label", to),
                    ("count", Value::from(count)),
                ])
            })
            .collect()
    }

    fn sample_rows(&self) -> Vec<Record> {
        self.nodes
            .iter()
            .take(self.sample_limit)
            .map(|node| {
                let mut entity = Record::new();
                entity.insert("labels".to_string(), Value::from(node.labels.clone()));
                entity.insert("properties".to_string(), Value::Object(node.properties.clone()));
                row([("n", Value::Object(entity))])
            })
            .collect()
    }
}

impl Default for OfflineGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GraphExecutor for OfflineGraph {
    async fn try_execute(&self, query: &str) -> GraphResult<Vec<Record>> {
        let query = query.trim().trim_end_matches(';').trim_end();
        debug!("Offline graph executing: {}", query);

        let rows = if query == NODE_TYPES_QUERY {
            self.node_type_rows()
        } else if query == RELATIONSHIP_PATTERNS_QUERY {
            self.relationship_rows()
        } else if query == TOTAL_NODES_QUERY {
            vec![row([("total_nodes", Value::from(self.nodes.len()))])]
        } else if query == TOTAL_RELATIONSHIPS_QUERY {
            vec![row([("total_relationships", Value::from(self.edges.len()))])]
        } else if !self.gate.is_read_only(query) {
            self.journal().push(query.to_string());
            Vec::new()
        } else if query.to_uppercase().contains("RETURN COUNT(") {
            vec![row([("count", Value::from(self.nodes.len()))])]
        } else {
            self.sample_rows()
        };
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_node_types_skip_unlabeled() {
        let graph = OfflineGraph::sample();
        let rows = graph.try_execute(NODE_TYPES_QUERY).await.unwrap();
        assert!(rows.iter().all(|r| !r["labels"].as_array().unwrap().is_empty()));
        let total: u64 = rows.iter().map(|r| r["count"].as_u64().unwrap()).sum();
        assert_eq!(total as usize, graph.node_count() - 1);
        // Person (name, age) x2 is the largest group
        assert_eq!(rows[0]["labels"][0], "Person");
        assert_eq!(rows[0]["count"], 2);
    }

    #[tokio::test]
    async fn test_relationship_patterns_grouped() {
        let graph = OfflineGraph::sample();
        let rows = graph.try_execute(RELATIONSHIP_PATTERNS_QUERY).await.unwrap();
        let lives_in = rows.iter().find(|r| r["rel_type"] == "LIVES_IN").unwrap();
        assert_eq!(lives_in["from_label"], "Person");
        assert_eq!(lives_in["to_label"], "Country");
        assert_eq!(lives_in["count"], 3);
    }

    #[tokio::test]
    async fn test_writes_are_journaled() {
        let graph = OfflineGraph::new();
        let rows = graph
            .try_execute("MERGE (p1:Person {name: \"Alice\"});")
            .await
            .unwrap();
        assert!(rows.is_empty());
        assert_eq!(graph.executed_writes(), vec!["MERGE (p1:Person {name: \"Alice\"})"]);
    }

    #[tokio::test]
    async fn test_reads_return_samples() {
        let graph = OfflineGraph::sample();
        let rows = graph.execute("MATCH (n) RETURN n LIMIT 10").await;
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["n"]["properties"]["name"], "Alice");
        assert!(graph.executed_writes().is_empty());
    }
}
