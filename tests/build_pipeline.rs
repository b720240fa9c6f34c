//! End-to-end tests for the text-to-statements path

use async_trait::async_trait;
use graphwise::builder::infer_schema;
use graphwise::llm::LlmResult;
use graphwise::*;
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// 30 people and 15 companies; 8 resolvable employments and 2 that point
/// at companies nobody extracted
fn scenario_records() -> Vec<ExtractedRecord> {
    let mut records = Vec::new();
    for i in 0..30 {
        records.push(
            ExtractedRecord::entity("Person", format!("Person {}", i))
                .with_attribute("age", 20 + i as i64),
        );
    }
    for i in 0..15 {
        records.push(
            ExtractedRecord::entity("Company", format!("Company {}", i))
                .with_attribute("founded", 1990 + i as i64),
        );
    }
    for i in 0..8 {
        records.push(ExtractedRecord::relationship(
            "WORKS_FOR",
            format!("Person {}", i),
            format!("Company {}", i % 15),
        ));
    }
    records.push(ExtractedRecord::relationship("WORKS_FOR", "Person 9", "Ghost Holdings"));
    records.push(ExtractedRecord::relationship("INVESTS_IN", "Nobody", "Company 1"));
    records
}

async fn generate(generator: &StatementGenerator, records: &[ExtractedRecord]) -> StatementBatch {
    generator.generate(&infer_schema(records), records).await
}

struct Garbage;

#[async_trait]
impl TextGenerator for Garbage {
    async fn complete(&self, _prompt: &str) -> LlmResult<String> {
        Ok("I could not find any entities, sorry!".to_string())
    }

    fn model(&self) -> &str {
        "garbage"
    }
}

#[tokio::test]
async fn test_scenario_counts() {
    let generator = StatementGenerator::new(150, 3000, 25);
    let batch = generate(&generator, &scenario_records()).await;

    assert_eq!(batch.node_count(), 45);
    assert_eq!(batch.edge_count(), 8);
    assert_eq!(batch.skipped_relationships, 2);
    assert_eq!(batch.rejected, 0);
    assert!(batch.len() <= generator.max_statements());

    let unique: FxHashSet<&String> = batch.statements.iter().collect();
    assert_eq!(unique.len(), batch.len());
}

#[tokio::test]
async fn test_generation_is_idempotent() {
    let generator = StatementGenerator::new(150, 3000, 25);
    let records = scenario_records();
    assert_eq!(generate(&generator, &records).await, generate(&generator, &records).await);
}

#[tokio::test]
async fn test_batch_never_exceeds_cap() {
    for cap in [1, 7, 20, 53, 500] {
        let generator = StatementGenerator::new(cap, 3000, 25);
        let batch = generate(&generator, &scenario_records()).await;
        assert!(batch.len() <= cap);
        assert_eq!(batch.len() + batch.truncated, 53);
    }
}

#[tokio::test]
async fn test_every_resolvable_relationship_connected_once() {
    let batch = generate(&StatementGenerator::new(150, 3000, 25), &scenario_records()).await;
    let edges: Vec<&String> = batch
        .statements
        .iter()
        .filter(|s| s.starts_with("MATCH "))
        .collect();

    for i in 0..8 {
        let person = format!("{{name: \"Person {}\"}}", i);
        let company = format!("{{name: \"Company {}\"}}", i % 15);
        let connecting = edges
            .iter()
            .filter(|s| s.contains(&person) && s.contains(&company))
            .count();
        assert_eq!(connecting, 1, "Person {} should be connected exactly once", i);
    }
    assert!(!edges.iter().any(|s| s.contains("Ghost Holdings") || s.contains("Nobody")));
}

#[tokio::test]
async fn test_chunking_is_invisible() {
    let records = scenario_records();
    let whole = generate(&StatementGenerator::new(150, 1_000_000, 10), &records).await;
    let chunked = generate(&StatementGenerator::new(150, 1, 10), &records).await;

    let whole_set: FxHashSet<&String> = whole.statements.iter().collect();
    let chunked_set: FxHashSet<&String> = chunked.statements.iter().collect();
    assert_eq!(whole_set, chunked_set);
    assert_eq!(chunked.skipped_relationships, 2);

    // an edge never precedes the node statements it matches on
    for (pos, statement) in chunked.statements.iter().enumerate() {
        if let Some(rest) = statement.strip_prefix("MATCH ") {
            let first_node = rest.split(')').next().unwrap();
            let merge = format!("MERGE {})", first_node);
            let node_pos = chunked
                .statements
                .iter()
                .position(|s| s.starts_with(&merge))
                .unwrap();
            assert!(node_pos < pos);
        }
    }
}

#[tokio::test]
async fn test_offline_build_and_ingest() {
    let graph = Arc::new(OfflineGraph::new());
    let builder = GraphBuilder::new(
        EntityExtractor::offline(),
        StatementGenerator::new(150, 3000, 25),
        graph.clone(),
    );
    let chunks = [
        "Alice works at Acme Corporation as an engineer.",
        "Charlie is the CEO of Tech Innovations. Charlie knows Alice.",
    ];

    let output = builder.build(&chunks).await;
    assert!(output.schema.nodes.contains_key("Person"));
    assert!(output.schema.nodes["Company"].contains("founded"));
    // Alice and Acme come from the first chunk, Charlie and Tech Innovations
    // from the second; Alice is extracted twice and merged
    assert_eq!(output.batch.node_count(), 4);
    assert_eq!(output.batch.edge_count(), 3);

    let report = builder.ingest(&output.batch).await;
    assert_eq!(report.executed, output.batch.len());
    let expected: Vec<String> = output
        .batch
        .statements
        .iter()
        .map(|s| s.trim_end_matches(';').to_string())
        .collect();
    assert_eq!(graph.executed_writes(), expected);
}

#[tokio::test]
async fn test_unparseable_extraction_yields_empty_batch() {
    let builder = GraphBuilder::new(
        EntityExtractor::new(Some(Arc::new(Garbage))),
        StatementGenerator::new(150, 3000, 25),
        Arc::new(OfflineGraph::new()),
    );
    let batch = builder.build_statements(&["Alice works at Acme"]).await;
    assert!(batch.is_empty());
}
