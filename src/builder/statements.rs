//! Statement generation: extracted records to idempotent Cypher upserts
//!
//! Pass 1 assigns every entity a reference and emits one `MERGE` per node.
//! Pass 2 connects entities whose endpoints both got a reference. Large
//! inputs are processed in entity batches; the caller sees one batch either
//! way.

use crate::builder::extract::ExtractedRecord;
use crate::builder::infer::InferredSchema;
use crate::config::AssistantConfig;
use crate::graph::value::{escape_string, string_literal_regex};
use crate::graph::AttributeValue;
use crate::llm::TextGenerator;
use crate::nlq::safety::SafetyGate;
use indexmap::IndexMap;
use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::fmt::Write;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

const STATEMENT_INSTRUCTIONS: &str = "convert these extracted entities and relationships into idempotent cypher statements.
use MERGE for every node and relationship, one statement per line, each ending with a semicolon.
every node pattern must carry its label, and nodes are identified by their name property.
";

/// Replace anything outside `[A-Za-z0-9_]` with `_`, collapse and trim
/// underscores, and prefix a leading digit. Falls back to `fallback`.
pub fn sanitize_identifier(raw: &str, fallback: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.trim().chars() {
        let c = if c.is_ascii_alphanumeric() { c } else { '_' };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    let trimmed = out.trim_matches('_');
    match trimmed.chars().next() {
        None => fallback.to_string(),
        Some(first) if first.is_ascii_digit() => format!("p_{}", trimmed),
        Some(_) => trimmed.to_string(),
    }
}

pub fn sanitize_property_name(raw: &str) -> String {
    sanitize_identifier(raw, "property")
}

/// Rough token count: four characters per token
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Output of one generation run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatementBatch {
    pub statements: Vec<String>,
    /// Statements cut by the batch cap
    pub truncated: usize,
    /// Relationships with an endpoint that never resolved
    pub skipped_relationships: usize,
    /// Statements dropped for an unlabeled node pattern
    pub rejected: usize,
}

impl StatementBatch {
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Relationship upserts are the statements that `MATCH` their endpoints
    pub fn edge_count(&self) -> usize {
        self.statements
            .iter()
            .filter(|s| s.starts_with("MATCH "))
            .count()
    }

    pub fn node_count(&self) -> usize {
        self.len() - self.edge_count()
    }
}

/// An entity after duplicate names were folded together
#[derive(Debug, Clone, Serialize)]
struct EntityDraft {
    label: String,
    name: String,
    attributes: IndexMap<String, AttributeValue>,
}

#[derive(Debug, Clone, Serialize)]
struct RelationshipDraft {
    label: String,
    from: String,
    to: String,
}

#[derive(Debug, Clone)]
struct NodeRef {
    var: String,
    label: String,
}

/// Reference names: label initial plus a per-initial counter
#[derive(Default)]
struct References {
    by_name: FxHashMap<String, NodeRef>,
    counters: FxHashMap<char, usize>,
}

impl References {
    fn assign(&mut self, entity: &EntityDraft) {
        if self.by_name.contains_key(&entity.name) {
            return;
        }
        let initial = entity
            .label
            .chars()
            .next()
            .map(|c| c.to_ascii_lowercase())
            .unwrap_or('n');
        let counter = self.counters.entry(initial).or_insert(0);
        *counter += 1;
        self.by_name.insert(
            entity.name.clone(),
            NodeRef {
                var: format!("{}{}", initial, counter),
                label: entity.label.clone(),
            },
        );
    }

    fn get(&self, name: &str) -> Option<&NodeRef> {
        self.by_name.get(name)
    }
}

fn merge_entities(records: &[ExtractedRecord]) -> (Vec<EntityDraft>, Vec<RelationshipDraft>) {
    let mut entities: IndexMap<String, EntityDraft> = IndexMap::new();
    let mut relationships = Vec::new();

    for record in records {
        match record {
            ExtractedRecord::Entity { label, name, attributes } => {
                if label.trim().is_empty() {
                    warn!("Skipping entity '{}' without a type label", name);
                    continue;
                }
                let draft = entities.entry(name.clone()).or_insert_with(|| EntityDraft {
                    label: sanitize_identifier(label, crate::builder::infer::PLACEHOLDER_TYPE),
                    name: name.clone(),
                    attributes: IndexMap::new(),
                });
                for (key, value) in attributes {
                    if value.is_blank() {
                        continue;
                    }
                    let key = sanitize_property_name(key);
                    if key == "name" {
                        continue;
                    }
                    draft.attributes.entry(key).or_insert_with(|| value.clone());
                }
            }
            ExtractedRecord::Relationship { label, from, to } => {
                if label.trim().is_empty() {
                    warn!("Skipping relationship {} -> {} without a type label", from, to);
                    continue;
                }
                relationships.push(RelationshipDraft {
                    label: sanitize_identifier(label, "RELATED_TO"),
                    from: from.clone(),
                    to: to.clone(),
                });
            }
        }
    }
    (entities.into_values().collect(), relationships)
}

fn node_pattern(node: &NodeRef, name: &str) -> String {
    format!("({}:{} {{name: \"{}\"}})", node.var, node.label, escape_string(name))
}

fn node_statement(node: &NodeRef, entity: &EntityDraft) -> String {
    let mut statement = format!("MERGE {}", node_pattern(node, &entity.name));
    let assignments: Vec<String> = entity
        .attributes
        .iter()
        .map(|(key, value)| format!("{}.{} = {}", node.var, key, value.to_cypher()))
        .collect();
    if !assignments.is_empty() {
        let _ = write!(statement, " SET {}", assignments.join(", "));
    }
    statement.push(';');
    statement
}

fn edge_statement(rel: &RelationshipDraft, from: &NodeRef, to: &NodeRef) -> String {
    if from.var == to.var {
        return format!(
            "MATCH {} MERGE ({})-[:{}]->({});",
            node_pattern(from, &rel.from),
            from.var,
            rel.label,
            from.var
        );
    }
    format!(
        "MATCH {}, {} MERGE ({})-[:{}]->({});",
        node_pattern(from, &rel.from),
        node_pattern(to, &rel.to),
        from.var,
        rel.label,
        to.var
    )
}

fn node_body_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(^|[^A-Za-z0-9_])\(([^()]*)\)").expect("valid node regex"))
}

/// At least one labeled node pattern; every other node pattern must carry
/// a label or reuse a variable labeled elsewhere in the same statement
pub fn has_labeled_nodes(statement: &str) -> bool {
    let stripped = string_literal_regex().replace_all(statement, "\"\"");
    let mut labeled = FxHashSet::default();
    let mut unlabeled = Vec::new();

    for cap in node_body_regex().captures_iter(&stripped) {
        let head = cap[2].split('{').next().unwrap_or_default().trim();
        let var: String = head
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        if head[var.len()..].trim_start().starts_with(':') {
            labeled.insert(var);
        } else {
            unlabeled.push(var);
        }
    }
    !labeled.is_empty() && unlabeled.iter().all(|var| !var.is_empty() && labeled.contains(var))
}

fn word_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").expect("valid word regex"))
}

/// Clause keywords of a statement. String contents, labels, relationship
/// types, map keys and property names are identifiers, not keywords.
fn clause_words(statement: &str) -> Vec<String> {
    let stripped = string_literal_regex().replace_all(statement, "\"\"");
    word_regex()
        .find_iter(&stripped)
        .filter(|m| {
            let before = stripped[..m.start()].trim_end().chars().last();
            let after = stripped[m.end()..].trim_start().chars().next();
            !matches!(before, Some('.' | ':')) && !matches!(after, Some('.' | ':'))
        })
        .map(|m| m.as_str().to_uppercase())
        .collect()
}

/// `MERGE` upserts, optionally behind a `MATCH`, with `SET` and
/// `ON CREATE` / `ON MATCH` allowed. Any other word the gate denies fails.
pub fn is_upsert(statement: &str, gate: &SafetyGate) -> bool {
    let words = clause_words(statement);
    let Some(first) = words.first() else {
        return false;
    };
    if first != "MERGE" && first != "MATCH" {
        return false;
    }
    if !words.iter().any(|w| w == "MERGE") {
        return false;
    }
    words.iter().enumerate().all(|(i, word)| match word.as_str() {
        "MERGE" | "SET" => true,
        "CREATE" => i > 0 && words[i - 1] == "ON",
        other => !gate.denies(other),
    })
}

/// Words a line of Cypher may begin with
const CLAUSE_KEYWORDS: &[&str] = &[
    "MERGE", "MATCH", "OPTIONAL", "WITH", "WHERE", "SET", "ON", "UNWIND", "RETURN", "CREATE",
    "DELETE", "DETACH", "REMOVE", "DROP", "CALL", "AND", "OR", "FOREACH",
];

fn starts_with_clause(line: &str) -> bool {
    let word: String = line
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_uppercase();
    CLAUSE_KEYWORDS.contains(&word.as_str())
}

/// Keep the Cypher lines of model output and split them into
/// `;`-terminated statements. Fences, comments and prose are dropped.
pub fn clean_statements(raw: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut pending: Vec<&str> = Vec::new();

    for line in raw.lines() {
        let line = line.trim();
        if !starts_with_clause(line) {
            if !line.is_empty() && !line.starts_with("```") {
                debug!("Dropping non-Cypher line: {}", line);
            }
            continue;
        }
        pending.push(line);
        if line.ends_with(';') {
            statements.push(pending.join(" "));
            pending.clear();
        }
    }
    if !pending.is_empty() {
        statements.push(format!("{};", pending.join(" ")));
    }
    statements
}

pub struct StatementGenerator {
    max_statements: usize,
    token_threshold: usize,
    batch_size: usize,
    generator: Option<Arc<dyn TextGenerator>>,
    gate: SafetyGate,
}

impl StatementGenerator {
    pub fn new(max_statements: usize, token_threshold: usize, batch_size: usize) -> Self {
        Self {
            max_statements,
            token_threshold,
            batch_size: batch_size.max(1),
            generator: None,
            gate: SafetyGate::default(),
        }
    }

    pub fn from_config(
        config: &AssistantConfig,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        Self {
            generator,
            ..Self::new(
                config.max_statements,
                config.batch_token_threshold,
                config.entity_batch_size,
            )
        }
    }

    pub fn with_model(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn max_statements(&self) -> usize {
        self.max_statements
    }

    fn deterministic_chunk(
        &self,
        entities: &[EntityDraft],
        relationships: &[&RelationshipDraft],
        refs: &References,
    ) -> Vec<String> {
        let mut statements = Vec::with_capacity(entities.len() + relationships.len());
        for entity in entities {
            if let Some(node) = refs.get(&entity.name) {
                statements.push(node_statement(node, entity));
            }
        }
        for rel in relationships {
            if let (Some(from), Some(to)) = (refs.get(&rel.from), refs.get(&rel.to)) {
                statements.push(edge_statement(rel, from, to));
            }
        }
        statements
    }

    fn chunk_prompt(
        schema: &InferredSchema,
        entities: &[EntityDraft],
        relationships: &[&RelationshipDraft],
    ) -> String {
        let to_json = |value: serde_json::Result<String>| value.unwrap_or_default();
        format!(
            "{}\nschema:\n{}\n\nentities:\n{}\n\nrelationships:\n{}\n",
            STATEMENT_INSTRUCTIONS,
            to_json(serde_json::to_string_pretty(schema)),
            to_json(serde_json::to_string_pretty(entities)),
            to_json(serde_json::to_string_pretty(relationships)),
        )
    }

    async fn chunk_statements(
        &self,
        schema: &InferredSchema,
        entities: &[EntityDraft],
        relationships: &[&RelationshipDraft],
        refs: &References,
    ) -> Vec<String> {
        let Some(generator) = &self.generator else {
            return self.deterministic_chunk(entities, relationships, refs);
        };
        let prompt = Self::chunk_prompt(schema, entities, relationships);
        match generator.complete(&prompt).await {
            Ok(raw) => {
                debug!("Raw statement output: {}", raw);
                clean_statements(&raw)
            }
            Err(e) => {
                warn!("Statement model call failed, generating deterministically: {}", e);
                self.deterministic_chunk(entities, relationships, refs)
            }
        }
    }

    /// One deduplicated, capped batch for all records
    pub async fn generate(
        &self,
        schema: &InferredSchema,
        records: &[ExtractedRecord],
    ) -> StatementBatch {
        let (entities, relationships) = merge_entities(records);

        let estimated = estimate_tokens(&serde_json::to_string(schema).unwrap_or_default())
            + estimate_tokens(&serde_json::to_string(records).unwrap_or_default());
        let chunk_size = if estimated > self.token_threshold && entities.len() > self.batch_size {
            info!(
                "Estimated {} tokens exceeds {}; generating in batches of {} entities",
                estimated, self.token_threshold, self.batch_size
            );
            self.batch_size
        } else {
            entities.len().max(1)
        };

        let mut refs = References::default();
        let mut emitted = vec![false; relationships.len()];
        let mut statements = Vec::new();

        for chunk in entities.chunks(chunk_size) {
            for entity in chunk {
                refs.assign(entity);
            }
            let ready: Vec<&RelationshipDraft> = relationships
                .iter()
                .zip(emitted.iter_mut())
                .filter(|(rel, done)| {
                    !**done && refs.get(&rel.from).is_some() && refs.get(&rel.to).is_some()
                })
                .map(|(rel, done)| {
                    *done = true;
                    rel
                })
                .collect();
            statements.extend(self.chunk_statements(schema, chunk, &ready, &refs).await);
        }

        let mut skipped_relationships = 0;
        for (rel, done) in relationships.iter().zip(&emitted) {
            if !done {
                warn!(
                    "Skipping {} relationship {} -> {}: endpoint has no entity",
                    rel.label, rel.from, rel.to
                );
                skipped_relationships += 1;
            }
        }

        let before = statements.len();
        statements.retain(|s| is_upsert(s, &self.gate) && has_labeled_nodes(s));
        let rejected = before - statements.len();
        if rejected > 0 {
            warn!("Rejected {} statements that were not labeled upserts", rejected);
        }

        let mut seen = FxHashSet::default();
        statements.retain(|s| seen.insert(s.clone()));

        let truncated = statements.len().saturating_sub(self.max_statements);
        if truncated > 0 {
            warn!(
                "Truncated statement batch to {}: dropped {} of {} statements",
                self.max_statements,
                truncated,
                statements.len()
            );
            statements.truncate(self.max_statements);
        }

        info!("Generated {} statements", statements.len());
        StatementBatch {
            statements,
            truncated,
            skipped_relationships,
            rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::infer::infer_schema;
    use crate::llm::LlmResult;
    use async_trait::async_trait;

    fn sample_records() -> Vec<ExtractedRecord> {
        vec![
            ExtractedRecord::entity("Person", "Alice").with_attribute("age", 30i64),
            ExtractedRecord::entity("Company", "Acme \"Best\" Corp")
                .with_attribute("founded", 1990i64),
            ExtractedRecord::entity("Person", "Bob"),
            ExtractedRecord::relationship("WORKS_FOR", "Alice", "Acme \"Best\" Corp"),
            ExtractedRecord::relationship("KNOWS", "Alice", "Nobody"),
        ]
    }

    async fn generate(
        generator: &StatementGenerator,
        records: &[ExtractedRecord],
    ) -> StatementBatch {
        generator.generate(&infer_schema(records), records).await
    }

    struct Scripted(&'static str);

    #[async_trait]
    impl TextGenerator for Scripted {
        async fn complete(&self, _prompt: &str) -> LlmResult<String> {
            Ok(self.0.to_string())
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    #[test]
    fn test_sanitize_property_name() {
        assert_eq!(sanitize_property_name("bad prop!!"), "bad_prop");
        assert_eq!(sanitize_property_name("__a--b__"), "a_b");
        assert_eq!(sanitize_property_name("2nd place"), "p_2nd_place");
        assert_eq!(sanitize_property_name("!!!"), "property");
        assert_eq!(sanitize_property_name("dateOfBirth"), "dateOfBirth");
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcde"), 2);
    }

    #[tokio::test]
    async fn test_two_pass_output() {
        let batch = generate(&StatementGenerator::new(150, 3000, 25), &sample_records()).await;
        assert_eq!(
            batch.statements,
            vec![
                "MERGE (p1:Person {name: \"Alice\"}) SET p1.age = 30;",
                "MERGE (c1:Company {name: \"Acme \\\"Best\\\" Corp\"}) SET c1.founded = 1990;",
                "MERGE (p2:Person {name: \"Bob\"});",
                "MATCH (p1:Person {name: \"Alice\"}), \
                 (c1:Company {name: \"Acme \\\"Best\\\" Corp\"}) MERGE (p1)-[:WORKS_FOR]->(c1);",
            ]
        );
        assert_eq!(batch.skipped_relationships, 1);
        assert_eq!(batch.edge_count(), 1);
        assert_eq!(batch.node_count(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_names_merged() {
        let records = vec![
            ExtractedRecord::entity("Person", "Alice").with_attribute("age", 30i64),
            ExtractedRecord::entity("Person", "Alice")
                .with_attribute("age", 31i64)
                .with_attribute("city", "Paris")
                .with_attribute("nickname", ""),
        ];
        let batch = generate(&StatementGenerator::new(150, 3000, 25), &records).await;
        assert_eq!(
            batch.statements,
            vec!["MERGE (p1:Person {name: \"Alice\"}) SET p1.age = 30, p1.city = \"Paris\";"]
        );
    }

    #[tokio::test]
    async fn test_self_loop_single_match() {
        let records = vec![
            ExtractedRecord::entity("Person", "Narcissus"),
            ExtractedRecord::relationship("ADMIRES", "Narcissus", "Narcissus"),
        ];
        let batch = generate(&StatementGenerator::new(150, 3000, 25), &records).await;
        assert_eq!(
            batch.statements[1],
            "MATCH (p1:Person {name: \"Narcissus\"}) MERGE (p1)-[:ADMIRES]->(p1);"
        );
    }

    #[tokio::test]
    async fn test_cap_keeps_first_statements() {
        let batch = generate(&StatementGenerator::new(2, 3000, 25), &sample_records()).await;
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.truncated, 2);
        assert!(batch.statements[0].contains("Alice"));
    }

    #[test]
    fn test_label_validation() {
        assert!(has_labeled_nodes("MERGE (p1:Person {name: \"A (x)\"});"));
        assert!(has_labeled_nodes(
            "MATCH (a:Person {name: \"A\"}), (b:Company {name: \"B\"}) MERGE (a)-[:WORKS_FOR]->(b);"
        ));
        assert!(!has_labeled_nodes("MERGE (a)-[:KNOWS]->(b);"));
        assert!(!has_labeled_nodes("MERGE (:Person {name: \"A\"})-[:KNOWS]->({name: \"B\"});"));
        assert!(has_labeled_nodes("MATCH (n:Person) RETURN count(n);"));
        assert!(!has_labeled_nodes("I hope this helps!;"));
    }

    #[test]
    fn test_upsert_validation() {
        let gate = SafetyGate::new();
        assert!(is_upsert("MERGE (p:Person {name: \"A\"}) SET p.age = 1;", &gate));
        assert!(is_upsert(
            "MATCH (a:Person {name: \"A\"}), (b:Person {name: \"B\"}) MERGE (a)-[:KNOWS]->(b);",
            &gate
        ));
        assert!(is_upsert(
            "MERGE (p:Person {name: \"A\"}) ON CREATE SET p.created = true;",
            &gate
        ));
        // keywords inside names, labels and property keys are data
        assert!(is_upsert("MERGE (c:Company {name: \"Delete Corp\"});", &gate));
        assert!(is_upsert("MERGE (c:Drop {remove: 1}) SET c.delete = 2;", &gate));

        assert!(!is_upsert("CREATE (p:Person {name: \"A\"});", &gate));
        assert!(!is_upsert("MATCH (n:Person) DETACH DELETE n;", &gate));
        assert!(!is_upsert("MATCH (n:Person) RETURN n;", &gate));
        assert!(!is_upsert("MERGE (p:Person {name: \"A\"}) REMOVE p.age;", &gate));
        assert!(!is_upsert("MERGE (p:Person) WITH p CREATE (q:Person);", &gate));
        assert!(!is_upsert("I hope this helps!;", &gate));
    }

    #[tokio::test]
    async fn test_edge_count_ignores_arrows_in_names() {
        let records = vec![
            ExtractedRecord::entity("Person", "a]->(b"),
            ExtractedRecord::entity("Person", "Carol"),
            ExtractedRecord::relationship("KNOWS", "Carol", "a]->(b"),
        ];
        let batch = generate(&StatementGenerator::new(150, 3000, 25), &records).await;
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.node_count(), 2);
        assert_eq!(batch.edge_count(), 1);
    }

    #[test]
    fn test_clean_statements() {
        let raw = "```cypher\n// people\nMERGE (a:Person {name: \"A\"})\n\
                   SET a.age = 1;\n# done\nMERGE (b:Person {name: \"B\"})\n```";
        assert_eq!(
            clean_statements(raw),
            vec![
                "MERGE (a:Person {name: \"A\"}) SET a.age = 1;",
                "MERGE (b:Person {name: \"B\"});",
            ]
        );

        let chatty = "Sure! Here you go:\nMERGE (a:Person {name: \"A\"})\n\
                      Let me know if you need more.\nSET a.age = 1;";
        assert_eq!(
            clean_statements(chatty),
            vec!["MERGE (a:Person {name: \"A\"}) SET a.age = 1;"]
        );
    }

    #[tokio::test]
    async fn test_model_output_validated() {
        let generator = StatementGenerator::new(150, 3000, 25).with_model(Arc::new(Scripted(
            "MERGE (a:Person {name: \"Alice\"});\nMERGE (a)-[:KNOWS]->(b);\n\
             MERGE (a:Person {name: \"Alice\"});",
        )));
        let batch = generate(&generator, &sample_records()).await;
        assert_eq!(batch.statements, vec!["MERGE (a:Person {name: \"Alice\"});"]);
        assert_eq!(batch.rejected, 1);
    }

    #[tokio::test]
    async fn test_model_prose_and_deletes_rejected() {
        let generator = StatementGenerator::new(150, 3000, 25).with_model(Arc::new(Scripted(
            "Here are the statements:\nMERGE (a:Person {name: \"Alice\"});\n\
             MATCH (n:Person) DETACH DELETE n;\nI hope this helps!",
        )));
        let batch = generate(&generator, &sample_records()).await;
        assert_eq!(batch.statements, vec!["MERGE (a:Person {name: \"Alice\"});"]);
        assert_eq!(batch.rejected, 1);
    }

    #[tokio::test]
    async fn test_model_create_rejected() {
        let generator = StatementGenerator::new(150, 3000, 25).with_model(Arc::new(Scripted(
            "CREATE (a:Person {name: \"Alice\"});\n\
             MERGE (b:Person {name: \"Bob\"}) ON CREATE SET b.age = 1;",
        )));
        let batch = generate(&generator, &sample_records()).await;
        assert_eq!(
            batch.statements,
            vec!["MERGE (b:Person {name: \"Bob\"}) ON CREATE SET b.age = 1;"]
        );
        assert_eq!(batch.rejected, 1);
    }
}
