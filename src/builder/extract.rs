//! Entity and relationship extraction from text chunks

use crate::graph::AttributeValue;
use crate::llm::TextGenerator;
use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

const EXTRACTION_INSTRUCTIONS: &str = r#"extract all relevant entities and relationships from the following text.

return your response as a json list with this format:
[
  {"entity": "Person", "name": "Alice", "attributes": {"age": 30}},
  {"relationship": "WORKS_FOR", "from": "Alice", "to": "Acme Corporation"}
]

text to analyze:
"#;

/// (trigger, label, name, attribute) recognized without a model
const OFFLINE_ENTITIES: &[(&str, &str, &str, Option<(&str, i64)>)] = &[
    ("alice", "Person", "Alice", Some(("age", 30))),
    ("bob", "Person", "Bob", None),
    ("charlie", "Person", "Charlie", Some(("age", 28))),
    ("acme", "Company", "Acme Corporation", Some(("founded", 1990))),
    ("tech innovations", "Company", "Tech Innovations Inc", Some(("founded", 2020))),
];

/// Every trigger group needs one hit: (groups, label, from, to)
const OFFLINE_RELATIONSHIPS: &[(&[&[&str]], &str, &str, &str)] = &[
    (&[&["friends"], &["alice"], &["bob"]], "FRIEND", "Alice", "Bob"),
    (&[&["works at", "ceo of"], &["alice"], &["acme"]], "WORKS_FOR", "Alice", "Acme Corporation"),
    (&[&["works at", "ceo of"], &["bob"], &["acme"]], "WORKS_FOR", "Bob", "Acme Corporation"),
    (
        &[&["works at", "ceo of"], &["charlie"], &["tech innovations"]],
        "WORKS_FOR",
        "Charlie",
        "Tech Innovations Inc",
    ),
    (&[&["knows"], &["charlie"], &["alice"]], "KNOWS", "Charlie", "Alice"),
];

/// One extracted fact
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExtractedRecord {
    Entity {
        #[serde(rename = "entity")]
        label: String,
        name: String,
        attributes: IndexMap<String, AttributeValue>,
    },
    Relationship {
        #[serde(rename = "relationship")]
        label: String,
        from: String,
        to: String,
    },
}

fn text_field(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn attributes(value: Option<&Value>) -> IndexMap<String, AttributeValue> {
    value
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .map(|(k, v)| (k.clone(), AttributeValue::from_json(v)))
                .collect()
        })
        .unwrap_or_default()
}

impl ExtractedRecord {
    pub fn entity(label: impl Into<String>, name: impl Into<String>) -> Self {
        ExtractedRecord::Entity {
            label: label.into(),
            name: name.into(),
            attributes: IndexMap::new(),
        }
    }

    pub fn relationship(
        label: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        ExtractedRecord::Relationship {
            label: label.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    /// Add an attribute; no-op on relationships
    pub fn with_attribute(mut self, key: &str, value: impl Into<AttributeValue>) -> Self {
        if let ExtractedRecord::Entity { attributes, .. } = &mut self {
            attributes.insert(key.to_string(), value.into());
        }
        self
    }

    pub fn label(&self) -> &str {
        match self {
            ExtractedRecord::Entity { label, .. } | ExtractedRecord::Relationship { label, .. } => {
                label
            }
        }
    }

    pub fn is_entity(&self) -> bool {
        matches!(self, ExtractedRecord::Entity { .. })
    }

    /// Accepts `{"entity", "name", "attributes"}` / `{"relationship", "from", "to"}`
    /// and the `{"type", "label", ...}` form. Records without a name or
    /// endpoints are unusable and yield `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        if let Some(label) = obj.get("entity").and_then(Value::as_str) {
            return Some(ExtractedRecord::Entity {
                label: label.trim().to_string(),
                name: text_field(obj.get("name"))?,
                attributes: attributes(obj.get("attributes").or_else(|| obj.get("properties"))),
            });
        }
        if let Some(label) = obj.get("relationship").and_then(Value::as_str) {
            return Some(ExtractedRecord::Relationship {
                label: label.trim().to_string(),
                from: text_field(obj.get("from"))?,
                to: text_field(obj.get("to"))?,
            });
        }

        let label = obj
            .get("label")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string();
        match obj.get("type").and_then(Value::as_str)? {
            "entity" => Some(ExtractedRecord::Entity {
                label,
                name: text_field(obj.get("name"))?,
                attributes: attributes(obj.get("properties").or_else(|| obj.get("attributes"))),
            }),
            "relationship" => Some(ExtractedRecord::Relationship {
                label,
                from: text_field(obj.get("from"))?,
                to: text_field(obj.get("to"))?,
            }),
            _ => None,
        }
    }
}

fn fenced_json_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)```(?:json)?\s*(.*?)\s*```").expect("valid fence regex"))
}

fn array_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\[.*\]").expect("valid array regex"))
}

fn parse_array(text: &str) -> Vec<ExtractedRecord> {
    match serde_json::from_str::<Vec<Value>>(text) {
        Ok(items) => items.iter().filter_map(ExtractedRecord::from_json).collect(),
        Err(e) => {
            warn!("Could not parse extraction output: {}", e);
            Vec::new()
        }
    }
}

/// Direct parse when the response opens with `[`, else the first fenced
/// block, else the widest `[...]` span. Anything unparseable is empty.
pub fn parse_records(response: &str) -> Vec<ExtractedRecord> {
    let trimmed = response.trim();
    if trimmed.starts_with('[') {
        return parse_array(trimmed);
    }
    if let Some(cap) = fenced_json_regex().captures(trimmed) {
        return parse_array(cap[1].trim());
    }
    if let Some(m) = array_regex().find(trimmed) {
        return parse_array(m.as_str());
    }
    warn!("No JSON array in extraction output");
    Vec::new()
}

/// Offline keyword table, case-insensitive substring matches
pub fn offline_records(chunk: &str) -> Vec<ExtractedRecord> {
    let lower = chunk.to_lowercase();
    let mut records = Vec::new();

    for (trigger, label, name, attribute) in OFFLINE_ENTITIES {
        if lower.contains(trigger) {
            let mut record = ExtractedRecord::entity(*label, *name);
            if let Some((key, value)) = attribute {
                record = record.with_attribute(key, *value);
            }
            records.push(record);
        }
    }
    for (groups, label, from, to) in OFFLINE_RELATIONSHIPS {
        if groups.iter().all(|group| group.iter().any(|t| lower.contains(t))) {
            records.push(ExtractedRecord::relationship(*label, *from, *to));
        }
    }
    records
}

pub struct EntityExtractor {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl EntityExtractor {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    pub fn offline() -> Self {
        Self { generator: None }
    }

    pub fn prompt(chunk: &str) -> String {
        format!("{}{}", EXTRACTION_INSTRUCTIONS, chunk)
    }

    /// Records for one chunk. Never fails: a model error falls back to the
    /// offline table for this chunk, bad output gives an empty list.
    pub async fn extract(&self, chunk: &str) -> Vec<ExtractedRecord> {
        let Some(generator) = &self.generator else {
            return offline_records(chunk);
        };
        match generator.complete(&Self::prompt(chunk)).await {
            Ok(response) => {
                debug!("Raw extraction output: {}", response);
                parse_records(&response)
            }
            Err(e) => {
                warn!("Extraction model call failed, using offline table: {}", e);
                offline_records(chunk)
            }
        }
    }

    pub async fn extract_all<S: AsRef<str>>(&self, chunks: &[S]) -> Vec<ExtractedRecord> {
        let mut records = Vec::new();
        for (i, chunk) in chunks.iter().enumerate() {
            let extracted = self.extract(chunk.as_ref()).await;
            debug!("Chunk {}: {} records", i, extracted.len());
            records.extend(extracted);
        }
        info!("Extracted {} records from {} chunks", records.len(), chunks.len());
        records
    }
}
