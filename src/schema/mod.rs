//! Graph schema description and grounding checks
//!
//! A [`SchemaDescription`] is only ever built from what the database
//! reports, so every label, relationship type and property name in it was
//! observed, never guessed.

pub mod discovery;
pub mod examples;

use crate::graph::value::string_literal_regex;
use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use std::fmt::Write;
use std::sync::OnceLock;

pub use discovery::{GraphStats, SchemaDiscovery};
pub use examples::{derive_examples, WorkedExample};

/// Patterns listed per relationship type when rendering
const RENDERED_PATTERNS: usize = 3;

/// Node category: property names seen on it and how many nodes carry it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeCategory {
    pub properties: IndexSet<String>,
    pub count: u64,
}

/// A (from, to) endpoint pair observed for a relationship type
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionPattern {
    pub from: String,
    pub to: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipCategory {
    /// Most frequent first
    pub patterns: Vec<ConnectionPattern>,
    /// Includes connections whose endpoints carry no label
    pub total_count: u64,
}

impl RelationshipCategory {
    pub fn most_common(&self) -> Option<&ConnectionPattern> {
        self.patterns.first()
    }
}

/// Discovered state of the database
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaDescription {
    pub nodes: IndexMap<String, NodeCategory>,
    pub relationships: IndexMap<String, RelationshipCategory>,
}

/// A schema element referenced by a query but absent from the description
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SchemaElement {
    Label(String),
    RelationshipType(String),
    Property(String),
}

fn label_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\(\s*(?:[A-Za-z_]\w*)?\s*:\s*([A-Za-z_]\w*)").expect("valid label regex")
    })
}

fn rel_type_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\[\s*(?:[A-Za-z_]\w*)?\s*:\s*([A-Za-z_]\w*)")
            .expect("valid relationship regex")
    })
}

fn property_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b[A-Za-z_]\w*\.([A-Za-z_]\w*)\b").expect("valid property regex")
    })
}

impl SchemaDescription {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.relationships.is_empty()
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.nodes.contains_key(label)
    }

    pub fn has_relationship(&self, rel_type: &str) -> bool {
        self.relationships.contains_key(rel_type)
    }

    /// Whether any node category carries `property`
    pub fn has_property(&self, property: &str) -> bool {
        self.nodes.values().any(|n| n.properties.contains(property))
    }

    /// Record one aggregation row for a node category set
    pub fn add_node_group(&mut self, primary: &str, properties: &[String], count: u64) {
        let category = self.nodes.entry(primary.to_string()).or_default();
        category.properties.extend(properties.iter().cloned());
        category.count += count;
    }

    /// Record one aggregation row for a connection pattern.
    /// Unlabeled endpoints count towards the total but are not listed.
    pub fn add_connection(
        &mut self,
        rel_type: &str,
        from: Option<&str>,
        to: Option<&str>,
        count: u64,
    ) {
        let category = self.relationships.entry(rel_type.to_string()).or_default();
        category.total_count += count;
        if let (Some(from), Some(to)) = (from, to) {
            match category.patterns.iter_mut().find(|p| p.from == from && p.to == to) {
                Some(pattern) => pattern.count += count,
                None => category.patterns.push(ConnectionPattern {
                    from: from.to_string(),
                    to: to.to_string(),
                    count,
                }),
            }
            category.patterns.sort_by(|a, b| b.count.cmp(&a.count));
        }
    }

    /// Textual schema body for prompts
    pub fn render(&self) -> String {
        let mut out = String::from("database schema\n\nnode types:\n");
        for (label, category) in &self.nodes {
            let _ = writeln!(out, "- **{}**: {} nodes", label, category.count);
            if !category.properties.is_empty() {
                let props: Vec<&str> = category.properties.iter().map(String::as_str).collect();
                let _ = writeln!(out, "  - Properties: {}", props.join(", "));
            }
        }

        out.push_str("\nrelationships:\n");
        for (rel_type, category) in &self.relationships {
            let _ = writeln!(out, "- **{}**: {} relationships", rel_type, category.total_count);
            for pattern in category.patterns.iter().take(RENDERED_PATTERNS) {
                let _ = writeln!(out, "  - {} -> {} ({})", pattern.from, pattern.to, pattern.count);
            }
        }
        out
    }

    /// Labels, relationship types and properties used by `query` that were
    /// never observed. String literals are ignored.
    pub fn unknown_elements(&self, query: &str) -> Vec<SchemaElement> {
        let stripped = string_literal_regex().replace_all(query, "\"\"");
        let mut unknown = IndexSet::new();

        for cap in label_regex().captures_iter(&stripped) {
            let label = &cap[1];
            if !self.has_label(label) {
                unknown.insert(SchemaElement::Label(label.to_string()));
            }
        }
        for cap in rel_type_regex().captures_iter(&stripped) {
            let rel_type = &cap[1];
            if !self.has_relationship(rel_type) {
                unknown.insert(SchemaElement::RelationshipType(rel_type.to_string()));
            }
        }
        for cap in property_regex().captures_iter(&stripped) {
            let property = &cap[1];
            if !self.has_property(property) {
                unknown.insert(SchemaElement::Property(property.to_string()));
            }
        }
        unknown.into_iter().collect()
    }
}

/// What the prompt composer gets to ground a question on
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaContext {
    /// Live discovery succeeded
    Discovered(SchemaDescription),
    /// Precomputed schema text from a file
    Static(String),
    /// Discovery failed; carries the failure description
    Unavailable(String),
}

impl SchemaContext {
    pub fn render(&self) -> String {
        match self {
            SchemaContext::Discovered(schema) => schema.render(),
            SchemaContext::Static(text) | SchemaContext::Unavailable(text) => text.clone(),
        }
    }

    pub fn description(&self) -> Option<&SchemaDescription> {
        match self {
            SchemaContext::Discovered(schema) => Some(schema),
            _ => None,
        }
    }

    /// False when the prompt must say the schema is unknown
    pub fn is_constrained(&self) -> bool {
        match self {
            SchemaContext::Discovered(schema) => !schema.is_empty(),
            SchemaContext::Static(text) => !text.trim().is_empty(),
            SchemaContext::Unavailable(_) => false,
        }
    }
}
