//! Schema inference over extracted records

use crate::builder::extract::ExtractedRecord;
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Endpoint type for relationship names that match no entity
pub const PLACEHOLDER_TYPE: &str = "Entity";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeSignature {
    pub from: String,
    pub to: String,
}

/// Node types with their property names, edge types with endpoint types
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InferredSchema {
    pub nodes: IndexMap<String, IndexSet<String>>,
    pub edges: IndexMap<String, EdgeSignature>,
}

impl InferredSchema {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Map entity names to their type; the first record for a name wins
pub fn entity_types(records: &[ExtractedRecord]) -> FxHashMap<&str, &str> {
    let mut types = FxHashMap::default();
    for record in records {
        if let ExtractedRecord::Entity { label, name, .. } = record {
            if !label.is_empty() {
                types.entry(name.as_str()).or_insert(label.as_str());
            }
        }
    }
    types
}

pub fn infer_schema(records: &[ExtractedRecord]) -> InferredSchema {
    let mut schema = InferredSchema::default();
    let types = entity_types(records);

    for record in records {
        match record {
            ExtractedRecord::Entity { label, attributes, .. } if !label.is_empty() => {
                let properties = schema.nodes.entry(label.clone()).or_default();
                properties.insert("name".to_string());
                properties.extend(attributes.keys().cloned());
            }
            ExtractedRecord::Relationship { label, from, to } if !label.is_empty() => {
                let resolve = |name: &str| {
                    types.get(name).copied().unwrap_or(PLACEHOLDER_TYPE).to_string()
                };
                let (from, to) = (resolve(from.as_str()), resolve(to.as_str()));
                let signature = schema
                    .edges
                    .entry(label.clone())
                    .or_insert_with(|| EdgeSignature {
                        from: from.clone(),
                        to: to.clone(),
                    });
                // a later record may resolve what an earlier one could not
                if signature.from == PLACEHOLDER_TYPE {
                    signature.from = from;
                }
                if signature.to == PLACEHOLDER_TYPE {
                    signature.to = to;
                }
            }
            _ => {}
        }
    }
    schema
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_properties_include_name() {
        let records = vec![
            ExtractedRecord::entity("Person", "Alice").with_attribute("age", 30i64),
            ExtractedRecord::entity("Person", "Bob").with_attribute("email", "b@x.io"),
            ExtractedRecord::entity("Company", "Acme"),
        ];
        let schema = infer_schema(&records);
        let person: Vec<&str> = schema.nodes["Person"].iter().map(String::as_str).collect();
        assert_eq!(person, vec!["name", "age", "email"]);
        assert_eq!(schema.nodes["Company"].len(), 1);
    }

    #[test]
    fn test_edges_resolved_by_name() {
        let records = vec![
            ExtractedRecord::entity("Person", "Alice"),
            ExtractedRecord::entity("Company", "Acme"),
            ExtractedRecord::relationship("WORKS_FOR", "Alice", "Acme"),
        ];
        let schema = infer_schema(&records);
        assert_eq!(
            schema.edges["WORKS_FOR"],
            EdgeSignature {
                from: "Person".to_string(),
                to: "Company".to_string(),
            }
        );
    }

    #[test]
    fn test_unresolved_endpoint_gets_placeholder() {
        let records = vec![
            ExtractedRecord::entity("Person", "Alice"),
            ExtractedRecord::relationship("KNOWS", "Alice", "Zed"),
        ];
        let schema = infer_schema(&records);
        assert_eq!(schema.edges["KNOWS"].from, "Person");
        assert_eq!(schema.edges["KNOWS"].to, PLACEHOLDER_TYPE);
    }

    #[test]
    fn test_placeholder_upgraded_later() {
        let records = vec![
            ExtractedRecord::entity("Person", "Alice"),
            ExtractedRecord::entity("Person", "Bob"),
            ExtractedRecord::relationship("KNOWS", "Alice", "Zed"),
            ExtractedRecord::relationship("KNOWS", "Alice", "Bob"),
        ];
        assert_eq!(infer_schema(&records).edges["KNOWS"].to, "Person");
    }

    #[test]
    fn test_name_resolution_case_sensitive() {
        let records = vec![
            ExtractedRecord::entity("Person", "Alice"),
            ExtractedRecord::relationship("KNOWS", "alice", "Alice"),
        ];
        assert_eq!(infer_schema(&records).edges["KNOWS"].from, PLACEHOLDER_TYPE);
    }
}
