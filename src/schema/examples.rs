//! Worked question/query pairs derived from a discovered schema

use crate::schema::{SchemaContext, SchemaDescription};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkedExample {
    pub question: String,
    pub query: String,
}

impl WorkedExample {
    pub fn new(question: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            query: query.into(),
        }
    }
}

/// Examples that hold for any graph
pub fn meta_examples() -> Vec<WorkedExample> {
    vec![
        WorkedExample::new(
            "What types of nodes are in the database?",
            "MATCH (n) RETURN DISTINCT labels(n) AS node_types",
        ),
        WorkedExample::new(
            "What relationships exist?",
            "MATCH ()-[r]->() RETURN DISTINCT type(r) AS relationship_type",
        ),
        WorkedExample::new("How many nodes are there?", "MATCH (n) RETURN count(n)"),
    ]
}

/// One listing example per populated node type (plus a name lookup when
/// the type has `name`), one per relationship type using its most common
/// pattern, then the meta examples.
pub fn derive_examples(schema: &SchemaDescription) -> Vec<WorkedExample> {
    let mut examples = Vec::new();

    for (label, category) in schema.nodes.iter().filter(|(_, c)| c.count > 0) {
        let lower = label.to_lowercase();
        examples.push(WorkedExample::new(
            format!("List all {}s", lower),
            format!("MATCH (n:{}) RETURN n.name LIMIT 10", label),
        ));
        if category.properties.contains("name") {
            examples.push(WorkedExample::new(
                format!("Find {} by name", lower),
                format!(
                    "MATCH (n:{}) WHERE toLower(n.name) CONTAINS \"example\" RETURN n.name",
                    label
                ),
            ));
        }
    }

    for (rel_type, category) in &schema.relationships {
        if let Some(pattern) = category.most_common() {
            examples.push(WorkedExample::new(
                format!(
                    "Show {} {} relationships",
                    pattern.from,
                    rel_type.to_lowercase().replace('_', " ")
                ),
                format!(
                    "MATCH (a:{})-[:{}]->(b:{}) RETURN a.name, b.name LIMIT 10",
                    pattern.from, rel_type, pattern.to
                ),
            ));
        }
    }

    examples.extend(meta_examples());
    examples
}

/// Example set for whatever schema context is available
pub fn examples_for(context: &SchemaContext) -> Vec<WorkedExample> {
    match context.description() {
        Some(schema) => derive_examples(schema),
        None => meta_examples(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tests::people_schema;

    #[test]
    fn test_examples_follow_schema() {
        let examples = derive_examples(&people_schema());
        let questions: Vec<&str> = examples.iter().map(|e| e.question.as_str()).collect();
        assert_eq!(
            questions,
            vec![
                "List all persons",
                "Find person by name",
                "List all countrys",
                "Find country by name",
                "Show Person lives in relationships",
                "Show Person knows relationships",
                "What types of nodes are in the database?",
                "What relationships exist?",
                "How many nodes are there?",
            ]
        );
        assert_eq!(
            examples[4].query,
            "MATCH (a:Person)-[:LIVES_IN]->(b:Country) RETURN a.name, b.name LIMIT 10"
        );
    }

    #[test]
    fn test_empty_types_skipped() {
        let mut schema = SchemaDescription::default();
        schema.add_node_group("Ghost", &["name".to_string()], 0);
        assert_eq!(derive_examples(&schema), meta_examples());
    }

    #[test]
    fn test_unavailable_schema_gets_meta_examples() {
        let context = SchemaContext::Unavailable("schema discovery failed: down".to_string());
        assert_eq!(examples_for(&context).len(), 3);
    }
}
