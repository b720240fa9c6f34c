//! Prompt composition for text-to-Cypher

use crate::nlq::safety::REFUSAL;
use crate::schema::{SchemaContext, WorkedExample};
use std::fmt::Write;

/// Appended to every prompt, after the schema-derived examples
const REFUSAL_EXAMPLES: [(&str, &str); 2] = [
    ("Delete all nodes", REFUSAL),
    ("Create a new person named Eve", REFUSAL),
];

/// A composed prompt and the question it was built for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptDocument {
    pub question: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct PromptComposer {
    max_examples: usize,
}

impl PromptComposer {
    pub fn new(max_examples: usize) -> Self {
        Self { max_examples }
    }

    /// Deterministic for identical inputs. The question is interpolated
    /// verbatim on the final `question:` line.
    pub fn build_prompt(
        &self,
        question: &str,
        schema: &SchemaContext,
        examples: &[WorkedExample],
    ) -> PromptDocument {
        let mut text = String::from(
            "you are a cypher expert. convert natural language questions into read-only cypher queries.\n\n",
        );

        text.push_str("### Rules\n");
        text.push_str(
            "- only generate read queries that start with MATCH and end with a RETURN clause\n",
        );
        text.push_str("- never write CREATE, MERGE, SET, DELETE, DETACH, REMOVE or DROP\n");
        let _ = writeln!(
            text,
            "- if the question asks to change the data, answer exactly: {}",
            REFUSAL
        );
        self.push_constraints(&mut text, schema);

        let _ = write!(text, "\n### Schema\n```\n{}\n```\n", schema.render().trim_end());

        text.push_str("\n### Examples\n\n");
        for example in examples.iter().take(self.max_examples) {
            let _ = write!(text, "Q: {}\nA: {}\n\n", example.question, example.query);
        }
        for (question, answer) in REFUSAL_EXAMPLES {
            let _ = write!(text, "Q: {}\nA: {}\n\n", question, answer);
        }

        let _ = write!(text, "question: {}\n\n", question);
        text.push_str(
            "return only the cypher query, no explanation. the query must end with a RETURN clause.",
        );

        PromptDocument {
            question: question.to_string(),
            text,
        }
    }

    fn push_constraints(&self, text: &mut String, schema: &SchemaContext) {
        if !schema.is_constrained() {
            text.push_str(
                "- the schema is unknown; keep patterns generic, e.g. MATCH (n) RETURN n LIMIT 10\n",
            );
            return;
        }
        match schema.description() {
            Some(description) => {
                let labels: Vec<&str> = description.nodes.keys().map(String::as_str).collect();
                let rel_types: Vec<&str> =
                    description.relationships.keys().map(String::as_str).collect();
                let _ = writeln!(text, "- use only these node labels: {}", labels.join(", "));
                if !rel_types.is_empty() {
                    let _ = writeln!(
                        text,
                        "- use only these relationship types: {}",
                        rel_types.join(", ")
                    );
                }
                text.push_str("- use only property names listed in the schema, with exact case\n");
            }
            None => text.push_str(
                "- use only labels, relationship types and property names that appear in the schema\n",
            ),
        }
    }
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::new(10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::examples::derive_examples;
    use crate::schema::SchemaDescription;

    fn schema() -> SchemaDescription {
        let mut schema = SchemaDescription::default();
        schema.add_node_group("Person", &["name".to_string()], 2);
        schema.add_connection("KNOWS", Some("Person"), Some("Person"), 1);
        schema
    }

    #[test]
    fn test_question_is_verbatim_last_question_line() {
        let composer = PromptComposer::default();
        let question = r#"Who is "Bob"'s friend?"#;
        let doc = composer.build_prompt(question, &SchemaContext::Discovered(schema()), &[]);
        assert!(doc.text.contains(&format!("\nquestion: {}\n", question)));
        assert!(doc.text.ends_with("must end with a RETURN clause."));
        assert_eq!(doc.question, question);
    }

    #[test]
    fn test_refusal_examples_always_present() {
        let composer = PromptComposer::new(0);
        let examples = vec![WorkedExample::new("Delete all nodes", REFUSAL)];
        let doc = composer.build_prompt("q", &SchemaContext::Discovered(schema()), &examples);
        assert_eq!(doc.text.matches("Q: Delete all nodes").count(), 1);
        assert!(doc.text.contains("Q: Create a new person named Eve"));
        assert_eq!(doc.text.matches(&format!("A: {}", REFUSAL)).count(), 2);
    }

    #[test]
    fn test_examples_capped() {
        let composer = PromptComposer::new(2);
        let schema = schema();
        let examples = derive_examples(&schema);
        assert!(examples.len() > 2);
        let doc = composer.build_prompt("q", &SchemaContext::Discovered(schema), &examples);
        // two real examples plus the two refusal examples
        assert_eq!(doc.text.matches("\nQ: ").count(), 4);
    }

    #[test]
    fn test_deterministic() {
        let composer = PromptComposer::default();
        let context = SchemaContext::Discovered(schema());
        let examples = derive_examples(&schema());
        assert_eq!(
            composer.build_prompt("who knows whom", &context, &examples),
            composer.build_prompt("who knows whom", &context, &examples)
        );
    }

    #[test]
    fn test_constraints_follow_schema() {
        let composer = PromptComposer::default();
        let doc = composer.build_prompt("q", &SchemaContext::Discovered(schema()), &[]);
        assert!(doc.text.contains("- use only these node labels: Person\n"));
        assert!(doc.text.contains("- use only these relationship types: KNOWS\n"));

        let failed = SchemaContext::Unavailable("schema discovery failed: timeout".to_string());
        let doc = composer.build_prompt("q", &failed, &[]);
        assert!(doc.text.contains("the schema is unknown"));
        assert!(doc.text.contains("schema discovery failed: timeout"));
    }

    #[test]
    fn test_rules_present_for_every_schema_context() {
        let composer = PromptComposer::default();
        let contexts = [
            SchemaContext::Discovered(schema()),
            SchemaContext::Static("Person(name)".to_string()),
            SchemaContext::Unavailable("schema discovery failed: timeout".to_string()),
        ];
        for context in &contexts {
            let doc = composer.build_prompt("Remove Bob", context, &[]);
            let rules = doc.text.find("### Rules\n").unwrap();
            let schema = doc.text.find("### Schema\n").unwrap();
            assert!(rules < schema);
            assert!(doc.text.contains("- only generate read queries"));
            assert!(doc
                .text
                .contains("- never write CREATE, MERGE, SET, DELETE, DETACH, REMOVE or DROP\n"));
            assert!(doc.text.contains(&format!(
                "- if the question asks to change the data, answer exactly: {}\n",
                REFUSAL
            )));
        }
    }
}
