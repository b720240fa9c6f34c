//! Offline intent table
//!
//! Maps question wording to canned query skeletons without a model. Rules
//! are data: each one lists trigger groups, and every group needs at least
//! one whole-word (or whole-phrase) hit in the question. First match wins.

use crate::nlq::safety::REFUSAL;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    WriteRequest,
    PopulationByCategory,
    CrossCategoryJoin,
    RelationByAttribute,
    CategoryCount,
    Unconstrained,
}

#[derive(Debug, Clone)]
pub struct IntentRule {
    pub intent: Intent,
    pub triggers: Vec<Vec<String>>,
    pub query: String,
}

/// Lowercase, turn punctuation into spaces and pad, so phrases can be
/// matched on word boundaries with a plain substring search
fn normalize(text: &str) -> String {
    let words: Vec<String> = text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect();
    format!(" {} ", words.join(" "))
}

impl IntentRule {
    pub fn new(intent: Intent, query: impl Into<String>) -> Self {
        Self {
            intent,
            triggers: Vec::new(),
            query: query.into(),
        }
    }

    /// Add a trigger group; at least one of `words` must appear
    pub fn requires(mut self, words: &[&str]) -> Self {
        self.triggers
            .push(words.iter().map(|w| normalize(w)).collect());
        self
    }

    fn matches(&self, normalized_question: &str) -> bool {
        !self.triggers.is_empty()
            && self
                .triggers
                .iter()
                .all(|group| group.iter().any(|t| normalized_question.contains(t.as_str())))
    }
}

#[derive(Debug, Clone)]
pub struct IntentTable {
    rules: Vec<IntentRule>,
    fallback: String,
}

impl IntentTable {
    pub fn new(rules: Vec<IntentRule>, fallback: impl Into<String>) -> Self {
        Self {
            rules,
            fallback: fallback.into(),
        }
    }

    /// Append a rule after the existing ones
    pub fn with_rule(mut self, rule: IntentRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Matched intent and its query text
    pub fn resolve(&self, question: &str) -> (Intent, &str) {
        let normalized = normalize(question);
        self.rules
            .iter()
            .find(|rule| rule.matches(&normalized))
            .map(|rule| (rule.intent, rule.query.as_str()))
            .unwrap_or((Intent::Unconstrained, self.fallback.as_str()))
    }

    pub fn classify(&self, question: &str) -> Intent {
        self.resolve(question).0
    }
}

impl Default for IntentTable {
    fn default() -> Self {
        Self::new(
            vec![
                IntentRule::new(Intent::WriteRequest, REFUSAL).requires(&[
                    "delete", "remove", "drop", "create", "insert", "update", "merge", "detach",
                    "erase", "wipe",
                ]),
                IntentRule::new(Intent::PopulationByCategory, "MATCH (p:Person) RETURN p.name")
                    .requires(&["all people", "show people", "list people", "all persons"]),
                IntentRule::new(
                    Intent::CrossCategoryJoin,
                    "MATCH (p:Person)-[:LIVES_IN]->(c:Country) RETURN p.name, c.name",
                )
                .requires(&["country", "countries"])
                .requires(&["live", "lives", "living", "lived"]),
                IntentRule::new(
                    Intent::RelationByAttribute,
                    "MATCH (p:Person)-[:BUYS]->(pr:Product) RETURN p.name, pr.name",
                )
                .requires(&["buy", "buys", "bought", "buying", "product", "products"]),
                IntentRule::new(Intent::CategoryCount, "MATCH (n) RETURN count(n)")
                    .requires(&["count", "how many", "number of"]),
            ],
            "MATCH (n) RETURN n LIMIT 10",
        )
    }
}
