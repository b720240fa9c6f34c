//! Read-only enforcement for generated queries
//!
//! Every synthesized query passes through [`SafetyGate::enforce`] before it
//! can reach an executor. Anything containing a mutating verb as a whole word
//! is replaced wholesale by [`REFUSAL`].

use rustc_hash::FxHashSet;
use std::fmt;
use tracing::warn;

/// The only non-query text allowed past the gate
pub const REFUSAL: &str = "I can only read data, not modify it";

/// Verbs that make a query mutating, matched as whole uppercase words
pub const MUTATING_KEYWORDS: &[&str] = &[
    "DELETE", "DROP", "CREATE", "MERGE", "SET", "REMOVE", "DETACH", "ALTER", "INSERT", "UPDATE",
    "TRUNCATE",
];

/// Best query text extracted from a synthesizer, or the refusal sentence
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateQuery(String);

impl CandidateQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn refusal() -> Self {
        Self(REFUSAL.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_refusal(&self) -> bool {
        self.0 == REFUSAL
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CandidateQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CandidateQuery {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Split on anything that cannot be part of an identifier
fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
}

/// Static read-only classifier.
///
/// The mutating verbs are always denied; extra keywords can be added but
/// never removed.
#[derive(Debug, Clone)]
pub struct SafetyGate {
    denylist: FxHashSet<String>,
}

impl SafetyGate {
    pub fn new() -> Self {
        Self {
            denylist: MUTATING_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Deny `keywords` on top of the mutating verbs; compared uppercased
    pub fn with_additional<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.denylist.extend(
            keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_uppercase())
                .filter(|k| !k.is_empty()),
        );
        self
    }

    /// Whether a single word is on the denylist
    pub fn denies(&self, word: &str) -> bool {
        self.denylist.contains(&word.to_uppercase())
    }

    /// Denylisted words found in `query`, in order of first appearance
    pub fn violations(&self, query: &str) -> Vec<String> {
        let upper = query.to_uppercase();
        let mut seen = FxHashSet::default();
        words(&upper)
            .filter(|w| self.denylist.contains(*w))
            .filter(|w| seen.insert(w.to_string()))
            .map(str::to_string)
            .collect()
    }

    pub fn is_read_only(&self, query: &str) -> bool {
        let upper = query.to_uppercase();
        let mutating = words(&upper).any(|w| self.denylist.contains(w));
        !mutating
    }

    /// Pass a read-only candidate through untouched, otherwise refuse
    pub fn enforce(&self, candidate: CandidateQuery) -> CandidateQuery {
        let violations = self.violations(candidate.as_str());
        if violations.is_empty() {
            return candidate;
        }
        warn!(
            "Rejected mutating query (found {}): {}",
            violations.join(", "),
            candidate
        );
        CandidateQuery::refusal()
    }
}

impl Default for SafetyGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enforce(text: &str) -> String {
        SafetyGate::new().enforce(CandidateQuery::new(text)).into_string()
    }

    #[test]
    fn test_read_query_unchanged() {
        assert_eq!(enforce("MATCH (n) RETURN n"), "MATCH (n) RETURN n");
    }

    #[test]
    fn test_create_refused() {
        assert_eq!(enforce("CREATE (n) RETURN n"), REFUSAL);
        assert_eq!(enforce("match (n) detach delete n"), REFUSAL);
    }

    #[test]
    fn test_substring_does_not_trigger() {
        let query = "MATCH (n) WHERE n.createdAt > 0 RETURN n";
        assert_eq!(enforce(query), query);
        let query = "MATCH (n:Dataset) RETURN n.offset";
        assert_eq!(enforce(query), query);
    }

    #[test]
    fn test_set_inside_read_shape_refused() {
        assert_eq!(enforce("MATCH (n) SET n.x = 1 RETURN n"), REFUSAL);
    }

    #[test]
    fn test_refusal_passes_gate() {
        assert!(SafetyGate::new().enforce(CandidateQuery::refusal()).is_refusal());
    }

    #[test]
    fn test_violations_ordered_and_unique() {
        let gate = SafetyGate::new();
        assert_eq!(
            gate.violations("MATCH (n) DETACH DELETE n WITH 1 AS x MATCH (m) DELETE m"),
            vec!["DETACH", "DELETE"]
        );
    }

    #[test]
    fn test_additional_keywords_extend_denylist() {
        let gate = SafetyGate::new().with_additional(["call", " load ", ""]);
        assert!(!gate.is_read_only("CALL db.labels()"));
        assert!(!gate.is_read_only("LOAD CSV FROM 'x' AS row RETURN row"));
        assert!(gate.denies("load"));
    }

    #[test]
    fn test_mutating_verbs_cannot_be_dropped() {
        let gate = SafetyGate::new().with_additional(["CALL"]);
        assert!(!gate.is_read_only("CREATE (n)"));
        let refused = gate.enforce(CandidateQuery::new("MATCH (n) DETACH DELETE n"));
        assert!(refused.is_refusal());
    }

    #[test]
    fn test_is_read_only_matches_enforce() {
        let gate = SafetyGate::default();
        assert!(gate.is_read_only("MATCH (n) RETURN n.updatedAt"));
        assert!(!gate.is_read_only("MATCH (n) REMOVE n.x"));
    }
}
