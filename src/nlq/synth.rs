//! Query synthesis: model output (or the offline intent table) to a
//! single candidate query

use crate::llm::TextGenerator;
use crate::nlq::intents::IntentTable;
use crate::nlq::prompt::PromptDocument;
use crate::nlq::safety::{CandidateQuery, REFUSAL};
use std::sync::Arc;
use tracing::{debug, warn};

/// Keywords that open a statement
const START_KEYWORDS: &[&str] = &[
    "MATCH", "OPTIONAL", "UNWIND", "CALL", "CREATE", "MERGE", "DELETE", "DETACH", "DROP", "REMOVE",
];

/// Keywords that continue the statement being captured
const CONTINUATION_KEYWORDS: &[&str] = &[
    "WHERE", "AND", "OR", "NOT", "XOR", "RETURN", "WITH", "ORDER", "SKIP", "LIMIT", "SET", "UNION",
    "OPTIONAL",
];

fn leading_word(line: &str) -> String {
    line.trim_start()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .next()
        .unwrap_or_default()
        .to_uppercase()
}

fn is_query_shaped(text: &str) -> bool {
    let word = leading_word(text);
    START_KEYWORDS.contains(&word.as_str()) || word == "WITH" || word == "RETURN"
}

/// A bare word such as `cypher` on the opening fence line. Keywords are
/// code, not tags.
fn is_language_tag(line: &str) -> bool {
    let tag = line.trim();
    if tag.is_empty() {
        return true;
    }
    let word = tag.to_uppercase();
    tag.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        && !START_KEYWORDS.contains(&word.as_str())
        && !CONTINUATION_KEYWORDS.contains(&word.as_str())
}

fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")? + 3;
    let end = start + text[start..].find("```")?;
    let mut inner = &text[start..end];
    if let Some(newline) = inner.find('\n') {
        if is_language_tag(&inner[..newline]) {
            inner = &inner[newline + 1..];
        }
    }
    let body = inner.trim();
    (!body.is_empty()).then_some(body)
}

fn scan_lines(text: &str) -> Option<String> {
    let mut captured: Vec<&str> = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if captured.is_empty() {
                continue;
            }
            break;
        }

        let word = leading_word(trimmed);
        if captured.is_empty() {
            if START_KEYWORDS.contains(&word.as_str()) {
                captured.push(trimmed);
            }
        } else if CONTINUATION_KEYWORDS.contains(&word.as_str()) {
            captured.push(trimmed);
        } else if START_KEYWORDS.contains(&word.as_str()) {
            // a new statement begins; drop the partial one
            captured.clear();
            captured.push(trimmed);
        } else {
            break;
        }
    }
    (!captured.is_empty()).then(|| captured.join(" "))
}

fn normalize(query: &str) -> String {
    query.trim().trim_end_matches(';').trim_end().to_string()
}

/// Pull the query out of free-form model output: first fenced block, else
/// the first keyword-led run of lines, else the whole text.
pub fn extract_query(response: &str) -> String {
    let trimmed = response.trim();
    if let Some(body) = fenced_block(trimmed) {
        return normalize(body);
    }
    if let Some(query) = scan_lines(trimmed) {
        return normalize(&query);
    }
    normalize(trimmed)
}

pub enum SynthBackend {
    Model(Arc<dyn TextGenerator>),
    Offline,
}

pub struct QuerySynthesizer {
    backend: SynthBackend,
    intents: IntentTable,
}

impl QuerySynthesizer {
    pub fn offline() -> Self {
        Self {
            backend: SynthBackend::Offline,
            intents: IntentTable::default(),
        }
    }

    pub fn with_model(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            backend: SynthBackend::Model(generator),
            intents: IntentTable::default(),
        }
    }

    /// Build from an optional generator; `None` means offline
    pub fn from_generator(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        match generator {
            Some(generator) => Self::with_model(generator),
            None => Self::offline(),
        }
    }

    pub fn with_intents(mut self, intents: IntentTable) -> Self {
        self.intents = intents;
        self
    }

    pub fn is_live(&self) -> bool {
        matches!(self.backend, SynthBackend::Model(_))
    }

    fn offline_query(&self, question: &str) -> CandidateQuery {
        let (intent, query) = self.intents.resolve(question);
        debug!("Offline intent {:?} for question: {}", intent, question);
        CandidateQuery::new(query)
    }

    /// Best candidate for the prompt. Model failures and unusable output
    /// fall back to the offline intent table; the result is not yet gated.
    pub async fn generate_query(&self, prompt: &PromptDocument) -> CandidateQuery {
        let generator = match &self.backend {
            SynthBackend::Offline => return self.offline_query(&prompt.question),
            SynthBackend::Model(generator) => generator,
        };

        let response = match generator.complete(&prompt.text).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Model call failed, using offline intents: {}", e);
                return self.offline_query(&prompt.question);
            }
        };
        debug!("Raw model output: {}", response);

        let query = extract_query(&response);
        if query.starts_with(REFUSAL) {
            return CandidateQuery::refusal();
        }
        if is_query_shaped(&query) {
            return CandidateQuery::new(query);
        }
        warn!("No query found in model output, using offline intents");
        self.offline_query(&prompt.question)
    }
}
