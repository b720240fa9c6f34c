//! Attribute values carried by extracted entities
//!
//! Values arrive as arbitrary JSON from a model and leave as Cypher
//! literals, so only the types Cypher can store as node properties are kept.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

/// Property value attached to an extracted entity
///
/// Supports:
/// - String
/// - Integer (i64)
/// - Float (f64)
/// - Boolean
/// - List (homogeneous or not; Cypher decides at ingestion)
/// - Null
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    List(Vec<AttributeValue>),
    Null,
}

impl AttributeValue {
    /// Convert a JSON value. Objects cannot be node properties and are kept
    /// as their JSON text.
    pub fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => AttributeValue::Null,
            Value::Bool(b) => AttributeValue::Boolean(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => AttributeValue::Integer(i),
                None => AttributeValue::Float(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => AttributeValue::String(s.clone()),
            Value::Array(items) => {
                AttributeValue::List(items.iter().map(Self::from_json).collect())
            }
            Value::Object(_) => AttributeValue::String(value.to_string()),
        }
    }

    /// Null or an empty/blank string: not worth storing
    pub fn is_blank(&self) -> bool {
        match self {
            AttributeValue::Null => true,
            AttributeValue::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Render as a Cypher literal
    pub fn to_cypher(&self) -> String {
        self.to_string()
    }
}

/// Escape a string for use inside a double-quoted Cypher literal
pub fn escape_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

/// Double- or single-quoted Cypher string literal, escapes included
pub(crate) fn string_literal_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#""(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'"#)
            .expect("valid string literal regex")
    })
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::String(s) => write!(f, "\"{}\"", escape_string(s)),
            AttributeValue::Integer(i) => write!(f, "{}", i),
            AttributeValue::Float(fl) => write!(f, "{:?}", fl),
            AttributeValue::Boolean(b) => write!(f, "{}", b),
            AttributeValue::List(items) => {
                write!(f, "[")?;
                for (i, val) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", val)?;
                }
                write!(f, "]")
            }
            AttributeValue::Null => write!(f, "null"),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::String(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::String(s)
    }
}

impl From<i64> for AttributeValue {
    fn from(i: i64) -> Self {
        AttributeValue::Integer(i)
    }
}

impl From<f64> for AttributeValue {
    fn from(f: f64) -> Self {
        AttributeValue::Float(f)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Boolean(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json() {
        assert_eq!(AttributeValue::from_json(&json!(30)), AttributeValue::Integer(30));
        assert_eq!(AttributeValue::from_json(&json!(1.5)), AttributeValue::Float(1.5));
        assert_eq!(AttributeValue::from_json(&json!("x")), AttributeValue::from("x"));
        assert_eq!(AttributeValue::from_json(&json!(null)), AttributeValue::Null);
        assert_eq!(
            AttributeValue::from_json(&json!({"a": 1})),
            AttributeValue::String("{\"a\":1}".to_string())
        );
        assert_eq!(
            AttributeValue::from_json(&json!([1, "b"])),
            AttributeValue::List(vec![AttributeValue::Integer(1), AttributeValue::from("b")])
        );
    }

    #[test]
    fn test_cypher_literals() {
        assert_eq!(AttributeValue::from("Alice").to_cypher(), "\"Alice\"");
        assert_eq!(AttributeValue::Integer(42).to_cypher(), "42");
        assert_eq!(AttributeValue::Float(2.0).to_cypher(), "2.0");
        assert_eq!(AttributeValue::Boolean(true).to_cypher(), "true");
        assert_eq!(
            AttributeValue::List(vec![1i64.into(), "a".into()]).to_cypher(),
            "[1, \"a\"]"
        );
    }

    #[test]
    fn test_embedded_quotes_are_escaped() {
        let value = AttributeValue::from(r#"the "best" \ corp"#);
        assert_eq!(value.to_cypher(), r#""the \"best\" \\ corp""#);
    }

    #[test]
    fn test_blank_values() {
        assert!(AttributeValue::Null.is_blank());
        assert!(AttributeValue::from("  ").is_blank());
        assert!(!AttributeValue::Integer(0).is_blank());
        assert!(!AttributeValue::from("x").is_blank());
    }

    #[test]
    fn test_string_literal_regex_spans_escapes() {
        let text = r#"MERGE (c {name: "Acme \"Best\" Corp", nick: 'it\'s'})"#;
        let literals: Vec<&str> = string_literal_regex()
            .find_iter(text)
            .map(|m| m.as_str())
            .collect();
        assert_eq!(literals, vec![r#""Acme \"Best\" Corp""#, r"'it\'s'"]);
    }
}
