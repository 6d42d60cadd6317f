//! Shared data types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use indexmap::IndexMap;
use std::fmt;

/// Aggregated result: identifier (as string) to cleaned record, in arrival order
pub type RecordMap = serde_json::Map<String, Value>;

/// Identifiers whose record carried at least one domain error, in record order
pub type ErrorMap = IndexMap<String, ErrorEntry>;

/// Taxpayer identifier as submitted to the registry.
///
/// Serialized untagged so `persona_ids` carries bare numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Number(u64),
    Text(String),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Number(n) => write!(f, "{}", n),
            Identifier::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for Identifier {
    fn from(value: u64) -> Self {
        Identifier::Number(value)
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Identifier::Text(value.to_string())
    }
}

/// Errors collected for one identifier.
///
/// A lone error is stored bare, several are kept as an ordered list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ErrorEntry {
    Single(Value),
    Many(Vec<Value>),
}

impl ErrorEntry {
    pub fn len(&self) -> usize {
        match self {
            ErrorEntry::Single(_) => 1,
            ErrorEntry::Many(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Raw answer of a service health probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: u16,
    pub body: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identifiers_serialize_bare() {
        let ids = vec![Identifier::from(20123456789), Identifier::from("A-1")];
        assert_eq!(serde_json::to_value(&ids).unwrap(), json!([20123456789u64, "A-1"]));
        assert_eq!(ids[0].to_string(), "20123456789");
    }

    #[test]
    fn error_entry_shapes() {
        let single = ErrorEntry::Single(json!("bad id"));
        let many = ErrorEntry::Many(vec![json!("e1"), json!("e2")]);
        assert_eq!(serde_json::to_value(&single).unwrap(), json!("bad id"));
        assert_eq!(serde_json::to_value(&many).unwrap(), json!(["e1", "e2"]));
        assert_eq!(many.len(), 2);
    }
}
