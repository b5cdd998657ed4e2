//! Document snapshots.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Schemaless document body: a JSON object keyed by field name.
pub type Document = Map<String, Value>;

/// A document as read from a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DocumentSnapshot {
    pub id: String,
    pub data: Document,
}

impl DocumentSnapshot {
    #[must_use]
    pub fn new(id: impl Into<String>, data: Document) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Build a snapshot from a JSON value. Non-object values yield an empty body.
    #[must_use]
    pub fn from_value(id: impl Into<String>, value: Value) -> Self {
        let data = match value {
            Value::Object(map) => map,
            _ => Document::new(),
        };
        Self::new(id, data)
    }
}
