//! Item-schema inference from sample documents.
//!
//! Every document of a collection is folded into one [`Shape`]: the JSON types
//! seen at each location, the properties of objects, and the item shape of
//! arrays. A property is `required` when every object observed at that
//! location carried it.

use std::collections::BTreeMap;

use docmig_core::document::DocumentSnapshot;
use serde_json::{Map, Value, json};

use crate::error::SchemaError;

#[derive(Debug, Default)]
struct Shape {
    /// JSON type names in first-seen order.
    types: Vec<&'static str>,
    properties: BTreeMap<String, Shape>,
    presence: BTreeMap<String, usize>,
    objects_seen: usize,
    items: Option<Box<Shape>>,
}

impl Shape {
    fn observe(&mut self, value: &Value) {
        self.note_type(type_name(value));
        match value {
            Value::Object(map) => self.observe_object(map),
            Value::Array(items) => {
                for item in items {
                    self.items.get_or_insert_with(Box::default).observe(item);
                }
            }
            _ => {}
        }
    }

    fn observe_object(&mut self, map: &Map<String, Value>) {
        self.objects_seen += 1;
        for (key, value) in map {
            *self.presence.entry(key.clone()).or_default() += 1;
            self.properties.entry(key.clone()).or_default().observe(value);
        }
    }

    fn note_type(&mut self, name: &'static str) {
        if self.types.contains(&name) {
            return;
        }
        // Integers widen into numbers.
        if name == "integer" && self.types.contains(&"number") {
            return;
        }
        if name == "number" {
            self.types.retain(|t| *t != "integer");
        }
        self.types.push(name);
    }

    fn to_schema(&self) -> Value {
        let mut schema = Map::new();
        match self.types.as_slice() {
            [] => {}
            [single] => {
                schema.insert("type".into(), json!(single));
            }
            many => {
                schema.insert("type".into(), json!(many));
            }
        }

        if self.types.contains(&"object") {
            let properties: Map<String, Value> = self
                .properties
                .iter()
                .map(|(key, shape)| (key.clone(), shape.to_schema()))
                .collect();
            let required: Vec<&String> = self
                .presence
                .iter()
                .filter(|(_, seen)| **seen == self.objects_seen)
                .map(|(key, _)| key)
                .collect();
            schema.insert("properties".into(), Value::Object(properties));
            if !required.is_empty() {
                schema.insert("required".into(), json!(required));
            }
        }

        if let Some(items) = &self.items {
            schema.insert("items".into(), items.to_schema());
        }
        Value::Object(schema)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Infer the schema of one document of `collection` from all its documents.
///
/// # Errors
///
/// Returns `SchemaError::EmptyCollection` if there are no documents.
pub fn infer_item_schema(
    collection: &str,
    documents: &[DocumentSnapshot],
) -> Result<Value, SchemaError> {
    if documents.is_empty() {
        return Err(SchemaError::EmptyCollection(collection.to_string()));
    }
    let mut shape = Shape::default();
    for doc in documents {
        shape.note_type("object");
        shape.observe_object(&doc.data);
    }
    let schema = shape.to_schema();
    tracing::debug!(collection, documents = documents.len(), "item schema inferred");
    Ok(schema)
}
