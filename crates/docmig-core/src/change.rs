//! Diff records, document previews, and summary groups.
//!
//! All types here are values: produced once per preview run, never mutated
//! afterwards, and never persisted.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::Document;
use crate::enums::ChangeOperation;

/// Result of evaluating one attribute template against one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AttributeChange {
    /// Dot path of the attribute (e.g. `"user.address.city"`).
    pub path: String,

    pub operation: ChangeOperation,

    /// Value read at `path` before the change. Populated for update and delete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,

    /// Value written at `path`. Populated for create and update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
}

/// Result of applying one document-level template to one matched document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PreviewChange {
    pub operation: ChangeOperation,
    pub document_id: String,
    pub collection_path: String,

    /// Document state before the change. Absent for create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<Document>,

    /// Document state after the change. Absent for delete.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<Document>,

    #[serde(default)]
    pub changes: Vec<AttributeChange>,
}

impl PreviewChange {
    /// Paths touched by this change, in diff order.
    #[must_use]
    pub fn changed_paths(&self) -> Vec<&str> {
        self.changes.iter().map(|c| c.path.as_str()).collect()
    }

    /// Split off the document id, leaving the shape shared by a summary group.
    #[must_use]
    pub fn into_shape(self) -> (String, ChangeShape) {
        let Self {
            operation,
            document_id,
            collection_path,
            before,
            after,
            changes,
        } = self;
        (
            document_id,
            ChangeShape {
                operation,
                collection_path,
                before,
                after,
                changes,
            },
        )
    }
}

/// A `PreviewChange` without its document id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChangeShape {
    pub operation: ChangeOperation,
    pub collection_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<Document>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<Document>,
    #[serde(default)]
    pub changes: Vec<AttributeChange>,
}

/// Structurally identical changes across many documents, collapsed into one shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PreviewChangeSummaryGroup {
    pub collection_path: String,
    pub document_ids: Vec<String>,
    /// Shape of the first change seen for this group.
    pub change: ChangeShape,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> PreviewChange {
        PreviewChange {
            operation: ChangeOperation::Update,
            document_id: "doc1".into(),
            collection_path: "users".into(),
            before: json!({"age": 25}).as_object().cloned(),
            after: json!({"age": 26}).as_object().cloned(),
            changes: vec![AttributeChange {
                path: "age".into(),
                operation: ChangeOperation::Update,
                old_value: Some(json!(25)),
                new_value: Some(json!(26)),
            }],
        }
    }

    #[test]
    fn into_shape_keeps_everything_but_the_id() {
        let change = sample();
        let (id, shape) = change.clone().into_shape();
        assert_eq!(id, "doc1");
        assert_eq!(shape.collection_path, change.collection_path);
        assert_eq!(shape.before, change.before);
        assert_eq!(shape.after, change.after);
        assert_eq!(shape.changes, change.changes);
    }

    #[test]
    fn absent_values_are_omitted_from_json() {
        let change = AttributeChange {
            path: "age".into(),
            operation: ChangeOperation::Update,
            old_value: Some(json!(30)),
            new_value: None,
        };
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(
            json,
            json!({"path": "age", "operation": "update", "old_value": 30})
        );
    }

    #[test]
    fn changed_paths_follow_diff_order() {
        let mut change = sample();
        change.changes.push(AttributeChange {
            path: "name".into(),
            operation: ChangeOperation::Update,
            old_value: None,
            new_value: Some(json!("x")),
        });
        assert_eq!(change.changed_paths(), vec!["age", "name"]);
    }
}
