//! Display projections of previews and migration results.
//!
//! These are the rows the CLI renders; they flatten each change's diffs into
//! parallel arrays so a table shows one line per document or per group.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::change::{AttributeChange, PreviewChange, PreviewChangeSummaryGroup};
use crate::enums::ChangeOperation;

/// One previewed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PreviewRow {
    pub collection: String,
    pub document: String,
    pub operation: ChangeOperation,
    pub attributes: Vec<String>,
    pub attributes_operation: Vec<ChangeOperation>,
    pub attributes_before: Vec<Value>,
    pub attributes_after: Vec<Value>,
}

/// One summary group of identical changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SummaryRow {
    pub collection: String,
    pub count: usize,
    pub documents: Vec<String>,
    pub operation: ChangeOperation,
    pub attributes: Vec<String>,
    pub attributes_operation: Vec<ChangeOperation>,
    pub attributes_before: Vec<Value>,
    pub attributes_after: Vec<Value>,
}

/// Result of one mutate pass over a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MigrationOutcome {
    pub collection_path: String,
    pub operation: ChangeOperation,
    /// Documents created, updated or deleted.
    pub written: usize,
    /// Batches committed to the store.
    pub batches: usize,
}

/// Response printed after `docmig migrate` finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MigrateResponse {
    pub previewed: usize,
    pub applied: bool,
    pub outcomes: Vec<MigrationOutcome>,
}

struct DiffColumns {
    attributes: Vec<String>,
    operations: Vec<ChangeOperation>,
    before: Vec<Value>,
    after: Vec<Value>,
}

fn diff_columns(changes: &[AttributeChange]) -> DiffColumns {
    DiffColumns {
        attributes: changes.iter().map(|c| c.path.clone()).collect(),
        operations: changes.iter().map(|c| c.operation).collect(),
        before: changes
            .iter()
            .map(|c| c.old_value.clone().unwrap_or(Value::Null))
            .collect(),
        after: changes
            .iter()
            .map(|c| c.new_value.clone().unwrap_or(Value::Null))
            .collect(),
    }
}

impl From<&PreviewChange> for PreviewRow {
    fn from(change: &PreviewChange) -> Self {
        let cols = diff_columns(&change.changes);
        Self {
            collection: change.collection_path.clone(),
            document: change.document_id.clone(),
            operation: change.operation,
            attributes: cols.attributes,
            attributes_operation: cols.operations,
            attributes_before: cols.before,
            attributes_after: cols.after,
        }
    }
}

impl From<&PreviewChangeSummaryGroup> for SummaryRow {
    fn from(group: &PreviewChangeSummaryGroup) -> Self {
        let cols = diff_columns(&group.change.changes);
        Self {
            collection: group.collection_path.clone(),
            count: group.document_ids.len(),
            documents: group.document_ids.clone(),
            operation: group.change.operation,
            attributes: cols.attributes,
            attributes_operation: cols.operations,
            attributes_before: cols.before,
            attributes_after: cols.after,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::ChangeShape;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn diff() -> AttributeChange {
        AttributeChange {
            path: "age".into(),
            operation: ChangeOperation::Update,
            old_value: Some(json!(25)),
            new_value: Some(json!(26)),
        }
    }

    #[test]
    fn preview_row_flattens_diffs() {
        let change = PreviewChange {
            operation: ChangeOperation::Update,
            document_id: "doc1".into(),
            collection_path: "users".into(),
            before: None,
            after: None,
            changes: vec![diff()],
        };
        let row = PreviewRow::from(&change);
        assert_eq!(row.collection, "users");
        assert_eq!(row.document, "doc1");
        assert_eq!(row.attributes, vec!["age".to_string()]);
        assert_eq!(row.attributes_operation, vec![ChangeOperation::Update]);
        assert_eq!(row.attributes_before, vec![json!(25)]);
        assert_eq!(row.attributes_after, vec![json!(26)]);
    }

    #[test]
    fn summary_row_counts_documents() {
        let group = PreviewChangeSummaryGroup {
            collection_path: "users".into(),
            document_ids: vec!["a".into(), "b".into()],
            change: ChangeShape {
                operation: ChangeOperation::Delete,
                collection_path: "users".into(),
                before: None,
                after: None,
                changes: vec![],
            },
        };
        let row = SummaryRow::from(&group);
        assert_eq!(row.count, 2);
        assert_eq!(row.documents, vec!["a".to_string(), "b".to_string()]);
        assert!(row.attributes.is_empty());
    }

    #[test]
    fn missing_values_render_as_null() {
        let mut d = diff();
        d.new_value = None;
        let cols = diff_columns(&[d]);
        assert_eq!(cols.after, vec![Value::Null]);
    }
}
