//! Grouping of identical preview changes.

use std::collections::HashMap;

use docmig_core::change::{PreviewChange, PreviewChangeSummaryGroup};

fn group_key(change: &PreviewChange) -> String {
    format!(
        "{}_{}_{}",
        change.operation,
        change.collection_path,
        change.changed_paths().join(",")
    )
}

/// Collapse changes that share operation, collection, and ordered changed paths.
///
/// The first change of each group seeds its shape; later members contribute
/// only their document id. Groups are returned in first-seen order.
#[must_use]
pub fn summarize_preview_changes(changes: &[PreviewChange]) -> Vec<PreviewChangeSummaryGroup> {
    let mut groups: Vec<PreviewChangeSummaryGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for change in changes {
        let key = group_key(change);
        if let Some(&slot) = index.get(&key) {
            groups[slot].document_ids.push(change.document_id.clone());
            continue;
        }
        let (document_id, shape) = change.clone().into_shape();
        index.insert(key, groups.len());
        groups.push(PreviewChangeSummaryGroup {
            collection_path: shape.collection_path.clone(),
            document_ids: vec![document_id],
            change: shape,
        });
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmig_core::change::AttributeChange;
    use docmig_core::enums::ChangeOperation;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn change(op: ChangeOperation, collection: &str, id: &str, paths: &[&str]) -> PreviewChange {
        PreviewChange {
            operation: op,
            document_id: id.into(),
            collection_path: collection.into(),
            before: None,
            after: None,
            changes: paths
                .iter()
                .map(|p| AttributeChange {
                    path: (*p).into(),
                    operation: op,
                    old_value: None,
                    new_value: Some(json!(id)),
                })
                .collect(),
        }
    }

    #[test]
    fn same_path_updates_collapse_in_encounter_order() {
        let changes = vec![
            change(ChangeOperation::Update, "users", "doc1", &["age"]),
            change(ChangeOperation::Update, "users", "doc2", &["age"]),
        ];
        let groups = summarize_preview_changes(&changes);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].document_ids, vec!["doc1", "doc2"]);
        assert_eq!(groups[0].collection_path, "users");
        // The shape is the first member's.
        assert_eq!(
            groups[0].change.changes[0].new_value,
            Some(json!("doc1"))
        );
    }

    #[test]
    fn key_separates_operation_collection_and_path_order() {
        let changes = vec![
            change(ChangeOperation::Update, "users", "a", &["x", "y"]),
            change(ChangeOperation::Update, "users", "b", &["y", "x"]),
            change(ChangeOperation::Delete, "users", "c", &["x", "y"]),
            change(ChangeOperation::Update, "orders", "d", &["x", "y"]),
            change(ChangeOperation::Update, "users", "e", &["x", "y"]),
        ];
        let groups = summarize_preview_changes(&changes);
        let ids: Vec<Vec<String>> = groups.iter().map(|g| g.document_ids.clone()).collect();
        assert_eq!(
            ids,
            vec![
                vec!["a".to_string(), "e".to_string()],
                vec!["b".to_string()],
                vec!["c".to_string()],
                vec!["d".to_string()],
            ]
        );
    }

    #[test]
    fn group_sizes_sum_to_input_length() {
        let changes: Vec<PreviewChange> = (0..9)
            .map(|i| {
                let paths: &[&str] = if i % 3 == 0 { &["a"] } else { &["b"] };
                change(ChangeOperation::Update, "c", &format!("d{i}"), paths)
            })
            .collect();
        let groups = summarize_preview_changes(&changes);
        let total: usize = groups.iter().map(|g| g.document_ids.len()).sum();
        assert_eq!(total, changes.len());
    }

    #[test]
    fn empty_input_yields_no_groups() {
        assert!(summarize_preview_changes(&[]).is_empty());
    }
}
