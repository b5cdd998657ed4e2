//! Collapsing of identical validation errors.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validate::ValidationError;

/// A validation error that occurred at one or more instance paths.
///
/// `error.instance_path` holds the first path until a second occurrence is
/// merged; from then on it is the comma-joined `instance_paths`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MergedValidationError {
    #[serde(flatten)]
    pub error: ValidationError,
    pub instance_paths: Vec<String>,
}

impl MergedValidationError {
    fn same_rule(&self, other: &ValidationError) -> bool {
        self.error.keyword == other.keyword
            && self.error.message == other.message
            && self.error.schema_path == other.schema_path
            && canonical(&self.error.params) == canonical(&other.params)
    }
}

/// Compact JSON text with object keys sorted, so key order never splits groups.
fn canonical(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let body: Vec<String> = entries
                .into_iter()
                .map(|(key, item)| format!("{}:{}", Value::String(key.clone()), canonical(item)))
                .collect();
            format!("{{{}}}", body.join(","))
        }
        Value::Array(items) => {
            let body: Vec<String> = items.iter().map(canonical).collect();
            format!("[{}]", body.join(","))
        }
        other => other.to_string(),
    }
}

/// Merge errors sharing keyword, message, params and schema path.
///
/// Output order is the order in which each distinct error first appears.
/// Expanding `instance_paths` of the result gives back exactly the input paths.
#[must_use]
pub fn merge_validation_errors(errors: &[ValidationError]) -> Vec<MergedValidationError> {
    let mut merged: Vec<MergedValidationError> = Vec::new();
    for error in errors {
        if let Some(existing) = merged.iter_mut().find(|m| m.same_rule(error)) {
            existing.instance_paths.push(error.instance_path.clone());
            existing.error.instance_path = existing.instance_paths.join(",");
        } else {
            merged.push(MergedValidationError {
                error: error.clone(),
                instance_paths: vec![error.instance_path.clone()],
            });
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn type_error(path: &str) -> ValidationError {
        ValidationError {
            keyword: "type".into(),
            instance_path: path.into(),
            schema_path: "#/items/properties/name/type".into(),
            params: json!({"type": "string"}),
            message: "must be string".into(),
        }
    }

    fn required_error(path: &str, property: &str) -> ValidationError {
        ValidationError {
            keyword: "required".into(),
            instance_path: path.into(),
            schema_path: "#/items/required".into(),
            params: json!({"missingProperty": property}),
            message: format!("must have required property '{property}'"),
        }
    }

    #[test]
    fn empty_input_merges_to_empty() {
        assert!(merge_validation_errors(&[]).is_empty());
    }

    #[test]
    fn single_error_keeps_its_path() {
        let merged = merge_validation_errors(&[type_error("/name")]);
        assert_eq!(
            merged,
            vec![MergedValidationError {
                error: type_error("/name"),
                instance_paths: vec!["/name".into()],
            }]
        );
    }

    #[test]
    fn identical_errors_collapse_and_join_paths() {
        let merged = merge_validation_errors(&[type_error("/0/name"), type_error("/1/name")]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].instance_paths, vec!["/0/name", "/1/name"]);
        assert_eq!(merged[0].error.instance_path, "/0/name,/1/name");
    }

    #[test]
    fn differing_params_stay_separate_in_first_seen_order() {
        let merged = merge_validation_errors(&[
            required_error("/0", "city"),
            type_error("/0/name"),
            required_error("/1", "zip"),
            required_error("/2", "city"),
        ]);
        let keys: Vec<(&str, Vec<String>)> = merged
            .iter()
            .map(|m| (m.error.keyword.as_str(), m.instance_paths.clone()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("required", vec!["/0".to_string(), "/2".to_string()]),
                ("type", vec!["/0/name".to_string()]),
                ("required", vec!["/1".to_string()]),
            ]
        );
    }

    #[test]
    fn merged_paths_round_trip_to_input_multiset() {
        let input = vec![
            type_error("/0/name"),
            required_error("/1", "city"),
            type_error("/2/name"),
            type_error("/3/name"),
        ];
        let merged = merge_validation_errors(&input);
        let mut expanded: Vec<String> = merged
            .iter()
            .flat_map(|m| m.instance_paths.iter().cloned())
            .collect();
        let mut original: Vec<String> = input.iter().map(|e| e.instance_path.clone()).collect();
        expanded.sort();
        original.sort();
        assert_eq!(expanded, original);
    }

    #[test]
    fn params_key_order_does_not_split_groups() {
        let mut a = type_error("/0/name");
        a.params = json!({"limit": 1, "type": "string"});
        let mut b = type_error("/1/name");
        let mut params = serde_json::Map::new();
        params.insert("type".into(), json!("string"));
        params.insert("limit".into(), json!(1));
        b.params = Value::Object(params);
        assert_eq!(merge_validation_errors(&[a, b]).len(), 1);
    }

    #[test]
    fn serializes_flat() {
        let merged = merge_validation_errors(&[type_error("/0/name")]);
        let value = serde_json::to_value(&merged[0]).unwrap();
        assert_eq!(value["keyword"], "type");
        assert_eq!(value["instance_paths"], json!(["/0/name"]));
    }
}
