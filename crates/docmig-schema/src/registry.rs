//! Central schema registry for docmig's own formats.
//!
//! The `SchemaRegistry` builds JSON Schemas from docmig types at construction
//! time using [`schemars::schema_for!`] and provides validation via
//! `jsonschema`. `docmig schema show <name>` prints entries from here.

use std::collections::HashMap;

use schemars::schema_for;
use serde_json::Value;

use crate::error::SchemaError;

/// Store of the JSON Schemas for script files, previews, and reports.
pub struct SchemaRegistry {
    schemas: HashMap<&'static str, Value>,
}

macro_rules! register {
    ($map:expr, $name:expr, $ty:ty) => {
        $map.insert($name, schema_for!($ty).to_value());
    };
}

impl SchemaRegistry {
    #[must_use]
    pub fn new() -> Self {
        let mut schemas = HashMap::new();

        // --- Input formats ---
        register!(schemas, "script_file", docmig_core::script::ScriptFile);
        register!(
            schemas,
            "document_snapshot",
            docmig_core::document::DocumentSnapshot
        );

        // --- Previews ---
        register!(schemas, "preview_change", docmig_core::change::PreviewChange);
        register!(
            schemas,
            "summary_group",
            docmig_core::change::PreviewChangeSummaryGroup
        );
        register!(schemas, "preview_row", docmig_core::responses::PreviewRow);
        register!(schemas, "summary_row", docmig_core::responses::SummaryRow);

        // --- Reports ---
        register!(
            schemas,
            "migration_outcome",
            docmig_core::responses::MigrationOutcome
        );
        register!(
            schemas,
            "migrate_response",
            docmig_core::responses::MigrateResponse
        );
        register!(
            schemas,
            "validation_error",
            crate::validate::ValidationError
        );
        register!(
            schemas,
            "merged_validation_error",
            crate::merge::MergedValidationError
        );

        Self { schemas }
    }

    /// Get a schema by name. Returns `None` if not found.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }

    /// Validate a JSON value against a named schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` if the schema name is unknown, or
    /// `SchemaError::ValidationFailed` if validation produces errors.
    pub fn validate(&self, name: &str, instance: &Value) -> Result<(), SchemaError> {
        let schema = self
            .get(name)
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))?;

        let validator = jsonschema::validator_for(schema)
            .map_err(|e| SchemaError::InvalidSchema(format!("{e}")))?;

        let errors: Vec<String> = validator
            .iter_errors(instance)
            .map(|e| format!("{e}"))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::ValidationFailed { errors })
        }
    }

    /// All registered schema names, sorted.
    #[must_use]
    pub fn list(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.schemas.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::new()
    }

    #[test]
    fn registry_has_expected_count() {
        // 2 inputs + 4 previews + 4 reports
        assert_eq!(registry().list().len(), 10);
    }

    #[test]
    fn registry_list_is_sorted() {
        let names = registry().list();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn get_nonexistent_schema() {
        assert!(registry().get("nonexistent").is_none());
    }

    #[test]
    fn script_file_schema_accepts_valid_script() {
        let script = json!({
            "changes": [{
                "operation": "update",
                "collection": "users",
                "where": [{"path": "status", "op": "eq", "value": "active"}],
                "attributes": [{"path": "age", "operation": "update", "value": 31}]
            }]
        });
        assert!(registry().validate("script_file", &script).is_ok());
    }

    #[test]
    fn script_file_schema_rejects_unknown_operation() {
        let script = json!({
            "changes": [{"operation": "upsert", "collection": "users"}]
        });
        let result = registry().validate("script_file", &script);
        assert!(matches!(result, Err(SchemaError::ValidationFailed { .. })));
    }

    #[test]
    fn validate_nonexistent_schema_returns_not_found() {
        let result = registry().validate("bogus", &json!({}));
        assert!(matches!(result, Err(SchemaError::NotFound(_))));
    }

    #[test]
    fn validation_error_schema_accepts_real_errors() {
        let errors = crate::validate::validate_collection(
            &json!({"type": "object", "required": ["name"]}),
            &[docmig_core::document::DocumentSnapshot::from_value("a", json!({}))],
        )
        .unwrap();
        let value = serde_json::to_value(&errors[0]).unwrap();
        assert!(registry().validate("validation_error", &value).is_ok());
    }
}
