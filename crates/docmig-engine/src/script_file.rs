//! Loading declarative migration scripts from TOML or JSON files.

use std::path::Path;
use std::sync::Arc;

use docmig_core::path::get_nested_value_or;
use docmig_core::script::{Condition, ScriptAttribute, ScriptFile, ScriptTemplate};
use docmig_schema::{SchemaError, SchemaRegistry};
use serde_json::Value;

use crate::attribute::{AttributeChangeTemplate, ValueSource};
use crate::error::EngineError;
use crate::script::{MigrationScript, ScriptExports};
use crate::template::PreviewChangeTemplate;

/// Serialization format of a script file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptFormat {
    Toml,
    Json,
}

impl ScriptFormat {
    /// Pick the format from a file extension.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidScript` for anything but `.toml` or `.json`.
    pub fn from_path(path: &Path) -> Result<Self, EngineError> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            _ => Err(EngineError::InvalidScript(format!(
                "unsupported script file {} (expected .toml or .json)",
                path.display()
            ))),
        }
    }
}

/// Read and validate a script file.
///
/// # Errors
///
/// Returns `EngineError::ScriptIo` if the file cannot be read, or
/// `InvalidScript` if it does not parse or exports no `changes`.
pub fn load_script_file(path: &Path) -> Result<MigrationScript, EngineError> {
    let format = ScriptFormat::from_path(path)?;
    let text = std::fs::read_to_string(path).map_err(|source| EngineError::ScriptIo {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), ?format, "loading script");
    parse_script(&text, format)
}

/// Parse script text.
///
/// # Errors
///
/// Returns `EngineError::InvalidScript` on syntax errors, a document that
/// does not match the `script_file` schema, a missing `changes` list, a
/// `where` value that disagrees with its operator, or an attribute carrying
/// both `value` and `copy_from`.
pub fn parse_script(text: &str, format: ScriptFormat) -> Result<MigrationScript, EngineError> {
    let raw: Value = match format {
        ScriptFormat::Toml => {
            toml::from_str(text).map_err(|e| EngineError::InvalidScript(e.to_string()))?
        }
        ScriptFormat::Json => {
            serde_json::from_str(text).map_err(|e| EngineError::InvalidScript(e.to_string()))?
        }
    };
    check_shape(&raw)?;
    let file: ScriptFile =
        serde_json::from_value(raw).map_err(|e| EngineError::InvalidScript(e.to_string()))?;
    let changes = match file.changes {
        Some(templates) => Some(
            templates
                .into_iter()
                .map(into_template)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        None => None,
    };
    ScriptExports {
        changes,
        ..ScriptExports::default()
    }
    .into_script()
}

fn check_shape(raw: &Value) -> Result<(), EngineError> {
    match SchemaRegistry::new().validate("script_file", raw) {
        Ok(()) => Ok(()),
        Err(SchemaError::ValidationFailed { errors }) => {
            Err(EngineError::InvalidScript(errors.join("; ")))
        }
        Err(other) => Err(EngineError::InvalidScript(other.to_string())),
    }
}

fn check_condition(collection: &str, condition: &Condition) -> Result<(), EngineError> {
    match (condition.op.takes_value(), condition.value.is_some()) {
        (true, false) => Err(EngineError::InvalidScript(format!(
            "condition `{}` on '{}' in {collection} needs a `value`",
            condition.op, condition.path
        ))),
        (false, true) => Err(EngineError::InvalidScript(format!(
            "condition `{}` on '{}' in {collection} does not take a `value`",
            condition.op, condition.path
        ))),
        _ => Ok(()),
    }
}

fn into_template(script: ScriptTemplate) -> Result<PreviewChangeTemplate, EngineError> {
    for condition in &script.conditions {
        check_condition(&script.collection, condition)?;
    }
    let mut template = PreviewChangeTemplate::new(script.operation, script.collection);
    if !script.conditions.is_empty() {
        let conditions: Arc<[Condition]> = script.conditions.into();
        template = template.with_filter(move |doc| conditions.iter().all(|c| c.matches(doc)));
    }
    if let Some(attributes) = script.attributes {
        template.changes = Some(
            attributes
                .into_iter()
                .map(into_attribute)
                .collect::<Result<Vec<_>, _>>()?,
        );
    }
    Ok(template)
}

fn into_attribute(attribute: ScriptAttribute) -> Result<AttributeChangeTemplate, EngineError> {
    let value = match (attribute.value, attribute.copy_from) {
        (Some(_), Some(_)) => {
            return Err(EngineError::InvalidScript(format!(
                "attribute '{}' sets both `value` and `copy_from`",
                attribute.path
            )));
        }
        (Some(literal), None) => Some(ValueSource::Literal(literal)),
        (None, Some(source)) => Some(ValueSource::from_fn(move |doc| {
            get_nested_value_or(doc, &source, Value::Null)
        })),
        (None, None) => None,
    };
    Ok(AttributeChangeTemplate {
        path: attribute.path,
        operation: attribute.operation,
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::preview_all;
    use docmig_core::document::Document;
    use docmig_store::MemoryStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::io::Write;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("test documents must be objects"),
        }
    }

    fn templates(script: MigrationScript) -> Vec<PreviewChangeTemplate> {
        match script {
            MigrationScript::Templates(templates) => templates,
            MigrationScript::Custom(_) => panic!("expected templates"),
        }
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(
            ScriptFormat::from_path(Path::new("a/b.TOML")).unwrap(),
            ScriptFormat::Toml
        );
        assert_eq!(
            ScriptFormat::from_path(Path::new("b.json")).unwrap(),
            ScriptFormat::Json
        );
        assert!(ScriptFormat::from_path(Path::new("b.js")).is_err());
    }

    #[test]
    fn file_without_changes_is_invalid() {
        let err = parse_script(r#"description = "nothing""#, ScriptFormat::Toml).unwrap_err();
        assert!(matches!(err, EngineError::InvalidScript(_)));
    }

    #[test]
    fn syntax_error_is_invalid_script() {
        let err = parse_script("{ not json", ScriptFormat::Json).unwrap_err();
        assert!(matches!(err, EngineError::InvalidScript(_)));
    }

    #[test]
    fn value_and_copy_from_are_exclusive() {
        let text = r#"{"changes": [{"operation": "update", "collection": "users",
            "attributes": [{"path": "a", "operation": "update", "value": 1, "copy_from": "b"}]}]}"#;
        let err = parse_script(text, ScriptFormat::Json).unwrap_err();
        assert!(err.to_string().contains("both `value` and `copy_from`"));
    }

    #[test]
    fn comparison_without_value_is_rejected() {
        let text = r#"
            [[changes]]
            operation = "delete"
            collection = "users"
            where = [{ path = "status", op = "eq" }]
        "#;
        let err = parse_script(text, ScriptFormat::Toml).unwrap_err();
        assert!(matches!(err, EngineError::InvalidScript(_)));
        assert!(err.to_string().contains("needs a `value`"));
    }

    #[test]
    fn presence_check_with_value_is_rejected() {
        let text = r#"{"changes": [{"operation": "delete", "collection": "users",
            "where": [{"path": "legacy_name", "op": "exists", "value": true}]}]}"#;
        let err = parse_script(text, ScriptFormat::Json).unwrap_err();
        assert!(err.to_string().contains("does not take a `value`"));
    }

    #[test]
    fn unknown_operation_fails_schema_check() {
        let text = r#"{"changes": [{"operation": "upsert", "collection": "users"}]}"#;
        let err = parse_script(text, ScriptFormat::Json).unwrap_err();
        assert!(matches!(err, EngineError::InvalidScript(_)));
        assert!(err.to_string().contains("upsert"));
    }

    #[tokio::test]
    async fn conditions_and_copy_from_drive_the_preview() {
        let text = r#"
            [[changes]]
            operation = "update"
            collection = "users"
            where = [
                { path = "status", op = "eq", value = "active" },
                { path = "legacy_name", op = "exists" },
            ]

            [[changes.attributes]]
            path = "profile.name"
            operation = "update"
            copy_from = "legacy_name"

            [[changes.attributes]]
            path = "legacy_name"
            operation = "delete"
        "#;
        let store = MemoryStore::with_collection(
            "users",
            [
                ("a", doc(json!({"status": "active", "legacy_name": "Ada"}))),
                ("b", doc(json!({"status": "inactive", "legacy_name": "Bob"}))),
                ("c", doc(json!({"status": "active"}))),
            ],
        );
        let templates = templates(parse_script(text, ScriptFormat::Toml).unwrap());
        let previews = preview_all(&templates, &store).await.unwrap();
        assert_eq!(previews.len(), 1);
        assert_eq!(previews[0].document_id, "a");
        assert_eq!(
            previews[0].after,
            Some(doc(json!({"status": "active", "profile": {"name": "Ada"}})))
        );
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("purge.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"changes": [{{"operation": "delete", "collection": "sessions"}}]}}"#
        )
        .unwrap();

        let templates = templates(load_script_file(&path).unwrap());
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].collection_path, "sessions");
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = load_script_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, EngineError::ScriptIo { .. }));
    }

    #[tokio::test]
    async fn bundled_demo_script_runs() {
        let script = parse_script(
            include_str!("../../../demos/normalize-users.toml"),
            ScriptFormat::Toml,
        )
        .unwrap();
        let templates = templates(script);
        assert_eq!(templates.len(), 2);
        assert_eq!(
            templates[1].operation,
            docmig_core::enums::ChangeOperation::Delete
        );

        let store = MemoryStore::with_collection(
            "sessions",
            [
                ("s1", doc(json!({"expired": true}))),
                ("s2", doc(json!({"expired": false}))),
            ],
        );
        let previews = preview_all(&templates, &store).await.unwrap();
        assert_eq!(previews.len(), 1);
        assert_eq!(previews[0].document_id, "s1");
    }
}
