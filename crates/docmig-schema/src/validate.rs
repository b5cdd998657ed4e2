//! Validation of whole collections against an item schema.
//!
//! Every failure becomes a flat [`ValidationError`] record. Messages are
//! derived from the keyword and its schema parameters rather than from the
//! offending value, so the same rule broken by many documents produces
//! identical records that [`crate::merge`] can collapse.

use docmig_core::document::DocumentSnapshot;
use jsonschema::error::ValidationErrorKind;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::SchemaError;

/// One schema violation at one location of the validated collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationError {
    /// Failing schema keyword, e.g. `type` or `required`.
    pub keyword: String,
    /// JSON pointer into the collection array, e.g. `/0/age`.
    pub instance_path: String,
    /// Pointer to the failing keyword in the collection schema, `#`-prefixed.
    pub schema_path: String,
    pub params: Value,
    pub message: String,
}

impl ValidationError {
    fn from_jsonschema(schema: &Value, error: &jsonschema::ValidationError<'_>) -> Self {
        let pointer = error.schema_path.to_string();
        let keyword = pointer
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .unwrap_or("schema")
            .to_string();

        let params = match &error.kind {
            ValidationErrorKind::Required { property } => json!({ "missingProperty": property }),
            ValidationErrorKind::AdditionalProperties { unexpected } => {
                json!({ "additionalProperties": unexpected })
            }
            _ => {
                let mut map = Map::new();
                map.insert(
                    keyword.clone(),
                    schema.pointer(&pointer).cloned().unwrap_or(Value::Null),
                );
                Value::Object(map)
            }
        };

        let message = describe(&keyword, &params).unwrap_or_else(|| error.to_string());

        Self {
            keyword,
            instance_path: error.instance_path.to_string(),
            schema_path: format!("#{pointer}"),
            params,
            message,
        }
    }
}

/// Instance-independent message for the common keywords.
fn describe(keyword: &str, params: &Value) -> Option<String> {
    let param = params.get(keyword);
    let text = |v: Option<&Value>| match v {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    let message = match keyword {
        "type" => {
            let types = match param {
                Some(Value::Array(items)) => items
                    .iter()
                    .map(|t| text(Some(t)))
                    .collect::<Vec<_>>()
                    .join(","),
                other => text(other),
            };
            format!("must be {types}")
        }
        "required" => format!(
            "must have required property '{}'",
            text(params.get("missingProperty"))
        ),
        "additionalProperties" => "must NOT have additional properties".to_string(),
        "enum" => "must be equal to one of the allowed values".to_string(),
        "const" => "must be equal to constant".to_string(),
        "minimum" => format!("must be >= {}", text(param)),
        "maximum" => format!("must be <= {}", text(param)),
        "exclusiveMinimum" => format!("must be > {}", text(param)),
        "exclusiveMaximum" => format!("must be < {}", text(param)),
        "minLength" => format!("must NOT have fewer than {} characters", text(param)),
        "maxLength" => format!("must NOT have more than {} characters", text(param)),
        "minItems" => format!("must NOT have fewer than {} items", text(param)),
        "maxItems" => format!("must NOT have more than {} items", text(param)),
        "pattern" => format!("must match pattern \"{}\"", text(param)),
        "format" => format!("must match format \"{}\"", text(param)),
        _ => return None,
    };
    Some(message)
}

/// Wrap an item schema so it validates an array of documents.
#[must_use]
pub fn collection_schema(item_schema: &Value) -> Value {
    json!({
        "type": "array",
        "items": item_schema,
    })
}

/// Validate every document of a collection, collecting all violations.
///
/// An empty result means the collection is valid.
///
/// # Errors
///
/// Returns `SchemaError::InvalidSchema` if the item schema does not compile.
pub fn validate_collection(
    item_schema: &Value,
    documents: &[DocumentSnapshot],
) -> Result<Vec<ValidationError>, SchemaError> {
    let schema = collection_schema(item_schema);
    let validator = jsonschema::validator_for(&schema)
        .map_err(|e| SchemaError::InvalidSchema(format!("{e}")))?;

    let instance = Value::Array(
        documents
            .iter()
            .map(|doc| Value::Object(doc.data.clone()))
            .collect(),
    );

    let errors: Vec<ValidationError> = validator
        .iter_errors(&instance)
        .map(|error| ValidationError::from_jsonschema(&schema, &error))
        .collect();
    tracing::debug!(
        documents = documents.len(),
        errors = errors.len(),
        "collection validated"
    );
    Ok(errors)
}
