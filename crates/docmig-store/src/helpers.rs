//! Encoding helpers shared by the store backends.

use docmig_core::document::Document;
use getrandom::fill;
use serde_json::Value;

use crate::error::StoreError;

/// Length of generated document IDs.
pub const DOCUMENT_ID_LEN: usize = 20;

const ID_ALPHABET: &[u8; 62] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a random alphanumeric document ID.
///
/// # Errors
///
/// Returns `StoreError::Query` if the OS random source is unavailable.
pub fn generate_document_id() -> Result<String, StoreError> {
    let mut bytes = [0_u8; DOCUMENT_ID_LEN];
    fill(&mut bytes).map_err(|e| StoreError::Query(format!("random source unavailable: {e}")))?;
    Ok(bytes
        .iter()
        .map(|b| char::from(ID_ALPHABET[usize::from(*b) % ID_ALPHABET.len()]))
        .collect())
}

/// Decode a stored JSON text column into a document body.
///
/// # Errors
///
/// Returns `StoreError::InvalidDocument` if the text is not JSON or not an object.
pub fn parse_document(collection: &str, id: &str, text: &str) -> Result<Document, StoreError> {
    let invalid = |reason: String| StoreError::InvalidDocument {
        collection: collection.to_string(),
        id: id.to_string(),
        reason,
    };
    match serde_json::from_str::<Value>(text).map_err(|e| invalid(e.to_string()))? {
        Value::Object(map) => Ok(map),
        other => Err(invalid(format!("expected an object, found {}", kind_of(&other)))),
    }
}

/// Encode a document body for a JSON text column.
///
/// # Errors
///
/// Returns `StoreError::Json` if serialization fails.
pub fn encode_document(data: &Document) -> Result<String, StoreError> {
    Ok(serde_json::to_string(data)?)
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
