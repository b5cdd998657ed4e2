//! Schema error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from schema inference, loading, and the registry.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Requested schema name was not found in the registry.
    #[error("Schema not found: {0}")]
    NotFound(String),

    /// A collection had no documents to infer a schema from.
    #[error("Failed to generate schema for collection: {0}. Collection is empty or has no schema.")]
    EmptyCollection(String),

    /// The item schema could not be compiled.
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// JSON value did not pass registry validation.
    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<String> },

    /// A schema or error file path is unusable for the request.
    #[error("Invalid path {path}: {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    /// A schema file does not exist.
    #[error("Schema file does not exist: {0}")]
    MissingFile(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
