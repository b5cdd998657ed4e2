//! Cross-cutting error types for docmig.
//!
//! Domain-specific errors (`StoreError`, `EngineError`, `SchemaError`) are
//! defined in their respective crates. The CLI converges them through `anyhow`.

use thiserror::Error;

/// Errors that can be raised by any docmig crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An operation tag did not name one of create, update or delete.
    #[error("Invalid operation type: {0}")]
    InvalidOperation(String),

    /// A dot path was empty or contained an empty segment.
    #[error("Invalid attribute path: '{0}'")]
    InvalidPath(String),

    /// A path addressed an array element with a segment that is not an index.
    #[error("Cannot address array with '{segment}' in path '{path}'")]
    ArrayIndex { path: String, segment: String },

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
