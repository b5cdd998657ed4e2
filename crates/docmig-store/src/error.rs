//! Store error types for docmig-store.

use thiserror::Error;

/// Errors from document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A query or write failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// An update targeted a document that does not exist.
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// Stored data could not be decoded as a document.
    #[error("Invalid document {collection}/{id}: {reason}")]
    InvalidDocument {
        collection: String,
        id: String,
        reason: String,
    },

    /// A batch was committed but rejected as a whole.
    #[error("Batch for '{collection}' rejected: {reason}")]
    BatchRejected { collection: String, reason: String },

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// JSON encoding of a document body failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
