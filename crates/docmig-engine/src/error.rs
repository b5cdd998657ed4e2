//! Engine error types.

use std::path::PathBuf;

use docmig_core::enums::ChangeOperation;
use docmig_core::errors::CoreError;
use docmig_store::StoreError;
use thiserror::Error;

/// Errors from compiling, previewing, or applying change templates.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A template was handed to the compiler for a different operation.
    #[error("Invalid operation type: {found} (expected {expected})")]
    InvalidOperation {
        expected: ChangeOperation,
        found: ChangeOperation,
    },

    /// A create or update template has no attribute changes.
    #[error("Missing changes for {0} template")]
    MissingChanges(ChangeOperation),

    /// A create template contains a non-create attribute change.
    #[error("Invalid operation type: {found} on attribute '{path}' of a create template")]
    InvalidAttributeOperation {
        path: String,
        found: ChangeOperation,
    },

    /// A computed attribute value failed.
    #[error("Value callback for '{path}' failed: {source}")]
    ValueCallback {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    /// A migration script does not export a usable shape.
    #[error("Invalid migration script: {0}")]
    InvalidScript(String),

    #[error("Cannot read script {path}: {source}")]
    ScriptIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
