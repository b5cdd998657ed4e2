//! # docmig-store
//!
//! Document store boundary for docmig.
//!
//! The engine only ever talks to a [`DocumentStore`]: list a collection,
//! allocate a fresh document ID, and commit a [`WriteBatch`] atomically.
//! Two backends ship here:
//!
//! - [`memory::MemoryStore`], insertion-ordered and process-local, used by tests
//!   and dry runs
//! - [`sql::LibsqlStore`], a libSQL database holding one row per document with
//!   the body stored as JSON text

pub mod batch;
pub mod error;
pub mod helpers;
pub mod memory;
mod migrations;
pub mod sql;

use std::sync::Arc;

use async_trait::async_trait;
use docmig_core::document::{Document, DocumentSnapshot};

pub use batch::{BatchOp, WriteBatch};
pub use error::StoreError;
pub use memory::MemoryStore;
pub use sql::LibsqlStore;

/// Shared, dynamically dispatched store handle.
pub type StoreHandle = Arc<dyn DocumentStore>;

/// Storage operations the migration engine depends on.
///
/// Implementations must make [`commit`](DocumentStore::commit) all-or-nothing:
/// either every staged write in the batch lands, or none does.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document in `collection`, in a stable order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the collection cannot be read or a stored body
    /// is not a JSON object.
    async fn list_documents(&self, collection: &str) -> Result<Vec<DocumentSnapshot>, StoreError>;

    /// Fetch a single document by ID.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the read fails.
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<DocumentSnapshot>, StoreError>;

    /// Reserve a fresh, unused document ID in `collection`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if ID generation fails.
    async fn allocate_id(&self, collection: &str) -> Result<String, StoreError>;

    /// Apply every staged write atomically.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if an update targets a missing document,
    /// or a backend error. In both cases nothing from the batch is applied.
    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;

    /// Write a single document in its own batch.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`commit`](DocumentStore::commit).
    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        data: Document,
    ) -> Result<(), StoreError> {
        let mut batch = WriteBatch::new(collection);
        batch.set(id, data);
        self.commit(batch).await
    }
}
