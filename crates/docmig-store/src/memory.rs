//! Process-local document store.
//!
//! Collections keep insertion order, so listings are deterministic. The store
//! counts reads and commits, which lets callers assert that a code path never
//! touched storage.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use docmig_core::document::{Document, DocumentSnapshot};
use tokio::sync::RwLock;

use crate::DocumentStore;
use crate::batch::{BatchOp, WriteBatch};
use crate::error::StoreError;
use crate::helpers::generate_document_id;

type Collection = Vec<(String, Document)>;

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
    reads: AtomicUsize,
    commits: AtomicUsize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with one collection.
    pub fn with_collection<I, S>(collection: &str, documents: I) -> Self
    where
        I: IntoIterator<Item = (S, Document)>,
        S: Into<String>,
    {
        let docs = documents
            .into_iter()
            .map(|(id, data)| (id.into(), data))
            .collect();
        let mut collections = HashMap::new();
        collections.insert(collection.to_string(), docs);
        Self {
            collections: RwLock::new(collections),
            ..Self::default()
        }
    }

    /// Number of collection listings and single-document reads served.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    /// Number of batches successfully committed.
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_documents(&self, collection: &str) -> Result<Vec<DocumentSnapshot>, StoreError> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| DocumentSnapshot::new(id.clone(), data.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<DocumentSnapshot>, StoreError> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|docs| {
            docs.iter()
                .find(|(doc_id, _)| doc_id == id)
                .map(|(doc_id, data)| DocumentSnapshot::new(doc_id.clone(), data.clone()))
        }))
    }

    async fn allocate_id(&self, collection: &str) -> Result<String, StoreError> {
        let collections = self.collections.read().await;
        let existing = collections.get(collection);
        loop {
            let id = generate_document_id()?;
            let taken = existing.is_some_and(|docs| docs.iter().any(|(doc_id, _)| *doc_id == id));
            if !taken {
                return Ok(id);
            }
        }
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let current = collections
            .get(batch.collection())
            .cloned()
            .unwrap_or_default();

        // Stage against a copy so a rejected batch leaves the collection as it was.
        let mut staged = current;
        for op in batch.ops() {
            let position = staged.iter().position(|(id, _)| id == op.id());
            match (op, position) {
                (BatchOp::Set { data, .. }, Some(idx)) => staged[idx].1 = data.clone(),
                (BatchOp::Set { id, data }, None) => staged.push((id.clone(), data.clone())),
                (BatchOp::Update { data, .. }, Some(idx)) => staged[idx].1 = data.clone(),
                (BatchOp::Update { id, .. }, None) => {
                    return Err(StoreError::NotFound {
                        collection: batch.collection().to_string(),
                        id: id.clone(),
                    });
                }
                (BatchOp::Delete { .. }, Some(idx)) => {
                    staged.remove(idx);
                }
                (BatchOp::Delete { .. }, None) => {}
            }
        }

        collections.insert(batch.collection().to_string(), staged);
        self.commits.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            collection = batch.collection(),
            writes = batch.len(),
            "memory store: batch committed"
        );
        Ok(())
    }
}
