//! Staged writes committed as one atomic unit.
//!
//! A `WriteBatch` is scoped to one collection. Nothing reaches the store until
//! [`crate::DocumentStore::commit`] is called; a batch that is dropped or
//! rejected leaves the collection untouched.

use docmig_core::document::Document;

/// One staged write.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOp {
    /// Create the document, or replace it if it exists.
    Set { id: String, data: Document },
    /// Replace the body of an existing document. Fails the batch if missing.
    Update { id: String, data: Document },
    /// Remove the document if present.
    Delete { id: String },
}

impl BatchOp {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Set { id, .. } | Self::Update { id, .. } | Self::Delete { id } => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WriteBatch {
    collection: String,
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    #[must_use]
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            ops: Vec::new(),
        }
    }

    pub fn set(&mut self, id: impl Into<String>, data: Document) -> &mut Self {
        self.ops.push(BatchOp::Set {
            id: id.into(),
            data,
        });
        self
    }

    pub fn update(&mut self, id: impl Into<String>, data: Document) -> &mut Self {
        self.ops.push(BatchOp::Update {
            id: id.into(),
            data,
        });
        self
    }

    pub fn delete(&mut self, id: impl Into<String>) -> &mut Self {
        self.ops.push(BatchOp::Delete { id: id.into() });
        self
    }

    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    #[must_use]
    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Split into batches of at most `max_ops` writes, preserving order.
    /// A `max_ops` of zero is treated as one.
    #[must_use]
    pub fn into_chunks(self, max_ops: usize) -> Vec<Self> {
        let max_ops = max_ops.max(1);
        let collection = self.collection;
        let mut chunks = Vec::with_capacity(self.ops.len().div_ceil(max_ops));
        let mut current = Vec::with_capacity(max_ops.min(self.ops.len()));
        for op in self.ops {
            current.push(op);
            if current.len() == max_ops {
                chunks.push(Self {
                    collection: collection.clone(),
                    ops: std::mem::take(&mut current),
                });
            }
        }
        if !current.is_empty() {
            chunks.push(Self {
                collection,
                ops: current,
            });
        }
        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn batch_of(n: usize) -> WriteBatch {
        let mut batch = WriteBatch::new("users");
        for i in 0..n {
            batch.delete(format!("doc{i}"));
        }
        batch
    }

    #[rstest]
    #[case(0, 500, 0)]
    #[case(3, 500, 1)]
    #[case(500, 500, 1)]
    #[case(501, 500, 2)]
    #[case(7, 2, 4)]
    #[case(3, 0, 3)]
    fn chunk_counts(#[case] ops: usize, #[case] max: usize, #[case] expected: usize) {
        assert_eq!(batch_of(ops).into_chunks(max).len(), expected);
    }

    #[test]
    fn chunks_preserve_order_and_collection() {
        let chunks = batch_of(5).into_chunks(2);
        let ids: Vec<&str> = chunks
            .iter()
            .flat_map(|c| c.ops().iter().map(BatchOp::id))
            .collect();
        assert_eq!(ids, vec!["doc0", "doc1", "doc2", "doc3", "doc4"]);
        assert!(chunks.iter().all(|c| c.collection() == "users"));
        assert_eq!(chunks.last().map(WriteBatch::len), Some(1));
    }

    #[test]
    fn builder_methods_stage_in_order() {
        let mut batch = WriteBatch::new("users");
        batch
            .set("a", Document::new())
            .update("b", Document::new())
            .delete("c");
        assert_eq!(batch.len(), 3);
        assert!(matches!(batch.ops()[0], BatchOp::Set { .. }));
        assert!(matches!(batch.ops()[1], BatchOp::Update { .. }));
        assert!(matches!(batch.ops()[2], BatchOp::Delete { .. }));
    }
}
