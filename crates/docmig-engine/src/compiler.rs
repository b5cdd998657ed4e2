//! Document template compiler.
//!
//! [`CompiledTemplate::compile`] checks a template's contract once, before any
//! store access, and yields a value that can preview or apply the change any
//! number of times. Preview never writes; migrate re-reads the collection and
//! recomputes the same diffs before committing them.

use docmig_core::change::{AttributeChange, PreviewChange};
use docmig_core::document::{Document, DocumentSnapshot};
use docmig_core::enums::ChangeOperation;
use docmig_core::path::{apply_attribute_changes, build_document_from_changes, validate_path};
use docmig_core::responses::MigrationOutcome;
use docmig_store::{DocumentStore, WriteBatch};
use futures_util::future::try_join_all;

use crate::attribute::{AttributeChangeBuilder, AttributeChangeTemplate};
use crate::error::EngineError;
use crate::template::PreviewChangeTemplate;

/// A template whose contract has been checked.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    template: PreviewChangeTemplate,
}

impl CompiledTemplate {
    /// Route to the compiler for the template's operation.
    ///
    /// # Errors
    ///
    /// Returns the contract error of the selected per-operation compiler.
    pub fn compile(template: &PreviewChangeTemplate) -> Result<Self, EngineError> {
        match template.operation {
            ChangeOperation::Delete => Self::compile_delete(template),
            ChangeOperation::Update => Self::compile_update(template),
            ChangeOperation::Create => Self::compile_create(template),
        }
    }

    /// # Errors
    ///
    /// Returns `EngineError::InvalidOperation` for a non-delete template.
    pub fn compile_delete(template: &PreviewChangeTemplate) -> Result<Self, EngineError> {
        expect_operation(template, ChangeOperation::Delete)?;
        let mut template = template.clone();
        template.changes = None;
        Ok(Self { template })
    }

    /// # Errors
    ///
    /// Returns `EngineError::InvalidOperation` for a non-update template,
    /// `MissingChanges` without changes, or `Core` for a malformed path.
    pub fn compile_update(template: &PreviewChangeTemplate) -> Result<Self, EngineError> {
        expect_operation(template, ChangeOperation::Update)?;
        required_changes(template)?;
        Ok(Self {
            template: template.clone(),
        })
    }

    /// # Errors
    ///
    /// As [`compile_update`](Self::compile_update), plus
    /// `InvalidAttributeOperation` for any non-create attribute.
    pub fn compile_create(template: &PreviewChangeTemplate) -> Result<Self, EngineError> {
        expect_operation(template, ChangeOperation::Create)?;
        let changes = required_changes(template)?;
        if let Some(bad) = changes
            .iter()
            .find(|change| change.operation != ChangeOperation::Create)
        {
            return Err(EngineError::InvalidAttributeOperation {
                path: bad.path.clone(),
                found: bad.operation,
            });
        }
        Ok(Self {
            template: template.clone(),
        })
    }

    #[must_use]
    pub const fn operation(&self) -> ChangeOperation {
        self.template.operation
    }

    #[must_use]
    pub fn collection_path(&self) -> &str {
        &self.template.collection_path
    }

    fn attributes(&self) -> &[AttributeChangeTemplate] {
        self.template.changes.as_deref().unwrap_or_default()
    }

    async fn matching_documents(
        &self,
        store: &dyn DocumentStore,
    ) -> Result<Vec<DocumentSnapshot>, EngineError> {
        let docs = store.list_documents(self.collection_path()).await?;
        let total = docs.len();
        let matched: Vec<DocumentSnapshot> = docs
            .into_iter()
            .filter(|doc| self.template.matches(&doc.data))
            .collect();
        tracing::debug!(
            collection = self.collection_path(),
            operation = %self.operation(),
            total,
            matched = matched.len(),
            "documents selected"
        );
        Ok(matched)
    }

    /// Diffs for one document, evaluated concurrently, in declaration order.
    async fn diff(&self, doc: &Document) -> Result<Vec<AttributeChange>, EngineError> {
        try_join_all(
            self.attributes()
                .iter()
                .map(|template| AttributeChangeBuilder::new(template).build(doc)),
        )
        .await
    }

    /// Compute the changes this template would make, without writing.
    ///
    /// Create templates use each matching document as a trigger: `after` is
    /// that document's data with the create diffs applied. One row per trigger
    /// is returned, while [`migrate`](Self::migrate) writes a single new
    /// document, so for create the preview count is not the write count.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Store` on read failure, `ValueCallback` if a
    /// computed value fails, or `Core` if a diff addresses an array with a
    /// non-index segment.
    pub async fn preview(
        &self,
        store: &dyn DocumentStore,
    ) -> Result<Vec<PreviewChange>, EngineError> {
        let operation = self.operation();
        let mut previews = Vec::new();
        for doc in self.matching_documents(store).await? {
            let preview = match operation {
                ChangeOperation::Delete => PreviewChange {
                    operation,
                    document_id: doc.id,
                    collection_path: self.collection_path().to_string(),
                    before: Some(doc.data),
                    after: None,
                    changes: Vec::new(),
                },
                ChangeOperation::Update | ChangeOperation::Create => {
                    let changes = self.diff(&doc.data).await?;
                    let mut after = doc.data.clone();
                    apply_attribute_changes(&changes, &mut after)?;
                    let before = (operation == ChangeOperation::Update).then_some(doc.data);
                    PreviewChange {
                        operation,
                        document_id: doc.id,
                        collection_path: self.collection_path().to_string(),
                        before,
                        after: Some(after),
                        changes,
                    }
                }
            };
            previews.push(preview);
        }
        Ok(previews)
    }

    /// Apply the change durably.
    ///
    /// Deletes and updates are staged per matching document and committed in
    /// chunks of at most `max_batch_size` writes; nothing is committed when
    /// nothing matched. Create writes exactly one new document whose values
    /// are evaluated against an empty document.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Store` on read or commit failure (the failing
    /// chunk is discarded; earlier chunks stay committed), `ValueCallback`,
    /// or `Core` for a diff that cannot be applied. A diff error fails before
    /// anything is committed.
    pub async fn migrate(
        &self,
        store: &dyn DocumentStore,
        max_batch_size: usize,
    ) -> Result<MigrationOutcome, EngineError> {
        let mut batch = WriteBatch::new(self.collection_path());
        match self.operation() {
            ChangeOperation::Delete => {
                for doc in self.matching_documents(store).await? {
                    batch.delete(doc.id);
                }
            }
            ChangeOperation::Update => {
                for doc in self.matching_documents(store).await? {
                    let changes = self.diff(&doc.data).await?;
                    let mut payload = doc.data;
                    apply_attribute_changes(&changes, &mut payload)?;
                    if payload.is_empty() {
                        tracing::warn!(
                            collection = self.collection_path(),
                            document = %doc.id,
                            "update payload is empty, skipping"
                        );
                        continue;
                    }
                    batch.update(doc.id, payload);
                }
            }
            ChangeOperation::Create => {
                let changes = self.diff(&Document::new()).await?;
                let payload = build_document_from_changes(&changes)?;
                let id = store.allocate_id(self.collection_path()).await?;
                batch.set(id, payload);
            }
        }
        self.commit_in_chunks(store, batch, max_batch_size).await
    }

    async fn commit_in_chunks(
        &self,
        store: &dyn DocumentStore,
        batch: WriteBatch,
        max_batch_size: usize,
    ) -> Result<MigrationOutcome, EngineError> {
        let mut outcome = MigrationOutcome {
            collection_path: self.collection_path().to_string(),
            operation: self.operation(),
            written: 0,
            batches: 0,
        };
        if batch.is_empty() {
            tracing::debug!(collection = self.collection_path(), "nothing to commit");
            return Ok(outcome);
        }
        for chunk in batch.into_chunks(max_batch_size) {
            let writes = chunk.len();
            store.commit(chunk).await?;
            outcome.written += writes;
            outcome.batches += 1;
            tracing::info!(
                collection = self.collection_path(),
                operation = %self.operation(),
                writes,
                "batch committed"
            );
        }
        Ok(outcome)
    }
}

fn expect_operation(
    template: &PreviewChangeTemplate,
    expected: ChangeOperation,
) -> Result<(), EngineError> {
    if template.operation == expected {
        Ok(())
    } else {
        Err(EngineError::InvalidOperation {
            expected,
            found: template.operation,
        })
    }
}

fn required_changes(
    template: &PreviewChangeTemplate,
) -> Result<&[AttributeChangeTemplate], EngineError> {
    let changes = template
        .changes
        .as_deref()
        .ok_or(EngineError::MissingChanges(template.operation))?;
    for change in changes {
        validate_path(&change.path)?;
    }
    Ok(changes)
}
