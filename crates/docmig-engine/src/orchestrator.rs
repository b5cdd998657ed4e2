//! Batch preview and mutate over a list of templates.

use async_trait::async_trait;
use docmig_config::{MAX_BATCH_SIZE_LIMIT, MigrateConfig};
use docmig_core::change::PreviewChange;
use docmig_core::responses::MigrationOutcome;
use docmig_store::DocumentStore;

use crate::compiler::CompiledTemplate;
use crate::error::EngineError;
use crate::script::Migration;
use crate::template::PreviewChangeTemplate;

/// Knobs for the mutate pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrateOptions {
    /// Most writes committed in one atomic batch.
    pub max_batch_size: usize,
}

impl Default for MigrateOptions {
    fn default() -> Self {
        Self {
            max_batch_size: MAX_BATCH_SIZE_LIMIT,
        }
    }
}

impl From<&MigrateConfig> for MigrateOptions {
    fn from(config: &MigrateConfig) -> Self {
        Self {
            max_batch_size: config.max_batch_size,
        }
    }
}

fn compile_all(templates: &[PreviewChangeTemplate]) -> Result<Vec<CompiledTemplate>, EngineError> {
    templates.iter().map(CompiledTemplate::compile).collect()
}

/// Preview every template in order and concatenate the results.
///
/// All templates are compiled before the first read, so a malformed template
/// produces no partial preview.
///
/// # Errors
///
/// Returns the first compile, store, or callback error.
pub async fn preview_all(
    templates: &[PreviewChangeTemplate],
    store: &dyn DocumentStore,
) -> Result<Vec<PreviewChange>, EngineError> {
    let compiled = compile_all(templates)?;
    let mut changes = Vec::new();
    for template in &compiled {
        let previews = template.preview(store).await?;
        tracing::debug!(
            collection = template.collection_path(),
            operation = %template.operation(),
            changes = previews.len(),
            "template previewed"
        );
        changes.extend(previews);
    }
    Ok(changes)
}

/// Apply every template strictly in declaration order.
///
/// Each template re-reads its collection, so it observes what earlier
/// templates wrote.
///
/// # Errors
///
/// Returns the first compile, store, or callback error. Templates already
/// applied stay applied.
pub async fn migrate_all(
    templates: &[PreviewChangeTemplate],
    store: &dyn DocumentStore,
    options: &MigrateOptions,
) -> Result<Vec<MigrationOutcome>, EngineError> {
    let compiled = compile_all(templates)?;
    let mut outcomes = Vec::with_capacity(compiled.len());
    for template in &compiled {
        outcomes.push(template.migrate(store, options.max_batch_size).await?);
    }
    Ok(outcomes)
}

/// A template list driven through the [`Migration`] trait.
#[derive(Debug, Clone)]
pub struct TemplateMigration {
    templates: Vec<PreviewChangeTemplate>,
}

impl TemplateMigration {
    #[must_use]
    pub const fn new(templates: Vec<PreviewChangeTemplate>) -> Self {
        Self { templates }
    }

    #[must_use]
    pub fn templates(&self) -> &[PreviewChangeTemplate] {
        &self.templates
    }
}

#[async_trait]
impl Migration for TemplateMigration {
    async fn preview(&self, store: &dyn DocumentStore) -> Result<Vec<PreviewChange>, EngineError> {
        preview_all(&self.templates, store).await
    }

    async fn migrate(
        &self,
        store: &dyn DocumentStore,
        options: &MigrateOptions,
    ) -> Result<Vec<MigrationOutcome>, EngineError> {
        migrate_all(&self.templates, store, options).await
    }
}
