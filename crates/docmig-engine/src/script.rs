//! Migration script contract.
//!
//! A script provides either a list of change templates or a pair of custom
//! `preview`/`migrate` functions, never both. [`ScriptExports::into_script`]
//! enforces that before anything touches the store.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use docmig_core::change::PreviewChange;
use docmig_core::responses::MigrationOutcome;
use docmig_store::DocumentStore;
use futures_util::future::BoxFuture;

use crate::error::EngineError;
use crate::orchestrator::{MigrateOptions, TemplateMigration};
use crate::template::PreviewChangeTemplate;

/// Something that can be previewed and then applied against a store.
#[async_trait]
pub trait Migration: Send + Sync {
    /// Compute changes without writing.
    async fn preview(&self, store: &dyn DocumentStore) -> Result<Vec<PreviewChange>, EngineError>;

    /// Apply changes durably.
    async fn migrate(
        &self,
        store: &dyn DocumentStore,
        options: &MigrateOptions,
    ) -> Result<Vec<MigrationOutcome>, EngineError>;
}

pub type PreviewFn = Arc<
    dyn for<'a> Fn(&'a dyn DocumentStore) -> BoxFuture<'a, Result<Vec<PreviewChange>, EngineError>>
        + Send
        + Sync,
>;

pub type MigrateFn = Arc<
    dyn for<'a> Fn(
            &'a dyn DocumentStore,
            &'a MigrateOptions,
        ) -> BoxFuture<'a, Result<Vec<MigrationOutcome>, EngineError>>
        + Send
        + Sync,
>;

/// What a script makes available, before its shape is checked.
#[derive(Clone, Default)]
pub struct ScriptExports {
    pub changes: Option<Vec<PreviewChangeTemplate>>,
    pub preview: Option<PreviewFn>,
    pub migrate: Option<MigrateFn>,
}

impl ScriptExports {
    /// Check the shape and build a runnable script.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidScript` when neither shape is provided,
    /// when both are, or when only one of `preview`/`migrate` is.
    pub fn into_script(self) -> Result<MigrationScript, EngineError> {
        match (self.changes, self.preview, self.migrate) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(EngineError::InvalidScript(
                "exports both `changes` and custom `preview`/`migrate` functions".into(),
            )),
            (Some(changes), None, None) => Ok(MigrationScript::Templates(changes)),
            (None, Some(preview), Some(migrate)) => Ok(MigrationScript::Custom(Arc::new(
                FnMigration { preview, migrate },
            ))),
            (None, Some(_), None) | (None, None, Some(_)) => Err(EngineError::InvalidScript(
                "`preview` and `migrate` must be provided together".into(),
            )),
            (None, None, None) => Err(EngineError::InvalidScript(
                "must export either `changes` or both `preview` and `migrate`".into(),
            )),
        }
    }
}

/// A validated script.
#[derive(Clone)]
pub enum MigrationScript {
    Templates(Vec<PreviewChangeTemplate>),
    Custom(Arc<dyn Migration>),
}

impl MigrationScript {
    /// The script as a uniformly driven [`Migration`].
    #[must_use]
    pub fn into_migration(self) -> Arc<dyn Migration> {
        match self {
            Self::Templates(templates) => Arc::new(TemplateMigration::new(templates)),
            Self::Custom(migration) => migration,
        }
    }
}

impl fmt::Debug for MigrationScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Templates(templates) => f.debug_tuple("Templates").field(templates).finish(),
            Self::Custom(_) => f.write_str("Custom(<migration>)"),
        }
    }
}

struct FnMigration {
    preview: PreviewFn,
    migrate: MigrateFn,
}

#[async_trait]
impl Migration for FnMigration {
    async fn preview(&self, store: &dyn DocumentStore) -> Result<Vec<PreviewChange>, EngineError> {
        (self.preview)(store).await
    }

    async fn migrate(
        &self,
        store: &dyn DocumentStore,
        options: &MigrateOptions,
    ) -> Result<Vec<MigrationOutcome>, EngineError> {
        (self.migrate)(store, options).await
    }
}
