//! Schema migration runner.
//!
//! Embeds the SQL files at compile time and executes them on open. All
//! statements use `IF NOT EXISTS` so re-running is harmless.

use crate::error::StoreError;
use crate::sql::LibsqlStore;

/// Documents table plus its collection index.
const MIGRATION_001: &str = include_str!("../migrations/001_documents.sql");

impl LibsqlStore {
    pub(crate) async fn run_migrations(&self) -> Result<(), StoreError> {
        self.conn()
            .execute_batch(MIGRATION_001)
            .await
            .map_err(|e| StoreError::Migration(format!("001_documents: {e}")))?;
        Ok(())
    }
}
