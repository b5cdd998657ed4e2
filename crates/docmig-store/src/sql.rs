//! libSQL-backed document store.
//!
//! One row per document in the `documents` table, keyed by `(collection, id)`.
//! Bodies are JSON text. Each committed batch runs inside a single transaction.

use async_trait::async_trait;
use chrono::Utc;
use docmig_config::StoreConfig;
use docmig_core::document::DocumentSnapshot;
use libsql::Builder;

use crate::DocumentStore;
use crate::batch::{BatchOp, WriteBatch};
use crate::error::StoreError;
use crate::helpers::{encode_document, parse_document};

pub struct LibsqlStore {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl LibsqlStore {
    /// Open a local database at the given path. `":memory:"` is accepted.
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the database cannot be opened or migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, StoreError> {
        if path != ":memory:"
            && let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Migration(format!("create {}: {e}", parent.display()))
            })?;
        }
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;
        let store = Self { db, conn };
        store.run_migrations().await?;
        tracing::debug!(path, "libsql store opened");
        Ok(store)
    }

    /// Open a remote database.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the connection or migrations fail.
    pub async fn open_remote(url: &str, auth_token: &str) -> Result<Self, StoreError> {
        let db = Builder::new_remote(url.to_string(), auth_token.to_string())
            .build()
            .await?;
        let conn = db.connect()?;
        let store = Self { db, conn };
        store.run_migrations().await?;
        tracing::debug!(url, "libsql remote store opened");
        Ok(store)
    }

    /// Open whichever backend the configuration selects.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`open_remote`](Self::open_remote) or
    /// [`open_local`](Self::open_local).
    pub async fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        if config.is_remote() {
            Self::open_remote(&config.url, &config.auth_token).await
        } else {
            Self::open_local(&config.path).await
        }
    }

    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    async fn id_exists(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let mut rows = self
            .conn
            .query(
                "SELECT 1 FROM documents WHERE collection = ?1 AND id = ?2",
                [collection, id],
            )
            .await?;
        Ok(rows.next().await?.is_some())
    }

    async fn apply_op(
        conn: &libsql::Connection,
        collection: &str,
        op: &BatchOp,
        now: &str,
    ) -> Result<(), StoreError> {
        match op {
            BatchOp::Set { id, data } => {
                let body = encode_document(data)?;
                conn.execute(
                    "INSERT INTO documents (collection, id, data, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?4)
                     ON CONFLICT (collection, id)
                     DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
                    libsql::params![collection, id.as_str(), body, now],
                )
                .await?;
            }
            BatchOp::Update { id, data } => {
                let body = encode_document(data)?;
                let changed = conn
                    .execute(
                        "UPDATE documents SET data = ?3, updated_at = ?4
                         WHERE collection = ?1 AND id = ?2",
                        libsql::params![collection, id.as_str(), body, now],
                    )
                    .await?;
                if changed == 0 {
                    return Err(StoreError::NotFound {
                        collection: collection.to_string(),
                        id: id.clone(),
                    });
                }
            }
            BatchOp::Delete { id } => {
                conn.execute(
                    "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
                    [collection, id.as_str()],
                )
                .await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for LibsqlStore {
    async fn list_documents(&self, collection: &str) -> Result<Vec<DocumentSnapshot>, StoreError> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, data FROM documents WHERE collection = ?1 ORDER BY rowid",
                [collection],
            )
            .await?;
        let mut docs = Vec::new();
        while let Some(row) = rows.next().await? {
            let id = row.get::<String>(0)?;
            let text = row.get::<String>(1)?;
            let data = parse_document(collection, &id, &text)?;
            docs.push(DocumentSnapshot::new(id, data));
        }
        Ok(docs)
    }

    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<DocumentSnapshot>, StoreError> {
        let mut rows = self
            .conn
            .query(
                "SELECT data FROM documents WHERE collection = ?1 AND id = ?2",
                [collection, id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => {
                let text = row.get::<String>(0)?;
                let data = parse_document(collection, id, &text)?;
                Ok(Some(DocumentSnapshot::new(id, data)))
            }
            None => Ok(None),
        }
    }

    async fn allocate_id(&self, collection: &str) -> Result<String, StoreError> {
        loop {
            let mut rows = self
                .conn
                .query("SELECT lower(hex(randomblob(10)))", ())
                .await?;
            let row = rows
                .next()
                .await?
                .ok_or_else(|| StoreError::Query("randomblob returned no rows".into()))?;
            let id = row.get::<String>(0)?;
            if !self.id_exists(collection, &id).await? {
                return Ok(id);
            }
        }
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction().await?;
        for op in batch.ops() {
            if let Err(error) = Self::apply_op(&tx, batch.collection(), op, &now).await {
                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!(%rollback, "rollback after failed batch also failed");
                }
                return Err(error);
            }
        }
        tx.commit().await?;
        tracing::debug!(
            collection = batch.collection(),
            writes = batch.len(),
            "libsql store: batch committed"
        );
        Ok(())
    }
}
