use std::path::{Path, PathBuf};

use anyhow::Context;
use docmig_schema::files::{collection_file, require_folder_for_many, write_json};
use docmig_schema::infer::infer_item_schema;
use docmig_store::{DocumentStore, StoreHandle};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::SchemaExportArgs;
use crate::output;
use crate::progress::Progress;

#[derive(Debug, Serialize)]
pub struct ExportedSchema {
    pub collection: String,
    pub documents: usize,
    pub path: PathBuf,
}

/// Handle `docmig schema export`.
pub async fn handle(
    args: &SchemaExportArgs,
    store: &StoreHandle,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let exported = export_schemas(store.as_ref(), &args.collections, &args.output).await?;
    output::output(&exported, flags.format)
}

/// Infer and write one item schema per collection, stopping at the first failure.
pub async fn export_schemas(
    store: &dyn DocumentStore,
    collections: &[String],
    output: &Path,
) -> anyhow::Result<Vec<ExportedSchema>> {
    require_folder_for_many(output, collections, "exporting")?;

    let progress = Progress::bar(collections.len() as u64, "Exporting schemas");
    let mut exported = Vec::with_capacity(collections.len());
    for collection in collections {
        progress.set_message(collection);
        let documents = store
            .list_documents(collection)
            .await
            .with_context(|| format!("failed to read collection {collection}"))?;
        let schema = match infer_item_schema(collection, &documents) {
            Ok(schema) => schema,
            Err(error) => {
                progress.finish_err("export failed");
                return Err(error.into());
            }
        };

        let path = collection_file(output, collection);
        write_json(&path, &schema)?;
        tracing::debug!(collection, path = %path.display(), "schema exported");

        exported.push(ExportedSchema {
            collection: collection.clone(),
            documents: documents.len(),
            path,
        });
        progress.inc(1);
    }
    progress.finish_clear();
    Ok(exported)
}
