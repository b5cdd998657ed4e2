use std::path::{Path, PathBuf};

use anyhow::Context;
use docmig_schema::files::{
    collection_file, read_schema, require_folder_for_many, write_validation_errors,
};
use docmig_schema::{ValidationError, merge_validation_errors, validate_collection};
use docmig_store::{DocumentStore, StoreHandle};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::SchemaValidateArgs;
use crate::output::{self, note};
use crate::progress::Progress;

/// Per-collection outcome line.
#[derive(Debug, Serialize)]
pub struct CollectionReport {
    pub collection: String,
    pub documents: usize,
    pub valid: bool,
    pub errors: usize,
    pub schema: PathBuf,
}

#[derive(Debug, Default)]
pub struct ValidationRun {
    pub reports: Vec<CollectionReport>,
    /// Raw errors per collection, in request order.
    pub errors: Vec<(String, Vec<ValidationError>)>,
    pub written: Vec<PathBuf>,
}

/// Handle `docmig schema validate`.
pub async fn handle(
    args: &SchemaValidateArgs,
    store: &StoreHandle,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let run = validate_collections(store.as_ref(), args, flags).await?;
    for path in &run.written {
        note(flags, &format!("Errors written to {}", path.display()));
    }
    output::output(&run.reports, flags.format)
}

/// Validate each collection against its item schema and optionally write the errors.
///
/// Invalid collections are reported, not raised; a missing or unreadable
/// schema file aborts.
pub async fn validate_collections(
    store: &dyn DocumentStore,
    args: &SchemaValidateArgs,
    flags: &GlobalFlags,
) -> anyhow::Result<ValidationRun> {
    if let Some(output) = &args.output {
        require_folder_for_many(output, &args.collections, "writing errors for")?;
    }

    let progress = Progress::bar(args.collections.len() as u64, "Validating collections");
    let mut run = ValidationRun::default();
    for collection in &args.collections {
        progress.set_message(collection);
        let (report, errors) = match validate_one(store, collection, &args.schema).await {
            Ok(result) => result,
            Err(error) => {
                progress.finish_err("validation aborted");
                return Err(error);
            }
        };

        if report.valid {
            note(flags, &format!("Validation succeeded for collection {collection}."));
        } else {
            note(
                flags,
                &format!(
                    "Validation failed for collection {collection}: found {} errors.",
                    errors.len()
                ),
            );
            if flags.verbose {
                for merged in merge_validation_errors(&errors) {
                    eprintln!("{}", serde_json::to_string_pretty(&merged)?);
                }
            }
        }

        run.reports.push(report);
        run.errors.push((collection.clone(), errors));
        progress.inc(1);
    }
    progress.finish_clear();

    if let Some(output) = &args.output {
        run.written = write_validation_errors(output, &run.errors, args.summarize)?;
    }
    Ok(run)
}

async fn validate_one(
    store: &dyn DocumentStore,
    collection: &str,
    schema_base: &Path,
) -> anyhow::Result<(CollectionReport, Vec<ValidationError>)> {
    let documents = store
        .list_documents(collection)
        .await
        .with_context(|| format!("failed to read collection {collection}"))?;

    let schema_path = collection_file(schema_base, collection);
    let item_schema = read_schema(&schema_path)?;
    let errors = validate_collection(&item_schema, &documents)
        .with_context(|| format!("schema {} does not compile", schema_path.display()))?;

    let report = CollectionReport {
        collection: collection.to_string(),
        documents: documents.len(),
        valid: errors.is_empty(),
        errors: errors.len(),
        schema: schema_path,
    };
    Ok((report, errors))
}
