use anyhow::Context;
use docmig_config::DocmigConfig;
use docmig_core::change::PreviewChange;
use docmig_core::responses::{MigrateResponse, PreviewRow, SummaryRow};
use docmig_engine::script_file::load_script_file;
use docmig_engine::{MigrateOptions, Migration, summarize_preview_changes};
use docmig_store::{DocumentStore, StoreHandle};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::MigrateArgs;
use crate::output::{self, note};
use crate::progress::Progress;
use crate::ui;

/// Resolved switches for one migrate run; flags OR config.
#[derive(Clone, Copy, Debug)]
pub struct MigratePlan {
    pub summarize: bool,
    pub assume_yes: bool,
    pub dry_run: bool,
    pub options: MigrateOptions,
}

impl MigratePlan {
    #[must_use]
    pub fn new(args: &MigrateArgs, config: &DocmigConfig) -> Self {
        Self {
            summarize: args.summarize || config.migrate.summarize,
            assume_yes: args.yes || config.migrate.assume_yes,
            dry_run: args.dry_run,
            options: MigrateOptions::from(&config.migrate),
        }
    }
}

/// Handle `docmig migrate`.
pub async fn handle(
    args: &MigrateArgs,
    store: &StoreHandle,
    config: &DocmigConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let script = load_script_file(&args.script)
        .with_context(|| format!("failed to load migration script {}", args.script.display()))?;
    let migration = script.into_migration();
    let plan = MigratePlan::new(args, config);

    let response = run(migration.as_ref(), store.as_ref(), &plan, flags, |count| {
        ui::confirm(&format!("Apply {count} changes?"))
    })
    .await?;
    output::output(&response, flags.format)
}

/// Preview, show, confirm, then apply.
///
/// `confirm` is only consulted when the preview is non-empty, the run is not
/// a dry run, and confirmation was not pre-approved.
pub async fn run<C>(
    migration: &dyn Migration,
    store: &dyn DocumentStore,
    plan: &MigratePlan,
    flags: &GlobalFlags,
    confirm: C,
) -> anyhow::Result<MigrateResponse>
where
    C: FnOnce(usize) -> anyhow::Result<bool>,
{
    let spinner = Progress::spinner("Previewing changes");
    let changes = match migration.preview(store).await {
        Ok(changes) => {
            spinner.finish_clear();
            changes
        }
        Err(error) => {
            spinner.finish_err("preview failed");
            return Err(error).context("preview failed");
        }
    };

    let not_applied = |previewed| MigrateResponse {
        previewed,
        applied: false,
        outcomes: Vec::new(),
    };

    if changes.is_empty() {
        note(flags, "No changes detected");
        return Ok(not_applied(0));
    }

    note(flags, &format!("{} changes detected:", changes.len()));
    if !flags.quiet {
        print_preview(&changes, plan.summarize, flags)?;
    }

    if plan.dry_run {
        note(flags, "Dry run: nothing written");
        return Ok(not_applied(changes.len()));
    }

    if !plan.assume_yes && !confirm(changes.len())? {
        note(flags, "Migration cancelled");
        return Ok(not_applied(changes.len()));
    }

    let spinner = Progress::spinner("Applying migration");
    let outcomes = match migration.migrate(store, &plan.options).await {
        Ok(outcomes) => {
            spinner.finish_clear();
            outcomes
        }
        Err(error) => {
            spinner.finish_err("migration failed");
            return Err(error).context("migration failed");
        }
    };
    tracing::info!(templates = outcomes.len(), "migration completed");

    Ok(MigrateResponse {
        previewed: changes.len(),
        applied: true,
        outcomes,
    })
}

fn print_preview(
    changes: &[PreviewChange],
    summarize: bool,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    if summarize {
        let rows: Vec<SummaryRow> = summarize_preview_changes(changes)
            .iter()
            .map(SummaryRow::from)
            .collect();
        output::output(&rows, flags.format)
    } else {
        let rows: Vec<PreviewRow> = changes.iter().map(PreviewRow::from).collect();
        output::output(&rows, flags.format)
    }
}
