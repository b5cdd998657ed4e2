use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::cli::subcommands::SchemaCommands;

/// Root command tree for `docmig`.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Preview a migration script, confirm, then apply it.
    Migrate(MigrateArgs),
    /// Export, validate, and inspect JSON Schemas.
    Schema {
        #[command(subcommand)]
        action: SchemaCommands,
    },
}

#[derive(Clone, Debug, Args)]
pub struct MigrateArgs {
    /// Migration script (`.toml` or `.json`)
    #[arg(long)]
    pub script: PathBuf,
    /// Group identical changes in the preview
    #[arg(long)]
    pub summarize: bool,
    /// Apply without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,
    /// Preview only; never write
    #[arg(long)]
    pub dry_run: bool,
}
