use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Schema subcommands.
#[derive(Clone, Debug, Subcommand)]
pub enum SchemaCommands {
    /// Infer an item schema from each collection's documents.
    Export(SchemaExportArgs),
    /// Validate collections against item schemas.
    Validate(SchemaValidateArgs),
    /// Print a registered schema of docmig's own formats.
    Show(SchemaShowArgs),
}

#[derive(Clone, Debug, Args)]
pub struct SchemaExportArgs {
    /// Collection names, comma separated
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub collections: Vec<String>,
    /// Output file, or a folder receiving `<collection>.json` files
    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Clone, Debug, Args)]
pub struct SchemaValidateArgs {
    /// Collection names, comma separated
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub collections: Vec<String>,
    /// Item schema file, or a folder holding `<collection>.json` files
    #[arg(long)]
    pub schema: PathBuf,
    /// Write errors to this file, or one file per collection in this folder
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Merge identical errors before writing
    #[arg(long)]
    pub summarize: bool,
}

#[derive(Clone, Debug, Args)]
pub struct SchemaShowArgs {
    /// Registered schema name; omit to list all names
    pub name: Option<String>,
}
