use clap::{Parser, ValueEnum};
use docmig_config::GeneralConfig;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;
pub use subcommands::SchemaCommands;

/// Top-level CLI parser for the `docmig` binary.
#[derive(Debug, Parser)]
#[command(
    name = "docmig",
    version,
    about = "docmig - preview and apply document collection migrations"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw (defaults to `general.default_format`)
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Document store path (overrides `store.path`)
    #[arg(short, long, global = true)]
    pub store: Option<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    ///
    /// # Errors
    ///
    /// Fails when `--format` is absent and the configured default is unknown.
    pub fn global_flags(&self, general: &GeneralConfig) -> anyhow::Result<GlobalFlags> {
        let format = match self.format {
            Some(format) => format,
            None => OutputFormat::from_str(&general.default_format, true).map_err(|error| {
                anyhow::anyhow!("invalid general.default_format: {error}")
            })?,
        };
        Ok(GlobalFlags {
            format,
            quiet: self.quiet,
            verbose: self.verbose,
            store: self.store.clone(),
        })
    }
}
