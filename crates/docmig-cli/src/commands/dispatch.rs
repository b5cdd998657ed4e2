use docmig_config::DocmigConfig;
use docmig_store::StoreHandle;

use crate::cli::root_commands::Commands;
use crate::cli::{GlobalFlags, SchemaCommands};
use crate::commands;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    store: &StoreHandle,
    config: &DocmigConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Migrate(args) => commands::migrate::handle(&args, store, config, flags).await,
        Commands::Schema { action } => match action {
            SchemaCommands::Export(args) => commands::schema::export::handle(&args, store, flags).await,
            SchemaCommands::Validate(args) => {
                commands::schema::validate::handle(&args, store, flags).await
            }
            SchemaCommands::Show(args) => commands::schema::show::handle(&args, flags),
        },
    }
}
