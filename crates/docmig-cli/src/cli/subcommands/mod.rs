pub mod schema;

pub use schema::{SchemaCommands, SchemaExportArgs, SchemaShowArgs, SchemaValidateArgs};
