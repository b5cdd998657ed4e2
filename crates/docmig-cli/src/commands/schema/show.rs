use docmig_schema::SchemaRegistry;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::SchemaShowArgs;
use crate::output;

/// Handle `docmig schema show`.
pub fn handle(args: &SchemaShowArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let registry = SchemaRegistry::new();
    match &args.name {
        Some(name) => output::output(lookup(&registry, name)?, flags.format),
        None => output::output(&registry.list(), flags.format),
    }
}

fn lookup<'a>(registry: &'a SchemaRegistry, name: &str) -> anyhow::Result<&'a serde_json::Value> {
    registry.get(name).ok_or_else(|| {
        anyhow::anyhow!(
            "unknown schema '{name}' (available: {})",
            registry.list().join(", ")
        )
    })
}

#[cfg(test)]
mod tests {
    use docmig_schema::SchemaRegistry;

    use super::lookup;

    #[test]
    fn known_schema_is_returned() {
        let registry = SchemaRegistry::new();
        let schema = lookup(&registry, "script_file").expect("script_file is registered");
        assert!(schema.get("properties").is_some());
    }

    #[test]
    fn unknown_schema_lists_alternatives() {
        let registry = SchemaRegistry::new();
        let error = lookup(&registry, "nope").unwrap_err().to_string();
        assert!(error.contains("unknown schema 'nope'"));
        assert!(error.contains("migrate_response"));
    }
}
