use std::sync::Arc;

use anyhow::Context;
use docmig_config::{DocmigConfig, StoreConfig};
use docmig_store::{LibsqlStore, StoreHandle};

use crate::cli::GlobalFlags;

/// Load layered config, reading `.env` from the working directory first.
pub fn load_config() -> anyhow::Result<DocmigConfig> {
    DocmigConfig::load_with_dotenv().context("failed to load docmig configuration")
}

/// Store settings after applying `--store`, which always selects a local file.
#[must_use]
pub fn effective_store_config(flags: &GlobalFlags, config: &DocmigConfig) -> StoreConfig {
    match &flags.store {
        Some(path) => StoreConfig {
            path: path.clone(),
            url: String::new(),
            auth_token: String::new(),
        },
        None => config.store.clone(),
    }
}

pub async fn open_store(flags: &GlobalFlags, config: &DocmigConfig) -> anyhow::Result<StoreHandle> {
    let store_config = effective_store_config(flags, config);
    let target = if store_config.is_remote() {
        store_config.url.clone()
    } else {
        store_config.path.clone()
    };
    tracing::debug!(%target, "opening document store");
    if store_config.is_in_memory() {
        tracing::warn!("using an in-memory store; changes are discarded on exit");
    }

    let store = LibsqlStore::from_config(&store_config)
        .await
        .with_context(|| format!("failed to open document store at {target}"))?;
    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use docmig_config::DocmigConfig;
    use docmig_store::DocumentStore;
    use pretty_assertions::assert_eq;

    use super::effective_store_config;
    use crate::cli::{GlobalFlags, OutputFormat};

    fn flags(store: Option<&str>) -> GlobalFlags {
        GlobalFlags {
            format: OutputFormat::Json,
            quiet: true,
            verbose: false,
            store: store.map(str::to_string),
        }
    }

    #[test]
    fn store_flag_overrides_remote_config() {
        let mut config = DocmigConfig::default();
        config.store.url = "libsql://docs.turso.io".into();
        config.store.auth_token = "token".into();

        let effective = effective_store_config(&flags(Some("local.db")), &config);
        assert_eq!(effective.path, "local.db");
        assert!(!effective.is_remote());
    }

    #[test]
    fn config_is_used_without_flag() {
        let config = DocmigConfig::default();
        let effective = effective_store_config(&flags(None), &config);
        assert_eq!(effective.path, config.store.path);
    }

    #[tokio::test]
    async fn in_memory_store_opens() {
        let config = DocmigConfig::default();
        let store = super::open_store(&flags(Some(":memory:")), &config)
            .await
            .expect("store should open");
        let docs = store.list_documents("users").await.expect("list");
        assert!(docs.is_empty());
    }
}
