//! # docmig-config
//!
//! Layered configuration loading for docmig using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`DOCMIG_*` prefix, `__` as separator)
//! 2. Project-level `.docmig/config.toml`
//! 3. User-level `~/.config/docmig/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `DOCMIG_STORE__PATH` -> `store.path`,
//! `DOCMIG_MIGRATE__MAX_BATCH_SIZE` -> `migrate.max_batch_size`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use docmig_config::DocmigConfig;
//!
//! let config = DocmigConfig::load_with_dotenv().expect("config");
//! println!("store: {}", config.store.path);
//! ```

mod error;
mod general;
mod migrate;
mod store;

pub use error::ConfigError;
pub use general::GeneralConfig;
pub use migrate::{MAX_BATCH_SIZE_LIMIT, MigrateConfig};
pub use store::StoreConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DocmigConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub migrate: MigrateConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl DocmigConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    /// Load configuration after reading `.env` from the current directory.
    ///
    /// A missing `.env` is fine; a malformed one is an error.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `.env` is malformed, extraction fails, or a
    /// value is out of range.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(error) if error.not_found() => {}
            Err(error) => return Err(error.into()),
        }
        Self::load()
    }

    /// Extract and validate from an arbitrary figment (tests layer their own providers).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is out of range.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".docmig/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("DOCMIG_").split("__"))
    }

    /// Check value ranges figment cannot express.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for a batch size outside `1..=500`
    /// or an unknown default output format.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.migrate.max_batch_size == 0 || self.migrate.max_batch_size > MAX_BATCH_SIZE_LIMIT {
            return Err(ConfigError::InvalidValue {
                field: "migrate.max_batch_size".into(),
                reason: format!(
                    "must be between 1 and {MAX_BATCH_SIZE_LIMIT}, got {}",
                    self.migrate.max_batch_size
                ),
            });
        }
        if !matches!(self.general.default_format.as_str(), "json" | "table" | "raw") {
            return Err(ConfigError::InvalidValue {
                field: "general.default_format".into(),
                reason: format!("unknown format '{}'", self.general.default_format),
            });
        }
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("docmig").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = DocmigConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.store.is_remote());
        assert_eq!(config.migrate.max_batch_size, 500);
    }

    #[test]
    fn figment_builds_without_files() {
        let config: DocmigConfig = DocmigConfig::figment()
            .extract()
            .expect("should extract defaults");
        assert_eq!(config.general.default_format, "table");
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let mut config = DocmigConfig::default();
        config.migrate.max_batch_size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("migrate.max_batch_size"));
    }

    #[test]
    fn oversized_batch_is_rejected() {
        let mut config = DocmigConfig::default();
        config.migrate.max_batch_size = 501;
        assert!(config.validate().is_err());
    }
}
