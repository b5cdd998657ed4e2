//! Configuration error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Layered extraction failed (bad TOML, wrong type, unknown env shape).
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    /// `.env` exists but could not be parsed.
    #[error("Failed to load .env: {0}")]
    Dotenv(#[from] dotenvy::Error),

    /// A field parsed but is out of range.
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}
