//! Document store connection configuration.

use serde::{Deserialize, Serialize};

/// Default local database file, relative to the working directory.
fn default_path() -> String {
    ".docmig/documents.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Local libSQL database file. `":memory:"` opens a throwaway database.
    #[serde(default = "default_path")]
    pub path: String,

    /// Remote database URL (e.g., `libsql://docs-myorg.turso.io`).
    #[serde(default)]
    pub url: String,

    /// Auth token for the remote database.
    #[serde(default)]
    pub auth_token: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            url: String::new(),
            auth_token: String::new(),
        }
    }
}

impl StoreConfig {
    /// Remote access needs both a URL and a token.
    pub fn is_remote(&self) -> bool {
        !self.url.is_empty() && !self.auth_token.is_empty()
    }

    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }
}
