//! Migration run settings.

use serde::{Deserialize, Serialize};

/// Upper bound on writes per atomic batch.
pub const MAX_BATCH_SIZE_LIMIT: usize = 500;

const fn default_max_batch_size() -> usize {
    MAX_BATCH_SIZE_LIMIT
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MigrateConfig {
    /// Maximum staged writes per committed batch. Larger change sets are
    /// split into independently committed chunks.
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Group identical changes when printing the preview.
    #[serde(default)]
    pub summarize: bool,

    /// Skip the confirmation prompt.
    #[serde(default)]
    pub assume_yes: bool,
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            max_batch_size: default_max_batch_size(),
            summarize: false,
            assume_yes: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = MigrateConfig::default();
        assert_eq!(config.max_batch_size, 500);
        assert!(!config.summarize);
        assert!(!config.assume_yes);
    }
}
