//! Operation tags for templates and diff records.
//!
//! Serialized in lowercase (`"create"`, `"update"`, `"delete"`), which is also
//! the spelling accepted in script files.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// The kind of change a template describes or a diff record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOperation {
    Create,
    Update,
    Delete,
}

impl ChangeOperation {
    /// All operations, in declaration order.
    pub const ALL: [Self; 3] = [Self::Create, Self::Update, Self::Delete];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Whether a diff for this operation reads the current value at its path.
    #[must_use]
    pub const fn reads_old_value(self) -> bool {
        matches!(self, Self::Update | Self::Delete)
    }

    /// Whether a diff for this operation evaluates a new value.
    #[must_use]
    pub const fn writes_new_value(self) -> bool {
        matches!(self, Self::Create | Self::Update)
    }
}

impl fmt::Display for ChangeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeOperation {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            _ => Err(CoreError::InvalidOperation(s.to_string())),
        }
    }
}
