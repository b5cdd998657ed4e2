//! Declarative migration script format.
//!
//! A script file (TOML or JSON) lists change templates. Each template names an
//! operation and a collection, optionally narrows the documents with `where`
//! conditions, and describes per-attribute changes whose values are either a
//! literal or copied from another path of the same document.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::Document;
use crate::enums::ChangeOperation;
use crate::path::get_nested_value;

/// Top-level contents of a script file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScriptFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Change templates, applied in declaration order.
    #[serde(default)]
    pub changes: Option<Vec<ScriptTemplate>>,
}

/// One document-level change template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScriptTemplate {
    pub operation: ChangeOperation,
    pub collection: String,

    /// Conditions that must all hold for a document to be affected.
    #[serde(default, rename = "where", skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    /// Attribute changes. Required for `create` and `update`.
    #[serde(default, alias = "changes", skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<ScriptAttribute>>,
}

/// One attribute change. At most one of `value` and `copy_from` may be set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScriptAttribute {
    pub path: String,
    pub operation: ChangeOperation,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    /// Dot path whose current value becomes the new value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copy_from: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOp {
    Eq,
    Ne,
    Exists,
    Missing,
}

impl ConditionOp {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Exists => "exists",
            Self::Missing => "missing",
        }
    }

    /// Whether the operator compares against a `value`.
    #[must_use]
    pub const fn takes_value(&self) -> bool {
        matches!(self, Self::Eq | Self::Ne)
    }
}

impl std::fmt::Display for ConditionOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `where` clause on a dot path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Condition {
    pub path: String,
    pub op: ConditionOp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl Condition {
    /// Evaluate against a document. A missing field never equals anything.
    #[must_use]
    pub fn matches(&self, doc: &Document) -> bool {
        let current = get_nested_value(doc, &self.path);
        let expected = self.value.as_ref().unwrap_or(&Value::Null);
        match self.op {
            ConditionOp::Eq => current == Some(expected),
            ConditionOp::Ne => current != Some(expected),
            ConditionOp::Exists => current.is_some(),
            ConditionOp::Missing => current.is_none(),
        }
    }
}
