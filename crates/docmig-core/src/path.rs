//! Dot-path lookup and the attribute diff applier.
//!
//! Paths are dot-separated field names (`"user.address.city"`). A numeric
//! segment addresses an array element when the container at that point is an
//! array; every other segment addresses an object field.

use serde_json::{Map, Value};

use crate::change::AttributeChange;
use crate::document::Document;
use crate::enums::ChangeOperation;
use crate::errors::CoreError;

/// Reject paths that are empty or contain an empty segment (`"a..b"`).
///
/// # Errors
///
/// Returns `CoreError::InvalidPath` naming the offending path.
pub fn validate_path(path: &str) -> Result<(), CoreError> {
    if path.split('.').any(str::is_empty) {
        return Err(CoreError::InvalidPath(path.to_string()));
    }
    Ok(())
}

/// Read the value at `path`, or `None` if any segment is missing or a
/// non-container is traversed.
#[must_use]
pub fn get_nested_value<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = doc.get(first)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Like [`get_nested_value`], falling back to `default` when nothing is found.
#[must_use]
pub fn get_nested_value_or(doc: &Document, path: &str, default: Value) -> Value {
    get_nested_value(doc, path).cloned().unwrap_or(default)
}

/// Apply diff records to `target` in order. Later changes to the same path win.
///
/// Intermediate segments that are absent or hold a scalar are replaced by an
/// empty object. Arrays are kept as arrays: a numeric segment at or past the
/// end grows the array, padding with `null`. Delete removes the leaf; create
/// and update set it to the diff's new value (`null` when the diff carries
/// none).
///
/// # Errors
///
/// Returns `CoreError::ArrayIndex` when a non-numeric segment addresses an
/// array. Changes before the failing one have already been applied.
pub fn apply_attribute_changes(
    changes: &[AttributeChange],
    target: &mut Document,
) -> Result<(), CoreError> {
    let mut root = Value::Object(std::mem::take(target));
    let result = changes
        .iter()
        .try_for_each(|change| apply_one(&mut root, change));
    if let Value::Object(map) = root {
        *target = map;
    }
    result
}

/// Assemble a fresh document from create diffs, setting each leaf along its path.
///
/// # Errors
///
/// As [`apply_attribute_changes`].
pub fn build_document_from_changes(changes: &[AttributeChange]) -> Result<Document, CoreError> {
    let creates: Vec<AttributeChange> = changes
        .iter()
        .filter(|c| c.operation == ChangeOperation::Create)
        .cloned()
        .collect();
    let mut doc = Document::new();
    apply_attribute_changes(&creates, &mut doc)?;
    Ok(doc)
}

fn apply_one(root: &mut Value, change: &AttributeChange) -> Result<(), CoreError> {
    let path = change.path.as_str();
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(leaf) = segments.pop() else {
        return Ok(());
    };
    if leaf.is_empty() {
        return Ok(());
    }

    let mut parent = root;
    for segment in segments {
        parent = descend(parent, path, segment)?;
    }

    match change.operation {
        ChangeOperation::Delete => remove_leaf(parent, path, leaf),
        ChangeOperation::Create | ChangeOperation::Update => {
            let value = change.new_value.clone().unwrap_or(Value::Null);
            set_leaf(parent, path, leaf, value)
        }
    }
}

fn parse_index(path: &str, segment: &str) -> Result<usize, CoreError> {
    segment.parse::<usize>().map_err(|_| CoreError::ArrayIndex {
        path: path.to_string(),
        segment: segment.to_string(),
    })
}

/// Index of `segment` in `items`, growing the array with `null` to reach it.
fn array_slot(items: &mut Vec<Value>, path: &str, segment: &str) -> Result<usize, CoreError> {
    let idx = parse_index(path, segment)?;
    if idx >= items.len() {
        items.resize(idx + 1, Value::Null);
    }
    Ok(idx)
}

const fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

fn descend<'a>(
    current: &'a mut Value,
    path: &str,
    segment: &str,
) -> Result<&'a mut Value, CoreError> {
    if !is_container(current) {
        *current = Value::Object(Map::new());
    }
    let child = match current {
        Value::Array(items) => {
            let idx = array_slot(items, path, segment)?;
            &mut items[idx]
        }
        Value::Object(map) => map.entry(segment.to_string()).or_insert(Value::Null),
        _ => return Err(CoreError::InvalidPath(path.to_string())),
    };
    if !is_container(child) {
        *child = Value::Object(Map::new());
    }
    Ok(child)
}

fn set_leaf(parent: &mut Value, path: &str, leaf: &str, value: Value) -> Result<(), CoreError> {
    match parent {
        Value::Array(items) => {
            let idx = array_slot(items, path, leaf)?;
            items[idx] = value;
        }
        Value::Object(map) => {
            map.insert(leaf.to_string(), value);
        }
        other => {
            let mut map = Map::new();
            map.insert(leaf.to_string(), value);
            *other = Value::Object(map);
        }
    }
    Ok(())
}

/// Array elements are nulled in place so later indices keep their positions.
fn remove_leaf(parent: &mut Value, path: &str, leaf: &str) -> Result<(), CoreError> {
    match parent {
        Value::Array(items) => {
            let idx = parse_index(path, leaf)?;
            if let Some(item) = items.get_mut(idx) {
                *item = Value::Null;
            }
        }
        Value::Object(map) => {
            map.remove(leaf);
        }
        _ => {}
    }
    Ok(())
}
