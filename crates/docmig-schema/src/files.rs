//! Reading schema files and writing schema and error exports.
//!
//! Output paths follow one rule: a directory receives one
//! `<collection>.json` per collection, anything else is a single file, and a
//! single file cannot hold several collections.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::error::SchemaError;
use crate::merge::merge_validation_errors;
use crate::validate::ValidationError;

/// Per-collection path inside `base` when it is a directory, else `base`.
#[must_use]
pub fn collection_file(base: &Path, collection: &str) -> PathBuf {
    if base.is_dir() {
        base.join(format!("{collection}.json"))
    } else {
        base.to_path_buf()
    }
}

/// Reject a non-directory path when more than one collection is involved.
///
/// # Errors
///
/// Returns `SchemaError::InvalidPath` naming the offending path.
pub fn require_folder_for_many(
    path: &Path,
    collections: &[String],
    purpose: &str,
) -> Result<(), SchemaError> {
    if collections.len() > 1 && !path.is_dir() {
        return Err(SchemaError::InvalidPath {
            path: path.to_path_buf(),
            reason: format!("must be a folder when {purpose} multiple collections"),
        });
    }
    Ok(())
}

/// Load a JSON schema file.
///
/// # Errors
///
/// Returns `SchemaError::MissingFile` if absent, `Io` or `Json` on read/parse failure.
pub fn read_schema(path: &Path) -> Result<Value, SchemaError> {
    if !path.exists() {
        return Err(SchemaError::MissingFile(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

/// Write pretty-printed JSON, creating parent directories.
///
/// # Errors
///
/// Returns `SchemaError::Io` or `SchemaError::Json`.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), SchemaError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|source| SchemaError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let text = serde_json::to_string_pretty(value)?;
    std::fs::write(path, text).map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "json written");
    Ok(())
}

/// Write validation errors for several collections.
///
/// A directory receives one file per collection that had errors. A file
/// receives one flat array of every error. With `summarize`, errors are
/// merged before writing. Returns the paths written.
///
/// # Errors
///
/// Propagates errors from [`write_json`].
pub fn write_validation_errors(
    output: &Path,
    errors: &[(String, Vec<ValidationError>)],
    summarize: bool,
) -> Result<Vec<PathBuf>, SchemaError> {
    let write = |path: &Path, errors: &[ValidationError]| {
        if summarize {
            write_json(path, &merge_validation_errors(errors))
        } else {
            write_json(path, errors)
        }
    };

    if output.is_dir() {
        let mut written = Vec::new();
        for (collection, collection_errors) in errors {
            if collection_errors.is_empty() {
                continue;
            }
            let path = collection_file(output, collection);
            write(&path, collection_errors)?;
            written.push(path);
        }
        Ok(written)
    } else {
        let all: Vec<ValidationError> = errors
            .iter()
            .flat_map(|(_, collection_errors)| collection_errors.iter().cloned())
            .collect();
        write(output, &all)?;
        Ok(vec![output.to_path_buf()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn error(path: &str) -> ValidationError {
        ValidationError {
            keyword: "type".into(),
            instance_path: path.into(),
            schema_path: "#/items/properties/age/type".into(),
            params: json!({"type": "integer"}),
            message: "must be integer".into(),
        }
    }

    #[test]
    fn collection_file_uses_directory_when_present() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            collection_file(dir.path(), "users"),
            dir.path().join("users.json")
        );
        let file = dir.path().join("schema.json");
        assert_eq!(collection_file(&file, "users"), file);
    }

    #[test]
    fn many_collections_need_a_folder() {
        let dir = TempDir::new().unwrap();
        let names = vec!["a".to_string(), "b".to_string()];
        assert!(require_folder_for_many(dir.path(), &names, "exporting").is_ok());

        let err = require_folder_for_many(&dir.path().join("out.json"), &names, "exporting")
            .unwrap_err();
        assert!(err.to_string().contains("must be a folder when exporting multiple collections"));

        let one = vec!["a".to_string()];
        assert!(require_folder_for_many(&dir.path().join("out.json"), &one, "exporting").is_ok());
    }

    #[test]
    fn read_schema_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read_schema(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, SchemaError::MissingFile(_)));
    }

    #[test]
    fn single_file_gets_flat_array() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("errors.json");
        let errors = vec![
            ("users".to_string(), vec![error("/0/age")]),
            ("orders".to_string(), vec![error("/3/age")]),
        ];
        let written = write_validation_errors(&out, &errors, false).unwrap();
        assert_eq!(written, vec![out.clone()]);

        let back: Vec<ValidationError> =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(back, vec![error("/0/age"), error("/3/age")]);
    }

    #[test]
    fn directory_gets_one_file_per_failing_collection_summarized() {
        let dir = TempDir::new().unwrap();
        let errors = vec![
            ("users".to_string(), vec![error("/0/age"), error("/1/age")]),
            ("clean".to_string(), vec![]),
        ];
        let written = write_validation_errors(dir.path(), &errors, true).unwrap();
        assert_eq!(written, vec![dir.path().join("users.json")]);

        let back: Value =
            serde_json::from_str(&std::fs::read_to_string(&written[0]).unwrap()).unwrap();
        assert_eq!(back[0]["instance_paths"], json!(["/0/age", "/1/age"]));
        assert_eq!(back[0]["instance_path"], json!("/0/age,/1/age"));
        assert!(!dir.path().join("clean.json").exists());
    }
}
