//! # docmig-schema
//!
//! JSON Schema support for docmig.
//!
//! This crate provides:
//! - Schema inference from a collection's documents (`docmig schema export`)
//! - Validation of a collection against an item schema, producing flat
//!   [`validate::ValidationError`] records instead of failing fast
//! - [`merge::merge_validation_errors`], which collapses identical errors
//!   found at different instance paths
//! - Reading and writing schema and error files, per collection or as one file
//! - `SchemaRegistry`: JSON Schemas of docmig's own file formats and outputs
//!
//! ## Architecture
//!
//! Value types are defined in `docmig-core` with `#[derive(JsonSchema)]`.
//! This crate imports those types for the registry. Validation itself is
//! delegated to `jsonschema`; this crate only reshapes its output.

pub mod error;
pub mod files;
pub mod infer;
pub mod merge;
pub mod registry;
pub mod validate;

pub use error::SchemaError;
pub use merge::{MergedValidationError, merge_validation_errors};
pub use registry::SchemaRegistry;
pub use validate::{ValidationError, collection_schema, validate_collection};
