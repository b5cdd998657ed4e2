//! # docmig-core
//!
//! Core types and error types for docmig.
//!
//! This crate provides the foundational types shared across all docmig crates:
//! - `ChangeOperation`, the create/update/delete tag carried by every template and diff
//! - Document snapshots and the `Document` alias for schemaless JSON objects
//! - Diff records (`AttributeChange`) and document-level previews (`PreviewChange`)
//! - Summary groups produced by collapsing identical previews
//! - Dot-path lookup and the attribute diff applier
//! - Display projections used by the CLI
//! - The declarative script file format and its `where` conditions
//! - Cross-cutting error types

pub mod change;
pub mod document;
pub mod enums;
pub mod errors;
pub mod path;
pub mod responses;
pub mod script;
