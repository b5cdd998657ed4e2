//! # docmig-engine
//!
//! The change-template engine.
//!
//! A [`template::PreviewChangeTemplate`] names an operation, a collection, an
//! optional document filter, and per-attribute changes. The
//! [`compiler::CompiledTemplate`] checks it once and then either previews the
//! change (before/after snapshots plus attribute diffs, no writes) or applies
//! it through a [`docmig_store::DocumentStore`] in atomic batches.
//!
//! - [`attribute`]: attribute templates, literal or computed values, and the
//!   builder producing one diff per attribute
//! - [`orchestrator`]: preview and mutate over a list of templates
//! - [`summary`]: grouping of identical previews for display
//! - [`script`] and [`script_file`]: the migration script contract and the
//!   declarative TOML/JSON loader

pub mod attribute;
pub mod compiler;
pub mod error;
pub mod orchestrator;
pub mod script;
pub mod script_file;
pub mod summary;
pub mod template;

pub use attribute::{AttributeChangeBuilder, AttributeChangeTemplate, ValueSource};
pub use compiler::CompiledTemplate;
pub use error::EngineError;
pub use orchestrator::{MigrateOptions, TemplateMigration, migrate_all, preview_all};
pub use script::{Migration, MigrationScript, ScriptExports};
pub use summary::summarize_preview_changes;
pub use template::{DocumentFilter, PreviewChangeTemplate};
