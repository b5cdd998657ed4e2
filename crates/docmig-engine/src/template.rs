//! Document-level change templates.

use std::fmt;
use std::sync::Arc;

use docmig_core::document::Document;
use docmig_core::enums::ChangeOperation;

use crate::attribute::AttributeChangeTemplate;

/// Predicate selecting the documents a template applies to.
pub type DocumentFilter = Arc<dyn Fn(&Document) -> bool + Send + Sync>;

/// One operation over one collection, before compilation.
#[derive(Clone)]
pub struct PreviewChangeTemplate {
    pub operation: ChangeOperation,
    pub collection_path: String,
    /// Absent filter matches every document.
    pub filter: Option<DocumentFilter>,
    /// Required for create and update, ignored for delete.
    pub changes: Option<Vec<AttributeChangeTemplate>>,
}

impl PreviewChangeTemplate {
    pub fn new(operation: ChangeOperation, collection_path: impl Into<String>) -> Self {
        Self {
            operation,
            collection_path: collection_path.into(),
            filter: None,
            changes: None,
        }
    }

    pub fn create(collection_path: impl Into<String>) -> Self {
        Self::new(ChangeOperation::Create, collection_path)
    }

    pub fn update(collection_path: impl Into<String>) -> Self {
        Self::new(ChangeOperation::Update, collection_path)
    }

    pub fn delete(collection_path: impl Into<String>) -> Self {
        Self::new(ChangeOperation::Delete, collection_path)
    }

    #[must_use]
    pub fn with_changes(mut self, changes: Vec<AttributeChangeTemplate>) -> Self {
        self.changes = Some(changes);
        self
    }

    #[must_use]
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&Document) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Whether `doc` passes this template's filter.
    #[must_use]
    pub fn matches(&self, doc: &Document) -> bool {
        self.filter.as_ref().is_none_or(|filter| filter(doc))
    }
}

impl fmt::Debug for PreviewChangeTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewChangeTemplate")
            .field("operation", &self.operation)
            .field("collection_path", &self.collection_path)
            .field("filter", &self.filter.as_ref().map(|_| "<fn>"))
            .field("changes", &self.changes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn absent_filter_matches_everything() {
        let template = PreviewChangeTemplate::delete("users");
        assert!(template.matches(&Document::new()));
    }

    #[test]
    fn filter_is_applied() {
        let template = PreviewChangeTemplate::delete("users")
            .with_filter(|doc| doc.get("banned") == Some(&Value::Bool(true)));
        let mut banned = Document::new();
        banned.insert("banned".into(), json!(true));
        assert!(template.matches(&banned));
        assert!(!template.matches(&Document::new()));
    }

    #[test]
    fn debug_hides_callbacks() {
        let template = PreviewChangeTemplate::update("users").with_filter(|_| true);
        let rendered = format!("{template:?}");
        assert!(rendered.contains("<fn>"));
        assert!(rendered.contains("users"));
    }
}
