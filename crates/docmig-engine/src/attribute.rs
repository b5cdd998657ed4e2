//! Attribute change templates and the builder that turns them into diffs.
//!
//! A template's value is either a literal or a computed callback. Both are
//! resolved through [`ValueSource::resolve`], so the rest of the pipeline
//! never branches on which kind it holds.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use docmig_core::change::AttributeChange;
use docmig_core::document::Document;
use docmig_core::enums::ChangeOperation;
use docmig_core::path::get_nested_value;
use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::error::EngineError;

/// Computed value callback. Receives an owned copy of the document.
pub type ValueFn =
    Arc<dyn Fn(Document) -> BoxFuture<'static, anyhow::Result<Value>> + Send + Sync>;

#[derive(Clone)]
pub enum ValueSource {
    Literal(Value),
    Computed(ValueFn),
}

impl ValueSource {
    /// Wrap an async callback.
    pub fn computed<F, Fut>(f: F) -> Self
    where
        F: Fn(Document) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        Self::Computed(Arc::new(move |doc| Box::pin(f(doc))))
    }

    /// Wrap an infallible synchronous callback.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Document) -> Value + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(move |doc| {
            let value = f(&doc);
            Box::pin(async move { Ok(value) })
        }))
    }

    /// Evaluate against `doc`. Literals are cloned as is.
    ///
    /// # Errors
    ///
    /// Returns whatever the computed callback fails with.
    pub async fn resolve(&self, doc: &Document) -> anyhow::Result<Value> {
        match self {
            Self::Literal(value) => Ok(value.clone()),
            Self::Computed(f) => f(doc.clone()).await,
        }
    }
}

impl fmt::Debug for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Computed(_) => f.write_str("Computed(<fn>)"),
        }
    }
}

impl From<Value> for ValueSource {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

/// Declarative change for one attribute.
#[derive(Debug, Clone)]
pub struct AttributeChangeTemplate {
    pub path: String,
    pub operation: ChangeOperation,
    /// Required for create and update; a missing value writes `null`.
    pub value: Option<ValueSource>,
}

impl AttributeChangeTemplate {
    pub fn create(path: impl Into<String>, value: impl Into<ValueSource>) -> Self {
        Self {
            path: path.into(),
            operation: ChangeOperation::Create,
            value: Some(value.into()),
        }
    }

    pub fn update(path: impl Into<String>, value: impl Into<ValueSource>) -> Self {
        Self {
            path: path.into(),
            operation: ChangeOperation::Update,
            value: Some(value.into()),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            operation: ChangeOperation::Delete,
            value: None,
        }
    }
}

/// Evaluates one attribute template against documents.
#[derive(Debug, Clone, Copy)]
pub struct AttributeChangeBuilder<'a> {
    template: &'a AttributeChangeTemplate,
}

impl<'a> AttributeChangeBuilder<'a> {
    #[must_use]
    pub const fn new(template: &'a AttributeChangeTemplate) -> Self {
        Self { template }
    }

    /// Produce the diff record for `doc`.
    ///
    /// Update and delete read the current value at the path; create and update
    /// resolve the new value. The template's own operation tags the result.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::ValueCallback` if a computed value fails.
    pub async fn build(self, doc: &Document) -> Result<AttributeChange, EngineError> {
        let template = self.template;
        let operation = template.operation;

        let old_value = operation
            .reads_old_value()
            .then(|| get_nested_value(doc, &template.path).cloned())
            .flatten();

        let new_value = if operation.writes_new_value() {
            let value = match &template.value {
                Some(source) => {
                    source
                        .resolve(doc)
                        .await
                        .map_err(|source| EngineError::ValueCallback {
                            path: template.path.clone(),
                            source,
                        })?
                }
                None => Value::Null,
            };
            Some(value)
        } else {
            None
        };

        Ok(AttributeChange {
            path: template.path.clone(),
            operation,
            old_value,
            new_value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("test documents must be objects"),
        }
    }

    #[tokio::test]
    async fn update_reads_old_and_resolves_literal() {
        let template = AttributeChangeTemplate::update("age", json!(26));
        let change = AttributeChangeBuilder::new(&template)
            .build(&doc(json!({"name": "John", "age": 25})))
            .await
            .unwrap();
        assert_eq!(
            change,
            AttributeChange {
                path: "age".into(),
                operation: ChangeOperation::Update,
                old_value: Some(json!(25)),
                new_value: Some(json!(26)),
            }
        );
    }

    #[tokio::test]
    async fn delete_reads_old_only() {
        let template = AttributeChangeTemplate::delete("profile.city");
        let change = AttributeChangeBuilder::new(&template)
            .build(&doc(json!({"profile": {"city": "Oslo"}})))
            .await
            .unwrap();
        assert_eq!(change.operation, ChangeOperation::Delete);
        assert_eq!(change.old_value, Some(json!("Oslo")));
        assert_eq!(change.new_value, None);
    }

    #[tokio::test]
    async fn create_keeps_its_operation_and_skips_old_value() {
        let template = AttributeChangeTemplate::create("age", json!(1));
        let change = AttributeChangeBuilder::new(&template)
            .build(&doc(json!({"age": 99})))
            .await
            .unwrap();
        assert_eq!(change.operation, ChangeOperation::Create);
        assert_eq!(change.old_value, None);
        assert_eq!(change.new_value, Some(json!(1)));
    }

    #[tokio::test]
    async fn missing_path_through_scalar_has_no_old_value() {
        let template = AttributeChangeTemplate::update("name.first", json!("J"));
        let change = AttributeChangeBuilder::new(&template)
            .build(&doc(json!({"name": "John"})))
            .await
            .unwrap();
        assert_eq!(change.old_value, None);
    }

    #[tokio::test]
    async fn computed_value_sees_the_document() {
        let template = AttributeChangeTemplate::update(
            "age",
            ValueSource::computed(|doc: Document| async move {
                let age = doc.get("age").and_then(Value::as_i64).unwrap_or_default();
                Ok(json!(age + 1))
            }),
        );
        let change = AttributeChangeBuilder::new(&template)
            .build(&doc(json!({"age": 41})))
            .await
            .unwrap();
        assert_eq!(change.new_value, Some(json!(42)));
    }

    #[tokio::test]
    async fn failing_callback_names_the_path() {
        let template = AttributeChangeTemplate::update(
            "age",
            ValueSource::computed(|_doc: Document| async { anyhow::bail!("boom") }),
        );
        let err = AttributeChangeBuilder::new(&template)
            .build(&Document::new())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::ValueCallback { ref path, .. } if path == "age"));
        assert_eq!(err.to_string(), "Value callback for 'age' failed: boom");
    }

    #[tokio::test]
    async fn missing_value_writes_null() {
        let template = AttributeChangeTemplate {
            path: "note".into(),
            operation: ChangeOperation::Update,
            value: None,
        };
        let change = AttributeChangeBuilder::new(&template)
            .build(&Document::new())
            .await
            .unwrap();
        assert_eq!(change.new_value, Some(Value::Null));
    }
}
