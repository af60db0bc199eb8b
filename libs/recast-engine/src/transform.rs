use std::sync::Arc;

use recast_api::store::Stored;
use recast_api::value::Value;

use crate::error::ConvertError;

/// Per-field value transform, applied between the attribute read and the
/// bag write. Receives the raw stored attribute so that relationship
/// handles can opt in to conversion (see `persist::many_to_domain`).
pub trait FieldTransform: Send + Sync {
    fn apply(&self, raw: Stored) -> Result<Value, ConvertError>;
}

impl<F> FieldTransform for F
where
    F: Fn(Stored) -> Result<Value, ConvertError> + Send + Sync,
{
    fn apply(&self, raw: Stored) -> Result<Value, ConvertError> {
        self(raw)
    }
}

/// Field-name → transform table for a persistence conversion.
///
/// Keys are storage-side names — the name the attribute was read under,
/// after renaming. Transforms are read-only configuration, shared across
/// calls.
#[derive(Clone, Default)]
pub struct TransformTable {
    entries: Vec<(String, Arc<dyn FieldTransform>)>,
}

impl TransformTable {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with(mut self, field: impl Into<String>, transform: Arc<dyn FieldTransform>) -> Self {
        self.entries.push((field.into(), transform));
        self
    }

    /// Convenience for the common case: a pure value → value function.
    /// A relationship handle under the field is rejected.
    pub fn map_value<F>(self, field: impl Into<String>, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        let field = field.into();
        let name = field.clone();
        self.with(field, Arc::new(move |raw: Stored| match raw {
            Stored::Value(v) => Ok(f(v)),
            Stored::Related(_) => Err(ConvertError::ShapeMismatch {
                expected: format!("a plain value for field '{name}'"),
                found: "a relationship handle".to_string(),
            }),
        }))
    }

    pub fn get(&self, field: &str) -> Option<&Arc<dyn FieldTransform>> {
        self.entries.iter().find(|(k, _)| k == field).map(|(_, t)| t)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
