use std::sync::Arc;

use crate::schema::Shape;

/// One nested-conversion directive: the shape to build for a field's value,
/// plus the field map to apply inside it.
#[derive(Debug, Clone)]
pub struct Nested {
    pub shape: Arc<Shape>,
    pub map: FieldMap,
}

/// Per-field nested-conversion directives for a record build.
///
/// Nesting is explicit opt-in: the builder recurses only into fields listed
/// here, never inferring nesting from declared types. Recursion depth is
/// bounded by the depth of this map; self-referential maps are unsupported.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    entries: Vec<(String, Nested)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Direct the builder to convert `field` into `shape`.
    pub fn nest(self, field: impl Into<String>, shape: Arc<Shape>) -> Self {
        self.nest_with(field, shape, FieldMap::new())
    }

    /// Like [`FieldMap::nest`], with a field map for the nested build.
    pub fn nest_with(mut self, field: impl Into<String>, shape: Arc<Shape>, map: FieldMap) -> Self {
        self.entries.push((field.into(), Nested { shape, map }));
        self
    }

    pub fn nested(&self, field: &str) -> Option<&Nested> {
        self.entries.iter().find(|(k, _)| k == field).map(|(_, n)| n)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Domain-field-name → persistence-field-name translation. Used only by the
/// persistence adapter; the record builder always matches names as-is.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RenameTable {
    entries: Vec<(String, String)>,
}

impl RenameTable {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn rename(mut self, field: impl Into<String>, stored_as: impl Into<String>) -> Self {
        self.entries.push((field.into(), stored_as.into()));
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == field)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
