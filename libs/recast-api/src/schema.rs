use std::collections::HashMap;
use std::fmt;

/// Structured data type tag. The conversion engine does not interpret it —
/// the validation delegate does.
///
/// Type name and attributes are arbitrary:
/// - `{ name: "string", attrs: {} }`
/// - `{ name: "int64", attrs: { min: 0 } }`
/// - `{ name: "Gender", attrs: {} }` (a nested shape, opted in via `FieldMap`)
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FieldType {
    pub name: String,
    #[serde(default)]
    pub attrs: HashMap<String, serde_json::Value>,
}

impl FieldType {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: HashMap::new(),
        }
    }
}

/// A single field declared by a shape.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    /// Construction fails when a required field is absent from the source.
    #[serde(default)]
    pub required: bool,
}

impl Field {
    pub fn required(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::named(type_name),
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::named(type_name),
            required: false,
        }
    }
}

/// Shape family — which construction rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ShapeKind {
    /// Plain business record. Never validated, rebuilt rather than mutated.
    Domain,
    /// Boundary record. Construction goes through the validation delegate.
    Transfer,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeKind::Domain => write!(f, "domain"),
            ShapeKind::Transfer => write!(f, "transfer"),
        }
    }
}

/// Explicit record-shape descriptor: an ordered field list plus the shape
/// family. Built once per record type and shared (`Arc`) across calls —
/// shapes are read-only configuration.
///
/// Field matching against a shape is name-based and case-sensitive.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Shape {
    pub name: String,
    pub kind: ShapeKind,
    pub fields: Vec<Field>,
    /// Shape-level attributes. Not interpreted by the engine.
    #[serde(default)]
    pub attrs: HashMap<String, serde_json::Value>,
}

impl Shape {
    pub fn new(name: impl Into<String>, kind: ShapeKind, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            kind,
            fields,
            attrs: HashMap::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}
