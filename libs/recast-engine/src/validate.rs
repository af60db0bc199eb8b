use std::sync::Arc;

use recast_api::error::DelegateError;
use recast_api::record::Record;
use recast_api::schema::{Field, Shape};
use recast_api::validate::ShapeValidator;
use recast_api::value::{Value, ValueBag};

/// Built-in validation delegate.
///
/// Checks required-ness and scalar type tags, and trims whitespace off
/// string values. Type tags it does not recognize (nested shape names,
/// application-specific tags) pass through unchecked — interpreting those
/// is a richer delegate's job. The engine works against
/// [`ShapeValidator`], so swapping this out is a one-line change for the
/// embedding application.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl ShapeValidator for SchemaValidator {
    fn construct(&self, shape: &Arc<Shape>, bag: ValueBag) -> Result<Record, DelegateError> {
        let mut out = ValueBag::new();

        for field in &shape.fields {
            match bag.get(&field.name) {
                None => {
                    if field.required {
                        return Err(DelegateError::validation(format!(
                            "field '{}' is required",
                            field.name
                        ))
                        .with_context(format!("shape '{}'", shape.name)));
                    }
                }
                Some(Value::Null) => {
                    if field.required {
                        return Err(DelegateError::validation(format!(
                            "field '{}' is required and may not be null",
                            field.name
                        ))
                        .with_context(format!("shape '{}'", shape.name)));
                    }
                    out.set(field.name.clone(), Value::Null);
                }
                Some(value) => {
                    let value = check(field, value)?;
                    out.set(field.name.clone(), value);
                }
            }
        }

        Ok(Record::new(shape.clone(), out))
    }
}

fn check(field: &Field, value: &Value) -> Result<Value, DelegateError> {
    let ok = match field.field_type.name.as_str() {
        "string" => matches!(value, Value::String(_)),
        "int64" => matches!(value, Value::Int64(_)),
        // Most sources lack unsigned integers — accept non-negative i64.
        "uint64" => match value {
            Value::UInt64(_) => true,
            Value::Int64(v) => *v >= 0,
            _ => false,
        },
        "float64" => matches!(value, Value::Float64(_)),
        "bool" => matches!(value, Value::Bool(_)),
        "bytes" => matches!(value, Value::Bytes(_)),
        "array" => matches!(value, Value::Array(_)),
        "map" => matches!(value, Value::Map(_)),
        // Unrecognized tag — not this delegate's business.
        _ => true,
    };

    if !ok {
        return Err(DelegateError::validation(format!(
            "field '{}': expected {}, got {}",
            field.name,
            field.field_type.name,
            value.type_name()
        )));
    }

    Ok(match value {
        Value::String(s) => Value::String(s.trim().to_string()),
        Value::Int64(v) if field.field_type.name == "uint64" => Value::UInt64(*v as u64),
        other => other.clone(),
    })
}
