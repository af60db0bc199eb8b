use std::sync::Arc;

use recast_api::mapping::{FieldMap, Nested, RenameTable};
use recast_api::record::Record;
use recast_api::schema::{Shape, ShapeKind};
use recast_api::validate::ShapeValidator;
use recast_api::value::{Value, ValueBag};

use crate::error::ConvertError;
use crate::matcher;

/// Upper bound on field-map recursion. A field map is a finite value, so a
/// true cycle cannot be constructed, but a programmatically built map can
/// still be arbitrarily deep; past this the build fails with
/// [`ConvertError::DepthExceeded`]. Self-referential maps are unsupported.
pub const MAX_NESTING: usize = 32;

/// Construct a new record of `shape` from `bag`.
///
/// - Fields are matched by name, case-sensitively, with no renaming (the
///   persistence adapter renames upstream, before the bag exists).
/// - Fields listed in `field_map` recurse into their nested shape; the
///   retrieved value must itself be a bag.
/// - An absent optional field stays absent; an absent required field fails.
/// - Transfer shapes are constructed through the validation delegate, whose
///   failure is relayed verbatim.
/// - The source is never mutated, and the result carries no field the shape
///   does not declare.
pub fn build(
    bag: &ValueBag,
    shape: &Arc<Shape>,
    field_map: &FieldMap,
    validator: &dyn ShapeValidator,
) -> Result<Record, ConvertError> {
    build_at(bag, shape, field_map, validator, 0)
}

fn build_at(
    bag: &ValueBag,
    shape: &Arc<Shape>,
    field_map: &FieldMap,
    validator: &dyn ShapeValidator,
    depth: usize,
) -> Result<Record, ConvertError> {
    if depth >= MAX_NESTING {
        return Err(ConvertError::DepthExceeded { limit: MAX_NESTING });
    }

    let no_renames = RenameTable::new();
    let mut out = ValueBag::new();

    for field in &shape.fields {
        let source = matcher::resolve(&field.name, &no_renames);
        match bag.get(source) {
            Some(value) => {
                let value = match field_map.nested(&field.name) {
                    Some(nested) if !value.is_null() => {
                        descend(value, &field.name, nested, validator, depth)?
                    }
                    _ => value.clone(),
                };
                out.set(field.name.clone(), value);
            }
            None if field.required => {
                return Err(ConvertError::MissingField {
                    shape: shape.name.clone(),
                    field: field.name.clone(),
                });
            }
            // Absent optional field stays absent — no entry, not a null.
            None => {}
        }
    }

    seal(out, shape, validator)
}

fn descend(
    value: &Value,
    field: &str,
    nested: &Nested,
    validator: &dyn ShapeValidator,
    depth: usize,
) -> Result<Value, ConvertError> {
    let inner = value.as_map().ok_or_else(|| ConvertError::ShapeMismatch {
        expected: format!("a nested bag for field '{field}'"),
        found: value.type_name().to_string(),
    })?;

    tracing::debug!(field, shape = %nested.shape.name, depth, "descending into nested shape");
    let record = build_at(inner, &nested.shape, &nested.map, validator, depth + 1)?;
    Ok(Value::Map(record.into_bag()))
}

/// Turn a resolved bag into a record: directly for domain shapes, through
/// the validation delegate for transfer shapes.
pub(crate) fn seal(
    bag: ValueBag,
    shape: &Arc<Shape>,
    validator: &dyn ShapeValidator,
) -> Result<Record, ConvertError> {
    match shape.kind {
        ShapeKind::Domain => Ok(Record::new(shape.clone(), bag)),
        ShapeKind::Transfer => validator.construct(shape, bag).map_err(|e| {
            tracing::warn!(shape = %shape.name, error = %e, "validation delegate rejected record");
            ConvertError::Validation(e)
        }),
    }
}
