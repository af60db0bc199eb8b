use std::sync::Arc;

use recast_api::record::Record;
use recast_api::request::RequestSource;
use recast_api::schema::Shape;
use recast_api::validate::ShapeValidator;
use recast_api::value::ValueBag;

use crate::error::ConvertError;

/// Inbound payload → validated transfer record.
///
/// Thin pass-through: project the declared fields out of the decoded body
/// payload (query parameters when the body is empty) and construct the
/// shape through the validation delegate. Undeclared payload keys never
/// reach the delegate; validation failures propagate unwrapped.
pub fn from_request(
    source: &dyn RequestSource,
    transfer_shape: &Arc<Shape>,
    validator: &dyn ShapeValidator,
) -> Result<Record, ConvertError> {
    let mut payload = source.payload().map_err(ConvertError::Request)?;
    if payload.is_empty() {
        tracing::debug!(shape = %transfer_shape.name, "empty body payload, falling back to query parameters");
        payload = source.query().map_err(ConvertError::Request)?;
    }

    let mut bag = ValueBag::new();
    for field in &transfer_shape.fields {
        if let Some(value) = payload.get(&field.name) {
            bag.set(field.name.clone(), value.clone());
        }
    }

    validator
        .construct(transfer_shape, bag)
        .map_err(ConvertError::Validation)
}
