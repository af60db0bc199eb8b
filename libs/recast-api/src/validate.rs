use std::sync::Arc;

use crate::error::DelegateError;
use crate::record::Record;
use crate::schema::Shape;
use crate::value::ValueBag;

/// The validation collaborator.
///
/// Transfer records are only ever constructed through this trait; the
/// engine hands over a resolved value bag and relays any failure verbatim.
/// What "valid" means — and whatever coercion it implies — is entirely the
/// delegate's business.
pub trait ShapeValidator: Send + Sync {
    fn construct(&self, shape: &Arc<Shape>, bag: ValueBag) -> Result<Record, DelegateError>;
}
