use std::sync::Arc;

use recast_api::mapping::FieldMap;
use recast_api::record::Record;
use recast_api::schema::{Shape, ShapeKind};
use recast_api::validate::ShapeValidator;
use recast_api::value::ValueBag;

use crate::builder;
use crate::error::ConvertError;
use crate::validate::SchemaValidator;

/// The conversion API: single and batch conversions between the two record
/// families, plus the merge ("update") operation.
///
/// Holds only the validation delegate; every operation is pure with respect
/// to its inputs, so one `Converter` is safe to share across threads.
pub struct Converter {
    validator: Arc<dyn ShapeValidator>,
}

impl Converter {
    pub fn new(validator: Arc<dyn ShapeValidator>) -> Self {
        Self { validator }
    }

    pub fn validator(&self) -> &Arc<dyn ShapeValidator> {
        &self.validator
    }

    /// Transfer record → domain record.
    ///
    /// Explicit nulls on the transfer side are omitted from the working bag
    /// (a null on the wire does not become a domain value), so a domain
    /// shape that requires such a field fails with `MissingField`.
    pub fn to_domain(
        &self,
        transfer: &Record,
        domain_shape: &Arc<Shape>,
        field_map: &FieldMap,
    ) -> Result<Record, ConvertError> {
        expect_kind(transfer, ShapeKind::Transfer)?;

        let mut bag = ValueBag::new();
        for (name, value) in transfer.values().iter() {
            if !value.is_null() {
                bag.set(name, value.clone());
            }
        }

        builder::build(&bag, domain_shape, field_map, self.validator.as_ref())
    }

    /// Domain record → transfer record. Construction goes through the
    /// validation delegate; its failure is relayed verbatim.
    pub fn to_transfer(
        &self,
        domain: &Record,
        transfer_shape: &Arc<Shape>,
        field_map: &FieldMap,
    ) -> Result<Record, ConvertError> {
        expect_kind(domain, ShapeKind::Domain)?;
        builder::build(
            domain.values(),
            transfer_shape,
            field_map,
            self.validator.as_ref(),
        )
    }

    /// Element-wise [`Converter::to_domain`], order-preserving.
    /// All-or-nothing: the first failing element aborts the whole batch.
    pub fn to_domain_batch(
        &self,
        transfers: &[Record],
        domain_shape: &Arc<Shape>,
    ) -> Result<Vec<Record>, ConvertError> {
        tracing::debug!(len = transfers.len(), shape = %domain_shape.name, "batch to_domain");
        let map = FieldMap::new();
        transfers
            .iter()
            .map(|t| self.to_domain(t, domain_shape, &map))
            .collect()
    }

    /// Element-wise [`Converter::to_transfer`], order-preserving,
    /// all-or-nothing.
    pub fn to_transfer_batch(
        &self,
        domains: &[Record],
        transfer_shape: &Arc<Shape>,
    ) -> Result<Vec<Record>, ConvertError> {
        tracing::debug!(len = domains.len(), shape = %transfer_shape.name, "batch to_transfer");
        let map = FieldMap::new();
        domains
            .iter()
            .map(|d| self.to_transfer(d, transfer_shape, &map))
            .collect()
    }

    /// Build a new record of `base`'s shape, taking each declared field
    /// from `overlay` when the overlay provides it — including explicit
    /// nulls and falsy values — and from `base` otherwise. Neither operand
    /// is mutated.
    pub fn merge(&self, base: &Record, overlay: &Record) -> Result<Record, ConvertError> {
        if base.shape().name != overlay.shape().name || base.kind() != overlay.kind() {
            return Err(ConvertError::ShapeMismatch {
                expected: describe(base.shape()),
                found: describe(overlay.shape()),
            });
        }

        let mut out = ValueBag::new();
        for field in &base.shape().fields {
            // membership, not truthiness: only true absence keeps the base
            let value = overlay.get(&field.name).or_else(|| base.get(&field.name));
            if let Some(value) = value {
                out.set(field.name.clone(), value.clone());
            }
        }

        builder::seal(out, base.shape(), self.validator.as_ref())
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(Arc::new(SchemaValidator))
    }
}

fn expect_kind(record: &Record, expected: ShapeKind) -> Result<(), ConvertError> {
    if record.kind() != expected {
        return Err(ConvertError::ShapeMismatch {
            expected: format!("a {expected} record"),
            found: describe(record.shape()),
        });
    }
    Ok(())
}

fn describe(shape: &Shape) -> String {
    format!("shape '{}' ({})", shape.name, shape.kind)
}
