use std::sync::Arc;

use crate::schema::{Shape, ShapeKind};
use crate::value::{Value, ValueBag};

/// A materialized instance of a shape: the shape handle plus one value bag.
///
/// Domain records and transfer records are both `Record`s — the family is
/// carried by `shape.kind`. Instances are created fresh per conversion call
/// and never mutated; "updating" one means building a new one.
///
/// `Record::new` performs no validation. Transfer records are expected to
/// come out of a [`crate::validate::ShapeValidator`], which is the only
/// construction path the engine uses for them.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    shape: Arc<Shape>,
    values: ValueBag,
}

impl Record {
    pub fn new(shape: Arc<Shape>, values: ValueBag) -> Self {
        Self { shape, values }
    }

    pub fn shape(&self) -> &Arc<Shape> {
        &self.shape
    }

    pub fn kind(&self) -> ShapeKind {
        self.shape.kind
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn values(&self) -> &ValueBag {
        &self.values
    }

    pub fn into_bag(self) -> ValueBag {
        self.values
    }
}
