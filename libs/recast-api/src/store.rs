use crate::error::DelegateError;
use crate::value::Value;

/// One attribute as exposed by the store: either a plain value or a
/// multi-valued relationship handle.
///
/// Relationship handles are never auto-converted — a transform (see the
/// engine's `many_to_domain`) must claim the field explicitly.
pub enum Stored {
    Value(Value),
    Related(Vec<Box<dyn PersistedRecord>>),
}

/// A record as exposed by the storage/ORM collaborator.
///
/// The engine only ever reads attributes by their storage-side name; it has
/// no idea what backs the record.
pub trait PersistedRecord: Send + Sync + std::fmt::Debug {
    /// Read one attribute. `None` when the record exposes no such attribute.
    fn read(&self, name: &str) -> Option<Stored>;
}

/// The persistence collaborator.
///
/// The engine doesn't enumerate or know concrete implementations. One
/// operation: single-predicate lookup with first-or-none semantics. Any
/// blocking happens entirely inside the implementation — the engine itself
/// performs no I/O.
pub trait RecordStore: Send + Sync {
    fn find_one(
        &self,
        field: &str,
        value: &Value,
    ) -> Result<Option<Box<dyn PersistedRecord>>, DelegateError>;
}
