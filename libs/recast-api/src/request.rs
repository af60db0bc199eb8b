use crate::error::DelegateError;
use crate::value::ValueBag;

/// The request-parsing collaborator.
///
/// Wire decoding happened upstream — the engine only ever sees structured
/// field-name → value payloads.
pub trait RequestSource: Send + Sync {
    /// Structured body payload.
    fn payload(&self) -> Result<ValueBag, DelegateError>;

    /// Decoded query parameters — consulted when the body payload is empty.
    fn query(&self) -> Result<ValueBag, DelegateError>;
}
