use recast_api::error::DelegateError;

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("shape '{shape}': missing required field '{field}'")]
    MissingField { shape: String, field: String },

    #[error("expected {expected}, got {found}")]
    ShapeMismatch { expected: String, found: String },

    #[error("filter field '{field}' is not allow-listed for lookups")]
    UnsupportedFilterField { field: String },

    #[error("field map nesting exceeded {limit} levels")]
    DepthExceeded { limit: usize },

    #[error("validation error: {0}")]
    Validation(DelegateError),

    #[error("store error: {0}")]
    Store(DelegateError),

    #[error("request error: {0}")]
    Request(DelegateError),
}
