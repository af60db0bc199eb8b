use std::fmt;

/// Error kind for collaborator errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Store,
    Request,
}

/// Collaborator error — returned by every collaborator trait method.
///
/// The conversion engine relays these verbatim (wrapped in the matching
/// engine-error variant, message untouched); it never rewrites or recovers
/// from them. Validation detail in particular belongs to the delegate.
#[derive(Debug, Clone)]
pub struct DelegateError {
    pub kind: ErrorKind,
    pub message: String,
}

impl DelegateError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Validation,
            message: msg.into(),
        }
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Store,
            message: msg.into(),
        }
    }

    pub fn request(msg: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Request,
            message: msg.into(),
        }
    }

    /// Prepend context to the message, keeping the kind. The result reads
    /// `"context: original message"`.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{ctx}: {}", self.message),
        }
    }
}

impl fmt::Display for DelegateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for DelegateError {}
