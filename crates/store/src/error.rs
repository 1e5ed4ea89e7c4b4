use thiserror::Error;

use khata_core::DomainError;

/// Store-level error.
///
/// Domain outcomes (`NotFound`, `Conflict`, ...) pass through unchanged so
/// callers can branch on them; everything else is an opaque backend fault.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("store backend error in {operation}: {message}")]
    Backend { operation: String, message: String },
}

impl StoreError {
    pub fn backend(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// The domain outcome, if this error carries one.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(e) => Some(e),
            Self::Backend { .. } => None,
        }
    }
}
