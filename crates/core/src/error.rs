//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, user-actionable failures. Infrastructure
/// concerns (connection faults, delivery failures) belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A requested owner/customer/code does not exist within the caller's scope.
    #[error("not found")]
    NotFound,

    /// A value failed validation (zero amount, short password, malformed input).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Bad credential, bad/expired one-time code, or wrong tenant scope.
    #[error("unauthorized")]
    Unauthorized,

    /// A uniqueness conflict on create (duplicate code/email/shop code).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
