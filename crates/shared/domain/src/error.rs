//! Domain-level errors.
//!
//! These errors represent business rule violations and malformed records.
//! They are independent of infrastructure concerns (HTTP, session storage).

use thiserror::Error;

/// Domain-specific errors for business rule violations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Validation failed for a field or input
    #[error("Validation error: {0}")]
    Validation(String),

    /// A backend record could not be interpreted
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// Status change not allowed from the current state
    #[error("Cannot move a user from '{from}' to '{to}'")]
    InvalidTransition { from: String, to: String },

    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),
}

impl DomainError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    /// Create a malformed record error
    pub fn malformed(msg: impl Into<String>) -> Self {
        DomainError::MalformedRecord(msg.into())
    }

    /// Create an invalid transition error
    pub fn invalid_transition(from: impl Into<String>, to: impl Into<String>) -> Self {
        DomainError::InvalidTransition {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>) -> Self {
        DomainError::NotFound(entity.into())
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
