//! # DomainError
//!
//! Closed error taxonomy shared by every port and service.
//! The transport layer maps each variant to exactly one response status.

use thiserror::Error;

/// The primary error type for all forum core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Referenced thread, post, forum or author does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Parent post in another thread, or a uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Malformed input (pagination parameters, non-numeric ids, bad vote values).
    #[error("validation error: {0}")]
    Validation(String),

    /// Storage failure or unexpected constraint violation.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(what: impl Into<String>) -> Self {
        Self::Conflict(what.into())
    }

    pub fn validation(what: impl Into<String>) -> Self {
        Self::Validation(what.into())
    }

    pub fn internal(what: impl Into<String>) -> Self {
        Self::Internal(what.into())
    }
}

/// A specialized Result type for forum core logic.
pub type DomainResult<T> = std::result::Result<T, DomainError>;
