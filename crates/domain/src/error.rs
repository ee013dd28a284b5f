//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur while building or validating a case.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A duration string could not be parsed.
    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// A header pattern is not a valid regular expression.
    #[error("invalid header pattern: {0}")]
    InvalidHeaderPattern(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
