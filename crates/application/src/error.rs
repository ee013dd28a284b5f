//! Application error types

use std::time::Duration;

use loopcheck_domain::{AssertionError, DomainError, RequiredField};
use thiserror::Error;

use crate::extensions::HookError;
use crate::ports::{HttpClientError, ServerStartError};

/// Why a test case failed.
#[derive(Debug, Error)]
pub enum CaseError {
    /// The case is missing `app`, `req` or `res`.
    #[error("Missing `{0}` from opts")]
    MissingField(RequiredField),

    /// The case's timeout string could not be parsed.
    #[error("invalid timeout: {0}")]
    InvalidTimeout(#[from] DomainError),

    /// The ephemeral server did not come up.
    #[error(transparent)]
    ServerStart(#[from] ServerStartError),

    /// The request could not be performed.
    #[error(transparent)]
    Http(#[from] HttpClientError),

    /// A hook returned an error.
    #[error(transparent)]
    Hook(#[from] HookError),

    /// The response did not match the expectation.
    #[error(transparent)]
    Assertion(#[from] AssertionError),

    /// The case ran past its deadline.
    #[error("Timeout of {}ms exceeded", .0.as_millis())]
    Timeout(Duration),
}

impl CaseError {
    /// Returns the assertion failure, if that is what this is.
    #[must_use]
    pub const fn as_assertion(&self) -> Option<&AssertionError> {
        match self {
            Self::Assertion(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type alias for running a case.
pub type CaseResult<T> = Result<T, CaseError>;
