//! HTTP Client port

use std::future::Future;

use loopcheck_domain::{CapturedResponse, RequestSpec};
use thiserror::Error;

/// Errors raised while performing a request.
///
/// A response with a 4xx or 5xx status is not an error: it is captured and
/// asserted like any other.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpClientError {
    /// The target URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request body could not be encoded.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// The server refused the connection.
    #[error("connection refused: {host}:{port}")]
    ConnectionRefused {
        /// Target host.
        host: String,
        /// Target port.
        port: u16,
    },

    /// The connection failed for another reason.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Any other client failure.
    #[error("HTTP error: {0}")]
    Other(String),
}

/// Port for performing the single request of a test case.
///
/// Implementations must not follow redirects and must not fail on
/// non-2xx statuses.
pub trait HttpClient: Send + Sync {
    /// Sends `request` relative to `base_url` and captures the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be built or sent, or the
    /// body could not be read.
    fn execute(
        &self,
        base_url: &str,
        request: &RequestSpec,
    ) -> impl Future<Output = Result<CapturedResponse, HttpClientError>> + Send;
}
