//! Expected response description

use std::fmt;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

use crate::error::{DomainError, DomainResult};

/// Expected value of a single response header.
#[derive(Debug, Clone)]
pub enum HeaderExpectation {
    /// The header must equal this string exactly.
    Exact(String),
    /// The header must match this pattern somewhere.
    Pattern(Regex),
}

impl HeaderExpectation {
    /// Compiles a pattern expectation.
    ///
    /// # Errors
    ///
    /// Returns an error if `pattern` is not a valid regular expression.
    pub fn pattern(pattern: &str) -> DomainResult<Self> {
        Regex::new(pattern)
            .map(Self::Pattern)
            .map_err(|e| DomainError::InvalidHeaderPattern(format!("{pattern}: {e}")))
    }
}

impl fmt::Display for HeaderExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(value) => f.write_str(value),
            Self::Pattern(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

impl From<&str> for HeaderExpectation {
    fn from(value: &str) -> Self {
        Self::Exact(value.to_string())
    }
}

impl From<String> for HeaderExpectation {
    fn from(value: String) -> Self {
        Self::Exact(value)
    }
}

impl From<Regex> for HeaderExpectation {
    fn from(regex: Regex) -> Self {
        Self::Pattern(regex)
    }
}

/// What the response must look like. Omitted fields are not asserted.
#[derive(Debug, Clone, Default)]
pub struct ResponseExpectation {
    /// Expected status code
    pub status: Option<u16>,
    /// Expected headers, checked in insertion order
    pub headers: IndexMap<String, HeaderExpectation>,
    /// Expected body
    pub data: Option<Value>,
}

impl ResponseExpectation {
    /// Creates an expectation that asserts nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects this status code.
    #[must_use]
    pub const fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Expects a header to equal or match the given value.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, expected: impl Into<HeaderExpectation>) -> Self {
        self.headers.insert(name.into(), expected.into());
        self
    }

    /// Expects this body.
    #[must_use]
    pub fn data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Returns true if nothing would be asserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.headers.is_empty() && self.data.is_none()
    }
}
