//! Response assertions.
//!
//! Checks a [`CapturedResponse`] against a [`ResponseExpectation`]: status
//! equality, header matching and body comparison. The first failing check
//! is returned as an [`AssertionError`].

use serde_json::Value;
use thiserror::Error;

use crate::request::ResponseType;
use crate::response::{CapturedResponse, HeaderExpectation, ResponseExpectation, ResponseHeaders};

/// A response did not match its expectation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AssertionError {
    /// The status code differs.
    #[error("Incorrect response status: expected {expected}, got {actual}")]
    StatusMismatch {
        /// Expected status code.
        expected: u16,
        /// Received status code.
        actual: u16,
    },

    /// An expected header was not sent.
    #[error("Expected \"{name}\" header")]
    MissingHeader {
        /// Lower-cased header name.
        name: String,
    },

    /// A header did not match its pattern.
    #[error("Expected \"{name}\" header matching {pattern}, got \"{actual}\"")]
    HeaderPatternMismatch {
        /// Header name as written in the expectation.
        name: String,
        /// Pattern, rendered as `/source/`.
        pattern: String,
        /// Received value.
        actual: String,
    },

    /// A header differs from its literal expectation.
    #[error("Expected \"{name}\" header equal to \"{expected}\", got \"{actual}\"")]
    HeaderValueMismatch {
        /// Header name as written in the expectation.
        name: String,
        /// Expected value.
        expected: String,
        /// Received value.
        actual: String,
    },

    /// A JSON body is not structurally equal to the expectation.
    #[error("Incorrect response JSON: expected {expected}, got {actual}")]
    JsonBodyMismatch {
        /// Expected body.
        expected: Value,
        /// Received body.
        actual: Value,
    },

    /// A text body differs from the expectation.
    #[error("Incorrect response body: expected \"{expected}\", got \"{actual}\"")]
    TextBodyMismatch {
        /// Expected body.
        expected: String,
        /// Received body.
        actual: String,
    },
}

/// Compares expected headers against received ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderMatcher;

impl HeaderMatcher {
    /// Checks one header.
    ///
    /// The lookup ignores case. Repeated headers are joined with `,` before
    /// comparison.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionError::MissingHeader`],
    /// [`AssertionError::HeaderPatternMismatch`] or
    /// [`AssertionError::HeaderValueMismatch`].
    pub fn check(
        name: &str,
        expected: &HeaderExpectation,
        actual: &ResponseHeaders,
    ) -> Result<(), AssertionError> {
        let Some(actual_value) = actual.get(name) else {
            return Err(AssertionError::MissingHeader {
                name: name.to_ascii_lowercase(),
            });
        };

        match expected {
            HeaderExpectation::Exact(value) if *value == actual_value => Ok(()),
            HeaderExpectation::Exact(value) => Err(AssertionError::HeaderValueMismatch {
                name: name.to_string(),
                expected: value.clone(),
                actual: actual_value,
            }),
            HeaderExpectation::Pattern(regex) if regex.is_match(&actual_value) => Ok(()),
            HeaderExpectation::Pattern(_) => Err(AssertionError::HeaderPatternMismatch {
                name: name.to_string(),
                pattern: expected.to_string(),
                actual: actual_value,
            }),
        }
    }

    /// Checks every expected header in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first header assertion that fails.
    pub fn check_all<'a>(
        expected: impl IntoIterator<Item = (&'a String, &'a HeaderExpectation)>,
        actual: &ResponseHeaders,
    ) -> Result<(), AssertionError> {
        expected
            .into_iter()
            .try_for_each(|(name, expectation)| Self::check(name, expectation, actual))
    }
}

/// Recursive structural equality over JSON values.
///
/// Objects must have the same key set with equal values, arrays the same
/// elements in the same order. Numbers compare by value, so `1` equals
/// `1.0`.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn structurally_equal(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Object(expected), Value::Object(actual)) => {
            expected.len() == actual.len()
                && expected.iter().all(|(key, value)| {
                    actual
                        .get(key)
                        .is_some_and(|other| structurally_equal(value, other))
                })
        }
        (Value::Array(expected), Value::Array(actual)) => {
            expected.len() == actual.len()
                && expected
                    .iter()
                    .zip(actual)
                    .all(|(a, b)| structurally_equal(a, b))
        }
        (Value::Number(expected), Value::Number(actual)) => {
            expected == actual
                || matches!((expected.as_f64(), actual.as_f64()), (Some(a), Some(b)) if a == b)
        }
        (expected, actual) => expected == actual,
    }
}

/// Asserts a captured response against an expectation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseAsserter;

impl ResponseAsserter {
    /// Runs status, header and body checks in that order.
    ///
    /// # Errors
    ///
    /// Returns the first failing assertion.
    pub fn assert(
        expectation: &ResponseExpectation,
        response: &CapturedResponse,
        response_type: ResponseType,
    ) -> Result<(), AssertionError> {
        if let Some(expected) = expectation.status {
            Self::assert_status(expected, response.status)?;
        }
        HeaderMatcher::check_all(&expectation.headers, &response.headers)?;
        if let Some(expected) = &expectation.data {
            Self::assert_body(expected, response, response_type)?;
        }
        Ok(())
    }

    /// Exact status code equality.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionError::StatusMismatch`] when the codes differ.
    pub const fn assert_status(expected: u16, actual: u16) -> Result<(), AssertionError> {
        if expected == actual {
            Ok(())
        } else {
            Err(AssertionError::StatusMismatch { expected, actual })
        }
    }

    /// Structural equality in JSON mode, literal string equality otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionError::JsonBodyMismatch`] or
    /// [`AssertionError::TextBodyMismatch`].
    pub fn assert_body(
        expected: &Value,
        response: &CapturedResponse,
        response_type: ResponseType,
    ) -> Result<(), AssertionError> {
        match response_type {
            ResponseType::Json if structurally_equal(expected, &response.data) => Ok(()),
            ResponseType::Json => Err(AssertionError::JsonBodyMismatch {
                expected: expected.clone(),
                actual: response.data.clone(),
            }),
            ResponseType::Text => {
                let expected = match expected {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                let actual = response.text();
                if expected == actual {
                    Ok(())
                } else {
                    Err(AssertionError::TextBodyMismatch { expected, actual })
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;

    fn json_headers() -> ResponseHeaders {
        [
            ("Content-Type", "application/json; charset=utf-8"),
            ("X-Powered-By", "axum"),
        ]
        .into_iter()
        .collect()
    }

    fn response(status: u16, data: Value) -> CapturedResponse {
        CapturedResponse {
            status,
            headers: json_headers(),
            data,
            duration: Duration::from_millis(3),
        }
    }

    #[test]
    fn test_missing_header_uses_lowercase_name() {
        let err = HeaderMatcher::check(
            "X-Vanity",
            &"Follow me".into(),
            &json_headers(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            AssertionError::MissingHeader {
                name: "x-vanity".to_string()
            }
        );
        assert_eq!(err.to_string(), "Expected \"x-vanity\" header");
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        HeaderMatcher::check("x-powered-by", &"axum".into(), &json_headers()).unwrap();
        HeaderMatcher::check("X-POWERED-BY", &"axum".into(), &json_headers()).unwrap();
    }

    #[test]
    fn test_header_pattern_mismatch() {
        let expected = HeaderExpectation::pattern("text").unwrap();
        let err = HeaderMatcher::check("content-type", &expected, &json_headers()).unwrap_err();
        assert!(matches!(err, AssertionError::HeaderPatternMismatch { .. }));
        assert_eq!(
            err.to_string(),
            "Expected \"content-type\" header matching /text/, got \"application/json; charset=utf-8\""
        );
    }

    #[test]
    fn test_header_pattern_match() {
        let expected = HeaderExpectation::pattern(r"application/json").unwrap();
        HeaderMatcher::check("content-type", &expected, &json_headers()).unwrap();
    }

    #[test]
    fn test_header_value_mismatch() {
        let err = HeaderMatcher::check("content-type", &"text".into(), &json_headers()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Expected \"content-type\" header equal to \"text\", got \"application/json; charset=utf-8\""
        );
    }

    #[test]
    fn test_multi_valued_header_compares_joined() {
        let headers: ResponseHeaders = [("vary", "accept"), ("vary", "origin")]
            .into_iter()
            .collect();
        HeaderMatcher::check("vary", &"accept,origin".into(), &headers).unwrap();

        let pattern = HeaderExpectation::pattern("^accept,origin$").unwrap();
        HeaderMatcher::check("Vary", &pattern, &headers).unwrap();
    }

    #[test]
    fn test_structural_equality() {
        let expected = json!({ "a": [1, { "b": "c" }], "d": null });
        let same = json!({ "d": null, "a": [1.0, { "b": "c" }] });
        assert!(structurally_equal(&expected, &same));

        assert!(!structurally_equal(&json!([1, 2]), &json!([2, 1])));
        assert!(!structurally_equal(&json!({ "a": 1 }), &json!({ "a": 1, "b": 2 })));
        assert!(!structurally_equal(&json!({ "a": 1 }), &json!({ "b": 1 })));
        assert!(!structurally_equal(&json!("1"), &json!(1)));
    }

    #[test]
    fn test_assert_checks_status_first() {
        let expectation = ResponseExpectation::new()
            .status(201)
            .header("x-missing", "value");
        let err = ResponseAsserter::assert(&expectation, &response(200, json!({})), ResponseType::Json)
            .unwrap_err();
        assert_eq!(
            err,
            AssertionError::StatusMismatch {
                expected: 201,
                actual: 200
            }
        );
    }

    #[test]
    fn test_assert_json_body() {
        let expectation = ResponseExpectation::new().status(200).data(json!({ "ok": true }));
        ResponseAsserter::assert(&expectation, &response(200, json!({ "ok": true })), ResponseType::Json)
            .unwrap();

        let err = ResponseAsserter::assert(
            &expectation,
            &response(200, json!({ "ok": false })),
            ResponseType::Json,
        )
        .unwrap_err();
        assert!(matches!(err, AssertionError::JsonBodyMismatch { .. }));
    }

    #[test]
    fn test_assert_text_body() {
        let expectation = ResponseExpectation::new().data("eps1.1_ones-and-zer0es.mpeg");
        ResponseAsserter::assert(
            &expectation,
            &response(200, json!("eps1.1_ones-and-zer0es.mpeg")),
            ResponseType::Text,
        )
        .unwrap();

        let err = ResponseAsserter::assert(&expectation, &response(200, json!("nope")), ResponseType::Text)
            .unwrap_err();
        assert_eq!(
            err,
            AssertionError::TextBodyMismatch {
                expected: "eps1.1_ones-and-zer0es.mpeg".to_string(),
                actual: "nope".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_expectation_passes() {
        ResponseAsserter::assert(
            &ResponseExpectation::new(),
            &response(500, Value::Null),
            ResponseType::Json,
        )
        .unwrap();
    }
}
