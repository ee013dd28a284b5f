//! Captured response type

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::request::ResponseType;

/// Response headers keyed by lower-cased name.
///
/// A header that appeared several times keeps every value in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseHeaders(BTreeMap<String, Vec<String>>);

impl ResponseHeaders {
    /// Creates an empty header map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value, folding the name to lowercase.
    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        self.0
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value.into());
    }

    /// Returns every value received for `name`, ignoring case.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Option<&[String]> {
        self.0.get(&name.to_ascii_lowercase()).map(Vec::as_slice)
    }

    /// Returns the header value with repeated values joined by `,`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        self.get_all(name).map(|values| values.join(","))
    }

    /// Returns true if the header was received.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(&name.to_ascii_lowercase())
    }

    /// Number of distinct header names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no header was received.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates names and values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl<N: AsRef<str>, V: Into<String>> FromIterator<(N, V)> for ResponseHeaders {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.append(name.as_ref(), value);
        }
        headers
    }
}

/// The response captured from the ephemeral server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: ResponseHeaders,
    /// Decoded body
    pub data: Value,
    /// Time from sending the request to reading the full body
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

impl CapturedResponse {
    /// Builds a response, decoding `body` according to `response_type`.
    ///
    /// In JSON mode a body that does not parse is kept as a string.
    #[must_use]
    pub fn decode(
        status: u16,
        headers: ResponseHeaders,
        body: &[u8],
        response_type: ResponseType,
        duration: Duration,
    ) -> Self {
        let text = String::from_utf8_lossy(body);
        let data = match response_type {
            ResponseType::Json => serde_json::from_str(&text)
                .unwrap_or_else(|_| Value::String(text.into_owned())),
            ResponseType::Text => Value::String(text.into_owned()),
        };
        Self {
            status,
            headers,
            data,
            duration,
        }
    }

    /// Returns true if the status code indicates success (2xx).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns the body as text: strings verbatim, anything else serialized.
    #[must_use]
    pub fn text(&self) -> String {
        match &self.data {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
