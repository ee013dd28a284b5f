//! Request specification type

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::HttpMethod;

/// How the response body should be decoded before assertions run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Parse the body as JSON and compare structurally.
    #[default]
    Json,
    /// Keep the body as raw text and compare literally.
    Text,
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Text => f.write_str("text"),
        }
    }
}

/// Description of the single request a test case sends.
///
/// Every field is optional so that a request can act as a layer: the effective
/// request is built by stacking the built-in defaults, the case-level
/// `defaults` and the case-level `req` (see [`RequestSpec::effective`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestSpec {
    /// HTTP method
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    /// Path (joined onto the server base URL) or absolute URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Request headers
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Query string parameters
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
    /// Request body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Response decoding hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_type: Option<ResponseType>,
}

impl RequestSpec {
    /// Creates an empty request layer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a request with the given method and URL.
    #[must_use]
    pub fn with_method(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method: Some(method),
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Creates a GET request for the given URL.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::with_method(HttpMethod::Get, url)
    }

    /// Creates a POST request for the given URL.
    #[must_use]
    pub fn post(url: impl Into<String>) -> Self {
        Self::with_method(HttpMethod::Post, url)
    }

    /// Creates a DELETE request for the given URL.
    #[must_use]
    pub fn delete(url: impl Into<String>) -> Self {
        Self::with_method(HttpMethod::Delete, url)
    }

    /// Adds a request header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn data(mut self, data: impl Into<Value>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Sets the response decoding hint.
    #[must_use]
    pub const fn response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = Some(response_type);
        self
    }

    /// Builds the effective request for a case.
    ///
    /// Layers are applied in increasing priority: `{ response_type: json }`,
    /// then `defaults`, then `req`.
    #[must_use]
    pub fn effective(defaults: Option<&Self>, req: &Self) -> Self {
        let mut merged = Self {
            response_type: Some(ResponseType::Json),
            ..Self::default()
        };
        if let Some(defaults) = defaults {
            merged.extend(defaults);
        }
        merged.extend(req);
        merged
    }

    /// Deep-merges `other` on top of `self`.
    ///
    /// Present scalars override, header and parameter maps merge key-wise,
    /// JSON object bodies merge recursively and any other body replaces.
    pub fn extend(&mut self, other: &Self) {
        if other.method.is_some() {
            self.method = other.method;
        }
        if let Some(url) = &other.url {
            self.url = Some(url.clone());
        }
        self.headers
            .extend(other.headers.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.params
            .extend(other.params.iter().map(|(k, v)| (k.clone(), v.clone())));
        if let Some(data) = &other.data {
            let merged = match self.data.take() {
                Some(mut existing) => {
                    deep_extend(&mut existing, data);
                    existing
                }
                None => data.clone(),
            };
            self.data = Some(merged);
        }
        if other.response_type.is_some() {
            self.response_type = other.response_type;
        }
    }

    /// Effective method, GET when unset.
    #[must_use]
    pub fn method(&self) -> HttpMethod {
        self.method.unwrap_or_default()
    }

    /// Effective URL, `/` when unset.
    #[must_use]
    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or("/")
    }

    /// Effective response type, JSON when unset.
    #[must_use]
    pub fn effective_response_type(&self) -> ResponseType {
        self.response_type.unwrap_or_default()
    }

    /// Returns true if a header with this name is set, ignoring case.
    #[must_use]
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.keys().any(|k| k.eq_ignore_ascii_case(name))
    }
}

/// Recursively merges `source` into `target`.
///
/// Objects merge key by key; arrays and scalars in `source` replace what is
/// in `target`.
pub fn deep_extend(target: &mut Value, source: &Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                match target.get_mut(key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        deep_extend(existing, value);
                    }
                    _ => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, source) => *target = source.clone(),
    }
}
