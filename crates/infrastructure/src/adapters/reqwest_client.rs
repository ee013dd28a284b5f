//! HTTP Client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port using the reqwest library.
//! It sends the single request of a test case to the ephemeral server.

use std::time::Instant;

use loopcheck_application::ports::{HttpClient, HttpClientError};
use loopcheck_domain::{CapturedResponse, HttpMethod, RequestSpec, ResponseHeaders};
use reqwest::{Client, Method, header};
use serde_json::Value;
use url::Url;

use crate::config::HarnessConfig;

/// HTTP client implementation using reqwest.
///
/// Redirects are never followed and idle connections are never kept: each
/// case talks to a server that is gone by the time the next one starts.
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Creates a client with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new() -> Result<Self, HttpClientError> {
        Self::from_config(&HarnessConfig::default())
    }

    /// Creates a client sending `config.user_agent`.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn from_config(config: &HarnessConfig) -> Result<Self, HttpClientError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::none())
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        Ok(Self { client })
    }

    /// Creates a new HTTP client with a custom reqwest client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    /// Resolves the request URL against `base_url` and appends the query
    /// parameters.
    ///
    /// Absolute URLs are used as-is. Otherwise the two halves are joined
    /// with exactly one `/`, so `/echo/` under `http://host/` stays
    /// `http://host/echo/` and never resolves against the base's path.
    fn build_url(base_url: &str, request: &RequestSpec) -> Result<Url, HttpClientError> {
        let path = request.url();
        let joined = if is_absolute_url(path) {
            path.to_string()
        } else {
            format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                path.trim_start_matches('/')
            )
        };

        let mut url =
            Url::parse(&joined).map_err(|e| HttpClientError::InvalidUrl(format!("{e}: {joined}")))?;
        if !request.params.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.params);
        }
        Ok(url)
    }

    /// Encodes the request body.
    ///
    /// Strings are sent raw. Anything else is sent as JSON, with a JSON
    /// content type unless the request already names one.
    fn build_body(
        builder: reqwest::RequestBuilder,
        request: &RequestSpec,
    ) -> Result<reqwest::RequestBuilder, HttpClientError> {
        match &request.data {
            None | Some(Value::Null) => Ok(builder),
            Some(Value::String(text)) => Ok(builder.body(text.clone())),
            Some(data) => {
                let bytes = serde_json::to_vec(data)
                    .map_err(|e| HttpClientError::InvalidBody(format!("Invalid JSON: {e}")))?;
                let builder = if request.has_header("content-type") {
                    builder
                } else {
                    builder.header(header::CONTENT_TYPE, "application/json")
                };
                Ok(builder.body(bytes))
            }
        }
    }

    /// Maps reqwest errors to `HttpClientError`.
    fn map_error(error: &reqwest::Error) -> HttpClientError {
        if error.is_connect() {
            let message = error.to_string();
            if message.to_lowercase().contains("refused") {
                return HttpClientError::ConnectionRefused {
                    host: error
                        .url()
                        .and_then(|u| u.host_str().map(str::to_string))
                        .unwrap_or_else(|| "unknown".to_string()),
                    port: error.url().and_then(Url::port).unwrap_or(80),
                };
            }
            return HttpClientError::ConnectionFailed(message);
        }

        if error.is_builder() {
            return HttpClientError::InvalidUrl(error.to_string());
        }

        HttpClientError::Other(error.to_string())
    }
}

impl HttpClient for ReqwestHttpClient {
    async fn execute(
        &self,
        base_url: &str,
        request: &RequestSpec,
    ) -> Result<CapturedResponse, HttpClientError> {
        let url = Self::build_url(base_url, request)?;

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method()), url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        builder = Self::build_body(builder, request)?;

        let start = Instant::now();
        let response = builder.send().await.map_err(|e| Self::map_error(&e))?;

        let status = response.status().as_u16();
        let headers: ResponseHeaders = response
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| HttpClientError::Other(format!("Failed to read body: {e}")))?;
        let duration = start.elapsed();

        Ok(CapturedResponse::decode(
            status,
            headers,
            &body,
            request.effective_response_type(),
            duration,
        ))
    }
}

/// `scheme://` or protocol-relative `//`.
fn is_absolute_url(url: &str) -> bool {
    if url.starts_with("//") {
        return true;
    }
    url.split_once("://").is_some_and(|(scheme, _)| {
        let mut chars = scheme.chars();
        chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}
