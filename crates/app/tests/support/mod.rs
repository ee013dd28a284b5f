//! Sample application and harness setup shared by the end-to-end tests.
#![allow(dead_code, clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::Query;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router, middleware};
use loopcheck::{ExtensionRegistry, HarnessConfig, TestHarness};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

pub const HELLO: &str = "eps1.0_hellofriend.mov";
pub const ONES_AND_ZEROES: &str = "eps1.1_ones-and-zer0es.mpeg";
pub const POWERED_BY: &str = "loopcheck-sample";

/// Installs a test-writer subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

/// A harness with its own registry so tests do not see each other's hooks.
pub fn harness() -> TestHarness {
    harness_with(HarnessConfig::default())
}

pub fn harness_with(config: HarnessConfig) -> TestHarness {
    init_tracing();
    TestHarness::from_config(&config, Arc::new(ExtensionRegistry::new())).unwrap()
}

/// The sample application.
///
/// - `GET /` answers a JSON string
/// - `GET /text` answers plain text
/// - `GET /errored` answers a 401 error document
/// - `GET /slow` answers after 300ms
/// - anything else echoes the request back as JSON
pub fn app() -> Router {
    Router::new()
        .route("/", get(root).fallback(echo))
        .route("/text", get(text).fallback(echo))
        .route("/errored", get(errored).fallback(echo))
        .route("/slow", get(slow).fallback(echo))
        .fallback(echo)
        .layer(middleware::map_response(powered_by))
}

async fn root() -> Json<&'static str> {
    Json(HELLO)
}

async fn text() -> &'static str {
    ONES_AND_ZEROES
}

async fn errored() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": true,
            "code": "NOT_AUTHORIZED",
            "name": "UnauthorizedError",
            "message": "You are not authorized, yo",
            "status": 401,
        })),
    )
        .into_response()
}

async fn slow() -> Json<&'static str> {
    tokio::time::sleep(Duration::from_millis(300)).await;
    Json("slept")
}

async fn echo(
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(qs): Query<BTreeMap<String, String>>,
    body: Bytes,
) -> Json<Value> {
    let mut echoed: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in &headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        match echoed.get_mut(name.as_str()) {
            Some(existing) => {
                existing.push_str(", ");
                existing.push_str(&value);
            }
            None => {
                echoed.insert(name.as_str().to_string(), value);
            }
        }
    }

    Json(json!({
        "method": method.as_str(),
        "url": uri.path_and_query().map_or(uri.path(), |pq| pq.as_str()),
        "path": uri.path(),
        "headers": echoed,
        "qs": qs,
        "body": serde_json::from_slice::<Value>(&body).unwrap_or_else(|_| json!({})),
    }))
}

async fn powered_by(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert("x-powered-by", HeaderValue::from_static(POWERED_BY));
    response
}
