//! Per-test deadlines.
#![allow(clippy::unwrap_used)]

mod support;

use std::time::Duration;

use loopcheck::HarnessConfig;
use loopcheck::prelude::*;
use pretty_assertions::assert_eq;
use support::{app, harness, harness_with};

fn slow_case() -> TestCase<axum::Router> {
    TestCase::new(app())
        .req(RequestSpec::get("/slow"))
        .res(ResponseExpectation::new().status(200).data("slept"))
}

fn short_deadline() -> HarnessConfig {
    HarnessConfig {
        default_timeout_ms: 100,
        ..HarnessConfig::default()
    }
}

#[tokio::test]
async fn test_default_timeout_passes_slow_handler() {
    harness().run(slow_case()).await.unwrap();
}

#[tokio::test]
async fn test_short_deadline_fails() {
    let err = harness_with(short_deadline())
        .run(slow_case())
        .await
        .unwrap_err();

    assert!(matches!(err, CaseError::Timeout(t) if t == Duration::from_millis(100)));
}

#[tokio::test]
async fn test_case_timeout_overrides_default() {
    harness_with(short_deadline())
        .run(slow_case().timeout("1s"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_case_timeout_can_shorten() {
    let err = harness().run(slow_case().timeout("50ms")).await.unwrap_err();
    assert_eq!(err.to_string(), "Timeout of 50ms exceeded");
}

#[tokio::test]
async fn test_invalid_timeout() {
    let err = harness().run(slow_case().timeout("soon")).await.unwrap_err();
    assert!(matches!(err, CaseError::InvalidTimeout(_)));
}
