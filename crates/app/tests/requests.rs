//! End-to-end checks against the sample application.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod support;

use axum::Router;
use loopcheck::domain::RequiredField;
use loopcheck::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use support::{HELLO, ONES_AND_ZEROES, POWERED_BY, app, harness};

#[tokio::test]
async fn test_missing_app() {
    let err = harness().run(TestCase::default()).await.unwrap_err();
    assert!(matches!(err, CaseError::MissingField(RequiredField::App)));
    assert_eq!(err.to_string(), "Missing `app` from opts");
}

#[tokio::test]
async fn test_missing_req() {
    let err = harness().run(TestCase::new(app())).await.unwrap_err();
    assert_eq!(err.to_string(), "Missing `req` from opts");
}

#[tokio::test]
async fn test_missing_res() {
    let case = TestCase::new(app()).req(RequestSpec::get("/"));
    let err = harness().run(case).await.unwrap_err();
    assert_eq!(err.to_string(), "Missing `res` from opts");
}

#[tokio::test]
async fn test_get_checks_status_and_body() {
    harness()
        .run(
            TestCase::new(app())
                .req(RequestSpec::get("/"))
                .res(ResponseExpectation::new().status(200).data(HELLO)),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_get_text_checks_header_pattern_and_body() {
    harness()
        .run(
            TestCase::new(app())
                .req(RequestSpec::get("/text").response_type(ResponseType::Text))
                .res(
                    ResponseExpectation::new()
                        .header("content-type", HeaderExpectation::pattern("text/plain").unwrap())
                        .data(ONES_AND_ZEROES),
                ),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_post_checks_status_and_headers() {
    harness()
        .run(
            TestCase::new(app())
                .req(RequestSpec::post("/"))
                .res(
                    ResponseExpectation::new()
                        .status(200)
                        .header("X-Powered-By", POWERED_BY),
                ),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_error_status_is_asserted_not_raised() {
    harness()
        .run(
            TestCase::new(app())
                .req(RequestSpec::get("/errored"))
                .res(ResponseExpectation::new().status(401).data(json!({
                    "error": true,
                    "code": "NOT_AUTHORIZED",
                    "name": "UnauthorizedError",
                    "message": "You are not authorized, yo",
                    "status": 401,
                }))),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_wrong_status_fails() {
    let err = harness()
        .run(
            TestCase::new(app())
                .req(RequestSpec::get("/errored"))
                .res(ResponseExpectation::new().status(200)),
        )
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Incorrect response status: expected 200, got 401"
    );
}

#[tokio::test]
async fn test_delete_is_echoed() {
    let req = RequestSpec::delete("/echo/")
        .header("accept", "application/json")
        .header("host", "localhost")
        .header("user-agent", "integration-test")
        .param("one", HELLO)
        .param("two", ONES_AND_ZEROES)
        .data(json!({
            "three": "eps1.2_d3bug.mkv",
            "four": "eps1.3_da3m0ns.mp4",
        }));

    let case = TestCase::new(app())
        .req(req)
        .res(ResponseExpectation::new().status(200).data(json!({
            "method": "DELETE",
            "url": format!("/echo/?one={HELLO}&two={ONES_AND_ZEROES}"),
            "path": "/echo/",
            "headers": {
                "accept": "application/json",
                "content-length": "56",
                "content-type": "application/json",
                "host": "localhost",
                "user-agent": "integration-test",
            },
            "qs": {"one": HELLO, "two": ONES_AND_ZEROES},
            "body": {"three": "eps1.2_d3bug.mkv", "four": "eps1.3_da3m0ns.mp4"},
        })));

    harness().run(case).await.unwrap();
}

#[tokio::test]
async fn test_defaults_are_merged_under_req() {
    let case = TestCase::new(app())
        .defaults(
            RequestSpec::post("/ignored")
                .header("x-team", "fsociety")
                .data(json!({"nested": {"a": 1}})),
        )
        .req(RequestSpec::post("/echo").data(json!({"nested": {"b": 2}})))
        .res(ResponseExpectation::new().status(200))
        .after_fn(|cx| {
            let data = &cx.res.expect("response in after").data;
            assert_eq!(data["path"], "/echo");
            assert_eq!(data["headers"]["x-team"], "fsociety");
            assert_eq!(data["body"], json!({"nested": {"a": 1, "b": 2}}));
            Ok(())
        });

    harness().run(case).await.unwrap();
}

#[tokio::test]
async fn test_same_case_can_run_twice() {
    let harness = harness();
    let case: TestCase<Router> = TestCase::new(app())
        .req(RequestSpec::get("/"))
        .res(ResponseExpectation::new().status(200).data(HELLO));

    harness.run(case.clone()).await.unwrap();
    harness.run(case).await.unwrap();
}

#[tokio::test]
async fn test_concurrent_runs_are_independent() {
    let harness = harness();
    let hello = TestCase::new(app())
        .req(RequestSpec::get("/"))
        .res(ResponseExpectation::new().data(HELLO));
    let text = TestCase::new(app())
        .req(RequestSpec::get("/text").response_type(ResponseType::Text))
        .res(ResponseExpectation::new().data(ONES_AND_ZEROES));

    let (a, b) = tokio::join!(harness.run(hello), harness.run(text));
    a.unwrap();
    b.unwrap();
}
