//! Executor behaviour: credential injection, the single re-authentication retry
//! and failure classification over real HTTP

use crate::mock_server::{MockServerFixture, CLIENT_ID};
use mockito::Matcher;
use pdf_services_rust::auth::{Authenticator, ServicePrincipalAuthenticator};
use pdf_services_rust::job::{JobRequest, OperationKind};
use pdf_services_rust::transport::{HttpExecutor, HttpRequest, RequestKey};
use pdf_services_rust::ErrorKind;
use reqwest::StatusCode;
use serde_json::json;
use std::sync::Arc;

const EXPIRED_BODY: &str = r#"{"error":{"code":"UNAUTHORIZED","message":"Access token expired"}}"#;

fn authenticator(fixture: &MockServerFixture) -> Arc<dyn Authenticator> {
    Arc::new(ServicePrincipalAuthenticator::new(
        fixture.credentials(),
        &fixture.config(),
        fixture.executor(),
    ))
}

fn resource_request(
    fixture: &MockServerFixture,
    auth: Arc<dyn Authenticator>,
    retryable: bool,
) -> HttpRequest {
    HttpRequest::get(RequestKey::Platform, fixture.url("/resource"))
        .authenticated(auth)
        .retryable(retryable)
}

async fn run(executor: &HttpExecutor, request: HttpRequest) -> pdf_services_rust::Result<String> {
    let response = executor.process(request, &[StatusCode::OK]).await?;
    Ok(response.text().await.unwrap_or_default())
}

#[tokio::test]
async fn test_expired_token_is_refreshed_and_request_replayed() {
    let mut fixture = MockServerFixture::new().await;
    let first_token = fixture.mock_token("token-1", 86_400, 1).await;
    let second_token = fixture.mock_token("token-2", 86_400, 1).await;
    let rejected = fixture
        .server
        .mock("GET", "/resource")
        .match_header("authorization", "Bearer token-1")
        .with_status(401)
        .with_body(EXPIRED_BODY)
        .expect(1)
        .create_async()
        .await;
    let accepted = fixture
        .server
        .mock("GET", "/resource")
        .match_header("authorization", "Bearer token-2")
        .match_header("x-api-key", CLIENT_ID)
        .with_status(200)
        .with_body("ok")
        .expect(1)
        .create_async()
        .await;

    let executor = fixture.executor();
    let body = run(&executor, resource_request(&fixture, authenticator(&fixture), true))
        .await
        .unwrap();

    assert_eq!(body, "ok");
    rejected.assert_async().await;
    accepted.assert_async().await;
    first_token.assert_async().await;
    second_token.assert_async().await;
}

#[tokio::test]
async fn test_second_rejection_is_returned_without_another_retry() {
    let mut fixture = MockServerFixture::new().await;
    let tokens = fixture.mock_token("token", 86_400, 2).await;
    let rejected = fixture
        .server
        .mock("GET", "/resource")
        .with_status(401)
        .with_header("x-request-id", "req-401")
        .with_body(EXPIRED_BODY)
        .expect(2)
        .create_async()
        .await;

    let executor = fixture.executor();
    let err = run(&executor, resource_request(&fixture, authenticator(&fixture), true))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ServiceApi);
    assert_eq!(err.status_code(), Some(401));
    assert_eq!(err.error_code(), Some("UNAUTHORIZED"));
    assert_eq!(err.request_tracking_id(), Some("req-401"));
    rejected.assert_async().await;
    tokens.assert_async().await;
}

#[tokio::test]
async fn test_non_retryable_request_fails_on_first_rejection() {
    let mut fixture = MockServerFixture::new().await;
    let tokens = fixture.mock_token("token", 86_400, 1).await;
    let rejected = fixture
        .server
        .mock("GET", "/resource")
        .with_status(401)
        .with_body(EXPIRED_BODY)
        .expect(1)
        .create_async()
        .await;

    let executor = fixture.executor();
    let err = run(&executor, resource_request(&fixture, authenticator(&fixture), false))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(401));
    rejected.assert_async().await;
    tokens.assert_async().await;
}

#[tokio::test]
async fn test_forbidden_is_not_retried() {
    let mut fixture = MockServerFixture::new().await;
    let tokens = fixture.mock_token("token", 86_400, 1).await;
    let forbidden = fixture
        .server
        .mock("GET", "/resource")
        .with_status(403)
        .with_body(r#"{"error":{"code":"FORBIDDEN","message":"Not entitled"}}"#)
        .expect(1)
        .create_async()
        .await;

    let executor = fixture.executor();
    let err = run(&executor, resource_request(&fixture, authenticator(&fixture), true))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(403));
    assert_eq!(err.error_code(), Some("FORBIDDEN"));
    forbidden.assert_async().await;
    tokens.assert_async().await;
}

#[tokio::test]
async fn test_unauthenticated_request_sends_default_headers_only() {
    let mut fixture = MockServerFixture::new().await;
    let m = fixture
        .server
        .mock("GET", "/public")
        .match_header("authorization", Matcher::Missing)
        .match_header("x-api-key", Matcher::Missing)
        .match_header("accept", "application/json, text/plain, */*")
        .match_header(
            "x-api-app-info",
            Matcher::Regex("^rust-pdfservices-sdk-".to_string()),
        )
        .with_status(200)
        .with_body("public")
        .create_async()
        .await;

    let executor = fixture.executor();
    let body = run(
        &executor,
        HttpRequest::get(RequestKey::Download, fixture.url("/public")),
    )
    .await
    .unwrap();

    assert_eq!(body, "public");
    m.assert_async().await;
}

#[tokio::test]
async fn test_usage_limit_on_submit() {
    let mut fixture = MockServerFixture::new().await;
    let _tokens = fixture.mock_token_any().await;
    let _m = fixture
        .server
        .mock("POST", "/operation/compresspdf")
        .with_status(429)
        .with_header("x-request-id", "req-429")
        .with_body(r#"{"error":{"code":"429001","message":"Too many"}}"#)
        .create_async()
        .await;

    let services = fixture.services();
    let request = JobRequest::new(OperationKind::CompressPdf, &json!({"assetID": "a1"})).unwrap();
    let err = services.submit(&request).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UsageLimit);
    assert_eq!(err.status_code(), Some(429));
    assert_eq!(err.error_code(), Some("429001"));
    assert_eq!(err.request_tracking_id(), Some("req-429"));
    assert!(err.to_string().contains("Service usage limit has been reached"));
}

#[tokio::test]
async fn test_gateway_overload_gets_canned_message() {
    let mut fixture = MockServerFixture::new().await;
    let _tokens = fixture.mock_token_any().await;
    let _m = fixture
        .server
        .mock("POST", "/operation/compresspdf")
        .with_status(503)
        .with_header("x-request-id", "req-503")
        .with_body("<html>upstream busy</html>")
        .create_async()
        .await;

    let services = fixture.services();
    let request = JobRequest::new(OperationKind::CompressPdf, &json!({"assetID": "a1"})).unwrap();
    let err = services.submit(&request).await.unwrap_err();

    let details = err.service_details().unwrap();
    assert_eq!(details.status_code, 503);
    assert_eq!(details.error_code, "ServiceUnavailable");
    assert!(details.message.contains("overloaded"));
    assert_eq!(details.request_tracking_id.as_deref(), Some("req-503"));
}

#[tokio::test]
async fn test_unrecognised_body_keeps_status_and_raw_text() {
    let mut fixture = MockServerFixture::new().await;
    let _tokens = fixture.mock_token_any().await;
    let _m = fixture
        .server
        .mock("POST", "/operation/compresspdf")
        .with_status(400)
        .with_body("plain text failure")
        .create_async()
        .await;

    let services = fixture.services();
    let request = JobRequest::new(OperationKind::CompressPdf, &json!({"assetID": "a1"})).unwrap();
    let err = services.submit(&request).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ServiceApi);
    assert_eq!(err.status_code(), Some(400));
    assert_eq!(err.error_code(), Some("UNKNOWN"));
    assert!(err.to_string().contains("plain text failure"));
}
