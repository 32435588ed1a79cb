//! Job submission and polling against a mock platform

use crate::mock_server::{MockServerFixture, CLIENT_ID};
use mockito::Matcher;
use pdf_services_rust::job::{JobHandle, JobRequest, JobResult, JobStatus, NotifierConfig, OperationKind};
use pdf_services_rust::ErrorKind;
use serde_json::json;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

const IN_PROGRESS: &str = r#"{"status":"in progress"}"#;

fn compress_handle(fixture: &MockServerFixture) -> JobHandle {
    JobHandle::new(fixture.url("/status/job-1"), OperationKind::CompressPdf)
}

async fn mock_in_progress(
    fixture: &mut MockServerFixture,
    retry_after: &str,
    hits: Option<usize>,
) -> mockito::Mock {
    let mock = fixture
        .server
        .mock("GET", "/status/job-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_header("retry-after", retry_after)
        .with_header("x-request-id", "poll-req")
        .with_body(IN_PROGRESS);
    match hits {
        Some(n) => mock.expect(n),
        None => mock.expect_at_least(1),
    }
    .create_async()
    .await
}

#[tokio::test]
async fn test_submit_returns_location_verbatim() {
    let mut fixture = MockServerFixture::new().await;
    let _tokens = fixture.mock_token_any().await;
    let location = fixture.url("/status/job-1?token=abc");
    let submit = fixture
        .server
        .mock("POST", "/operation/compresspdf")
        .match_header("x-dcsdk-ops-info", "Compress PDF Operation")
        .match_header("x-api-key", CLIENT_ID)
        .match_header("authorization", "Bearer session-token")
        .match_header("x-request-id", Matcher::Any)
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(json!({"assetID": "in-1", "compressionLevel": "HIGH"})))
        .with_status(201)
        .with_header("location", &location)
        .create_async()
        .await;

    let services = fixture.services();
    let request = JobRequest::new(
        OperationKind::CompressPdf,
        &json!({"assetID": "in-1", "compressionLevel": "HIGH"}),
    )
    .unwrap();
    let handle = services.submit(&request).await.unwrap();

    assert_eq!(handle.location(), location);
    assert_eq!(handle.kind(), OperationKind::CompressPdf);
    submit.assert_async().await;
}

#[tokio::test]
async fn test_submit_includes_notifiers() {
    let mut fixture = MockServerFixture::new().await;
    let _tokens = fixture.mock_token_any().await;
    let submit = fixture
        .server
        .mock("POST", "/operation/ocr")
        .match_body(Matcher::PartialJson(json!({
            "assetID": "in-1",
            "notifiers": [{
                "type": "CALLBACK",
                "data": {"url": "https://hooks.example/done", "headers": {"x-api-key": "hook"}}
            }]
        })))
        .with_status(201)
        .with_header("location", &fixture.url("/status/job-2"))
        .create_async()
        .await;

    let services = fixture.services();
    let request = JobRequest::new(OperationKind::Ocr, &json!({"assetID": "in-1"}))
        .unwrap()
        .with_notifier(
            NotifierConfig::callback("https://hooks.example/done")
                .unwrap()
                .with_header("x-api-key", "hook"),
        );
    services.submit(&request).await.unwrap();
    submit.assert_async().await;
}

#[tokio::test]
async fn test_submit_without_location_is_service_error() {
    let mut fixture = MockServerFixture::new().await;
    let _tokens = fixture.mock_token_any().await;
    let _m = fixture
        .mock_json_response("POST", "/operation/compresspdf", 201, "{}")
        .await;

    let services = fixture.services();
    let request = JobRequest::new(OperationKind::CompressPdf, &json!({"assetID": "a"})).unwrap();
    let err = services.submit(&request).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ServiceApi);
}

#[tokio::test]
async fn test_poll_honours_retry_after_until_done() {
    let mut fixture = MockServerFixture::new().await;
    let _tokens = fixture.mock_token_any().await;
    let in_progress = mock_in_progress(&mut fixture, "1", Some(2)).await;
    let done = fixture
        .server
        .mock("GET", "/status/job-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "status": "done",
                "asset": {"assetID": "out-1", "downloadUri": "https://storage.example/out-1"}
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let services = fixture.services();
    let started = Instant::now();
    let outcome = services
        .get_job_result(&compress_handle(&fixture))
        .await
        .unwrap();

    assert!(started.elapsed() >= Duration::from_secs(2));
    assert_eq!(outcome.status(), JobStatus::Done);
    match outcome.result() {
        Some(JobResult::Asset { asset }) => {
            assert_eq!(asset.asset_id(), "out-1");
            assert_eq!(asset.download_uri(), Some("https://storage.example/out-1"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
    in_progress.assert_async().await;
    done.assert_async().await;
}

#[tokio::test]
async fn test_failed_job_surfaces_service_error() {
    let mut fixture = MockServerFixture::new().await;
    let _tokens = fixture.mock_token_any().await;
    let _m = fixture
        .server
        .mock("GET", "/status/job-1")
        .with_status(200)
        .with_header("x-request-id", "job-req-9")
        .with_body(
            r#"{"status":"failed","error":{"code":"BAD_PDF","message":"Input file is corrupted","status":400}}"#,
        )
        .create_async()
        .await;

    let services = fixture.services();
    let err = services
        .get_job_result(&compress_handle(&fixture))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ServiceApi);
    assert_eq!(err.status_code(), Some(400));
    assert_eq!(err.error_code(), Some("BAD_PDF"));
    assert_eq!(err.request_tracking_id(), Some("job-req-9"));
    assert!(err.to_string().contains("Input file is corrupted"));
}

#[tokio::test]
async fn test_bounded_poll_times_out_with_last_tracking_id() {
    let mut fixture = MockServerFixture::new().await;
    let _tokens = fixture.mock_token_any().await;
    let _m = mock_in_progress(&mut fixture, "1", None).await;

    let services = fixture.services();
    let err = services
        .get_job_result_bounded(&compress_handle(&fixture), Duration::from_millis(1_500))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert_eq!(err.request_tracking_id(), Some("poll-req"));
}

#[tokio::test]
async fn test_cancelled_poll_returns_promptly() {
    let mut fixture = MockServerFixture::new().await;
    let _tokens = fixture.mock_token_any().await;
    let _m = mock_in_progress(&mut fixture, "30", None).await;

    let services = fixture.services();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let err = services
        .get_job_result_cancellable(&compress_handle(&fixture), &cancel)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Client);
    assert!(err.to_string().contains("interrupted"));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_status_query_reports_retry_interval() {
    let mut fixture = MockServerFixture::new().await;
    let _tokens = fixture.mock_token_any().await;
    let _m = mock_in_progress(&mut fixture, "2.5", Some(1)).await;

    let services = fixture.services();
    let status = services
        .get_job_status(&fixture.url("/status/job-1"))
        .await
        .unwrap();

    assert_eq!(status.status(), JobStatus::InProgress);
    assert_eq!(status.retry_interval(), Duration::from_millis(2_500));
    assert_eq!(status.request_tracking_id().as_deref(), Some("poll-req"));
}

#[tokio::test]
async fn test_empty_location_is_rejected_without_io() {
    let fixture = MockServerFixture::new().await;
    let services = fixture.services();
    let err = services.get_job_status("  ").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Client);
}

#[tokio::test]
async fn test_unknown_status_value_is_client_error() {
    let mut fixture = MockServerFixture::new().await;
    let _tokens = fixture.mock_token_any().await;
    let _m = fixture
        .mock_json_response("GET", "/status/job-1", 200, r#"{"status":"queued"}"#)
        .await;

    let services = fixture.services();
    let err = services
        .get_job_result(&compress_handle(&fixture))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Client);
}

#[tokio::test]
async fn test_extract_result_fetches_structured_content() {
    let mut fixture = MockServerFixture::new().await;
    let _tokens = fixture.mock_token_any().await;
    let content_uri = fixture.url("/download/structuredData.json");
    let _status = fixture
        .server
        .mock("GET", "/status/job-1")
        .with_status(200)
        .with_body(
            json!({
                "status": "done",
                "content": {"assetID": "content-1", "downloadUri": content_uri},
                "resource": {"assetID": "resource-1", "downloadUri": "https://storage.example/r"}
            })
            .to_string(),
        )
        .create_async()
        .await;
    let content = fixture
        .server
        .mock("GET", "/download/structuredData.json")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"elements":[{"Text":"Hello"}]}"#)
        .expect(1)
        .create_async()
        .await;

    let services = fixture.services();
    let handle = JobHandle::new(fixture.url("/status/job-1"), OperationKind::ExtractPdf);
    let outcome = services.get_job_result(&handle).await.unwrap();

    match outcome.into_result() {
        Some(JobResult::Extract {
            content: Some(asset),
            resource: Some(resource),
            content_json: Some(json),
        }) => {
            assert_eq!(asset.asset_id(), "content-1");
            assert_eq!(resource.asset_id(), "resource-1");
            assert_eq!(json["elements"][0]["Text"], "Hello");
        }
        other => panic!("unexpected result: {:?}", other),
    }
    content.assert_async().await;
}

#[tokio::test]
async fn test_properties_result_carries_metadata() {
    let mut fixture = MockServerFixture::new().await;
    let _tokens = fixture.mock_token_any().await;
    let _m = fixture
        .mock_json_response(
            "GET",
            "/status/job-1",
            200,
            r#"{"status":"done","metadata":{"pageCount":3}}"#,
        )
        .await;

    let services = fixture.services();
    let handle = JobHandle::new(fixture.url("/status/job-1"), OperationKind::PdfProperties);
    let outcome = services.get_job_result(&handle).await.unwrap();

    match outcome.result() {
        Some(JobResult::Properties { metadata }) => assert_eq!(metadata["pageCount"], 3),
        other => panic!("unexpected result: {:?}", other),
    }
}
