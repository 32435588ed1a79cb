//! Asset upload, batch upload, download, refresh and delete against a mock platform

use crate::mock_server::MockServerFixture;
use mockito::Matcher;
use pdf_services_rust::asset::{Asset, CloudAsset, ExternalAsset, ExternalStorageType, StreamAsset};
use pdf_services_rust::ErrorKind;
use serde_json::json;
use std::path::PathBuf;

const STORAGE_FAILURE: &str = r#"<?xml version="1.0" encoding="utf-8"?><Error><Code>AuthenticationFailed</Code><Message>Server failed to authenticate the request.</Message><RequestId>blob-req-2</RequestId></Error>"#;

async fn mock_upload_target(
    fixture: &mut MockServerFixture,
    media_type: &str,
    asset_id: &str,
) -> mockito::Mock {
    let body = json!({
        "assetID": asset_id,
        "uploadUri": fixture.url(&format!("/upload/{}", asset_id)),
    });
    fixture
        .server
        .mock("POST", "/assets")
        .match_body(Matcher::PartialJson(json!({ "mediaType": media_type })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}

async fn mock_upload_put(fixture: &mut MockServerFixture, asset_id: &str, status: usize) -> mockito::Mock {
    let mock = fixture
        .server
        .mock("PUT", format!("/upload/{}", asset_id).as_str())
        .match_header("authorization", Matcher::Missing)
        .with_status(status);
    let mock = if status >= 400 {
        mock.with_header("content-type", "application/xml")
            .with_body(STORAGE_FAILURE)
    } else {
        mock
    };
    mock.create_async().await
}

fn temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("pdf-services-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[tokio::test]
async fn test_upload_single_asset() {
    let mut fixture = MockServerFixture::new().await;
    let _tokens = fixture.mock_token_any().await;
    let target = mock_upload_target(&mut fixture, "application/pdf", "asset-pdf").await;
    let put = fixture
        .server
        .mock("PUT", "/upload/asset-pdf")
        .match_header("content-type", "application/pdf")
        .match_header("authorization", Matcher::Missing)
        .match_body("%PDF-1.7 sample")
        .with_status(200)
        .create_async()
        .await;

    let services = fixture.services();
    let asset = services
        .upload(b"%PDF-1.7 sample".to_vec(), "application/pdf")
        .await
        .unwrap();

    assert_eq!(asset.asset_id(), "asset-pdf");
    assert_eq!(asset.download_uri(), None);
    target.assert_async().await;
    put.assert_async().await;
}

#[tokio::test]
async fn test_upload_failure_without_envelope_gets_generic_message() {
    let mut fixture = MockServerFixture::new().await;
    let _tokens = fixture.mock_token_any().await;
    let _target = mock_upload_target(&mut fixture, "application/pdf", "asset-pdf").await;
    let _put = fixture
        .server
        .mock("PUT", "/upload/asset-pdf")
        .with_status(400)
        .with_body("bad request")
        .create_async()
        .await;

    let services = fixture.services();
    let err = services
        .upload(b"%PDF".to_vec(), "application/pdf")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ServiceApi);
    assert_eq!(err.status_code(), Some(400));
    assert_eq!(err.error_code(), Some("UNKNOWN"));
    assert!(err.to_string().contains("Error in uploading file"));
}

/// Five inputs, each routed to its own upload target by media type.
const BATCH: [(&str, &str); 5] = [
    ("application/pdf", "a0"),
    ("image/jpeg", "a1"),
    ("image/png", "a2"),
    ("text/plain", "a3"),
    ("application/msword", "a4"),
];

async fn mock_batch(fixture: &mut MockServerFixture, failing: usize) -> Vec<mockito::Mock> {
    let mut mocks = Vec::new();
    for (i, (media_type, asset_id)) in BATCH.iter().enumerate() {
        mocks.push(mock_upload_target(fixture, media_type, asset_id).await);
        let status = if i == failing { 403 } else { 200 };
        mocks.push(mock_upload_put(fixture, asset_id, status).await);
    }
    mocks
}

fn batch_inputs() -> Vec<StreamAsset> {
    BATCH
        .iter()
        .map(|(media_type, id)| StreamAsset::new(format!("content {}", id), *media_type).unwrap())
        .collect()
}

#[tokio::test]
async fn test_batch_upload_settled_reports_each_outcome() {
    let mut fixture = MockServerFixture::new().await;
    let _tokens = fixture.mock_token_any().await;
    let _mocks = mock_batch(&mut fixture, 2).await;

    let services = fixture.services();
    let result = services.upload_assets_settled(batch_inputs()).await;

    assert_eq!(result.total_processed, 5);
    assert_eq!(result.success_count(), 4);
    assert_eq!(result.failure_count(), 1);
    let indices: Vec<usize> = result.successes.iter().map(|(i, _)| *i).collect();
    assert_eq!(indices, vec![0, 1, 3, 4]);
    assert_eq!(result.asset(3).unwrap().asset_id(), "a3");
    assert!(result.asset(2).is_none());

    let (index, err) = &result.failures[0];
    assert_eq!(*index, 2);
    assert_eq!(err.kind(), ErrorKind::ServiceApi);
    assert_eq!(err.status_code(), Some(403));
    assert_eq!(err.error_code(), Some("AuthenticationFailed"));
    assert_eq!(err.request_tracking_id(), Some("blob-req-2"));
}

#[tokio::test]
async fn test_batch_upload_preserves_input_order() {
    let mut fixture = MockServerFixture::new().await;
    let _tokens = fixture.mock_token_any().await;
    let _mocks = mock_batch(&mut fixture, usize::MAX).await;

    let services = fixture.services();
    let assets = services.upload_assets(batch_inputs()).await.unwrap();

    let ids: Vec<&str> = assets.iter().map(|a| a.asset_id()).collect();
    assert_eq!(ids, vec!["a0", "a1", "a2", "a3", "a4"]);
}

#[tokio::test]
async fn test_batch_upload_fails_fast() {
    let mut fixture = MockServerFixture::new().await;
    let _tokens = fixture.mock_token_any().await;
    let _mocks = mock_batch(&mut fixture, 2).await;

    let services = fixture.services();
    let err = services.upload_assets(batch_inputs()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ServiceApi);
    assert_eq!(err.error_code(), Some("AuthenticationFailed"));
}

#[tokio::test]
async fn test_empty_batch_is_rejected() {
    let fixture = MockServerFixture::new().await;
    let services = fixture.services();
    let err = services.upload_assets(Vec::new()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Client);
}

#[tokio::test]
async fn test_get_content_downloads_without_credentials() {
    let mut fixture = MockServerFixture::new().await;
    let download = fixture
        .server
        .mock("GET", "/download/out.pdf")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_header("content-type", "application/pdf")
        .with_body("%PDF-1.7 result")
        .create_async()
        .await;

    let services = fixture.services();
    let asset = CloudAsset::new("out-1", Some(fixture.url("/download/out.pdf")));
    let content = services.get_content(&asset).await.unwrap();

    assert_eq!(content.media_type(), "application/pdf");
    assert_eq!(content.bytes().as_ref(), b"%PDF-1.7 result");
    download.assert_async().await;
}

#[tokio::test]
async fn test_get_content_refreshes_missing_download_uri() {
    let mut fixture = MockServerFixture::new().await;
    let _tokens = fixture.mock_token_any().await;
    let download_uri = fixture.url("/download/refreshed.pdf");
    let refresh = fixture
        .mock_json_response(
            "GET",
            "/assets/out-9",
            200,
            &json!({ "downloadUri": download_uri }).to_string(),
        )
        .await;
    let download = fixture
        .server
        .mock("GET", "/download/refreshed.pdf")
        .with_status(200)
        .with_body("bytes")
        .create_async()
        .await;

    let services = fixture.services();
    let content = services
        .get_content(&CloudAsset::new("out-9", None))
        .await
        .unwrap();

    assert_eq!(content.bytes().as_ref(), b"bytes");
    assert_eq!(content.media_type(), "application/octet-stream");
    refresh.assert_async().await;
    download.assert_async().await;
}

#[tokio::test]
async fn test_save_content_writes_file_and_leaves_no_partials() {
    let mut fixture = MockServerFixture::new().await;
    let _m = fixture
        .server
        .mock("GET", "/download/out.pdf")
        .with_status(200)
        .with_body("%PDF-1.7 saved")
        .create_async()
        .await;

    let dir = temp_dir();
    let target = dir.join("result.pdf");
    let services = fixture.services();
    let asset = CloudAsset::new("out-1", Some(fixture.url("/download/out.pdf")));
    let written = services.save_content(&asset, &target).await.unwrap();

    assert_eq!(written, target);
    assert_eq!(std::fs::read(&target).unwrap(), b"%PDF-1.7 saved");
    let leftovers: Vec<_> = std::fs::read_dir(&dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".part"))
        .collect();
    assert!(leftovers.is_empty());
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_failed_download_leaves_target_untouched() {
    let mut fixture = MockServerFixture::new().await;
    let _m = fixture
        .server
        .mock("GET", "/download/missing.pdf")
        .with_status(404)
        .with_body(r#"{"error":{"code":"NOT_FOUND","message":"Asset expired"}}"#)
        .create_async()
        .await;

    let dir = temp_dir();
    let target = dir.join("result.pdf");
    let services = fixture.services();
    let asset = CloudAsset::new("out-1", Some(fixture.url("/download/missing.pdf")));
    let err = services.save_content(&asset, &target).await.unwrap_err();

    assert_eq!(err.status_code(), Some(404));
    assert_eq!(err.error_code(), Some("NOT_FOUND"));
    assert!(!target.exists());
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_refresh_download_uri() {
    let mut fixture = MockServerFixture::new().await;
    let _tokens = fixture.mock_token_any().await;
    let _m = fixture
        .mock_json_response(
            "GET",
            "/assets/asset-1",
            200,
            r#"{"downloadUri":"https://storage.example/asset-1?sig=new"}"#,
        )
        .await;

    let services = fixture.services();
    let asset = Asset::Cloud(CloudAsset::new("asset-1", Some("https://old".into())));
    let refreshed = services.refresh_download_uri(&asset).await.unwrap();

    assert_eq!(refreshed.asset_id(), "asset-1");
    assert_eq!(
        refreshed.download_uri(),
        Some("https://storage.example/asset-1?sig=new")
    );
}

#[tokio::test]
async fn test_delete_asset() {
    let mut fixture = MockServerFixture::new().await;
    let _tokens = fixture.mock_token_any().await;
    let delete = fixture
        .server
        .mock("DELETE", "/assets/asset-1")
        .match_header("authorization", "Bearer session-token")
        .with_status(204)
        .expect(1)
        .create_async()
        .await;

    let services = fixture.services();
    services
        .delete_asset(&Asset::Cloud(CloudAsset::new("asset-1", None)))
        .await
        .unwrap();
    delete.assert_async().await;
}

#[tokio::test]
async fn test_external_assets_cannot_be_managed() {
    let fixture = MockServerFixture::new().await;
    let services = fixture.services();
    let external = Asset::External(
        ExternalAsset::new("https://bucket.example/in.pdf", Some(ExternalStorageType::S3))
            .unwrap(),
    );

    let err = services.delete_asset(&external).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Client);
    let err = services.refresh_download_uri(&external).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Client);
}
