use std::time::Duration;

use cho_cuu_nong::clients::{
    build_http_client,
    upload::{UploadClient, UploadError, UploadFile},
};
use httpmock::prelude::*;
use serde_json::json;

fn client(server: &MockServer) -> UploadClient {
    let http = build_http_client(Duration::from_secs(5)).unwrap();
    UploadClient::new(http, server.base_url())
}

fn file(name: &str) -> UploadFile {
    UploadFile {
        file_name: name.to_string(),
        content_type: Some("image/png".to_string()),
        bytes: b"\x89PNG fake".to_vec(),
    }
}

#[tokio::test]
async fn uploads_files_as_multipart_with_bearer() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/uploads")
            .header("authorization", "Bearer token-123")
            .body_contains("name=\"saveDir\"")
            .body_contains("products/seller-1")
            .body_contains("filename=\"cai-bap.png\"");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "files": [
                    { "file": "cai-bap.png", "url": "https://cdn.example.com/products/seller-1/cai-bap.png" }
                ]
            }));
    });

    let result = client(&server)
        .upload("token-123", vec![file("cai-bap.png")], "products/seller-1")
        .await;

    mock.assert();
    let files = result.unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].file, "cai-bap.png");
    assert_eq!(
        files[0].url,
        "https://cdn.example.com/products/seller-1/cai-bap.png"
    );
}

#[tokio::test]
async fn partial_success_returns_fewer_entries() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/uploads");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "files": [ { "file": "a.png", "url": "https://cdn.example.com/a.png" } ] }));
    });

    let files = client(&server)
        .upload("t", vec![file("a.png"), file("b.png")], "misc")
        .await
        .unwrap();

    mock.assert();
    assert_eq!(files.len(), 1);
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/uploads");
        then.status(500).body("bucket unavailable");
    });

    let result = client(&server).upload("t", vec![file("a.png")], "misc").await;

    mock.assert();
    match result {
        Err(UploadError::Status { status, body }) => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "bucket unavailable");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_batch_is_rejected_without_a_request() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/uploads");
        then.status(200);
    });

    let result = client(&server).upload("t", Vec::new(), "misc").await;

    assert!(matches!(result, Err(UploadError::Empty)));
    mock.assert_hits(0);
}
