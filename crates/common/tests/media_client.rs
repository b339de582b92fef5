//! Media store client tests against a mock HTTP server.

use pressroom_common::config::MediaConfig;
use pressroom_common::errors::AppError;
use pressroom_common::media::{ImageKitClient, MediaStore};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> MediaConfig {
    MediaConfig {
        private_key: Some("private_test_key".into()),
        public_key: Some("public_test_key".into()),
        url_endpoint: Some("https://ik.example.com/demo".into()),
        upload_url: format!("{}/upload", server.uri()),
        api_url: format!("{}/v1", server.uri()),
        auth_expiry_secs: 2400,
    }
}

#[tokio::test]
async fn upload_returns_media_handle() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": "https://ik.example.com/demo/news/2024/05/01/the-hindu/original/the-hindu-2024-05-01.pdf",
            "fileId": "abc123",
            "filePath": "/news/2024/05/01/the-hindu/original/the-hindu-2024-05-01.pdf"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ImageKitClient::new(config_for(&server));
    let auth = client.auth_params().unwrap();

    let uploaded = client
        .upload(
            &auth,
            vec![1, 2, 3],
            "the-hindu-2024-05-01.pdf",
            "/news/2024/05/01/the-hindu/original",
            "date:2024-05-01,paper:the-hindu,type:original",
        )
        .await
        .unwrap();

    assert_eq!(uploaded.file_id, "abc123");
    assert_eq!(
        uploaded.path,
        "/news/2024/05/01/the-hindu/original/the-hindu-2024-05-01.pdf"
    );
    assert!(uploaded.url.starts_with("https://ik.example.com/demo"));
}

#[tokio::test]
async fn upload_falls_back_to_url_pathname() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": "https://ik.example.com/demo/news/2024/05/01/the-hindu/summary/summary.pdf",
            "fileId": "def456"
        })))
        .mount(&server)
        .await;

    let client = ImageKitClient::new(config_for(&server));
    let auth = client.auth_params().unwrap();

    let uploaded = client
        .upload(
            &auth,
            vec![0u8; 8],
            "summary.pdf",
            "/news/2024/05/01/the-hindu/summary",
            "date:2024-05-01,paper:the-hindu,type:summary",
        )
        .await
        .unwrap();

    assert_eq!(
        uploaded.path,
        "/demo/news/2024/05/01/the-hindu/summary/summary.pdf"
    );
}

#[tokio::test]
async fn upload_surfaces_remote_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "Invalid folder name" })),
        )
        .mount(&server)
        .await;

    let client = ImageKitClient::new(config_for(&server));
    let auth = client.auth_params().unwrap();

    let err = client
        .upload(&auth, vec![0u8; 8], "o.pdf", "/bad folder", "")
        .await
        .unwrap_err();

    match err {
        AppError::Upstream { service, message } => {
            assert_eq!(service, "imagekit");
            assert_eq!(message, "Invalid folder name");
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn delete_captures_per_id_outcomes() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/files/good-id"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/v1/files/bad-id"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "File not found" })),
        )
        .mount(&server)
        .await;

    let client = ImageKitClient::new(config_for(&server));

    let good = client.delete("good-id").await.unwrap();
    assert!(good.success);
    assert!(good.error.is_none());

    // A per-id refusal is captured, not raised, so a batch can continue.
    let bad = client.delete("bad-id").await.unwrap();
    assert!(!bad.success);
    assert_eq!(bad.error.as_deref(), Some("File not found"));
}

#[tokio::test]
async fn delete_without_credentials_is_a_config_error() {
    let server = MockServer::start().await;
    let client = ImageKitClient::new(MediaConfig {
        private_key: None,
        ..config_for(&server)
    });

    let err = client.delete("any-id").await.unwrap_err();
    assert!(matches!(err, AppError::Configuration { .. }));
}
