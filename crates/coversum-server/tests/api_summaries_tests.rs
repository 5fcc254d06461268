//! API integration tests for the coversum server
//!
//! These tests drive the real router end to end with the in-memory
//! store and a mocked processing webhook.
//!
//! Coverage includes:
//! - The upload/callback/status lifecycle
//! - Validation rejections (missing file, media type, size, bad ids)
//! - Forwarding failure after record creation
//! - Last-write-wins semantics of the completion callback

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use coversum_server::api::create_router;
use coversum_server::features::FeatureState;
use coversum_server::forward::Forwarder;
use coversum_server::store::{
    MemorySummaryStore, NewSummary, SharedSummaryStore, StoreError, Summary, SummaryPatch,
    SummaryStore,
};

const BOUNDARY: &str = "coversum-test-boundary";
const WEBHOOK_PATH: &str = "/webhook/upload-book";

// ============================================================================
// Helper Functions
// ============================================================================

/// Start a mock webhook that answers every forward with `status`
async fn mock_webhook(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(WEBHOOK_PATH))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;
    server
}

/// Build the app against the given webhook, returning the store handle
/// for direct state assertions
fn test_app(webhook: &MockServer) -> (Router, SharedSummaryStore) {
    let store: SharedSummaryStore = Arc::new(MemorySummaryStore::new());
    let forwarder = Forwarder::new(
        format!("{}{}", webhook.uri(), WEBHOOK_PATH),
        Duration::from_secs(5),
    )
    .unwrap();
    let app = create_router(FeatureState {
        store: store.clone(),
        forwarder,
    });
    (app, store)
}

/// Encode a single-file multipart body
fn multipart_body(field: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn post_upload(
    app: &Router,
    filename: &str,
    content_type: &str,
    bytes: &[u8],
) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/upload")
                .method("POST")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(multipart_body("data", filename, content_type, bytes)))
                .unwrap(),
        )
        .await
        .unwrap();

    json_response(response).await
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    json_response(response).await
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .method("POST")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    json_response(response).await
}

async fn json_response(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

// ============================================================================
// Upload Lifecycle
// ============================================================================

#[tokio::test]
async fn test_upload_png_creates_first_record() {
    let webhook = mock_webhook(200).await;
    let (app, _store) = test_app(&webhook);

    let image = vec![0x89u8; 10 * 1024];
    let (status, body) = post_upload(&app, "cover.png", "image/png", &image).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["id"], 1);
    assert!(body["data"]["message"].as_str().unwrap().contains("uploaded"));

    // Exactly one forward attempted
    assert_eq!(webhook.received_requests().await.unwrap().len(), 1);

    // Status query reflects a freshly created record
    let (status, body) = get_json(&app, "/api/summary/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], 1);
    assert_eq!(body["data"]["bookName"], "cover.png");
    assert_eq!(body["data"]["statusProcessing"], true);
    assert_eq!(body["data"]["generatedSummary"], Value::Null);
    assert!(body["data"]["imageUrl"]
        .as_str()
        .unwrap()
        .starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn test_upload_without_filename_uses_fallback_name() {
    let webhook = mock_webhook(200).await;
    let (app, _store) = test_app(&webhook);

    let (status, _body) = post_upload(&app, "", "image/jpeg", &[0xFFu8; 64]).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get_json(&app, "/api/summary/1").await;
    assert_eq!(body["data"]["bookName"], "book-cover");
}

// ============================================================================
// Upload Validation
// ============================================================================

#[tokio::test]
async fn test_upload_rejects_unsupported_media_type() {
    let webhook = mock_webhook(200).await;
    let (app, _store) = test_app(&webhook);

    let (status, body) = post_upload(&app, "notes.txt", "text/plain", b"not an image").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["message"].as_str().unwrap().contains("file type"));

    // Rejected before any record was created or forward attempted
    let (status, _) = get_json(&app, "/api/summary/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(webhook.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_rejects_oversized_image() {
    let webhook = mock_webhook(200).await;
    let (app, _store) = test_app(&webhook);

    let six_mib = vec![0u8; 6 * 1024 * 1024];
    let (status, body) = post_upload(&app, "big.jpg", "image/jpeg", &six_mib).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("5 MiB"));

    let (status, _) = get_json(&app, "/api/summary/1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(webhook.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_without_data_field_is_rejected() {
    let webhook = mock_webhook(200).await;
    let (app, _store) = test_app(&webhook);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/upload")
                .method("POST")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(multipart_body(
                    "other",
                    "cover.png",
                    "image/png",
                    &[1, 2, 3],
                )))
                .unwrap(),
        )
        .await
        .unwrap();

    let (status, body) = json_response(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("No file"));
}

// ============================================================================
// Forwarding Failure
// ============================================================================

#[tokio::test]
async fn test_forward_failure_keeps_created_record() {
    let webhook = mock_webhook(500).await;
    let (app, store) = test_app(&webhook);

    let (status, body) = post_upload(&app, "cover.png", "image/png", &[1u8; 512]).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "FORWARD_FAILED");
    assert_eq!(body["error"]["details"]["id"], 1);

    // Record persisted before the forward; it stays in processing state
    let stored = store.get(1).await.unwrap().unwrap();
    assert!(stored.status_processing);
    assert_eq!(stored.generated_summary, None);

    let (status, body) = get_json(&app, "/api/summary/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["statusProcessing"], true);
}

// ============================================================================
// Status Query and Callback
// ============================================================================

#[tokio::test]
async fn test_unknown_id_returns_404_for_status_and_callback() {
    let webhook = mock_webhook(200).await;
    let (app, _store) = test_app(&webhook);

    let (status, body) = get_json(&app, "/api/summary/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, _) = post_json(&app, "/api/summary/99", json!({"summary": "late"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_id_returns_400() {
    let webhook = mock_webhook(200).await;
    let (app, _store) = test_app(&webhook);

    let (status, body) = get_json(&app, "/api/summary/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, _) = post_json(&app, "/api/summary/-1", json!({"summary": "x"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_callback_completes_record() {
    let webhook = mock_webhook(200).await;
    let (app, _store) = test_app(&webhook);

    post_upload(&app, "cover.png", "image/png", &[1u8; 128]).await;

    let (status, body) = post_json(&app, "/api/summary/1", json!({"summary": "done"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["statusProcessing"], false);
    assert_eq!(body["data"]["generatedSummary"], "done");

    let (_, body) = get_json(&app, "/api/summary/1").await;
    assert_eq!(body["data"]["statusProcessing"], false);
    assert_eq!(body["data"]["generatedSummary"], "done");
}

#[tokio::test]
async fn test_callback_without_summary_completes_with_null() {
    let webhook = mock_webhook(200).await;
    let (app, _store) = test_app(&webhook);

    post_upload(&app, "cover.png", "image/png", &[1u8; 128]).await;

    let (status, body) = post_json(&app, "/api/summary/1", json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["statusProcessing"], false);
    assert_eq!(body["data"]["generatedSummary"], Value::Null);
}

#[tokio::test]
async fn test_repeated_callback_is_last_write_wins() {
    let webhook = mock_webhook(200).await;
    let (app, store) = test_app(&webhook);

    post_upload(&app, "cover.png", "image/png", &[1u8; 128]).await;

    let (status, _) = post_json(&app, "/api/summary/1", json!({"summary": "first"})).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_json(&app, "/api/summary/1", json!({"summary": "second"})).await;
    assert_eq!(status, StatusCode::OK);

    let stored = store.get(1).await.unwrap().unwrap();
    assert_eq!(stored.generated_summary.as_deref(), Some("second"));
}

// ============================================================================
// Service Endpoints
// ============================================================================

#[tokio::test]
async fn test_root_and_health_endpoints() {
    let webhook = mock_webhook(200).await;
    let (app, _store) = test_app(&webhook);

    let (status, body) = get_json(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

/// Store whose connectivity is gone; every call fails the way a dead
/// database pool would.
struct UnreachableStore;

#[async_trait::async_trait]
impl SummaryStore for UnreachableStore {
    async fn create(&self, _new: NewSummary) -> Result<Summary, StoreError> {
        Err(StoreError::Sqlx(sqlx::Error::PoolTimedOut))
    }

    async fn get(&self, _id: i32) -> Result<Option<Summary>, StoreError> {
        Err(StoreError::Sqlx(sqlx::Error::PoolTimedOut))
    }

    async fn update(&self, _id: i32, _patch: SummaryPatch) -> Result<Option<Summary>, StoreError> {
        Err(StoreError::Sqlx(sqlx::Error::PoolTimedOut))
    }

    async fn list_all(&self) -> Result<Vec<Summary>, StoreError> {
        Err(StoreError::Sqlx(sqlx::Error::PoolTimedOut))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::Sqlx(sqlx::Error::PoolTimedOut))
    }
}

#[tokio::test]
async fn test_health_degrades_when_store_is_unreachable() {
    let webhook = mock_webhook(200).await;
    let forwarder = Forwarder::new(
        format!("{}{}", webhook.uri(), WEBHOOK_PATH),
        Duration::from_secs(5),
    )
    .unwrap();
    let app = create_router(FeatureState {
        store: Arc::new(UnreachableStore),
        forwarder,
    });

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
