//! Covers the upload/confirm two-step flow: staging, content-addressed
//! dedup, and both confirm actions (spec.md §8 scenario S3's dedup case).

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

const BOUNDARY: &str = "X-BOUNDARY-TEST";

fn multipart_body(filename: &str, content_type: &str, bytes: &[u8]) -> Body {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n").as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    Body::from(body)
}

async fn post_multipart(router: &axum::Router, path: &str, filename: &str, bytes: &[u8]) -> Value {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(multipart_body(filename, "text/plain", bytes))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn post_json(router: &axum::Router, path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

#[tokio::test]
async fn upload_then_confirm_new_document_starts_processing() {
    let app = common::setup().await;

    let upload = post_multipart(&app.router, "/uploads", "report.txt", b"first version of the report").await;
    let upload_id = upload["files"][0]["upload_id"].as_str().unwrap();
    assert_eq!(upload["files"][0]["status"], "pending_confirmation");

    let (status, confirmed) = post_json(
        &app.router,
        "/uploads/confirm",
        json!({ "upload_id": upload_id, "action": "new_document", "title": "Inquiry Report" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(confirmed["status"], "processing");
    assert!(confirmed["doc_id"].as_str().is_some());

    // the extract job was enqueued and the version left the pipeline running
    let doc_id = uuid::Uuid::parse_str(confirmed["doc_id"].as_str().unwrap()).unwrap();
    let doc = app.state.repos.documents.get(doc_id).await.unwrap();
    assert_eq!(doc.title, "Inquiry Report");
}

#[tokio::test]
async fn reupload_of_identical_bytes_is_flagged_duplicate() {
    let app = common::setup().await;

    let first = post_multipart(&app.router, "/uploads", "report.txt", b"identical bytes").await;
    let first_id = first["files"][0]["upload_id"].as_str().unwrap();
    post_json(
        &app.router,
        "/uploads/confirm",
        json!({ "upload_id": first_id, "action": "new_document", "title": "Original" }),
    )
    .await;

    let second = post_multipart(&app.router, "/uploads", "report-copy.txt", b"identical bytes").await;
    assert_eq!(second["files"][0]["status"], "duplicate");
    assert!(second["files"][0]["duplicate_doc_id"].as_str().is_some());
}

#[tokio::test]
async fn confirm_new_version_without_existing_doc_id_is_rejected() {
    let app = common::setup().await;

    let upload = post_multipart(&app.router, "/uploads", "addendum.txt", b"addendum text").await;
    let upload_id = upload["files"][0]["upload_id"].as_str().unwrap();

    let (status, _) = post_json(
        &app.router,
        "/uploads/confirm",
        json!({ "upload_id": upload_id, "action": "new_version" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
