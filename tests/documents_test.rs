//! Document listing/detail and the reprocess admin action, grounded in
//! `original_source/api/routes/documents.py`'s corresponding routes.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use lka::models::{Document, DocumentVersion, JobStage};

async fn get(router: &axum::Router, path: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder().uri(path).body(Body::empty()).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { serde_json::Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

async fn post(router: &axum::Router, path: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder().method("POST").uri(path).body(Body::empty()).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { serde_json::Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

#[tokio::test]
async fn list_and_get_document_includes_job_history() {
    let app = common::setup().await;

    let doc = Document::new("Memo on Tariffs", None);
    app.state.repos.documents.create(&doc).await.unwrap();
    let version = DocumentVersion::new(
        doc.id,
        "deadbeef".repeat(8),
        "versions/x/memo.pdf".to_string(),
        "application/pdf".to_string(),
        "memo.pdf".to_string(),
        1024,
    );
    app.state.repos.versions.create(&version).await.unwrap();
    app.state.repos.documents.set_latest_version(doc.id, version.id).await.unwrap();
    app.state.orchestrator.enqueue_stage(version.id, JobStage::Extract).await.unwrap();

    let (status, list_body) = get(&app.router, "/documents").await;
    assert_eq!(status, StatusCode::OK);
    assert!(list_body.as_array().unwrap().iter().any(|d| d["doc_id"] == doc.id.to_string()));

    let (status, detail) = get(&app.router, &format!("/documents/{}", doc.id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["title"], "Memo on Tariffs");
    let versions = detail["versions"].as_array().unwrap();
    assert_eq!(versions.len(), 1);
    let jobs = versions[0]["jobs"].as_array().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["stage"], "extract");
}

#[tokio::test]
async fn reprocess_requires_a_latest_version() {
    let app = common::setup().await;

    let doc = Document::new("Versionless Stub", None);
    app.state.repos.documents.create(&doc).await.unwrap();

    let (status, _) = post(&app.router, &format!("/documents/{}/reprocess", doc.id)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn get_document_for_unknown_id_is_not_found() {
    let app = common::setup().await;
    let (status, _) = get(&app.router, &format!("/documents/{}", uuid::Uuid::new_v4())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
