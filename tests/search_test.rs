//! Search and passage-reading endpoints. The harness points the embedder
//! client at a closed port, so these exercise `hybrid_search`'s lexical-only
//! fallback path (spec.md's error taxonomy (v)) rather than needing a fake
//! embedding service.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use lka::models::{Chunk, Document, DocumentVersion, Language};

async fn seed_document_with_chunks(app: &common::TestApp, title: &str, texts: &[&str]) -> (uuid::Uuid, uuid::Uuid) {
    seed_document_with_chunks_lang(app, title, texts, Language::English).await
}

async fn seed_document_with_chunks_lang(
    app: &common::TestApp,
    title: &str,
    texts: &[&str],
    language: Language,
) -> (uuid::Uuid, uuid::Uuid) {
    let doc = Document::new(title, None);
    app.state.repos.documents.create(&doc).await.unwrap();

    let version = DocumentVersion::new(
        doc.id,
        DocumentVersion::compute_hash(title.as_bytes()),
        format!("versions/{}/doc.txt", uuid::Uuid::new_v4()),
        "text/plain".to_string(),
        "doc.txt".to_string(),
        texts.iter().map(|t| t.len() as i64).sum(),
    );
    app.state.repos.versions.create(&version).await.unwrap();
    app.state.repos.documents.set_latest_version(doc.id, version.id).await.unwrap();

    let chunks: Vec<Chunk> = texts
        .iter()
        .enumerate()
        .map(|(i, text)| Chunk::new(version.id, doc.id, i as i32, text.to_string(), language, 1, 1, false, None))
        .collect();
    app.state.repos.chunks.replace_chunks(version.id, &chunks).await.unwrap();

    (doc.id, version.id)
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
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn search_falls_back_to_lexical_when_embedder_unreachable() {
    let app = common::setup().await;
    seed_document_with_chunks(
        &app,
        "Budget Memo",
        &["the committee approved the annual budget resolution", "unrelated administrative filing"],
    )
    .await;

    let (status, body) = post_json(&app.router, "/search", json!({ "query": "budget resolution", "k": 5 })).await;
    assert_eq!(status, StatusCode::OK);
    let hits = body["hits"].as_array().unwrap();
    assert!(!hits.is_empty());
    assert!(hits[0]["text"].as_str().unwrap().contains("budget"));
}

#[tokio::test]
async fn search_scoped_to_document_excludes_other_documents() {
    let app = common::setup().await;
    let (doc_a, _) = seed_document_with_chunks(&app, "Doc A", &["shared keyword alpha"]).await;
    seed_document_with_chunks(&app, "Doc B", &["shared keyword beta"]).await;

    let (status, body) = post_json(
        &app.router,
        "/search",
        json!({ "query": "shared keyword", "k": 10, "doc_id": doc_a.to_string() }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let hits = body["hits"].as_array().unwrap();
    assert!(hits.iter().all(|h| h["document_id"] == doc_a.to_string()));
}

#[tokio::test]
async fn search_finds_chunks_labeled_french() {
    let app = common::setup().await;
    seed_document_with_chunks_lang(
        &app,
        "Rapport Budgetaire",
        &["le comite a approuve la resolution budgetaire annuelle"],
        Language::French,
    )
    .await;

    let (status, body) = post_json(&app.router, "/search", json!({ "query": "resolution budgetaire", "k": 5 })).await;
    assert_eq!(status, StatusCode::OK);
    let hits = body["hits"].as_array().unwrap();
    assert!(!hits.is_empty(), "a French-labeled chunk must still be found by lexical search");
}

#[tokio::test]
async fn read_passages_returns_neighboring_context() {
    let app = common::setup().await;
    let (_, version_id) = seed_document_with_chunks(&app, "Three Part Memo", &["part one text", "part two text", "part three text"]).await;

    let chunks = app.state.repos.chunks.get_chunks(version_id).await.unwrap();
    let middle_id = chunks[1].id;

    let (status, body) = post_json(
        &app.router,
        "/search/passages",
        json!({ "chunk_ids": [middle_id.to_string()], "include_context": true }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let passages = body.as_array().unwrap();
    assert_eq!(passages.len(), 1);
    assert_eq!(passages[0]["context_before"], "part one text");
    assert_eq!(passages[0]["context_after"], "part three text");
}
