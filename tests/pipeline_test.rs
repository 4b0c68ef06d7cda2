//! Drives chunk → embed → finalize directly against a fake embedding
//! service, covering spec.md §4.2.3/§4.2.4/§4.2.5 without needing a real
//! embedder deployment. Extract/OCR are skipped here (covered by their own
//! module-level unit tests) by seeding pages directly, mirroring how the
//! orchestrator's `advance_pipeline` treats a version that already has
//! pages recorded.

mod common;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::Json as JsonExtractor;
use axum::routing::post;
use axum::Router as AxumRouter;
use serde::{Deserialize, Serialize};

use lka::config::Settings;
use lka::external::{EmbedderClient, ObjectStore, TikaClient};
use lka::models::{Document, DocumentPage, DocumentVersion, Upload, UploadStatus};
use lka::pipeline::stages::{self, StageContext};
use lka::pipeline::Orchestrator;
use lka::progress::InMemoryProgressBus;
use lka::queue::InMemoryJobQueue;

#[derive(Deserialize)]
struct EmbedRequest {
    texts: Vec<String>,
}

#[derive(Serialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// A fake embedder: one deterministic 4-dim vector per input, derived from
/// its length so distinct texts get distinct (but stable) vectors.
async fn fake_embed(JsonExtractor(req): JsonExtractor<EmbedRequest>) -> JsonExtractor<EmbedResponse> {
    let embeddings = req
        .texts
        .iter()
        .map(|t| {
            let n = t.len() as f32;
            vec![n, n * 0.5, n * 0.25, 1.0]
        })
        .collect();
    JsonExtractor(EmbedResponse { embeddings })
}

async fn spawn_fake_embedder() -> SocketAddr {
    let app = AxumRouter::new().route("/embed", post(fake_embed));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn chunk_embed_finalize_runs_end_to_end() {
    let app = common::setup().await;
    let embedder_addr = spawn_fake_embedder().await;

    let doc = Document::new("Field Report", None);
    app.state.repos.documents.create(&doc).await.unwrap();
    let mut version = DocumentVersion::new(
        doc.id,
        "cafebabe".repeat(8),
        "versions/x/report.txt".to_string(),
        "text/plain".to_string(),
        "report.txt".to_string(),
        4096,
    );
    version.has_text_layer = true;
    app.state.repos.versions.create(&version).await.unwrap();

    let page_text = "The inspection found the facility compliant with all applicable regulations. \
        Staff interviews corroborated the written records reviewed during the site visit.";
    app.state
        .repos
        .pages
        .replace_pages(version.id, &[DocumentPage::new(version.id, 0, page_text.to_string())])
        .await
        .unwrap();

    let mut upload = Upload::new("report.txt".to_string(), "text/plain".to_string(), page_text.len() as i64, version.original_sha256.clone());
    upload.status = UploadStatus::Processing;
    upload.document_id = Some(doc.id);
    upload.version_id = Some(version.id);
    app.state.repos.uploads.create(&upload).await.unwrap();

    let object_store: Arc<dyn ObjectStore> = Arc::new(common::FakeObjectStore::default());
    let settings = Settings::from_env();
    let orchestrator = Orchestrator::new(
        app.state.repos.clone(),
        Arc::new(InMemoryJobQueue::new()),
        Arc::new(InMemoryProgressBus::new()),
        settings.reaper_timeout_multiplier,
    );
    let ctx = StageContext {
        repos: app.state.repos.clone(),
        object_store,
        embedder: EmbedderClient::new(format!("http://{embedder_addr}")),
        tika: TikaClient::new("http://127.0.0.1:1".to_string()),
        settings: Arc::new(settings),
        orchestrator,
    };

    let chunk_metrics = stages::chunk::run(&ctx, version.id).await.unwrap();
    assert!(chunk_metrics.is_some());

    let chunks_before = app.state.repos.chunks.get_chunks(version.id).await.unwrap();
    assert!(!chunks_before.is_empty());
    assert!(chunks_before.iter().all(|c| c.embedding.is_none()));

    let job_id = uuid::Uuid::new_v4();
    stages::embed::run(&ctx, job_id, version.id).await.unwrap();

    let chunks_after = app.state.repos.chunks.get_chunks(version.id).await.unwrap();
    assert!(chunks_after.iter().all(|c| c.embedding.is_some()));

    stages::finalize::run(&ctx, version.id).await.unwrap();
    let refreshed_doc = app.state.repos.documents.get(doc.id).await.unwrap();
    assert_eq!(refreshed_doc.latest_version_id, Some(version.id));

    let refreshed_upload = app.state.repos.uploads.get(upload.id).await.unwrap();
    assert_eq!(refreshed_upload.status, UploadStatus::Done);
}
