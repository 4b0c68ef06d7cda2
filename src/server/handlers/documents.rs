//! Document listing/detail and the admin reprocess action, grounded in
//! `original_source/api/routes/documents.py`.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{JobStage, JobStatus};
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct DocumentSummary {
    pub doc_id: Uuid,
    pub title: String,
    pub status: String,
    pub latest_version_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ListDocumentsQuery {
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

fn default_limit() -> i64 {
    200
}

pub async fn list_documents(
    State(state): State<AppState>,
    Query(q): Query<ListDocumentsQuery>,
) -> AppResult<Json<Vec<DocumentSummary>>> {
    let docs = state.repos.documents.list(q.limit, q.offset).await?;
    Ok(Json(
        docs.into_iter()
            .map(|d| DocumentSummary {
                doc_id: d.id,
                title: d.title,
                status: d.status.to_string(),
                latest_version_id: d.latest_version_id,
            })
            .collect(),
    ))
}

#[derive(Debug, Serialize)]
pub struct JobInfo {
    pub job_id: Uuid,
    pub stage: JobStage,
    pub status: JobStatus,
    pub progress_current: Option<i32>,
    pub progress_total: Option<i32>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VersionInfo {
    pub version_id: Uuid,
    pub status: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub has_text_layer: bool,
    pub needs_ocr: bool,
    pub extracted_chars: i32,
    pub error: Option<String>,
    pub jobs: Vec<JobInfo>,
}

#[derive(Debug, Serialize)]
pub struct DocumentDetail {
    pub doc_id: Uuid,
    pub title: String,
    pub status: String,
    pub latest_version_id: Option<Uuid>,
    pub versions: Vec<VersionInfo>,
}

pub async fn get_document(State(state): State<AppState>, Path(doc_id): Path<Uuid>) -> AppResult<Json<DocumentDetail>> {
    let doc = state.repos.documents.get(doc_id).await?;
    let versions = state.repos.versions.list_by_document(doc_id).await?;

    let mut version_infos = Vec::with_capacity(versions.len());
    for v in versions {
        let jobs = state.repos.jobs.list_by_version(v.id).await?;
        version_infos.push(VersionInfo {
            version_id: v.id,
            status: v.status.to_string(),
            mime_type: v.mime_type,
            size_bytes: v.size_bytes,
            has_text_layer: v.has_text_layer,
            needs_ocr: v.needs_ocr,
            extracted_chars: v.extracted_chars,
            error: v.error,
            jobs: jobs
                .into_iter()
                .map(|j| JobInfo {
                    job_id: j.id,
                    stage: j.stage,
                    status: j.status,
                    progress_current: j.progress_current,
                    progress_total: j.progress_total,
                    error: j.error,
                })
                .collect(),
        });
    }

    Ok(Json(DocumentDetail {
        doc_id: doc.id,
        title: doc.title,
        status: doc.status.to_string(),
        latest_version_id: doc.latest_version_id,
        versions: version_infos,
    }))
}

#[derive(Debug, Serialize)]
pub struct ReprocessResponse {
    pub doc_id: Uuid,
    pub version_id: Uuid,
    pub status: &'static str,
}

/// Restarts the document's latest version from `extract` — used to recover
/// from a version stuck in `error`.
pub async fn reprocess_document(
    State(state): State<AppState>,
    Path(doc_id): Path<Uuid>,
) -> AppResult<Json<ReprocessResponse>> {
    let doc = state.repos.documents.get(doc_id).await?;
    let version_id = doc
        .latest_version_id
        .ok_or_else(|| crate::error::AppError::Validation(format!("document {doc_id} has no version to reprocess")))?;

    state.repos.versions.set_status(version_id, crate::models::VersionStatus::Uploaded, None).await?;
    state.orchestrator.start_pipeline(version_id).await?;

    Ok(Json(ReprocessResponse {
        doc_id,
        version_id,
        status: "reprocessing",
    }))
}
