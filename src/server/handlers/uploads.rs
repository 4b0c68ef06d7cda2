//! Upload and confirm flow (spec.md's two-step upload), grounded in
//! `original_source/api/routes/uploads.py`'s `upload_files`/`confirm_upload`
//! pair: stage bytes in the object store under a temp key, hash them for
//! content-addressed dedup, then either point at an existing version or
//! mint a new document/version and start its pipeline.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Document, DocumentVersion, Upload, UploadStatus};
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct UploadFileResult {
    pub upload_id: Uuid,
    pub filename: String,
    pub size_bytes: i64,
    pub mime_type: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_doc_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_version_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub files: Vec<UploadFileResult>,
}

/// Accepts one or more files as multipart form fields. Each is streamed
/// into memory (bounded by `Settings::max_upload_size_bytes`), hashed, and
/// either flagged as a duplicate of an existing version or staged under
/// `tmp/uploads/<upload_id>/<filename>` awaiting confirmation.
pub async fn upload_files(State(state): State<AppState>, mut multipart: Multipart) -> AppResult<Json<UploadResponse>> {
    let max_bytes = state.settings.max_upload_size_bytes();
    let mut results = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        let filename = field.file_name().unwrap_or("file").to_string();
        let mime_type = field
            .content_type()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("reading upload body failed: {e}")))?;

        if bytes.len() as u64 > max_bytes {
            return Err(AppError::Validation(format!(
                "file '{filename}' exceeds {} byte limit",
                max_bytes
            )));
        }

        let sha256 = DocumentVersion::compute_hash(&bytes);

        if let Some(existing) = state.repos.versions.get_by_sha256(&sha256).await? {
            let mut upload = Upload::new(filename.clone(), mime_type.clone(), bytes.len() as i64, sha256);
            upload.status = UploadStatus::Duplicate;
            upload.document_id = Some(existing.document_id);
            upload.version_id = Some(existing.id);
            state.repos.uploads.create(&upload).await?;

            results.push(UploadFileResult {
                upload_id: upload.id,
                filename,
                size_bytes: upload.size_bytes,
                mime_type,
                status: UploadStatus::Duplicate.as_str(),
                duplicate_doc_id: Some(existing.document_id),
                duplicate_version_id: Some(existing.id),
            });
            continue;
        }

        let upload = Upload::new(filename.clone(), mime_type.clone(), bytes.len() as i64, sha256);
        state
            .object_store
            .put_object(&upload.staging_key, bytes.to_vec(), &mime_type)
            .await?;
        state.repos.uploads.create(&upload).await?;

        results.push(UploadFileResult {
            upload_id: upload.id,
            filename,
            size_bytes: upload.size_bytes,
            mime_type,
            status: UploadStatus::PendingConfirmation.as_str(),
            duplicate_doc_id: None,
            duplicate_version_id: None,
        });
    }

    Ok(Json(UploadResponse { files: results }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmAction {
    NewDocument,
    NewVersion,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmUploadRequest {
    pub upload_id: Uuid,
    pub action: ConfirmAction,
    pub existing_doc_id: Option<Uuid>,
    /// Required with `new_document`: the title for the new document.
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConfirmUploadResponse {
    pub doc_id: Uuid,
    pub version_id: Uuid,
    pub status: &'static str,
}

/// Moves a staged upload to its canonical object-store key, creates the
/// document (or reuses an existing one) and its new version row, then
/// kicks off the pipeline from `extract`.
pub async fn confirm_upload(
    State(state): State<AppState>,
    Json(body): Json<ConfirmUploadRequest>,
) -> AppResult<Json<ConfirmUploadResponse>> {
    let upload = state.repos.uploads.get(body.upload_id).await?;
    if upload.status != UploadStatus::PendingConfirmation {
        return Err(AppError::Validation(format!(
            "upload {} is '{}', not pending confirmation",
            body.upload_id, upload.status
        )));
    }

    let doc_id = match body.action {
        ConfirmAction::NewDocument => {
            let title = body
                .title
                .unwrap_or_else(|| upload.original_filename.rsplit_once('.').map(|(s, _)| s).unwrap_or(&upload.original_filename).to_string());
            let doc = Document::new(title, None);
            state.repos.documents.create(&doc).await?;
            doc.id
        }
        ConfirmAction::NewVersion => {
            let doc_id = body
                .existing_doc_id
                .ok_or_else(|| AppError::Validation("existing_doc_id required for new_version".into()))?;
            state.repos.documents.get(doc_id).await?;
            doc_id
        }
    };

    let mut version = DocumentVersion::new(
        doc_id,
        upload.sha256.clone(),
        String::new(),
        upload.mime_type.clone(),
        upload.original_filename.clone(),
        upload.size_bytes,
    );
    let canonical_key = format!("versions/{}/{}", version.id, upload.original_filename);
    version.storage_key = canonical_key.clone();
    state.repos.versions.create(&version).await?;

    state.object_store.copy_object(&upload.staging_key, &canonical_key).await?;
    state.repos.uploads.mark_confirmed(upload.id, doc_id, version.id).await?;

    state.orchestrator.start_pipeline(version.id).await?;

    Ok(Json(ConfirmUploadResponse {
        doc_id,
        version_id: version.id,
        status: UploadStatus::Processing.as_str(),
    }))
}

#[derive(Debug, Serialize)]
pub struct UploadStatusResponse {
    pub upload_id: Uuid,
    pub original_filename: String,
    pub status: String,
    pub document_id: Option<Uuid>,
    pub version_id: Option<Uuid>,
}

pub async fn list_uploads(State(state): State<AppState>) -> AppResult<Json<Vec<UploadStatusResponse>>> {
    let uploads = state.repos.uploads.list(100).await?;
    Ok(Json(
        uploads
            .into_iter()
            .map(|u| UploadStatusResponse {
                upload_id: u.id,
                original_filename: u.original_filename,
                status: u.status.to_string(),
                document_id: u.document_id,
                version_id: u.version_id,
            })
            .collect(),
    ))
}

pub async fn get_upload(State(state): State<AppState>, Path(id): Path<Uuid>) -> AppResult<Json<UploadStatusResponse>> {
    let u = state.repos.uploads.get(id).await?;
    Ok(Json(UploadStatusResponse {
        upload_id: u.id,
        original_filename: u.original_filename,
        status: u.status.to_string(),
        document_id: u.document_id,
        version_id: u.version_id,
    }))
}
