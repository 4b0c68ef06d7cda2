//! Diesel row types and their conversions to/from the domain models in
//! `crate::models`. Mirrors the teacher's `diesel_models.rs`: string
//! timestamps, `Nullable<Text>` JSON columns decoded with `serde_json`,
//! and enums stored as their `as_str()` text rather than via a derive.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    Chunk, Document, DocumentPage, DocumentStatus, DocumentVersion, IngestionJob, JobStage,
    JobStatus, Language, Metric, Upload, UploadStatus, VersionStatus,
};
use crate::schema::{chunks, document_pages, document_versions, documents, ingestion_jobs, uploads};

fn now_str() -> String {
    Utc::now().to_rfc3339()
}

fn parse_dt(s: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AppError::Database(diesel::result::Error::DeserializationError(Box::new(e))))
}

fn bad_enum(field: &str, value: &str) -> AppError {
    AppError::Database(diesel::result::Error::DeserializationError(
        format!("invalid {field}: {value}").into(),
    ))
}

// ---------------------------------------------------------------- documents

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = documents)]
pub struct DocumentRow {
    pub id: String,
    pub title: String,
    pub source_url: Option<String>,
    pub tags: String,
    pub status: String,
    pub latest_version_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = documents)]
pub struct NewDocumentRow {
    pub id: String,
    pub title: String,
    pub source_url: Option<String>,
    pub tags: String,
    pub status: String,
    pub latest_version_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Document> for NewDocumentRow {
    fn from(d: &Document) -> Self {
        Self {
            id: d.id.to_string(),
            title: d.title.clone(),
            source_url: d.source_url.clone(),
            tags: serde_json::to_string(&d.tags).unwrap_or_else(|_| "[]".to_string()),
            status: d.status.as_str().to_string(),
            latest_version_id: d.latest_version_id.map(|id| id.to_string()),
            created_at: d.created_at.to_rfc3339(),
            updated_at: now_str(),
        }
    }
}

impl TryFrom<DocumentRow> for Document {
    type Error = AppError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        Ok(Document {
            id: Uuid::parse_str(&row.id)
                .map_err(|_| bad_enum("documents.id", &row.id))?,
            title: row.title,
            source_url: row.source_url,
            tags: serde_json::from_str(&row.tags).unwrap_or_default(),
            status: DocumentStatus::from_str(&row.status)
                .ok_or_else(|| bad_enum("documents.status", &row.status))?,
            latest_version_id: row
                .latest_version_id
                .map(|s| Uuid::parse_str(&s))
                .transpose()
                .map_err(|_| bad_enum("documents.latest_version_id", "<invalid uuid>"))?,
            created_at: parse_dt(&row.created_at)?,
            updated_at: parse_dt(&row.updated_at)?,
        })
    }
}

// --------------------------------------------------------- document_versions

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = document_versions)]
pub struct DocumentVersionRow {
    pub id: String,
    pub document_id: String,
    pub original_sha256: String,
    pub storage_key: String,
    pub mime_type: String,
    pub original_filename: String,
    pub size_bytes: i64,
    pub status: String,
    pub has_text_layer: bool,
    pub needs_ocr: bool,
    pub extracted_chars: i32,
    pub error: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = document_versions)]
pub struct NewDocumentVersionRow {
    pub id: String,
    pub document_id: String,
    pub original_sha256: String,
    pub storage_key: String,
    pub mime_type: String,
    pub original_filename: String,
    pub size_bytes: i64,
    pub status: String,
    pub has_text_layer: bool,
    pub needs_ocr: bool,
    pub extracted_chars: i32,
    pub error: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&DocumentVersion> for NewDocumentVersionRow {
    fn from(v: &DocumentVersion) -> Self {
        Self {
            id: v.id.to_string(),
            document_id: v.document_id.to_string(),
            original_sha256: v.original_sha256.clone(),
            storage_key: v.storage_key.clone(),
            mime_type: v.mime_type.clone(),
            original_filename: v.original_filename.clone(),
            size_bytes: v.size_bytes,
            status: v.status.as_str().to_string(),
            has_text_layer: v.has_text_layer,
            needs_ocr: v.needs_ocr,
            extracted_chars: v.extracted_chars,
            error: v.error.clone(),
            created_at: v.created_at.to_rfc3339(),
            updated_at: now_str(),
        }
    }
}

impl TryFrom<DocumentVersionRow> for DocumentVersion {
    type Error = AppError;

    fn try_from(row: DocumentVersionRow) -> Result<Self, Self::Error> {
        Ok(DocumentVersion {
            id: Uuid::parse_str(&row.id).map_err(|_| bad_enum("document_versions.id", &row.id))?,
            document_id: Uuid::parse_str(&row.document_id)
                .map_err(|_| bad_enum("document_versions.document_id", &row.document_id))?,
            original_sha256: row.original_sha256,
            storage_key: row.storage_key,
            mime_type: row.mime_type,
            original_filename: row.original_filename,
            size_bytes: row.size_bytes,
            status: VersionStatus::from_str(&row.status)
                .ok_or_else(|| bad_enum("document_versions.status", &row.status))?,
            has_text_layer: row.has_text_layer,
            needs_ocr: row.needs_ocr,
            extracted_chars: row.extracted_chars,
            error: row.error,
            created_at: parse_dt(&row.created_at)?,
            updated_at: parse_dt(&row.updated_at)?,
        })
    }
}

// ------------------------------------------------------------ document_pages

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = document_pages)]
pub struct DocumentPageRow {
    pub id: String,
    pub version_id: String,
    pub page_num: i32,
    pub text: String,
    pub ocr_used: bool,
    pub ocr_confidence: Option<f32>,
    pub created_at: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = document_pages)]
pub struct NewDocumentPageRow {
    pub id: String,
    pub version_id: String,
    pub page_num: i32,
    pub text: String,
    pub ocr_used: bool,
    pub ocr_confidence: Option<f32>,
    pub created_at: String,
}

impl From<&DocumentPage> for NewDocumentPageRow {
    fn from(p: &DocumentPage) -> Self {
        Self {
            id: p.id.to_string(),
            version_id: p.version_id.to_string(),
            page_num: p.page_num,
            text: p.text.clone(),
            ocr_used: p.ocr_used,
            ocr_confidence: p.ocr_confidence,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

impl TryFrom<DocumentPageRow> for DocumentPage {
    type Error = AppError;

    fn try_from(row: DocumentPageRow) -> Result<Self, Self::Error> {
        Ok(DocumentPage {
            id: Uuid::parse_str(&row.id).map_err(|_| bad_enum("document_pages.id", &row.id))?,
            version_id: Uuid::parse_str(&row.version_id)
                .map_err(|_| bad_enum("document_pages.version_id", &row.version_id))?,
            page_num: row.page_num,
            text: row.text,
            ocr_used: row.ocr_used,
            ocr_confidence: row.ocr_confidence,
            created_at: parse_dt(&row.created_at)?,
        })
    }
}

// ------------------------------------------------------------------- chunks

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = chunks)]
pub struct ChunkRow {
    pub id: String,
    pub version_id: String,
    pub document_id: String,
    pub chunk_num: i32,
    pub text: String,
    pub language: String,
    pub page_start: i32,
    pub page_end: i32,
    pub ocr_used: bool,
    pub ocr_confidence: Option<f32>,
    pub embedding: Option<Vec<u8>>,
    pub created_at: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = chunks)]
pub struct NewChunkRow {
    pub id: String,
    pub version_id: String,
    pub document_id: String,
    pub chunk_num: i32,
    pub text: String,
    pub language: String,
    pub page_start: i32,
    pub page_end: i32,
    pub ocr_used: bool,
    pub ocr_confidence: Option<f32>,
    pub embedding: Option<Vec<u8>>,
    pub created_at: String,
}

impl From<&Chunk> for NewChunkRow {
    fn from(c: &Chunk) -> Self {
        Self {
            id: c.id.to_string(),
            version_id: c.version_id.to_string(),
            document_id: c.document_id.to_string(),
            chunk_num: c.chunk_num,
            text: c.text.clone(),
            language: c.language.as_str().to_string(),
            page_start: c.page_start,
            page_end: c.page_end,
            ocr_used: c.ocr_used,
            ocr_confidence: c.ocr_confidence,
            embedding: c.embedding.as_deref().map(crate::models::encode_embedding),
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

impl TryFrom<ChunkRow> for Chunk {
    type Error = AppError;

    fn try_from(row: ChunkRow) -> Result<Self, Self::Error> {
        Ok(Chunk {
            id: Uuid::parse_str(&row.id).map_err(|_| bad_enum("chunks.id", &row.id))?,
            version_id: Uuid::parse_str(&row.version_id)
                .map_err(|_| bad_enum("chunks.version_id", &row.version_id))?,
            document_id: Uuid::parse_str(&row.document_id)
                .map_err(|_| bad_enum("chunks.document_id", &row.document_id))?,
            chunk_num: row.chunk_num,
            text: row.text,
            language: Language::from_str(&row.language)
                .ok_or_else(|| bad_enum("chunks.language", &row.language))?,
            page_start: row.page_start,
            page_end: row.page_end,
            ocr_used: row.ocr_used,
            ocr_confidence: row.ocr_confidence,
            embedding: row.embedding.as_deref().map(crate::models::decode_embedding),
            created_at: parse_dt(&row.created_at)?,
        })
    }
}

// ----------------------------------------------------------- ingestion_jobs

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = ingestion_jobs)]
pub struct IngestionJobRow {
    pub id: String,
    pub version_id: String,
    pub stage: String,
    pub status: String,
    pub queue: String,
    pub attempts: i32,
    pub progress_current: Option<i32>,
    pub progress_total: Option<i32>,
    pub metrics: Option<String>,
    pub error: Option<String>,
    pub enqueued_at: String,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = ingestion_jobs)]
pub struct NewIngestionJobRow {
    pub id: String,
    pub version_id: String,
    pub stage: String,
    pub status: String,
    pub queue: String,
    pub attempts: i32,
    pub progress_current: Option<i32>,
    pub progress_total: Option<i32>,
    pub metrics: Option<String>,
    pub error: Option<String>,
    pub enqueued_at: String,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
}

impl From<&IngestionJob> for NewIngestionJobRow {
    fn from(j: &IngestionJob) -> Self {
        Self {
            id: j.id.to_string(),
            version_id: j.version_id.to_string(),
            stage: j.stage.as_str().to_string(),
            status: j.status.as_str().to_string(),
            queue: j.queue.clone(),
            attempts: j.attempts,
            progress_current: j.progress_current,
            progress_total: j.progress_total,
            metrics: j
                .metrics
                .as_ref()
                .map(|m| serde_json::to_string(m).unwrap_or_default()),
            error: j.error.clone(),
            enqueued_at: j.enqueued_at.to_rfc3339(),
            started_at: j.started_at.map(|t| t.to_rfc3339()),
            finished_at: j.finished_at.map(|t| t.to_rfc3339()),
        }
    }
}

impl TryFrom<IngestionJobRow> for IngestionJob {
    type Error = AppError;

    fn try_from(row: IngestionJobRow) -> Result<Self, Self::Error> {
        Ok(IngestionJob {
            id: Uuid::parse_str(&row.id).map_err(|_| bad_enum("ingestion_jobs.id", &row.id))?,
            version_id: Uuid::parse_str(&row.version_id)
                .map_err(|_| bad_enum("ingestion_jobs.version_id", &row.version_id))?,
            stage: JobStage::from_str(&row.stage)
                .ok_or_else(|| bad_enum("ingestion_jobs.stage", &row.stage))?,
            status: JobStatus::from_str(&row.status)
                .ok_or_else(|| bad_enum("ingestion_jobs.status", &row.status))?,
            queue: row.queue,
            attempts: row.attempts,
            progress_current: row.progress_current,
            progress_total: row.progress_total,
            metrics: row
                .metrics
                .as_deref()
                .map(serde_json::from_str::<Metric>)
                .transpose()
                .map_err(|e| AppError::Database(diesel::result::Error::DeserializationError(Box::new(e))))?,
            error: row.error,
            enqueued_at: parse_dt(&row.enqueued_at)?,
            started_at: row.started_at.as_deref().map(parse_dt).transpose()?,
            finished_at: row.finished_at.as_deref().map(parse_dt).transpose()?,
        })
    }
}

// ----------------------------------------------------------------- uploads

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = uploads)]
pub struct UploadRow {
    pub id: String,
    pub original_filename: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub sha256: String,
    pub staging_key: String,
    pub status: String,
    pub document_id: Option<String>,
    pub version_id: Option<String>,
    pub error: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = uploads)]
pub struct NewUploadRow {
    pub id: String,
    pub original_filename: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub sha256: String,
    pub staging_key: String,
    pub status: String,
    pub document_id: Option<String>,
    pub version_id: Option<String>,
    pub error: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Upload> for NewUploadRow {
    fn from(u: &Upload) -> Self {
        Self {
            id: u.id.to_string(),
            original_filename: u.original_filename.clone(),
            mime_type: u.mime_type.clone(),
            size_bytes: u.size_bytes,
            sha256: u.sha256.clone(),
            staging_key: u.staging_key.clone(),
            status: u.status.as_str().to_string(),
            document_id: u.document_id.map(|id| id.to_string()),
            version_id: u.version_id.map(|id| id.to_string()),
            error: u.error.clone(),
            created_at: u.created_at.to_rfc3339(),
            updated_at: now_str(),
        }
    }
}

impl TryFrom<UploadRow> for Upload {
    type Error = AppError;

    fn try_from(row: UploadRow) -> Result<Self, Self::Error> {
        Ok(Upload {
            id: Uuid::parse_str(&row.id).map_err(|_| bad_enum("uploads.id", &row.id))?,
            original_filename: row.original_filename,
            mime_type: row.mime_type,
            size_bytes: row.size_bytes,
            sha256: row.sha256,
            staging_key: row.staging_key,
            status: UploadStatus::from_str(&row.status)
                .ok_or_else(|| bad_enum("uploads.status", &row.status))?,
            document_id: row
                .document_id
                .map(|s| Uuid::parse_str(&s))
                .transpose()
                .map_err(|_| bad_enum("uploads.document_id", "<invalid uuid>"))?,
            version_id: row
                .version_id
                .map(|s| Uuid::parse_str(&s))
                .transpose()
                .map_err(|_| bad_enum("uploads.version_id", "<invalid uuid>"))?,
            error: row.error,
            created_at: parse_dt(&row.created_at)?,
            updated_at: parse_dt(&row.updated_at)?,
        })
    }
}
