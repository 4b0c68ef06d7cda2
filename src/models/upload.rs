use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::UploadStatus;

/// A file staged in the object store's `tmp/uploads/` prefix, awaiting
/// confirmation as either a new document or a new version of an existing
/// one (spec.md's upload/confirm two-step flow). Grounded in
/// `original_source/.../api/routes/uploads.py`'s `upload_files`/
/// `confirm_upload` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Upload {
    pub id: Uuid,
    pub original_filename: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub sha256: String,
    pub staging_key: String,
    pub status: UploadStatus,
    pub document_id: Option<Uuid>,
    pub version_id: Option<Uuid>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Upload {
    pub fn new(original_filename: String, mime_type: String, size_bytes: i64, sha256: String) -> Self {
        let id = Uuid::new_v4();
        let now = Utc::now();
        Self {
            staging_key: format!("tmp/uploads/{id}/{original_filename}"),
            id,
            original_filename,
            mime_type,
            size_bytes,
            sha256,
            status: UploadStatus::PendingConfirmation,
            document_id: None,
            version_id: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }
}
