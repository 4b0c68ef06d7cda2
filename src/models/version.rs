use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::enums::VersionStatus;

/// One immutable, content-addressed upload of a document's bytes, and the
/// pipeline state tracking its progress through extract/ocr/chunk/embed/
/// finalize. Mirrors the teacher's `DocumentVersion::compute_hash`
/// content-addressing convention, generalized from an in-memory `Vec` of
/// versions on `Document` to its own table with a global uniqueness
/// constraint on `original_sha256` (spec.md's global, not per-document,
/// dedup rule).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentVersion {
    pub id: Uuid,
    pub document_id: Uuid,
    pub original_sha256: String,
    pub storage_key: String,
    pub mime_type: String,
    pub original_filename: String,
    pub size_bytes: i64,
    pub status: VersionStatus,
    /// Set by the extract stage (spec.md §4.2.1); drives the orchestrator's
    /// OCR-skip decision in `advance_pipeline`.
    pub has_text_layer: bool,
    pub needs_ocr: bool,
    pub extracted_chars: i32,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentVersion {
    /// Compute the content hash used for global deduplication.
    pub fn compute_hash(content: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content);
        hex::encode(hasher.finalize())
    }

    pub fn new(
        document_id: Uuid,
        original_sha256: String,
        storage_key: String,
        mime_type: String,
        original_filename: String,
        size_bytes: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            document_id,
            original_sha256,
            storage_key,
            mime_type,
            original_filename,
            size_bytes,
            status: VersionStatus::Uploaded,
            has_text_layer: false,
            needs_ocr: false,
            extracted_chars: 0,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_and_content_sensitive() {
        let a = DocumentVersion::compute_hash(b"hello world");
        let b = DocumentVersion::compute_hash(b"hello world");
        let c = DocumentVersion::compute_hash(b"hello world!");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }
}
