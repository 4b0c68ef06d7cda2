use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{DocumentVersion, VersionStatus};
use crate::schema::document_versions;

use super::pool::DieselSqlitePool;
use super::records::{DocumentVersionRow, NewDocumentVersionRow};

#[derive(Clone)]
pub struct VersionRepository {
    pool: DieselSqlitePool,
}

impl VersionRepository {
    pub fn new(pool: DieselSqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, version: &DocumentVersion) -> AppResult<()> {
        let mut conn = self.pool.get().await?;
        diesel::insert_into(document_versions::table)
            .values(NewDocumentVersionRow::from(version))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> AppResult<DocumentVersion> {
        let mut conn = self.pool.get().await?;
        let row = document_versions::table
            .filter(document_versions::id.eq(id.to_string()))
            .select(DocumentVersionRow::as_select())
            .first(&mut conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::NotFound => AppError::NotFound(format!("version {id}")),
                e => AppError::Database(e),
            })?;
        DocumentVersion::try_from(row)
    }

    /// Global content-hash lookup backing spec.md's dedup-on-upload rule:
    /// any version anywhere with this hash, not just within one document.
    pub async fn get_by_sha256(&self, sha256: &str) -> AppResult<Option<DocumentVersion>> {
        let mut conn = self.pool.get().await?;
        let row = document_versions::table
            .filter(document_versions::original_sha256.eq(sha256))
            .select(DocumentVersionRow::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        row.map(DocumentVersion::try_from).transpose()
    }

    pub async fn list_by_document(&self, document_id: Uuid) -> AppResult<Vec<DocumentVersion>> {
        let mut conn = self.pool.get().await?;
        let rows = document_versions::table
            .filter(document_versions::document_id.eq(document_id.to_string()))
            .order(document_versions::created_at.desc())
            .select(DocumentVersionRow::as_select())
            .load(&mut conn)
            .await?;
        rows.into_iter().map(DocumentVersion::try_from).collect()
    }

    pub async fn set_status(&self, id: Uuid, status: VersionStatus, error: Option<&str>) -> AppResult<()> {
        let mut conn = self.pool.get().await?;
        diesel::update(document_versions::table.filter(document_versions::id.eq(id.to_string())))
            .set((
                document_versions::status.eq(status.as_str()),
                document_versions::error.eq(error),
                document_versions::updated_at.eq(chrono::Utc::now().to_rfc3339()),
            ))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    /// Persists the extract stage's sniffing results (spec.md §4.2.1).
    pub async fn set_extract_result(
        &self,
        id: Uuid,
        has_text_layer: bool,
        needs_ocr: bool,
        extracted_chars: i32,
    ) -> AppResult<()> {
        let mut conn = self.pool.get().await?;
        diesel::update(document_versions::table.filter(document_versions::id.eq(id.to_string())))
            .set((
                document_versions::has_text_layer.eq(has_text_layer),
                document_versions::needs_ocr.eq(needs_ocr),
                document_versions::extracted_chars.eq(extracted_chars),
                document_versions::updated_at.eq(chrono::Utc::now().to_rfc3339()),
            ))
            .execute(&mut conn)
            .await?;
        Ok(())
    }
}
