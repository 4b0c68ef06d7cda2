use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Upload, UploadStatus};
use crate::schema::uploads;

use super::pool::DieselSqlitePool;
use super::records::{NewUploadRow, UploadRow};

#[derive(Clone)]
pub struct UploadRepository {
    pool: DieselSqlitePool,
}

impl UploadRepository {
    pub fn new(pool: DieselSqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, upload: &Upload) -> AppResult<()> {
        let mut conn = self.pool.get().await?;
        diesel::insert_into(uploads::table)
            .values(NewUploadRow::from(upload))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Upload> {
        let mut conn = self.pool.get().await?;
        let row = uploads::table
            .filter(uploads::id.eq(id.to_string()))
            .select(UploadRow::as_select())
            .first(&mut conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::NotFound => AppError::NotFound(format!("upload {id}")),
                e => AppError::Database(e),
            })?;
        Upload::try_from(row)
    }

    pub async fn list(&self, limit: i64) -> AppResult<Vec<Upload>> {
        let mut conn = self.pool.get().await?;
        let rows = uploads::table
            .order(uploads::created_at.desc())
            .limit(limit)
            .select(UploadRow::as_select())
            .load(&mut conn)
            .await?;
        rows.into_iter().map(Upload::try_from).collect()
    }

    pub async fn mark_confirmed(&self, id: Uuid, document_id: Uuid, version_id: Uuid) -> AppResult<()> {
        let mut conn = self.pool.get().await?;
        diesel::update(uploads::table.filter(uploads::id.eq(id.to_string())))
            .set((
                uploads::status.eq(UploadStatus::Processing.as_str()),
                uploads::document_id.eq(document_id.to_string()),
                uploads::version_id.eq(version_id.to_string()),
                uploads::updated_at.eq(chrono::Utc::now().to_rfc3339()),
            ))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    /// Marks every upload still `processing` for a version done, once that
    /// version's pipeline reaches `finalize` (spec.md §4.2.5).
    pub async fn mark_done_for_version(&self, version_id: Uuid) -> AppResult<()> {
        let mut conn = self.pool.get().await?;
        diesel::update(
            uploads::table
                .filter(uploads::version_id.eq(version_id.to_string()))
                .filter(uploads::status.eq(UploadStatus::Processing.as_str())),
        )
        .set((
            uploads::status.eq(UploadStatus::Done.as_str()),
            uploads::updated_at.eq(chrono::Utc::now().to_rfc3339()),
        ))
        .execute(&mut conn)
        .await?;
        Ok(())
    }

    pub async fn mark_duplicate(&self, id: Uuid, existing_version_id: Uuid) -> AppResult<()> {
        let mut conn = self.pool.get().await?;
        diesel::update(uploads::table.filter(uploads::id.eq(id.to_string())))
            .set((
                uploads::status.eq(UploadStatus::Duplicate.as_str()),
                uploads::version_id.eq(existing_version_id.to_string()),
                uploads::updated_at.eq(chrono::Utc::now().to_rfc3339()),
            ))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    pub async fn mark_error(&self, id: Uuid, error: &str) -> AppResult<()> {
        let mut conn = self.pool.get().await?;
        diesel::update(uploads::table.filter(uploads::id.eq(id.to_string())))
            .set((
                uploads::status.eq(UploadStatus::Error.as_str()),
                uploads::error.eq(error),
                uploads::updated_at.eq(chrono::Utc::now().to_rfc3339()),
            ))
            .execute(&mut conn)
            .await?;
        Ok(())
    }
}
