use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::Document;
use crate::schema::documents;

use super::pool::DieselSqlitePool;
use super::records::{DocumentRow, NewDocumentRow};

#[derive(Clone)]
pub struct DocumentRepository {
    pool: DieselSqlitePool,
}

impl DocumentRepository {
    pub fn new(pool: DieselSqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, doc: &Document) -> AppResult<()> {
        let mut conn = self.pool.get().await?;
        diesel::insert_into(documents::table)
            .values(NewDocumentRow::from(doc))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Document> {
        let mut conn = self.pool.get().await?;
        let row = documents::table
            .filter(documents::id.eq(id.to_string()))
            .select(DocumentRow::as_select())
            .first(&mut conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::NotFound => AppError::NotFound(format!("document {id}")),
                e => AppError::Database(e),
            })?;
        Document::try_from(row)
    }

    pub async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<Document>> {
        let mut conn = self.pool.get().await?;
        let rows = documents::table
            .order(documents::created_at.desc())
            .limit(limit)
            .offset(offset)
            .select(DocumentRow::as_select())
            .load(&mut conn)
            .await?;
        rows.into_iter().map(Document::try_from).collect()
    }

    /// Called by the finalize stage once a version completes: points the
    /// document at its newest version.
    pub async fn set_latest_version(&self, document_id: Uuid, version_id: Uuid) -> AppResult<()> {
        let mut conn = self.pool.get().await?;
        diesel::update(documents::table.filter(documents::id.eq(document_id.to_string())))
            .set((
                documents::latest_version_id.eq(version_id.to_string()),
                documents::updated_at.eq(chrono::Utc::now().to_rfc3339()),
            ))
            .execute(&mut conn)
            .await?;
        Ok(())
    }
}
