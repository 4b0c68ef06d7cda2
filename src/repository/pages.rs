use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::DocumentPage;
use crate::schema::document_pages;

use super::pool::DieselSqlitePool;
use super::records::{DocumentPageRow, NewDocumentPageRow};

#[derive(Clone)]
pub struct PageRepository {
    pool: DieselSqlitePool,
}

impl PageRepository {
    pub fn new(pool: DieselSqlitePool) -> Self {
        Self { pool }
    }

    /// Idempotent replace: deletes any existing pages for the version,
    /// then inserts the given set in one transaction. The extract stage
    /// calls this on every run (including retries), so re-running it never
    /// produces duplicate pages.
    pub async fn replace_pages(&self, version_id: Uuid, pages: &[DocumentPage]) -> AppResult<()> {
        let mut conn = self.pool.get().await?;
        let new_rows: Vec<NewDocumentPageRow> = pages.iter().map(NewDocumentPageRow::from).collect();
        conn.transaction(|conn| {
            async move {
                diesel::delete(
                    document_pages::table.filter(document_pages::version_id.eq(version_id.to_string())),
                )
                .execute(conn)
                .await?;
                diesel::insert_into(document_pages::table)
                    .values(new_rows)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
    }

    pub async fn get_pages(&self, version_id: Uuid) -> AppResult<Vec<DocumentPage>> {
        let mut conn = self.pool.get().await?;
        let rows = document_pages::table
            .filter(document_pages::version_id.eq(version_id.to_string()))
            .order(document_pages::page_num.asc())
            .select(DocumentPageRow::as_select())
            .load(&mut conn)
            .await?;
        rows.into_iter().map(DocumentPage::try_from).collect()
    }
}
