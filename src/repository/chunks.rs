use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::Chunk;
use crate::schema::chunks;

use super::pool::DieselSqlitePool;
use super::records::{ChunkRow, NewChunkRow};

#[derive(Clone)]
pub struct ChunkRepository {
    pool: DieselSqlitePool,
}

impl ChunkRepository {
    pub fn new(pool: DieselSqlitePool) -> Self {
        Self { pool }
    }

    /// Exposed for the search module's raw `sql_query` access to the FTS5
    /// virtual tables, which aren't representable through this
    /// repository's ordinary `diesel::table!`-backed methods.
    pub fn pool(&self) -> &DieselSqlitePool {
        &self.pool
    }

    /// Idempotent replace, same rationale as `PageRepository::replace_pages`.
    pub async fn replace_chunks(&self, version_id: Uuid, new_chunks: &[Chunk]) -> AppResult<()> {
        let mut conn = self.pool.get().await?;
        let new_rows: Vec<NewChunkRow> = new_chunks.iter().map(NewChunkRow::from).collect();
        conn.transaction(|conn| {
            async move {
                diesel::delete(chunks::table.filter(chunks::version_id.eq(version_id.to_string())))
                    .execute(conn)
                    .await?;
                diesel::insert_into(chunks::table)
                    .values(new_rows)
                    .execute(conn)
                    .await?;
                Ok(())
            }
            .scope_boxed()
        })
        .await
    }

    pub async fn get_chunks(&self, version_id: Uuid) -> AppResult<Vec<Chunk>> {
        let mut conn = self.pool.get().await?;
        let rows = chunks::table
            .filter(chunks::version_id.eq(version_id.to_string()))
            .order(chunks::chunk_num.asc())
            .select(ChunkRow::as_select())
            .load(&mut conn)
            .await?;
        rows.into_iter().map(Chunk::try_from).collect()
    }

    pub async fn get_chunk(&self, id: Uuid) -> AppResult<Option<Chunk>> {
        let mut conn = self.pool.get().await?;
        let row = chunks::table
            .filter(chunks::id.eq(id.to_string()))
            .select(ChunkRow::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        row.map(Chunk::try_from).transpose()
    }

    /// Fetch the chunk immediately before/after `chunk_num` in the same
    /// version, used by `read_passages`'s `include_context` option.
    pub async fn get_chunk_by_num(&self, version_id: Uuid, chunk_num: i32) -> AppResult<Option<Chunk>> {
        let mut conn = self.pool.get().await?;
        let row = chunks::table
            .filter(chunks::version_id.eq(version_id.to_string()))
            .filter(chunks::chunk_num.eq(chunk_num))
            .select(ChunkRow::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        row.map(Chunk::try_from).transpose()
    }

    pub async fn set_embedding(&self, id: Uuid, embedding: Vec<f32>) -> AppResult<()> {
        let mut conn = self.pool.get().await?;
        let blob = crate::models::encode_embedding(&embedding);
        diesel::update(chunks::table.filter(chunks::id.eq(id.to_string())))
            .set(chunks::embedding.eq(blob))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    /// Every chunk with an embedding set, across every document — the
    /// brute-force candidate set for the vector half of hybrid search
    /// (see DESIGN.md's Open Question on ANN indexing at this scale).
    pub async fn all_embedded(&self) -> AppResult<Vec<Chunk>> {
        let mut conn = self.pool.get().await?;
        let rows = chunks::table
            .filter(chunks::embedding.is_not_null())
            .select(ChunkRow::as_select())
            .load(&mut conn)
            .await?;
        rows.into_iter().map(Chunk::try_from).collect()
    }

    /// Batch fetch by id, used by hybrid search to hydrate candidate
    /// chunks gathered from the lexical and semantic retrieval sets.
    pub async fn get_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Chunk>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await?;
        let id_strings: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        let rows = chunks::table
            .filter(chunks::id.eq_any(id_strings))
            .select(ChunkRow::as_select())
            .load(&mut conn)
            .await?;
        rows.into_iter().map(Chunk::try_from).collect()
    }

    pub async fn get_by_document(&self, document_id: Uuid) -> AppResult<Vec<Chunk>> {
        let mut conn = self.pool.get().await?;
        let rows = chunks::table
            .filter(chunks::document_id.eq(document_id.to_string()))
            .order(chunks::chunk_num.asc())
            .select(ChunkRow::as_select())
            .load(&mut conn)
            .await?;
        rows.into_iter().map(Chunk::try_from).collect()
    }
}
