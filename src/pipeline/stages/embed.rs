//! Embed stage: sends each not-yet-embedded chunk's text to the embedding
//! service in batches of 256, in `chunk_num` order, persisting each
//! returned vector as it comes back (spec.md §4.2.4).

use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{JobStage, Metric};

use super::StageContext;

const BATCH_SIZE: usize = 256;

pub async fn run(ctx: &StageContext, job_id: Uuid, version_id: Uuid) -> AppResult<Option<Metric>> {
    let mut chunks = ctx.repos.chunks.get_chunks(version_id).await?;
    chunks.sort_by_key(|c| c.chunk_num);
    let pending: Vec<_> = chunks.into_iter().filter(|c| c.embedding.is_none()).collect();

    if pending.is_empty() {
        return Ok(Some(Metric::counts().with("embedded", 0.0).build()));
    }

    let total_batches = pending.len().div_ceil(BATCH_SIZE);
    let mut embedded = 0usize;

    for (batch_idx, batch) in pending.chunks(BATCH_SIZE).enumerate() {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let vectors = ctx.embedder.embed(&texts).await?;

        for (chunk, vector) in batch.iter().zip(vectors) {
            ctx.repos.chunks.set_embedding(chunk.id, vector).await?;
            embedded += 1;
        }

        ctx.orchestrator
            .report_progress(job_id, version_id, JobStage::Embed, (batch_idx + 1) as i32, total_batches as i32)
            .await?;
    }

    Ok(Some(Metric::counts().with("embedded", embedded as f64).build()))
}
