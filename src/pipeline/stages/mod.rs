//! The five pipeline stages. Each exposes a `run(ctx, version_id)` that the
//! worker binary calls between `Orchestrator::mark_stage_running` and
//! `mark_stage_done`/`mark_stage_error`. `dispatch` is the single place that
//! maps a `JobStage` to its implementation, kept here (not in
//! `pipeline::mod`) to avoid the orchestrator depending on every stage's
//! collaborator set.

pub mod chunk;
pub mod embed;
pub mod extract;
mod format;
pub mod finalize;
pub mod ocr;
mod windowing;

use std::sync::Arc;

use uuid::Uuid;

use crate::config::Settings;
use crate::error::AppResult;
use crate::external::{EmbedderClient, ObjectStore, TikaClient};
use crate::models::{JobStage, Metric};
use crate::pipeline::Orchestrator;
use crate::repository::Repositories;

/// Collaborators a stage needs, bundled once by the worker binary and
/// passed by reference into each stage's `run`.
#[derive(Clone)]
pub struct StageContext {
    pub repos: Repositories,
    pub object_store: Arc<dyn ObjectStore>,
    pub embedder: EmbedderClient,
    pub tika: TikaClient,
    pub settings: Arc<Settings>,
    pub orchestrator: Orchestrator,
}

pub async fn dispatch(ctx: &StageContext, stage: JobStage, job_id: Uuid, version_id: Uuid) -> AppResult<Option<Metric>> {
    match stage {
        JobStage::Extract => extract::run(ctx, version_id).await,
        JobStage::Ocr => ocr::run(ctx, job_id, version_id).await,
        JobStage::Chunk => chunk::run(ctx, version_id).await,
        JobStage::Embed => embed::run(ctx, job_id, version_id).await,
        JobStage::Finalize => finalize::run(ctx, version_id).await,
    }
}
