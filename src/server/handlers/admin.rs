//! Operational endpoints: health check and orphan-job reaping, grounded in
//! spec.md §5's "2x timeout" reaper and the teacher's own `/api/stats`-style
//! admin surface.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::error::AppResult;
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub embedder_ok: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        embedder_ok: state.embedder.health().await,
    })
}

#[derive(Debug, Serialize)]
pub struct ReapResponse {
    pub reaped: usize,
}

pub async fn reap(State(state): State<AppState>) -> AppResult<Json<ReapResponse>> {
    let reaped = state.orchestrator.reap_orphaned_jobs().await?;
    Ok(Json(ReapResponse { reaped }))
}
