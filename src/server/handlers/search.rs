//! Search and passage-reading endpoints, grounded in
//! `original_source/api/routes/search.py`. Both wrap `crate::tools`
//! directly rather than calling the search engine themselves, so this
//! handler and any future RPC surface stay in lockstep.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::search::{Passage, SearchResult};
use crate::server::AppState;
use crate::tools;

fn default_k() -> usize {
    10
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_k")]
    pub k: usize,
    pub doc_id: Option<Uuid>,
    pub version_id: Option<Uuid>,
}

pub async fn search(State(state): State<AppState>, Json(body): Json<SearchRequest>) -> AppResult<Json<SearchResult>> {
    let result = tools::search(&state.repos, &state.embedder, &body.query, body.k, body.doc_id, body.version_id).await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct ReadPassagesRequest {
    pub chunk_ids: Vec<Uuid>,
    #[serde(default)]
    pub include_context: bool,
}

pub async fn read_passages(
    State(state): State<AppState>,
    Json(body): Json<ReadPassagesRequest>,
) -> AppResult<Json<Vec<Passage>>> {
    let passages = tools::read_passages(&state.repos, &body.chunk_ids, body.include_context).await?;
    Ok(Json(passages))
}
