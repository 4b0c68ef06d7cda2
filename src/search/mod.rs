//! Hybrid lexical + semantic search engine (spec.md §4.5): the tool-level
//! `search`/`read_passages` contract's implementation.

mod lexical;
mod scoring;

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::external::EmbedderClient;
use crate::models::{cosine_similarity, Chunk, Language};
use crate::repository::Repositories;

const SEMANTIC_CANDIDATE_LIMIT: usize = 30;

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub chunk_id: Uuid,
    pub document_id: Uuid,
    pub version_id: Uuid,
    pub document_title: String,
    pub text: String,
    pub page_start: i32,
    pub page_end: i32,
    pub language: Language,
    pub ocr_used: bool,
    pub ocr_confidence: Option<f32>,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConflictSource {
    pub doc_id: Uuid,
    pub version_id: Uuid,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub hits: Vec<SearchHit>,
    pub possible_conflict: bool,
    pub conflict_sources: Vec<ConflictSource>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Passage {
    pub chunk_id: Uuid,
    pub text: String,
    pub page_start: i32,
    pub page_end: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_after: Option<String>,
}

pub struct SearchScope {
    pub doc_id: Option<Uuid>,
    pub version_id: Option<Uuid>,
}

/// Runs a hybrid search. Degrades gracefully to lexical-only if the
/// embedder is unavailable (spec.md's error taxonomy (v), scenario S6) —
/// the embed failure is logged, never raised to the caller.
pub async fn hybrid_search(
    repos: &Repositories,
    embedder: &EmbedderClient,
    query: &str,
    k: usize,
    scope: &SearchScope,
) -> AppResult<SearchResult> {
    let lexical_raw = lexical::lexical_candidates(repos.chunks.pool(), query).await?;

    let semantic_raw = match embedder.embed(&[query.to_string()]).await {
        Ok(mut vectors) if !vectors.is_empty() => {
            let query_vector = vectors.remove(0);
            semantic_candidates(repos, &query_vector).await?
        }
        Ok(_) => HashMap::new(),
        Err(e) => {
            tracing::warn!(error = %e, "embedder unavailable, falling back to lexical-only search");
            HashMap::new()
        }
    };

    let candidate_ids: HashSet<Uuid> = lexical_raw.keys().chain(semantic_raw.keys()).copied().collect();
    if candidate_ids.is_empty() {
        return Ok(SearchResult {
            hits: Vec::new(),
            possible_conflict: false,
            conflict_sources: Vec::new(),
        });
    }

    let ids: Vec<Uuid> = candidate_ids.into_iter().collect();
    let mut chunks = repos.chunks.get_by_ids(&ids).await?;
    chunks.retain(|c| {
        scope.doc_id.map_or(true, |id| id == c.document_id) && scope.version_id.map_or(true, |id| id == c.version_id)
    });

    if chunks.is_empty() {
        return Ok(SearchResult {
            hits: Vec::new(),
            possible_conflict: false,
            conflict_sources: Vec::new(),
        });
    }

    let kept: HashSet<Uuid> = chunks.iter().map(|c| c.id).collect();
    let lexical_scoped: HashMap<Uuid, f32> = lexical_raw.into_iter().filter(|(id, _)| kept.contains(id)).collect();
    let semantic_scoped: HashMap<Uuid, f32> = semantic_raw.into_iter().filter(|(id, _)| kept.contains(id)).collect();

    let norm_lex = scoring::normalize_scores(&lexical_scoped);
    let norm_sem = scoring::normalize_scores(&semantic_scoped);

    let mut documents: HashMap<Uuid, crate::models::Document> = HashMap::new();
    for chunk in &chunks {
        if !documents.contains_key(&chunk.document_id) {
            let doc = repos.documents.get(chunk.document_id).await?;
            documents.insert(chunk.document_id, doc);
        }
    }

    let mut scored: Vec<(Chunk, f32)> = chunks
        .into_iter()
        .map(|chunk| {
            let lex = norm_lex.get(&chunk.id).copied().unwrap_or(0.0);
            let sem = norm_sem.get(&chunk.id).copied().unwrap_or(0.0);
            let latest_version_id = documents.get(&chunk.document_id).and_then(|d| d.latest_version_id);
            let boost = scoring::latest_version_boost(chunk.version_id, latest_version_id)
                + scoring::ocr_confidence_boost(chunk.ocr_confidence);
            let score = lex + sem + boost;
            (chunk, score)
        })
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let (possible_conflict, conflict_sources) = detect_conflict(&scored, &documents);

    let hits = scored
        .into_iter()
        .take(k)
        .map(|(chunk, score)| {
            let title = documents
                .get(&chunk.document_id)
                .map(|d| d.title.clone())
                .unwrap_or_default();
            SearchHit {
                chunk_id: chunk.id,
                document_id: chunk.document_id,
                version_id: chunk.version_id,
                document_title: title,
                text: chunk.text,
                page_start: chunk.page_start,
                page_end: chunk.page_end,
                language: chunk.language,
                ocr_used: chunk.ocr_used,
                ocr_confidence: chunk.ocr_confidence,
                score: (score as f64 * 10000.0).round() / 10000.0,
            }
        })
        .collect();

    Ok(SearchResult {
        hits,
        possible_conflict,
        conflict_sources,
    })
}

async fn semantic_candidates(repos: &Repositories, query_vector: &[f32]) -> AppResult<HashMap<Uuid, f32>> {
    let embedded = repos.chunks.all_embedded().await?;
    let mut scored: Vec<(Uuid, f32)> = embedded
        .into_iter()
        .filter_map(|chunk| {
            chunk
                .embedding
                .as_ref()
                .map(|vector| (chunk.id, cosine_similarity(query_vector, vector)))
        })
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(SEMANTIC_CANDIDATE_LIMIT);
    Ok(scored.into_iter().collect())
}

/// Inspects the top three final-scored hits: any within `CONFLICT_THRESHOLD`
/// of the top score is a "close hit"; if those span two or more distinct
/// (doc, version) pairs, the answer is ambiguous.
fn detect_conflict(
    scored: &[(Chunk, f32)],
    documents: &HashMap<Uuid, crate::models::Document>,
) -> (bool, Vec<ConflictSource>) {
    let top = &scored[..scored.len().min(3)];
    let Some((_, top_score)) = top.first() else {
        return (false, Vec::new());
    };
    if *top_score <= 0.0 {
        return (false, Vec::new());
    }

    let close: Vec<&(Chunk, f32)> = top
        .iter()
        .filter(|(_, score)| *score >= scoring::CONFLICT_THRESHOLD * top_score)
        .collect();

    let mut sources: Vec<ConflictSource> = Vec::new();
    let mut seen: HashSet<(Uuid, Uuid)> = HashSet::new();
    for (chunk, _) in &close {
        if seen.insert((chunk.document_id, chunk.version_id)) {
            let title = documents.get(&chunk.document_id).map(|d| d.title.clone()).unwrap_or_default();
            sources.push(ConflictSource {
                doc_id: chunk.document_id,
                version_id: chunk.version_id,
                title,
            });
        }
    }

    if sources.len() >= 2 {
        (true, sources)
    } else {
        (false, Vec::new())
    }
}

/// Reads back the given chunk ids in request order, dropping unknown ids,
/// optionally attaching each chunk's immediate neighbor text.
pub async fn read_passages(repos: &Repositories, chunk_ids: &[Uuid], include_context: bool) -> AppResult<Vec<Passage>> {
    let chunks = repos.chunks.get_by_ids(chunk_ids).await?;
    let by_id: HashMap<Uuid, Chunk> = chunks.into_iter().map(|c| (c.id, c)).collect();

    let mut passages = Vec::new();
    for id in chunk_ids {
        let Some(chunk) = by_id.get(id) else { continue };
        let (context_before, context_after) = if include_context {
            let before = repos
                .chunks
                .get_chunk_by_num(chunk.version_id, chunk.chunk_num - 1)
                .await?
                .map(|c| c.text);
            let after = repos
                .chunks
                .get_chunk_by_num(chunk.version_id, chunk.chunk_num + 1)
                .await?
                .map(|c| c.text);
            (before, after)
        } else {
            (None, None)
        };

        passages.push(Passage {
            chunk_id: chunk.id,
            text: chunk.text.clone(),
            page_start: chunk.page_start,
            page_end: chunk.page_end,
            context_before,
            context_after,
        });
    }
    Ok(passages)
}
