//! Plain-function tool surface (spec.md §6): the three operations an
//! outside caller actually needs — `search`, `read_passages`, and
//! `get_document` — with no transport or auth concerns of their own.
//! `server::handlers` and any future RPC surface both wrap these directly
//! rather than duplicating the underlying calls.

use uuid::Uuid;

use crate::error::AppResult;
use crate::external::EmbedderClient;
use crate::models::Document;
use crate::repository::Repositories;
use crate::search::{self, Passage, SearchResult, SearchScope};

/// Hybrid lexical+semantic search, optionally scoped to one document or
/// one specific version of it.
pub async fn search(
    repos: &Repositories,
    embedder: &EmbedderClient,
    query: &str,
    k: usize,
    doc_id: Option<Uuid>,
    version_id: Option<Uuid>,
) -> AppResult<SearchResult> {
    let scope = SearchScope { doc_id, version_id };
    search::hybrid_search(repos, embedder, query, k, &scope).await
}

/// Reads back full passage text for a set of chunk ids, in request order.
pub async fn read_passages(repos: &Repositories, chunk_ids: &[Uuid], include_context: bool) -> AppResult<Vec<Passage>> {
    search::read_passages(repos, chunk_ids, include_context).await
}

pub async fn get_document(repos: &Repositories, document_id: Uuid) -> AppResult<Document> {
    repos.documents.get(document_id).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_scope_defaults_to_unscoped() {
        let scope = SearchScope {
            doc_id: None,
            version_id: None,
        };
        assert!(scope.doc_id.is_none());
        assert!(scope.version_id.is_none());
    }
}
