//! Lexical retrieval over the two per-language FTS5 external-content
//! tables (spec.md §4.5). Queried with `diesel::sql_query` rather than the
//! `diesel::table!` macro since FTS5 virtual tables and `bm25()` aren't
//! representable as ordinary Diesel query-DSL columns.

use std::collections::HashMap;

use diesel::sql_query;
use diesel::sql_types::{Float, Text};
use diesel::QueryableByName;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::error::AppResult;
use crate::repository::DieselSqlitePool;

const CANDIDATE_LIMIT: i64 = 30;
const FTS_TABLES: [&str; 2] = ["chunks_fts_en", "chunks_fts_fr"];

#[derive(QueryableByName)]
struct CandidateRow {
    #[diesel(sql_type = Text)]
    id: String,
    #[diesel(sql_type = Float)]
    raw_score: f32,
}

/// Turns a free-text query into an FTS5 MATCH expression: each word quoted
/// (so punctuation and FTS operators in the input can't alter the query)
/// and OR'd together, approximating the "coverage-density" ranking spec.md
/// calls for — chunks matching more of the query terms rank higher.
fn build_match_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(|w| format!("\"{}\"", w.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// Top lexical candidates across both analyzer languages, keyed by chunk
/// id with the maximum raw bm25-derived score seen for that id. Every
/// chunk is indexed into both tables, so a hit can legitimately score
/// differently under each analyzer; the max is what spec.md's "best
/// lexical score per chunk" wording calls for.
pub async fn lexical_candidates(pool: &DieselSqlitePool, query: &str) -> AppResult<HashMap<Uuid, f32>> {
    let match_query = build_match_query(query);
    if match_query.is_empty() {
        return Ok(HashMap::new());
    }

    let mut scores: HashMap<Uuid, f32> = HashMap::new();
    for table in FTS_TABLES {
        let mut conn = pool.get().await?;
        // bm25() is more negative for better matches; negate so higher is
        // better, matching the semantic side's similarity convention.
        let sql = format!(
            "SELECT chunks.id AS id, CAST(-bm25({table}) AS REAL) AS raw_score \
             FROM {table} JOIN chunks ON chunks.rowid = {table}.rowid \
             WHERE {table} MATCH ? ORDER BY raw_score DESC LIMIT {CANDIDATE_LIMIT}"
        );
        let rows: Vec<CandidateRow> = sql_query(sql).bind::<Text, _>(&match_query).load(&mut conn).await?;

        for row in rows {
            let Ok(id) = Uuid::parse_str(&row.id) else { continue };
            scores
                .entry(id)
                .and_modify(|existing| {
                    if row.raw_score > *existing {
                        *existing = row.raw_score;
                    }
                })
                .or_insert(row.raw_score);
        }
    }
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_and_ors_each_word() {
        assert_eq!(build_match_query("resource quota"), "\"resource\" OR \"quota\"");
    }

    #[test]
    fn escapes_embedded_quotes() {
        assert_eq!(build_match_query("say \"hi\""), "\"say\" OR \"\"\"hi\"\"\"");
    }
}
