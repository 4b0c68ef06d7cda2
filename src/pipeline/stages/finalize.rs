//! Finalize stage: the pipeline's last step. Points the document at this
//! version as its latest, and marks any upload record that confirmed into
//! it as done (spec.md §4.2.5).

use uuid::Uuid;

use crate::error::AppResult;
use crate::models::Metric;

use super::StageContext;

pub async fn run(ctx: &StageContext, version_id: Uuid) -> AppResult<Option<Metric>> {
    let version = ctx.repos.versions.get(version_id).await?;
    ctx.repos
        .documents
        .set_latest_version(version.document_id, version_id)
        .await?;
    ctx.repos.uploads.mark_done_for_version(version_id).await?;

    Ok(Some(Metric::counts().with("finalized", 1.0).build()))
}
