use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{IngestionJob, JobStage, JobStatus, Metric};
use crate::schema::ingestion_jobs;

use super::pool::DieselSqlitePool;
use super::records::{IngestionJobRow, NewIngestionJobRow};

#[derive(Clone)]
pub struct JobRepository {
    pool: DieselSqlitePool,
}

impl JobRepository {
    pub fn new(pool: DieselSqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new queued job. The `(version_id, stage)` unique index
    /// means a second concurrent enqueue for the same stage fails with a
    /// constraint violation, which callers treat as "already queued"
    /// rather than an error (spec.md §5's per-version-per-stage
    /// serialization invariant).
    pub async fn enqueue(&self, job: &IngestionJob) -> AppResult<bool> {
        let mut conn = self.pool.get().await?;
        let result = diesel::insert_into(ingestion_jobs::table)
            .values(NewIngestionJobRow::from(job))
            .execute(&mut conn)
            .await;
        match result {
            Ok(_) => Ok(true),
            Err(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            )) => Ok(false),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    pub async fn get_by_version_stage(
        &self,
        version_id: Uuid,
        stage: JobStage,
    ) -> AppResult<Option<IngestionJob>> {
        let mut conn = self.pool.get().await?;
        let row = ingestion_jobs::table
            .filter(ingestion_jobs::version_id.eq(version_id.to_string()))
            .filter(ingestion_jobs::stage.eq(stage.as_str()))
            .select(IngestionJobRow::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        row.map(IngestionJob::try_from).transpose()
    }

    /// All jobs recorded for a version, across every stage — backs the
    /// document detail view's per-version job history.
    pub async fn list_by_version(&self, version_id: Uuid) -> AppResult<Vec<IngestionJob>> {
        let mut conn = self.pool.get().await?;
        let rows = ingestion_jobs::table
            .filter(ingestion_jobs::version_id.eq(version_id.to_string()))
            .order(ingestion_jobs::enqueued_at.asc())
            .select(IngestionJobRow::as_select())
            .load(&mut conn)
            .await?;
        rows.into_iter().map(IngestionJob::try_from).collect()
    }

    pub async fn mark_running(&self, id: Uuid) -> AppResult<()> {
        let mut conn = self.pool.get().await?;
        diesel::update(ingestion_jobs::table.filter(ingestion_jobs::id.eq(id.to_string())))
            .set((
                ingestion_jobs::status.eq(JobStatus::Running.as_str()),
                ingestion_jobs::started_at.eq(Utc::now().to_rfc3339()),
            ))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    pub async fn mark_done(&self, id: Uuid, metrics: Option<Metric>) -> AppResult<()> {
        let mut conn = self.pool.get().await?;
        let metrics_json = metrics.map(|m| serde_json::to_string(&m).unwrap_or_default());
        diesel::update(ingestion_jobs::table.filter(ingestion_jobs::id.eq(id.to_string())))
            .set((
                ingestion_jobs::status.eq(JobStatus::Done.as_str()),
                ingestion_jobs::metrics.eq(metrics_json),
                ingestion_jobs::finished_at.eq(Utc::now().to_rfc3339()),
            ))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    pub async fn mark_error(&self, id: Uuid, error: &str) -> AppResult<()> {
        let mut conn = self.pool.get().await?;
        diesel::update(ingestion_jobs::table.filter(ingestion_jobs::id.eq(id.to_string())))
            .set((
                ingestion_jobs::status.eq(JobStatus::Error.as_str()),
                ingestion_jobs::error.eq(error),
                ingestion_jobs::attempts.eq(ingestion_jobs::attempts + 1),
                ingestion_jobs::finished_at.eq(Utc::now().to_rfc3339()),
            ))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    /// Jobs stuck `running` past `timeout * multiplier` — a worker that
    /// crashed mid-stage without reporting failure. The reaper re-queues
    /// these (spec.md §4.3's orphan recovery).
    pub async fn list_orphaned(&self, timeout_multiplier: u32) -> AppResult<Vec<IngestionJob>> {
        let mut conn = self.pool.get().await?;
        let rows = ingestion_jobs::table
            .filter(ingestion_jobs::status.eq(JobStatus::Running.as_str()))
            .select(IngestionJobRow::as_select())
            .load(&mut conn)
            .await?;
        let jobs: AppResult<Vec<IngestionJob>> = rows.into_iter().map(IngestionJob::try_from).collect();
        let jobs = jobs?;

        let now = Utc::now();
        Ok(jobs
            .into_iter()
            .filter(|job| {
                let Some(started) = job.started_at else {
                    return false;
                };
                let timeout = job.stage.timeout_secs() as i64 * timeout_multiplier as i64;
                (now - started).num_seconds() > timeout
            })
            .collect())
    }

    /// Records per-item progress within a running stage (e.g. pages OCR'd,
    /// embedding batches sent) so the progress bus can report `progress`/
    /// `total` alongside the stage's `running` events.
    pub async fn set_progress(&self, id: Uuid, current: i32, total: i32) -> AppResult<()> {
        let mut conn = self.pool.get().await?;
        diesel::update(ingestion_jobs::table.filter(ingestion_jobs::id.eq(id.to_string())))
            .set((
                ingestion_jobs::progress_current.eq(current),
                ingestion_jobs::progress_total.eq(total),
            ))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    pub async fn requeue(&self, id: Uuid) -> AppResult<()> {
        let mut conn = self.pool.get().await?;
        diesel::update(ingestion_jobs::table.filter(ingestion_jobs::id.eq(id.to_string())))
            .set((
                ingestion_jobs::status.eq(JobStatus::Queued.as_str()),
                ingestion_jobs::started_at.eq(None::<String>),
            ))
            .execute(&mut conn)
            .await?;
        Ok(())
    }
}
