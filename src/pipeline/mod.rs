//! Pipeline orchestrator: owns the per-version state machine driving
//! `extract → ocr? → chunk → embed → finalize` (spec.md §4.3), passing
//! itself to stage functions as a small interface (`mark_stage_running`/
//! `mark_stage_done`/`mark_stage_error`) rather than letting stages import
//! it as a module-level singleton, which would create the orchestrator
//! ↔ stages import cycle spec.md §9 calls out.

mod stage_config;
pub mod stages;

pub use stage_config::{done_sentinel, running_sentinel};

use std::sync::Arc;

use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{IngestionJob, JobStage, JobStatus, Metric, VersionStatus};
use crate::progress::{ProgressEvent, ProgressPublisher};
use crate::queue::{JobQueue, WorkItem};
use crate::repository::Repositories;

#[derive(Clone)]
pub struct Orchestrator {
    repos: Repositories,
    queue: Arc<dyn JobQueue>,
    progress: Arc<dyn ProgressPublisher>,
    reaper_timeout_multiplier: u32,
}

impl Orchestrator {
    pub fn new(
        repos: Repositories,
        queue: Arc<dyn JobQueue>,
        progress: Arc<dyn ProgressPublisher>,
        reaper_timeout_multiplier: u32,
    ) -> Self {
        Self {
            repos,
            queue,
            progress,
            reaper_timeout_multiplier,
        }
    }

    pub fn repos(&self) -> &Repositories {
        &self.repos
    }

    /// Upserts the `(version, stage)` job to `queued`, sets the version's
    /// status to the stage's running sentinel, and pushes the work item
    /// onto the stage's queue. A concurrent enqueue for the same stage is
    /// a benign no-op, enforced by the job table's unique index.
    pub async fn enqueue_stage(&self, version_id: Uuid, stage: JobStage) -> AppResult<()> {
        let job = IngestionJob::new(version_id, stage);
        let inserted = self.repos.jobs.enqueue(&job).await?;
        if !inserted {
            return Ok(());
        }
        self.repos
            .versions
            .set_status(version_id, running_sentinel(stage), None)
            .await?;
        self.queue
            .push(stage.queue_name(), WorkItem { stage, version_id })
            .await?;
        self.progress
            .publish(ProgressEvent::new(version_id, stage, JobStatus::Queued))
            .await?;
        Ok(())
    }

    pub async fn mark_stage_running(&self, job_id: Uuid, version_id: Uuid, stage: JobStage) -> AppResult<()> {
        self.repos.jobs.mark_running(job_id).await?;
        self.progress
            .publish(ProgressEvent::new(version_id, stage, JobStatus::Running))
            .await
    }

    /// Called by a long-running stage (OCR, embed) after each unit of work
    /// to update the job's progress counters and emit a `running` event
    /// carrying them, per spec.md §4.4's progress/total payload fields.
    pub async fn report_progress(
        &self,
        job_id: Uuid,
        version_id: Uuid,
        stage: JobStage,
        current: i32,
        total: i32,
    ) -> AppResult<()> {
        self.repos.jobs.set_progress(job_id, current, total).await?;
        self.progress
            .publish(ProgressEvent::new(version_id, stage, JobStatus::Running).with_progress(current, total))
            .await
    }

    pub async fn mark_stage_done(
        &self,
        job_id: Uuid,
        version_id: Uuid,
        stage: JobStage,
        metrics: Option<Metric>,
    ) -> AppResult<()> {
        self.repos.jobs.mark_done(job_id, metrics).await?;
        self.repos
            .versions
            .set_status(version_id, done_sentinel(stage), None)
            .await?;
        self.progress
            .publish(ProgressEvent::new(version_id, stage, JobStatus::Done))
            .await?;
        self.advance_pipeline(version_id).await
    }

    pub async fn mark_stage_error(
        &self,
        job_id: Uuid,
        version_id: Uuid,
        stage: JobStage,
        error: &str,
    ) -> AppResult<()> {
        self.repos.jobs.mark_error(job_id, error).await?;
        self.repos
            .versions
            .set_status(version_id, VersionStatus::Error, Some(error))
            .await?;
        self.progress
            .publish(ProgressEvent::new(version_id, stage, JobStatus::Error).with_message(error))
            .await
    }

    /// Walks the stage order from `Extract`, skipping any already-`done`
    /// stage. When it reaches `ocr` and the version doesn't need it,
    /// synthesizes a `done` job with `metrics.skipped=true` and continues
    /// the walk in the same call. Enqueues the first stage that isn't
    /// done yet; if every stage is done, the pipeline is complete.
    pub async fn advance_pipeline(&self, version_id: Uuid) -> AppResult<()> {
        let version = self.repos.versions.get(version_id).await?;

        for stage in JobStage::ORDER {
            let job = self.repos.jobs.get_by_version_stage(version_id, stage).await?;
            if matches!(&job, Some(j) if j.status == JobStatus::Done) {
                continue;
            }

            if stage == JobStage::Ocr && !version.needs_ocr && job.is_none() {
                let mut skip_job = IngestionJob::new(version_id, JobStage::Ocr);
                skip_job.status = JobStatus::Done;
                skip_job.metrics = Some(Metric::skipped());
                skip_job.started_at = Some(chrono::Utc::now());
                skip_job.finished_at = Some(chrono::Utc::now());
                self.repos.jobs.enqueue(&skip_job).await?;
                self.repos
                    .versions
                    .set_status(version_id, VersionStatus::OcrDone, None)
                    .await?;
                self.progress
                    .publish(
                        ProgressEvent::new(version_id, JobStage::Ocr, JobStatus::Done)
                            .with_message("skipped"),
                    )
                    .await?;
                continue;
            }

            self.enqueue_stage(version_id, stage).await?;
            return Ok(());
        }
        Ok(())
    }

    /// Re-enqueues jobs stuck `running` past `timeout * multiplier`
    /// (orphaned worker), returning the number reclaimed.
    pub async fn reap_orphaned_jobs(&self) -> AppResult<usize> {
        let orphaned = self.repos.jobs.list_orphaned(self.reaper_timeout_multiplier).await?;
        let count = orphaned.len();
        for job in orphaned {
            self.repos.jobs.requeue(job.id).await?;
            self.queue
                .push(
                    job.queue.as_str(),
                    WorkItem {
                        stage: job.stage,
                        version_id: job.version_id,
                    },
                )
                .await?;
            self.progress
                .publish(
                    ProgressEvent::new(job.version_id, job.stage, JobStatus::Queued)
                        .with_message("reaped"),
                )
                .await?;
        }
        Ok(count)
    }

    /// Starts a version's pipeline from the beginning: used by upload
    /// confirmation and the explicit "reprocess" admin action.
    pub async fn start_pipeline(&self, version_id: Uuid) -> AppResult<()> {
        self.enqueue_stage(version_id, JobStage::Extract).await
    }
}
