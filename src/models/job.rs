use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{JobStage, JobStatus};

/// Per-stage metrics recorded when a job completes. Replaces an ad hoc
/// `serde_json::Value` with a small tagged union: most stages report a
/// flat numeric breakdown (pages extracted, chunks produced, embedding
/// batch count), while the OCR-skip synthesis path (spec.md §4.3) records
/// only `{"skipped": true}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Metric {
    Skipped { skipped: bool },
    Counts(BTreeMap<String, f64>),
}

impl Metric {
    pub fn skipped() -> Self {
        Metric::Skipped { skipped: true }
    }

    pub fn counts() -> CountsBuilder {
        CountsBuilder(BTreeMap::new())
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Metric::Skipped { skipped: true })
    }
}

pub struct CountsBuilder(BTreeMap<String, f64>);

impl CountsBuilder {
    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.0.insert(key.to_string(), value);
        self
    }

    pub fn build(self) -> Metric {
        Metric::Counts(self.0)
    }
}

/// One unit of work for a single pipeline stage against a single version.
/// Uniqueness on `(version_id, stage)` enforces spec.md §5's "one job per
/// stage per version in flight at a time" invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionJob {
    pub id: Uuid,
    pub version_id: Uuid,
    pub stage: JobStage,
    pub status: JobStatus,
    pub queue: String,
    pub attempts: i32,
    pub progress_current: Option<i32>,
    pub progress_total: Option<i32>,
    pub metrics: Option<Metric>,
    pub error: Option<String>,
    pub enqueued_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl IngestionJob {
    pub fn new(version_id: Uuid, stage: JobStage) -> Self {
        Self {
            id: Uuid::new_v4(),
            version_id,
            stage,
            status: JobStatus::Queued,
            queue: stage.queue_name().to_string(),
            attempts: 0,
            progress_current: None,
            progress_total: None,
            metrics: None,
            error: None,
            enqueued_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }
}
