//! Job queue: hands `(stage, version_id)` work items to worker tasks,
//! one named queue per stage group (`io`, `cpu` — spec.md §5).

mod memory_queue;
mod redis_queue;

pub use memory_queue::InMemoryJobQueue;
pub use redis_queue::RedisJobQueue;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::JobStage;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkItem {
    pub stage: JobStage,
    pub version_id: Uuid,
}

#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn push(&self, queue: &str, item: WorkItem) -> AppResult<()>;

    /// Block for up to `timeout_secs` waiting for work on `queue`,
    /// returning `None` on timeout so the worker loop can check for
    /// shutdown between waits.
    async fn pop(&self, queue: &str, timeout_secs: u64) -> AppResult<Option<WorkItem>>;
}
