//! Progress bus: publishes per-version pipeline events so an outer UI or
//! API client can watch a document move through the stages in real time
//! (spec.md §4.4), grounded in `original_source/events.py`'s
//! `publish_job_event` over the `job_progress` Redis channel.

mod memory_bus;
mod redis_bus;

pub use memory_bus::InMemoryProgressBus;
pub use redis_bus::RedisProgressBus;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{JobStage, JobStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub version_id: Uuid,
    pub stage: JobStage,
    pub status: JobStatus,
    pub message: Option<String>,
    pub progress: Option<i32>,
    pub total: Option<i32>,
    pub timestamp: DateTime<Utc>,
}

impl ProgressEvent {
    pub fn new(version_id: Uuid, stage: JobStage, status: JobStatus) -> Self {
        Self {
            version_id,
            stage,
            status,
            message: None,
            progress: None,
            total: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_progress(mut self, current: i32, total: i32) -> Self {
        self.progress = Some(current);
        self.total = Some(total);
        self
    }
}

#[async_trait]
pub trait ProgressPublisher: Send + Sync {
    async fn publish(&self, event: ProgressEvent) -> AppResult<()>;
}

/// Separate from `ProgressPublisher` since subscribing is only needed by
/// the server's SSE relay, never by pipeline workers.
#[async_trait]
pub trait ProgressSubscriber: Send + Sync {
    async fn subscribe_stream(&self) -> AppResult<BoxStream<'static, ProgressEvent>>;
}
