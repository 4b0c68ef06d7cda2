use async_trait::async_trait;
use redis::AsyncCommands;

use crate::error::{AppError, AppResult};

use super::{JobQueue, WorkItem};

/// `BLPOP`/`RPUSH` over a Redis list per named queue, the broker the
/// original worker pool uses (`original_source/worker/pipeline.py`'s
/// `enqueue_stage`).
#[derive(Clone)]
pub struct RedisJobQueue {
    client: redis::Client,
}

impl RedisJobQueue {
    pub fn new(redis_url: &str) -> AppResult<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| AppError::Upstream(format!("invalid redis url: {e}")))?;
        Ok(Self { client })
    }

    fn key(queue: &str) -> String {
        format!("lka:queue:{queue}")
    }
}

#[async_trait]
impl JobQueue for RedisJobQueue {
    async fn push(&self, queue: &str, item: WorkItem) -> AppResult<()> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Upstream(format!("redis connect failed: {e}")))?;
        let payload = serde_json::to_string(&item)
            .map_err(|e| AppError::Upstream(format!("work item encode failed: {e}")))?;
        let _: i64 = conn
            .rpush(Self::key(queue), payload)
            .await
            .map_err(|e| AppError::Upstream(format!("redis rpush failed: {e}")))?;
        Ok(())
    }

    async fn pop(&self, queue: &str, timeout_secs: u64) -> AppResult<Option<WorkItem>> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Upstream(format!("redis connect failed: {e}")))?;
        let result: Option<(String, String)> = conn
            .blpop(Self::key(queue), timeout_secs as f64)
            .await
            .map_err(|e| AppError::Upstream(format!("redis blpop failed: {e}")))?;
        match result {
            Some((_, payload)) => {
                let item = serde_json::from_str(&payload)
                    .map_err(|e| AppError::Upstream(format!("work item decode failed: {e}")))?;
                Ok(Some(item))
            }
            None => Ok(None),
        }
    }
}
