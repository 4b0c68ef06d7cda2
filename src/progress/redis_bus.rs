use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use redis::AsyncCommands;

use crate::error::{AppError, AppResult};

use super::{ProgressEvent, ProgressPublisher, ProgressSubscriber};

/// Channel name mirroring `original_source/events.py`'s `CHANNEL`.
pub const CHANNEL: &str = "job_progress";

#[derive(Clone)]
pub struct RedisProgressBus {
    client: redis::Client,
}

impl RedisProgressBus {
    pub fn new(redis_url: &str) -> AppResult<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| AppError::Upstream(format!("invalid redis url: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ProgressPublisher for RedisProgressBus {
    async fn publish(&self, event: ProgressEvent) -> AppResult<()> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Upstream(format!("redis connect failed: {e}")))?;
        let payload = serde_json::to_string(&event)
            .map_err(|e| AppError::Upstream(format!("progress event encode failed: {e}")))?;
        let _: i64 = conn
            .publish(CHANNEL, payload)
            .await
            .map_err(|e| AppError::Upstream(format!("redis publish failed: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl ProgressSubscriber for RedisProgressBus {
    async fn subscribe_stream(&self) -> AppResult<BoxStream<'static, ProgressEvent>> {
        let mut pubsub = self
            .client
            .get_async_pubsub()
            .await
            .map_err(|e| AppError::Upstream(format!("redis pubsub connect failed: {e}")))?;
        pubsub
            .subscribe(CHANNEL)
            .await
            .map_err(|e| AppError::Upstream(format!("redis subscribe failed: {e}")))?;

        let stream = pubsub.into_on_message().filter_map(|msg| async move {
            let payload: String = msg.get_payload().ok()?;
            serde_json::from_str::<ProgressEvent>(&payload).ok()
        });
        Ok(Box::pin(stream))
    }
}
