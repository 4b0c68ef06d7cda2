use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::error::AppResult;

use super::{ProgressEvent, ProgressPublisher, ProgressSubscriber};

/// In-process fallback/test double for the progress bus, backed by a
/// `tokio::sync::broadcast` channel — the teacher's usual choice for
/// fan-out notification within a single process (see `server/handlers`).
#[derive(Clone)]
pub struct InMemoryProgressBus {
    sender: broadcast::Sender<ProgressEvent>,
}

impl InMemoryProgressBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1024);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.sender.subscribe()
    }
}

impl Default for InMemoryProgressBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProgressPublisher for InMemoryProgressBus {
    async fn publish(&self, event: ProgressEvent) -> AppResult<()> {
        // No active subscribers is not an error; it just means nobody's
        // watching this version's progress right now.
        let _ = self.sender.send(event);
        Ok(())
    }
}

#[async_trait]
impl ProgressSubscriber for InMemoryProgressBus {
    async fn subscribe_stream(&self) -> AppResult<BoxStream<'static, ProgressEvent>> {
        let stream = BroadcastStream::new(self.subscribe()).filter_map(|r| async move { r.ok() });
        Ok(Box::pin(stream))
    }
}
