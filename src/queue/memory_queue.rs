use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use crate::error::AppResult;

use super::{JobQueue, WorkItem};

/// In-process queue used by tests and the no-broker development mode.
#[derive(Clone, Default)]
pub struct InMemoryJobQueue {
    queues: Arc<Mutex<HashMap<String, VecDeque<WorkItem>>>>,
    notify: Arc<Notify>,
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn push(&self, queue: &str, item: WorkItem) -> AppResult<()> {
        let mut queues = self.queues.lock().await;
        queues.entry(queue.to_string()).or_default().push_back(item);
        drop(queues);
        self.notify.notify_waiters();
        Ok(())
    }

    async fn pop(&self, queue: &str, timeout_secs: u64) -> AppResult<Option<WorkItem>> {
        let deadline = Duration::from_secs(timeout_secs);
        let start = tokio::time::Instant::now();
        loop {
            {
                let mut queues = self.queues.lock().await;
                if let Some(item) = queues.get_mut(queue).and_then(|q| q.pop_front()) {
                    return Ok(Some(item));
                }
            }
            let elapsed = start.elapsed();
            if elapsed >= deadline {
                return Ok(None);
            }
            let remaining = deadline - elapsed;
            let _ = tokio::time::timeout(remaining, self.notify.notified()).await;
        }
    }
}
