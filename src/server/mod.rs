//! Web server: REST API, tool-style JSON endpoints, and the SSE progress
//! relay. Grounded in the teacher's `server/mod.rs` (`AppState`/
//! `create_router`/`serve` shape), generalized from the teacher's
//! crawl/document browsing state to this appliance's repositories plus
//! its external collaborators (object store, embedder, Tika, job queue,
//! progress bus).

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Settings;
use crate::external::{EmbedderClient, ObjectStore, S3ObjectStore, TikaClient};
use crate::pipeline::Orchestrator;
use crate::progress::{ProgressPublisher, ProgressSubscriber, RedisProgressBus};
use crate::queue::{JobQueue, RedisJobQueue};
use crate::repository::{DieselSqlitePool, Repositories};

#[cfg(test)]
use crate::progress::InMemoryProgressBus;
#[cfg(test)]
use crate::queue::InMemoryJobQueue;

#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub object_store: Arc<dyn ObjectStore>,
    pub embedder: EmbedderClient,
    pub tika: TikaClient,
    pub settings: Arc<Settings>,
    pub orchestrator: Orchestrator,
    pub progress: Arc<dyn ProgressSubscriber>,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        let settings = Arc::new(settings.clone());
        let pool = DieselSqlitePool::new(settings.database_url.clone());
        let repos = Repositories::new(pool);

        let object_store = S3ObjectStore::from_settings(&settings).await;
        object_store.ensure_bucket().await?;
        let object_store: Arc<dyn ObjectStore> = Arc::new(object_store);

        let embedder = EmbedderClient::new(settings.embedder_url.clone());
        let tika = TikaClient::new(settings.tika_url.clone());

        let queue: Arc<dyn JobQueue> = Arc::new(RedisJobQueue::new(&settings.redis_url)?);
        let publisher: Arc<dyn ProgressPublisher> = Arc::new(RedisProgressBus::new(&settings.redis_url)?);
        let subscriber: Arc<dyn ProgressSubscriber> = Arc::new(RedisProgressBus::new(&settings.redis_url)?);

        let orchestrator = Orchestrator::new(repos.clone(), queue, publisher, settings.reaper_timeout_multiplier);

        Ok(Self {
            repos,
            object_store,
            embedder,
            tika,
            settings,
            orchestrator,
            progress: subscriber,
        })
    }

    /// Same-process test/dev harness: in-memory queue and progress bus
    /// instead of Redis, so the server can run without a broker.
    #[cfg(test)]
    pub fn new_in_memory(settings: Settings, object_store: Arc<dyn ObjectStore>) -> Self {
        let settings = Arc::new(settings);
        let pool = DieselSqlitePool::new(settings.database_url.clone());
        let repos = Repositories::new(pool);

        let embedder = EmbedderClient::new(settings.embedder_url.clone());
        let tika = TikaClient::new(settings.tika_url.clone());

        let bus = Arc::new(InMemoryProgressBus::new());
        let queue: Arc<dyn JobQueue> = Arc::new(InMemoryJobQueue::new());
        let publisher: Arc<dyn ProgressPublisher> = bus.clone();
        let subscriber: Arc<dyn ProgressSubscriber> = bus;

        let orchestrator = Orchestrator::new(repos.clone(), queue, publisher, settings.reaper_timeout_multiplier);

        Self {
            repos,
            object_store,
            embedder,
            tika,
            settings,
            orchestrator,
            progress: subscriber,
        }
    }
}

pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings).await?;
    let app = create_router(state);
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    tracing::info!("starting lka server at http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
