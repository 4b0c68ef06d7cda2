//! Worker process: pulls `WorkItem`s off the `io`/`cpu` queues and runs the
//! matching pipeline stage. Grounded in the teacher's worker-pool idiom
//! (`cli/commands.rs`'s `refresh`/`annotate` commands: a shared queue, a
//! fixed number of `tokio::spawn`ed loop tasks, a `Semaphore` bounding
//! in-flight work) adapted from a one-shot batch job to a long-running
//! consumer of the two queues `JobStage::queue_name` names.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lka::config::Settings;
use lka::external::{EmbedderClient, ObjectStore, S3ObjectStore, TikaClient};
use lka::models::JobStage;
use lka::pipeline::stages::{self, StageContext};
use lka::pipeline::Orchestrator;
use lka::progress::{ProgressPublisher, RedisProgressBus};
use lka::queue::{JobQueue, RedisJobQueue};
use lka::repository::{DieselSqlitePool, Repositories};

/// How long a queue `pop` blocks before looping back to check for other
/// work — also the cadence at which a shutdown signal is noticed.
const POP_TIMEOUT_SECS: u64 = 5;

#[derive(Parser)]
#[command(name = "lka-worker")]
#[command(about = "Ingestion pipeline worker: consumes the io and cpu job queues")]
struct Args {
    /// Concurrent tasks per queue (io and cpu each get this many).
    #[arg(long, env = "LKA_WORKER_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lka=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env();
    let ctx = build_context(&settings).await?;

    tracing::info!(concurrency = args.concurrency, "starting lka-worker");

    let mut handles = Vec::new();
    for queue in ["io", "cpu"] {
        for slot in 0..args.concurrency {
            let ctx = ctx.clone();
            handles.push(tokio::spawn(async move {
                run_queue_loop(ctx, queue, slot).await;
            }));
        }
    }

    for handle in handles {
        handle.await?;
    }
    Ok(())
}

async fn build_context(settings: &Settings) -> anyhow::Result<StageContext> {
    let pool = DieselSqlitePool::new(settings.database_url.clone());
    let repos = Repositories::new(pool);

    let object_store = S3ObjectStore::from_settings(settings).await;
    object_store.ensure_bucket().await?;
    let object_store: Arc<dyn ObjectStore> = Arc::new(object_store);

    let embedder = EmbedderClient::new(settings.embedder_url.clone());
    let tika = TikaClient::new(settings.tika_url.clone());

    let queue: Arc<dyn JobQueue> = Arc::new(RedisJobQueue::new(&settings.redis_url)?);
    let publisher: Arc<dyn ProgressPublisher> = Arc::new(RedisProgressBus::new(&settings.redis_url)?);
    let orchestrator = Orchestrator::new(repos.clone(), queue, publisher, settings.reaper_timeout_multiplier);

    Ok(StageContext {
        repos,
        object_store,
        embedder,
        tika,
        settings: Arc::new(settings.clone()),
        orchestrator,
    })
}

/// One queue consumer: blocks on `pop`, dispatches the stage, and reports
/// the outcome back through the orchestrator. Never returns except on a
/// queue error, which is logged and retried rather than killing the task —
/// a worker slot dying silently would just shrink capacity.
async fn run_queue_loop(ctx: StageContext, queue_name: &'static str, slot: usize) {
    let queue: Arc<dyn JobQueue> = match RedisJobQueue::new(&ctx.settings.redis_url) {
        Ok(q) => Arc::new(q),
        Err(err) => {
            tracing::error!(queue = queue_name, slot, %err, "worker slot failed to connect to queue");
            return;
        }
    };

    loop {
        let item = match queue.pop(queue_name, POP_TIMEOUT_SECS).await {
            Ok(Some(item)) => item,
            Ok(None) => continue,
            Err(err) => {
                tracing::error!(queue = queue_name, slot, %err, "queue pop failed, retrying");
                tokio::time::sleep(std::time::Duration::from_secs(1)).await;
                continue;
            }
        };

        if let Err(err) = process_item(&ctx, item.stage, item.version_id).await {
            tracing::error!(queue = queue_name, slot, stage = ?item.stage, version_id = %item.version_id, %err, "stage processing failed");
        }
    }
}

async fn process_item(ctx: &StageContext, stage: JobStage, version_id: uuid::Uuid) -> anyhow::Result<()> {
    let job = ctx
        .repos
        .jobs
        .get_by_version_stage(version_id, stage)
        .await?
        .ok_or_else(|| anyhow::anyhow!("no job row for version {version_id} stage {stage:?}"))?;

    ctx.orchestrator.mark_stage_running(job.id, version_id, stage).await?;

    match stages::dispatch(ctx, stage, job.id, version_id).await {
        Ok(metrics) => {
            ctx.orchestrator
                .mark_stage_done(job.id, version_id, stage, metrics)
                .await?;
        }
        Err(err) => {
            ctx.orchestrator
                .mark_stage_error(job.id, version_id, stage, &err.to_string())
                .await?;
        }
    }
    Ok(())
}
