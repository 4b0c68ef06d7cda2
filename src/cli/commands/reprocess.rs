//! Admin command to restart a stuck or failed version's pipeline from
//! `extract`, bypassing whatever stage it last errored on.

use std::sync::Arc;

use console::style;
use uuid::Uuid;

use crate::config::Settings;
use crate::pipeline::Orchestrator;
use crate::progress::InMemoryProgressBus;
use crate::queue::RedisJobQueue;
use crate::repository::{DieselSqlitePool, Repositories};

pub async fn cmd_reprocess(settings: &Settings, version_id: Uuid) -> anyhow::Result<()> {
    let pool = DieselSqlitePool::new(settings.database_url.clone());
    let repos = Repositories::new(pool);

    // Confirm the version exists before doing anything else.
    repos.versions.get(version_id).await?;

    let queue = Arc::new(RedisJobQueue::new(&settings.redis_url)?);
    let progress = Arc::new(InMemoryProgressBus::new());
    let orchestrator = Orchestrator::new(repos, queue, progress, settings.reaper_timeout_multiplier);

    orchestrator.start_pipeline(version_id).await?;
    println!("{} Restarted pipeline for version {}", style("✓").green(), version_id);
    Ok(())
}
