//! Orphaned-job reaper command: a one-shot invocation of the same sweep the
//! server could run on a timer (spec.md §5's "2x timeout" orphan rescue).

use std::sync::Arc;

use console::style;

use crate::config::Settings;
use crate::pipeline::Orchestrator;
use crate::progress::InMemoryProgressBus;
use crate::queue::RedisJobQueue;
use crate::repository::{DieselSqlitePool, Repositories};

pub async fn cmd_reap(settings: &Settings) -> anyhow::Result<()> {
    let pool = DieselSqlitePool::new(settings.database_url.clone());
    let repos = Repositories::new(pool);
    let queue = Arc::new(RedisJobQueue::new(&settings.redis_url)?);
    let progress = Arc::new(InMemoryProgressBus::new());
    let orchestrator = Orchestrator::new(repos, queue, progress, settings.reaper_timeout_multiplier);

    let count = orchestrator.reap_orphaned_jobs().await?;
    if count == 0 {
        println!("{} No orphaned jobs found", style("✓").green());
    } else {
        println!("{} Reaped {} orphaned job(s)", style("!").yellow(), count);
    }
    Ok(())
}
