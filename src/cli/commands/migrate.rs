//! Database migration command.

use console::style;

use crate::config::Settings;
use crate::repository::DieselSqlitePool;

pub async fn cmd_migrate(settings: &Settings) -> anyhow::Result<()> {
    println!("{} Running database migrations...", style("→").cyan());
    let pool = DieselSqlitePool::new(settings.database_url.clone());
    pool.run_migrations()?;
    println!("  {} Database ready at {}", style("✓").green(), settings.database_url);
    Ok(())
}
