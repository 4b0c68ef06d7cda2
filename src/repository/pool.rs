//! Async SQLite connection handling.
//!
//! Uses diesel-async's `SyncConnectionWrapper` to provide an async
//! interface over a synchronous `SqliteConnection` (it internally runs
//! blocking calls via `spawn_blocking`). SQLite connections are cheap and
//! file-based, so — mirroring the teacher's `diesel_pool.rs` — this opens
//! a fresh connection per unit of work rather than maintaining a pool;
//! SQLite's own file locking plus `busy_timeout` handles the resulting
//! concurrent-writer contention.

use diesel::sqlite::SqliteConnection;
use diesel::Connection as SyncConnectionTrait;
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_async::AsyncConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::error::{AppError, AppResult};

pub type AsyncSqliteConnection = SyncConnectionWrapper<SqliteConnection>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Opens fresh `AsyncSqliteConnection`s against a single database URL.
#[derive(Clone)]
pub struct DieselSqlitePool {
    database_url: String,
}

impl DieselSqlitePool {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }

    pub async fn get(&self) -> AppResult<AsyncSqliteConnection> {
        AsyncSqliteConnection::establish(&self.database_url)
            .await
            .map_err(|e| AppError::Database(to_diesel_error(e)))
    }

    /// Run any pending migrations. Uses a plain synchronous connection
    /// since `diesel_migrations::MigrationHarness` is not async-aware.
    pub fn run_migrations(&self) -> AppResult<()> {
        let mut conn = SqliteConnection::establish(&self.database_url)
            .map_err(|e| AppError::Migration(e.to_string()))?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| AppError::Migration(e.to_string()))?;
        Ok(())
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

/// `SyncConnectionWrapper::establish` surfaces connection errors as a
/// boxed `ConnectionError`; narrow it back to a `diesel::result::Error`
/// so callers only ever deal with one error type from this module.
fn to_diesel_error(e: diesel::ConnectionError) -> diesel::result::Error {
    diesel::result::Error::QueryBuilderError(Box::new(e))
}
