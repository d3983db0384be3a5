pub mod friendship_repo;
pub mod post_repo;
pub mod travel_repo;
pub mod user_repo;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{error, info};

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// How long a writer waits on another connection's write lock before
/// `SQLITE_BUSY` is returned.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the pool and brings the schema up to date.
pub async fn connect(database_url: &str, max_connections: u32) -> sqlx::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    MIGRATOR.run(&pool).await.map_err(|e| {
        error!("Migration failed: {}", e);
        sqlx::Error::from(e)
    })?;

    info!("Database connected and migrated");
    Ok(pool)
}

/// Transaction that takes the write lock at `BEGIN`, so concurrent writers
/// queue on `busy_timeout` instead of failing a read-to-write upgrade with
/// `SQLITE_BUSY`.
pub async fn begin_write(pool: &SqlitePool) -> sqlx::Result<Transaction<'static, Sqlite>> {
    pool.begin_with("BEGIN IMMEDIATE").await
}

/// In-memory database for tests. One connection only: every connection to
/// `sqlite::memory:` would otherwise see its own empty database.
#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("memory url")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("connect memory db");

    MIGRATOR.run(&pool).await.expect("migrate memory db");
    pool
}
