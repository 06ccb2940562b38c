//! `SQLite` connection pool setup and migration runner.

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::error::StorageError;

const MAX_CONNECTIONS: u32 = 4;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for the `SQLite` storage adapter.
pub struct Config {
    /// `SQLite` connection URL (e.g. `sqlite:minionhub.db` or `sqlite::memory:`).
    pub database_url: String,
}

impl Config {
    /// Open the minion store described by this configuration.
    ///
    /// The database file is created if missing and pending migrations are
    /// applied before the store is handed out.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Connect`] when the URL is invalid or the
    /// database cannot be opened, [`StorageError::Migration`] otherwise.
    pub async fn build(self) -> Result<Database, StorageError> {
        Database::open(&self.database_url).await
    }
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// The minion store's connection pool.
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    async fn open(database_url: &str) -> Result<Self, StorageError> {
        let connect_error = |source| StorageError::Connect {
            url: database_url.to_string(),
            source,
        };

        let mut options = SqliteConnectOptions::from_str(database_url)
            .map_err(connect_error)?
            .create_if_missing(true)
            .busy_timeout(BUSY_TIMEOUT);
        // HTTP reads must not block behind a timeout or delete being written.
        if !is_in_memory(database_url) {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .map_err(connect_error)?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!(database_url, "minion store ready");

        Ok(Self { pool })
    }

    /// Borrow the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Wait for in-flight queries and close every connection.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("minion store closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_create_pool_and_run_migrations_when_using_memory_db() {
        let config = Config {
            database_url: "sqlite::memory:".to_string(),
        };
        let db = config.build().await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' AND name != '_sqlx_migrations' ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();

        let names: Vec<&str> = tables.iter().map(|row| row.0.as_str()).collect();
        assert_eq!(names, vec!["minions"]);
    }

    #[test]
    fn should_recognize_in_memory_urls() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite:file:hub?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite:minionhub.db?mode=rwc"));
    }

    #[tokio::test]
    async fn should_close_pool() {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();

        db.close().await;

        assert!(db.pool().is_closed());
    }
}
