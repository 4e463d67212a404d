//! Database connection and pool management.

use exn::ResultExt;
use sqlx::SqliteConnection;
use sqlx::pool::PoolConnectionMetadata;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use std::path::Path;
use std::time::Duration;
use tracing::instrument;

use crate::error::{ErrorKind, Result};
use crate::timestamp;

/// Embedded migrations that are run automatically on connect.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
// The home feed fires three reads at once; a fourth connection leaves room
// for a write issued while they are in flight.
const MAX_CONNECTIONS: u32 = 4;
/// Every timestamp column, with the key of its table.
const STAMPED_COLUMNS: [(&str, &str, &str); 4] = [
    ("files", "id", "created_at"),
    ("files", "id", "updated_at"),
    ("metadata", "file_id", "created_at"),
    ("metadata", "file_id", "updated_at"),
];
const PADDED: &str = "[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9] [0-9][0-9]:[0-9][0-9]:[0-9][0-9]*";

/// Database connection pool for the document library.
///
/// This is the main entry point for interacting with the embedded store. It
/// owns the SQLite connection pool and hands it out to [`Repository`](crate::Repository).
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    async fn new(options: SqliteConnectOptions, max: Option<u32>) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            // Query-based PRAGMAs must be applied to EVERY pooled connection,
            // not only to the first one handed out.
            .after_connect(|conn, meta| Box::pin(async move { Self::apply_pragmas(conn, meta).await }))
            .max_connections(max.unwrap_or(MAX_CONNECTIONS))
            .connect_with(options)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let db = Self { pool };
        db.migrate().await?;
        db.normalize_timestamps().await?;
        Ok(db)
    }

    /// Connect to the library database at the given path.
    ///
    /// Creates the database file if it doesn't exist and runs migrations.
    /// Databases written by earlier releases keep their schema; only their
    /// legacy timestamps are rewritten.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "opening library database");
        let options = Self::base_options().filename(path).create_if_missing(true);
        Self::new(options, None).await
    }

    /// Connect to an in-memory database (useful for testing).
    ///
    /// Note:
    /// - In-memory databases are destroyed when the connection closes.
    /// - Do NOT apply `#[cfg(test)]` so that other crates can also use this in their tests.
    pub async fn connect_in_memory() -> Result<Self> {
        let options = Self::base_options().filename(":memory:");
        // Every pooled connection to ":memory:" would see its own empty
        // database, so the pool is limited to a single connection.
        Self::new(options, Some(1)).await
    }

    /// Base connection options shared between file and in-memory databases.
    fn base_options() -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            // Readers (the home feed) never block on the progress writer.
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // Progress is saved on every page turn; give a concurrent writer
            // a moment instead of surfacing SQLITE_BUSY to the reader.
            .busy_timeout(Duration::from_millis(1500))
    }

    /// Apply additional PRAGMA settings that aren't exposed via SqliteConnectOptions.
    async fn apply_pragmas(conn: &mut SqliteConnection, _meta: PoolConnectionMetadata) -> sqlx::Result<()> {
        sqlx::query(
            r#"
                PRAGMA wal_autocheckpoint = 500;
                PRAGMA cache_size = -4096;
                PRAGMA temp_store = MEMORY;
            "#,
        )
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Run database migrations.
    ///
    /// This is called automatically by `connect` and `connect_in_memory`.
    #[instrument("performing database migrations", skip(self))]
    async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await.or_raise(|| ErrorKind::Migration)
    }

    /// Rewrite timestamps from earlier releases (`2023-7-4 09:05:00`) in the
    /// zero-padded form, so that sorting on the TEXT columns is chronological.
    ///
    /// Legacy values are wall-clock device time and are kept as such; only
    /// their shape changes. Unparseable values are left untouched.
    #[instrument(skip(self))]
    async fn normalize_timestamps(&self) -> Result<u64> {
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let mut rewritten = 0;
        for (table, key, column) in STAMPED_COLUMNS {
            let select = format!(
                "SELECT {key}, {column} FROM {table} WHERE {column} IS NOT NULL AND {column} != '' AND {column} NOT GLOB '{PADDED}'"
            );
            let legacy: Vec<(i64, String)> =
                sqlx::query_as(&select).fetch_all(&mut *tx).await.or_raise(|| ErrorKind::Database)?;
            let update = format!("UPDATE {table} SET {column} = ? WHERE {key} = ?");
            for (id, value) in legacy {
                let Ok(parsed) = timestamp::parse(&value) else {
                    tracing::warn!(table, column, id, value = %value, "leaving unreadable timestamp alone");
                    continue;
                };
                sqlx::query(&update)
                    .bind(timestamp::format(parsed)?)
                    .bind(id)
                    .execute(&mut *tx)
                    .await
                    .or_raise(|| ErrorKind::Database)?;
                rewritten += 1;
            }
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        if rewritten > 0 {
            tracing::info!(rewritten, "normalized legacy timestamps");
        }
        Ok(rewritten)
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    ///
    /// Waits for all connections to be returned to the pool and then closes
    /// them. The instance should not be used afterwards.
    pub async fn close(&self) {
        // Let SQLite update query planner statistics
        _ = sqlx::query("PRAGMA optimize").execute(&self.pool).await;
        self.pool.close().await;
    }
}
