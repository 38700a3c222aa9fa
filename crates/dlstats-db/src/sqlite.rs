//! SQLite implementation of DownloadLedger
//!
//! An embedded backend for single-host deployments and for exercising the
//! ingestion path without a PostgreSQL server. Unlike the PostgreSQL ledger it
//! bootstraps its own tables, since an in-memory database starts empty.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dlstats_core::AssetId;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use std::str::FromStr;
use tracing::{debug, info, instrument};

use crate::error::{DbError, DbResult};
use crate::ledger::{DownloadLedger, LedgerTransaction};

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS release_assets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    first_seen_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS download_samples (
    asset_id INTEGER NOT NULL REFERENCES release_assets (id),
    recorded_at DATETIME NOT NULL,
    download_count INTEGER NOT NULL CHECK (download_count >= 0)
);

CREATE INDEX IF NOT EXISTS idx_download_samples_asset_time
    ON download_samples (asset_id, recorded_at);
"#;

/// SQLite implementation of DownloadLedger
#[derive(Debug, Clone)]
pub struct SqliteLedger {
    pool: SqlitePool,
}

impl SqliteLedger {
    /// Open (creating if missing) the database at `url` and ensure its tables
    pub async fn connect(url: &str) -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| DbError::Configuration(format!("Invalid SQLite URL: {}", e)))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection(format!("Failed to open SQLite database: {}", e)))?;

        let ledger = Self { pool };
        ledger.ensure_schema().await?;
        Ok(ledger)
    }

    /// Open a private in-memory database
    ///
    /// The pool pins a single connection for its whole lifetime; the database
    /// disappears with it.
    pub async fn in_memory() -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DbError::Configuration(format!("Invalid SQLite URL: {}", e)))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection(format!("Failed to open SQLite database: {}", e)))?;

        let ledger = Self { pool };
        ledger.ensure_schema().await?;
        Ok(ledger)
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn ensure_schema(&self) -> DbResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        info!("SQLite ledger schema ready");
        Ok(())
    }
}

#[async_trait]
impl DownloadLedger for SqliteLedger {
    #[instrument(skip(self))]
    async fn begin(&self) -> DbResult<Box<dyn LedgerTransaction>> {
        debug!("Beginning SQLite transaction");
        let tx = self.pool.begin().await?;
        Ok(Box::new(SqliteLedgerTransaction { tx }))
    }

    async fn health_check(&self) -> DbResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::Connection(format!("Health check failed: {}", e)))?;
        Ok(())
    }
}

/// One open SQLite transaction
pub struct SqliteLedgerTransaction {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl LedgerTransaction for SqliteLedgerTransaction {
    async fn find_asset_id(&mut self, name: &str) -> DbResult<Option<AssetId>> {
        let id: Option<i64> = sqlx::query_scalar("SELECT id FROM release_assets WHERE name = ?")
            .bind(name)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(id.map(AssetId::new))
    }

    async fn insert_asset(&mut self, name: &str) -> DbResult<u64> {
        let result = sqlx::query(
            "INSERT INTO release_assets (name) VALUES (?) ON CONFLICT (name) DO NOTHING",
        )
        .bind(name)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected())
    }

    async fn insert_sample(
        &mut self,
        asset_name: &str,
        recorded_at: DateTime<Utc>,
        download_count: i64,
    ) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO download_samples (asset_id, recorded_at, download_count)
            SELECT id, ?, ?
            FROM release_assets
            WHERE name = ?
            "#,
        )
        .bind(recorded_at)
        .bind(download_count)
        .bind(asset_name)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> DbResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::Transaction(format!("Commit failed: {}", e)))
    }

    async fn rollback(self: Box<Self>) -> DbResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DbError::Transaction(format!("Rollback failed: {}", e)))
    }
}
