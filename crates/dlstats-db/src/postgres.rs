//! PostgreSQL implementation of DownloadLedger
//!
//! This module provides the production ledger backed by PostgreSQL via SQLx.
//! Expected tables are described in `sql/postgres.sql`; this crate never
//! creates or migrates them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dlstats_core::AssetId;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};

use crate::error::{DbError, DbResult};
use crate::ledger::{DownloadLedger, LedgerTransaction};

/// PostgreSQL implementation of DownloadLedger
#[derive(Debug, Clone)]
pub struct PostgresLedger {
    pool: PgPool,
}

impl PostgresLedger {
    /// Create a new PostgreSQL ledger
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DownloadLedger for PostgresLedger {
    #[instrument(skip(self))]
    async fn begin(&self) -> DbResult<Box<dyn LedgerTransaction>> {
        debug!("Beginning PostgreSQL transaction");
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgLedgerTransaction { tx }))
    }

    async fn health_check(&self) -> DbResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::Connection(format!("Health check failed: {}", e)))?;
        Ok(())
    }
}

/// One open PostgreSQL transaction
///
/// The wrapped `sqlx::Transaction` rolls back when dropped uncommitted.
pub struct PgLedgerTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LedgerTransaction for PgLedgerTransaction {
    async fn find_asset_id(&mut self, name: &str) -> DbResult<Option<AssetId>> {
        let id: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT id FROM release_assets
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(id.map(AssetId::new))
    }

    async fn insert_asset(&mut self, name: &str) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO release_assets (name)
            VALUES ($1)
            ON CONFLICT (name) DO NOTHING
            "#,
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
            SELECT id, $2, $3
            FROM release_assets
            WHERE name = $1
            "#,
        )
        .bind(asset_name)
        .bind(recorded_at)
        .bind(download_count)
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
