//! Transactional ledger abstractions
//!
//! A ledger hands out transactions; a transaction exposes the handful of
//! parameterized statements the registry accessor and sample appender are
//! built on. Backends (PostgreSQL, SQLite) only implement these primitives;
//! the row-count invariants live in [`crate::registry`] and [`crate::samples`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dlstats_core::AssetId;

use crate::error::DbResult;

/// Statements available inside one open transaction
///
/// Dropping an implementation without calling [`commit`](Self::commit) must
/// roll the transaction back.
#[async_trait]
pub trait LedgerTransaction: Send {
    /// Look up the identifier registered for `name`
    ///
    /// # Returns
    /// * `Ok(Some(id))` - The name is registered
    /// * `Ok(None)` - The name has never been seen
    async fn find_asset_id(&mut self, name: &str) -> DbResult<Option<AssetId>>;

    /// Insert a registry row for `name`
    ///
    /// Conflicts on the unique name are not raised; they surface as zero
    /// affected rows.
    ///
    /// # Returns
    /// * Number of rows affected
    async fn insert_asset(&mut self, name: &str) -> DbResult<u64>;

    /// Insert a sample for the asset registered as `asset_name`
    ///
    /// The asset reference is resolved by name inside the statement, so an
    /// unregistered name inserts nothing.
    ///
    /// # Returns
    /// * Number of rows affected
    async fn insert_sample(
        &mut self,
        asset_name: &str,
        recorded_at: DateTime<Utc>,
        download_count: i64,
    ) -> DbResult<u64>;

    /// Commit every statement executed in this transaction
    async fn commit(self: Box<Self>) -> DbResult<()>;

    /// Discard every statement executed in this transaction
    async fn rollback(self: Box<Self>) -> DbResult<()>;
}

/// Source of ledger transactions
///
/// Implementations must be thread-safe (Send + Sync) for use in async contexts.
#[async_trait]
pub trait DownloadLedger: Send + Sync {
    /// Open a new transaction
    async fn begin(&self) -> DbResult<Box<dyn LedgerTransaction>>;

    /// Health check - verify the backend is reachable
    async fn health_check(&self) -> DbResult<()>;
}
