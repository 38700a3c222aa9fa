//! Database layer for the download-count collector
//!
//! This crate provides persistence for release asset identities and their
//! download-count samples, including:
//! - Connection pool management for PostgreSQL
//! - The `DownloadLedger` / `LedgerTransaction` abstraction
//! - The asset registry accessor and sample appender built on it
//! - PostgreSQL and (feature `sqlite`) SQLite ledgers
//!
//! Every write happens inside a caller-owned transaction and must affect
//! exactly one row; anything else is reported as an integrity violation.
//!
//! # Example
//!
//! ```rust,no_run
//! use dlstats_db::{create_pool, ensure_registered, PoolConfig, PostgresLedger, DownloadLedger};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PoolConfig::new("postgres://localhost/github_stats").max_connections(10);
//! let pool = create_pool(&config).await?;
//! let ledger = PostgresLedger::new(pool);
//!
//! let mut tx = ledger.begin().await?;
//! let registration = ensure_registered(tx.as_mut(), "DB.Browser.for.SQLite-3.12.2.dmg").await?;
//! tx.commit().await?;
//! # Ok(())
//! # }
//! ```

// Re-export core domain types for convenience
pub use dlstats_core;

// Public modules
pub mod error;
pub mod ledger;
pub mod pool;
pub mod postgres;
pub mod registry;
pub mod samples;
#[cfg(feature = "sqlite")]
pub mod sqlite;

// Re-exports for convenience
pub use error::{DbError, DbResult};
pub use ledger::{DownloadLedger, LedgerTransaction};
pub use pool::{close_pool, create_pool, mask_password, verify_pool_health, PoolConfig};
pub use postgres::PostgresLedger;
pub use registry::{ensure_registered, Registration};
pub use samples::append_sample;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteLedger;

// Re-export sqlx types that users may need
pub use sqlx::postgres::PgPool;

