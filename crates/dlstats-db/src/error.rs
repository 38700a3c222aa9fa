//! Database-specific error types and conversions
//!
//! This module provides error types for ledger operations, including
//! connection errors, query errors, and row-count integrity violations.

use thiserror::Error;

/// Result type alias for database operations
pub type DbResult<T> = Result<T, DbError>;

/// Database-specific errors
#[derive(Debug, Error)]
pub enum DbError {
    /// Database connection error
    #[error("Database connection error: {0}")]
    Connection(String),

    /// Connection pool error
    #[error("Connection pool error: {0}")]
    Pool(String),

    /// SQL query error
    #[error("Query error: {0}")]
    Query(String),

    /// Transaction begin/commit/rollback error
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// A write touched a different number of rows than exactly one
    #[error("Integrity violation: {operation} for {subject:?} affected {affected} rows, expected 1")]
    UnexpectedRowCount {
        operation: &'static str,
        subject: String,
        affected: u64,
    },

    /// A name registered in this transaction could not be resolved again
    #[error("Integrity violation: asset {0:?} not resolvable right after registration")]
    UnresolvedAsset(String),

    /// Constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Foreign key violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidData(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal database error
    #[error("Internal database error: {0}")]
    Internal(String),

    /// Domain error from core crate
    #[error("Domain error: {0}")]
    Domain(#[from] dlstats_core::StatsError),
}

impl DbError {
    /// Check if this error breaks a registry or sample write invariant
    pub fn is_integrity_violation(&self) -> bool {
        matches!(
            self,
            DbError::UnexpectedRowCount { .. } | DbError::UnresolvedAsset(_)
        )
    }
}

/// Verify a single-row write, the invariant behind every insert in the ledger
pub(crate) fn expect_single_row(
    operation: &'static str,
    subject: &str,
    affected: u64,
) -> DbResult<()> {
    if affected == 1 {
        return Ok(());
    }
    Err(DbError::UnexpectedRowCount {
        operation,
        subject: subject.to_string(),
        affected,
    })
}

/// Convert SQLx database errors to our error type
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound("No rows returned".to_string()),

            sqlx::Error::Database(db_err) => {
                let code = db_err.code();
                let message = db_err.message();

                // PostgreSQL SQLSTATE codes first, then SQLite extended result codes
                match code.as_deref() {
                    Some("23505") | Some("2067") | Some("1555") => {
                        DbError::UniqueViolation(message.to_string())
                    }
                    Some("23503") | Some("787") => {
                        DbError::ForeignKeyViolation(message.to_string())
                    }
                    Some("23514") | Some("275") => {
                        DbError::ConstraintViolation(message.to_string())
                    }
                    Some("23000") | Some("23001") | Some("23502") | Some("1299") => {
                        DbError::ConstraintViolation(message.to_string())
                    }
                    _ => DbError::Query(message.to_string()),
                }
            }

            sqlx::Error::PoolTimedOut => DbError::Pool("Connection pool timeout".to_string()),

            sqlx::Error::PoolClosed => DbError::Pool("Connection pool closed".to_string()),

            sqlx::Error::Io(io_err) => DbError::Connection(format!("I/O error: {}", io_err)),

            sqlx::Error::Tls(tls_err) => DbError::Connection(format!("TLS error: {}", tls_err)),

            sqlx::Error::Protocol(msg) => DbError::Connection(format!("Protocol error: {}", msg)),

            sqlx::Error::ColumnNotFound(col) => {
                DbError::InvalidData(format!("Column not found: {}", col))
            }

            sqlx::Error::Decode(msg) => DbError::InvalidData(format!("Decode error: {}", msg)),

            _ => DbError::Internal(format!("{}", err)),
        }
    }
}

/// Convert URL parse errors
impl From<url::ParseError> for DbError {
    fn from(err: url::ParseError) -> Self {
        DbError::Configuration(format!("Invalid URL: {}", err))
    }
}
