//! Service-layer error types
//!
//! This module defines the errors a run can end with, mapping fetcher and
//! database errors onto the three run outcomes an operator cares about.

use chrono::{DateTime, Utc};
use dlstats_db::DbError;
use std::fmt;
use thiserror::Error;

/// Result type alias for release fetching
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Result type alias for service operations
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Errors raised while fetching releases upstream
#[derive(Debug, Error)]
pub enum SourceError {
    /// API request failed with an HTTP error status
    #[error("Release API request failed with status {status}: {url}")]
    Api {
        /// HTTP status code
        status: u16,
        /// The URL that was requested
        url: String,
    },

    /// The API refused the request because the quota is used up
    #[error("Release API rate limit exhausted")]
    RateLimited {
        /// When the quota resets, if the API said so
        reset_at: Option<DateTime<Utc>>,
    },

    /// Network or HTTP client error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON parsing error
    #[error("Invalid response from release API: {0}")]
    JsonParse(#[from] serde_json::Error),
}

/// Broad classification of why a run failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Nothing was fetched that could be recorded; no transaction was opened
    Precondition,
    /// A write did not behave as exactly one row, or the data was unstorable
    Integrity,
    /// Connection, query or commit failure
    Storage,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Precondition => write!(f, "precondition"),
            Self::Integrity => write!(f, "integrity"),
            Self::Storage => write!(f, "storage"),
        }
    }
}

/// Terminal errors of an ingestion run
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The release fetch itself failed
    #[error("Failed to fetch releases: {0}")]
    Fetch(#[from] SourceError),

    /// The fetch succeeded but left no API quota
    #[error("Release API rate limit exhausted")]
    RateLimitExhausted { reset_at: Option<DateTime<Utc>> },

    /// Upstream returned an empty release list
    #[error("No releases returned upstream")]
    NoReleases,

    /// Registry or sample write broke an integrity invariant
    #[error("{0}")]
    Integrity(DbError),

    /// Database failure
    #[error("Storage failure: {0}")]
    Storage(DbError),
}

impl ServiceError {
    /// Classify the failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Fetch(_) | Self::RateLimitExhausted { .. } | Self::NoReleases => {
                ErrorKind::Precondition
            }
            Self::Integrity(_) => ErrorKind::Integrity,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UnexpectedRowCount { .. }
            | DbError::UnresolvedAsset(_)
            | DbError::Domain(_)
            | DbError::InvalidData(_) => ServiceError::Integrity(err),
            other => ServiceError::Storage(other),
        }
    }
}
