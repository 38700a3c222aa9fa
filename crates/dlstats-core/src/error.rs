//! Error types for domain validation

use thiserror::Error;

/// Result type alias for domain operations
pub type Result<T> = std::result::Result<T, StatsError>;

/// Domain validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    /// Asset names are the registry key and must not be blank
    #[error("Invalid asset name: {0:?}")]
    InvalidAssetName(String),

    /// Download count cannot be represented by the store
    #[error("Download count {count} for asset {asset} is out of range")]
    CountOutOfRange { asset: String, count: u64 },
}
