//! Core domain models for the download-count collector
//!
//! This crate holds the transient release data fetched from upstream, the
//! persisted identities and samples, and the run-wide timestamp shared by
//! every sample written in one ingestion run.

pub mod error;
pub mod release;
pub mod sample;
pub mod types;

// Re-exports for convenience
pub use error::{Result, StatsError};
pub use release::{qualifying_assets, Release, ReleaseAsset, CONTINUOUS_RELEASE};
pub use sample::{RunSummary, Sample};
pub use types::{storable_count, validate_asset_name, AssetId, RunTimestamp};
