//! Download-count samples and run outcomes

use serde::{Deserialize, Serialize};

use crate::release::ReleaseAsset;
use crate::types::RunTimestamp;

/// One observation: asset X had N cumulative downloads as of T
///
/// The asset is referenced by its registry name; the store resolves the
/// surrogate identifier when the sample is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub asset_name: String,
    pub recorded_at: RunTimestamp,
    pub download_count: u64,
}

impl Sample {
    /// Observe a release asset at the run timestamp
    pub fn observe(asset: &ReleaseAsset, recorded_at: RunTimestamp) -> Self {
        Self {
            asset_name: asset.name.clone(),
            recorded_at,
            download_count: asset.download_count,
        }
    }
}

/// Outcome of a committed ingestion run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Timestamp carried by every sample of the run
    pub recorded_at: RunTimestamp,

    /// Releases returned upstream
    pub releases_seen: usize,

    /// Releases excluded as the continuous channel
    pub releases_skipped: usize,

    /// Asset names registered for the first time
    pub assets_registered: usize,

    /// Sample rows written
    pub samples_written: usize,
}

impl RunSummary {
    /// Start an empty summary for a run at `recorded_at`
    pub fn new(recorded_at: RunTimestamp) -> Self {
        Self {
            recorded_at,
            releases_seen: 0,
            releases_skipped: 0,
            assets_registered: 0,
            samples_written: 0,
        }
    }
}
