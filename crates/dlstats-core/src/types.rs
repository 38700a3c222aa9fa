//! Core type definitions

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, StatsError};

/// Surrogate identifier assigned to an asset name at first registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(i64);

impl AssetId {
    /// Wrap a database-assigned identifier
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw identifier
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AssetId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.parse::<i64>()
            .map(Self)
            .map_err(|e| format!("Invalid AssetId: {}", e))
    }
}

impl From<i64> for AssetId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// The single timestamp shared by every sample of one ingestion run
///
/// Captured once at the start of the run, in UTC, truncated to microseconds so
/// the value survives a round trip through `timestamptz` unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunTimestamp(DateTime<Utc>);

impl RunTimestamp {
    /// Capture the current time
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Use an explicit point in time (truncated to microseconds)
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self(at.trunc_subsecs(6))
    }

    /// Get the underlying datetime
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }
}

impl fmt::Display for RunTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for RunTimestamp {
    fn from(at: DateTime<Utc>) -> Self {
        Self::from_datetime(at)
    }
}

/// Reject blank asset names
pub fn validate_asset_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(StatsError::InvalidAssetName(name.to_string()));
    }
    Ok(())
}

/// Convert an upstream download count to the store's signed 64-bit column
pub fn storable_count(asset: &str, count: u64) -> Result<i64> {
    i64::try_from(count).map_err(|_| StatsError::CountOutOfRange {
        asset: asset.to_string(),
        count,
    })
}
