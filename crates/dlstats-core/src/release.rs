//! Release data fetched from the upstream hosting API
//!
//! Releases are transient: they exist only for the duration of a run and are
//! never persisted themselves. Only their assets' names and counts are stored.

use serde::{Deserialize, Serialize};

/// Tag and name of the continuously rebuilt pre-release channel
///
/// Upstream automation replaces its assets on every push to the main branch, so
/// its counters reset constantly and say nothing about historical downloads.
pub const CONTINUOUS_RELEASE: &str = "continuous";

/// A single downloadable artifact attached to a release
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReleaseAsset {
    /// Artifact filename, the registry key
    pub name: String,

    /// Cumulative download count reported upstream
    pub download_count: u64,
}

impl ReleaseAsset {
    /// Create a new release asset
    pub fn new(name: impl Into<String>, download_count: u64) -> Self {
        Self {
            name: name.into(),
            download_count,
        }
    }
}

/// A tagged collection of assets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Git tag the release was cut from
    pub tag_name: String,

    /// Display name, when upstream has one
    #[serde(default)]
    pub name: Option<String>,

    /// Whether the release is a draft
    #[serde(default)]
    pub draft: bool,

    /// Whether the release is marked as a pre-release
    #[serde(default)]
    pub prerelease: bool,

    /// Attached assets with their current counts
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

impl Release {
    /// Create a release whose display name equals its tag
    pub fn new(tag_name: impl Into<String>, assets: Vec<ReleaseAsset>) -> Self {
        let tag_name = tag_name.into();
        Self {
            name: Some(tag_name.clone()),
            tag_name,
            draft: false,
            prerelease: false,
            assets,
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name used in logs: the display name if present, otherwise the tag
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.tag_name)
    }

    /// Whether this is the continuously rebuilt channel
    pub fn is_continuous(&self) -> bool {
        self.tag_name == CONTINUOUS_RELEASE || self.name.as_deref() == Some(CONTINUOUS_RELEASE)
    }
}

/// Iterate over every asset that should be sampled, in upstream order
pub fn qualifying_assets(releases: &[Release]) -> impl Iterator<Item = &ReleaseAsset> {
    releases
        .iter()
        .filter(|release| !release.is_continuous())
        .flat_map(|release| release.assets.iter())
}
