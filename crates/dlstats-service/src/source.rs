//! Release source abstraction
//!
//! The ingestion service only needs "the current releases, and how much API
//! quota is left". Anything that can answer that implements [`ReleaseSource`].

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use dlstats_core::Release;
use reqwest::header::HeaderMap;

use crate::error::SourceResult;

/// API quota state reported alongside a fetch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimit {
    /// Requests allowed per window
    pub limit: Option<u32>,
    /// Requests left in the current window
    pub remaining: Option<u32>,
    /// When the window resets
    pub reset_at: Option<DateTime<Utc>>,
}

impl RateLimit {
    /// Quota with a known remaining count
    pub fn remaining(remaining: u32) -> Self {
        Self {
            remaining: Some(remaining),
            ..Default::default()
        }
    }

    /// Read the `x-ratelimit-*` headers; missing or malformed headers stay unknown
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let number = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<i64>().ok())
        };

        Self {
            limit: number("x-ratelimit-limit").and_then(|v| u32::try_from(v).ok()),
            remaining: number("x-ratelimit-remaining").and_then(|v| u32::try_from(v).ok()),
            reset_at: number("x-ratelimit-reset").and_then(|v| Utc.timestamp_opt(v, 0).single()),
        }
    }

    /// Whether the quota is known to be used up
    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }
}

/// Result of one release listing
#[derive(Debug, Clone, PartialEq)]
pub struct ReleasePage {
    /// Releases in upstream order
    pub releases: Vec<Release>,
    /// Quota state after the listing
    pub rate_limit: RateLimit,
}

/// Upstream provider of releases and their download counts
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Fetch the current releases together with the remaining API quota
    async fn fetch_releases(&self) -> SourceResult<ReleasePage>;
}
