//! Ingestion service
//!
//! This module orchestrates one collection run: fetch the releases, check the
//! preconditions, then register every qualifying asset and append its sample
//! inside a single ledger transaction stamped with one shared timestamp.

use async_trait::async_trait;
use dlstats_core::{qualifying_assets, Release, ReleaseAsset, RunSummary, RunTimestamp, Sample};
use dlstats_db::{append_sample, ensure_registered, DbResult, DownloadLedger, LedgerTransaction};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::error::{ServiceError, ServiceResult};
use crate::source::ReleaseSource;

/// Trait for download-count collection runs
#[async_trait]
pub trait IngestionService: Send + Sync {
    /// Fetch the current releases and record one sample per qualifying asset
    async fn run(&self) -> ServiceResult<RunSummary>;

    /// Record already-fetched releases, stamped with the current time
    async fn record(&self, releases: &[Release]) -> ServiceResult<RunSummary>;

    /// Record already-fetched releases with an explicit run timestamp
    async fn record_at(
        &self,
        releases: &[Release],
        recorded_at: RunTimestamp,
    ) -> ServiceResult<RunSummary>;

    /// Fetch and list what a run would record, without touching the ledger
    async fn preview(&self) -> ServiceResult<Vec<ReleaseAsset>>;
}

/// Default implementation of IngestionService
pub struct DefaultIngestionService {
    source: Arc<dyn ReleaseSource>,
    ledger: Arc<dyn DownloadLedger>,
}

impl DefaultIngestionService {
    /// Create a new ingestion service
    pub fn new(source: Arc<dyn ReleaseSource>, ledger: Arc<dyn DownloadLedger>) -> Self {
        Self { source, ledger }
    }

    /// Fetch releases and reject runs that have nothing to record
    async fn fetch_checked(&self) -> ServiceResult<Vec<Release>> {
        let page = self.source.fetch_releases().await?;

        if page.rate_limit.is_exhausted() {
            warn!(reset_at = ?page.rate_limit.reset_at, "Release API quota exhausted");
            return Err(ServiceError::RateLimitExhausted {
                reset_at: page.rate_limit.reset_at,
            });
        }

        if page.releases.is_empty() {
            warn!("Upstream returned no releases");
            return Err(ServiceError::NoReleases);
        }

        info!(
            releases = page.releases.len(),
            remaining = ?page.rate_limit.remaining,
            "Fetched releases"
        );
        Ok(page.releases)
    }
}

#[async_trait]
impl IngestionService for DefaultIngestionService {
    #[instrument(skip(self))]
    async fn run(&self) -> ServiceResult<RunSummary> {
        let releases = self.fetch_checked().await?;
        self.record(&releases).await
    }

    async fn record(&self, releases: &[Release]) -> ServiceResult<RunSummary> {
        self.record_at(releases, RunTimestamp::now()).await
    }

    #[instrument(skip(self, releases), fields(releases = releases.len(), recorded_at = %recorded_at))]
    async fn record_at(
        &self,
        releases: &[Release],
        recorded_at: RunTimestamp,
    ) -> ServiceResult<RunSummary> {
        let mut tx = self.ledger.begin().await?;

        match record_releases(tx.as_mut(), releases, recorded_at).await {
            Ok(summary) => {
                tx.commit().await?;
                info!(
                    assets_registered = summary.assets_registered,
                    samples_written = summary.samples_written,
                    releases_skipped = summary.releases_skipped,
                    "Run committed"
                );
                Ok(summary)
            }
            Err(e) => {
                warn!(error = %e, "Run failed, rolling back");
                if let Err(rollback_err) = tx.rollback().await {
                    warn!("Rollback failed: {}", rollback_err);
                }
                Err(e.into())
            }
        }
    }

    #[instrument(skip(self))]
    async fn preview(&self) -> ServiceResult<Vec<ReleaseAsset>> {
        let releases = self.fetch_checked().await?;
        Ok(qualifying_assets(&releases).cloned().collect())
    }
}

/// Register and sample every asset of every non-continuous release
async fn record_releases(
    tx: &mut dyn LedgerTransaction,
    releases: &[Release],
    recorded_at: RunTimestamp,
) -> DbResult<RunSummary> {
    let mut summary = RunSummary::new(recorded_at);
    summary.releases_seen = releases.len();

    for release in releases {
        if release.is_continuous() {
            debug!(release = release.label(), "Skipping continuous release");
            summary.releases_skipped += 1;
            continue;
        }

        for asset in &release.assets {
            let registration = ensure_registered(&mut *tx, &asset.name).await?;
            if registration.newly_registered {
                summary.assets_registered += 1;
            }

            append_sample(&mut *tx, &Sample::observe(asset, recorded_at)).await?;
            summary.samples_written += 1;
        }
    }

    Ok(summary)
}
