//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests: an in-memory
//! ledger, a canned release source and queries for inspecting what a run wrote.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dlstats_core::Release;
use dlstats_db::SqliteLedger;
use dlstats_service::{
    DefaultIngestionService, RateLimit, ReleasePage, ReleaseSource, SourceResult,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub mod fixtures;

/// Release source that always answers with the same listing
pub struct StaticReleaseSource {
    releases: Vec<Release>,
    rate_limit: RateLimit,
    calls: AtomicUsize,
}

impl StaticReleaseSource {
    /// Source with plenty of quota left
    pub fn new(releases: Vec<Release>) -> Self {
        Self::with_remaining(releases, 4999)
    }

    /// Source reporting `remaining` requests left
    pub fn with_remaining(releases: Vec<Release>, remaining: u32) -> Self {
        Self {
            releases,
            rate_limit: RateLimit::remaining(remaining),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of fetches served
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReleaseSource for StaticReleaseSource {
    async fn fetch_releases(&self) -> SourceResult<ReleasePage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ReleasePage {
            releases: self.releases.clone(),
            rate_limit: self.rate_limit,
        })
    }
}

/// Test harness: an empty in-memory ledger plus a service wired to it
pub struct TestHarness {
    pub ledger: SqliteLedger,
    pub source: Arc<StaticReleaseSource>,
    pub service: DefaultIngestionService,
}

impl TestHarness {
    /// Harness whose source serves `releases`
    pub async fn new(releases: Vec<Release>) -> Self {
        Self::with_source(StaticReleaseSource::new(releases)).await
    }

    /// Harness around a custom source
    pub async fn with_source(source: StaticReleaseSource) -> Self {
        let ledger = SqliteLedger::in_memory()
            .await
            .expect("Failed to open in-memory ledger");
        let source = Arc::new(source);
        let service = DefaultIngestionService::new(source.clone(), Arc::new(ledger.clone()));

        Self {
            ledger,
            source,
            service,
        }
    }

    /// Row count of `table`
    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(self.ledger.pool())
            .await
            .expect("Failed to count rows")
    }

    /// Registered identifier for `name`
    pub async fn asset_id(&self, name: &str) -> Option<i64> {
        sqlx::query_scalar("SELECT id FROM release_assets WHERE name = ?")
            .bind(name)
            .fetch_optional(self.ledger.pool())
            .await
            .expect("Failed to look up asset")
    }

    /// Every sample as (asset name, recorded_at, count), oldest first
    pub async fn samples(&self) -> Vec<(String, DateTime<Utc>, i64)> {
        sqlx::query_as(
            r#"
            SELECT a.name, s.recorded_at, s.download_count
            FROM download_samples s
            JOIN release_assets a ON a.id = s.asset_id
            ORDER BY s.rowid
            "#,
        )
        .fetch_all(self.ledger.pool())
        .await
        .expect("Failed to read samples")
    }

    /// Make every sample insert for `name` fail
    pub async fn fail_samples_for(&self, name: &str) {
        let sql = format!(
            r#"
            CREATE TRIGGER fail_sample_insert
            BEFORE INSERT ON download_samples
            WHEN NEW.asset_id = (SELECT id FROM release_assets WHERE name = '{}')
            BEGIN
                SELECT RAISE(ABORT, 'injected sample failure');
            END
            "#,
            name.replace('\'', "''")
        );
        sqlx::query(&sql)
            .execute(self.ledger.pool())
            .await
            .expect("Failed to install failure trigger");
    }
}
