//! Service layer for the download-count collector
//!
//! This crate sits between the collector binary and the database layer. It
//! fetches releases upstream and turns one fetch into one atomic ledger run.
//!
//! # Architecture
//!
//! - **ReleaseSource**: where releases come from (`GitHubReleaseSource` in production)
//! - **IngestionService**: precondition checks, continuous-release filtering and
//!   the all-or-nothing transaction around registration and sampling
//!
//! # Example
//!
//! ```rust,no_run
//! use dlstats_service::{
//!     DefaultIngestionService, GitHubConfig, GitHubReleaseSource, IngestionService,
//! };
//! use std::sync::Arc;
//!
//! # async fn example(ledger: Arc<dyn dlstats_db::DownloadLedger>) -> Result<(), Box<dyn std::error::Error>> {
//! let source = GitHubReleaseSource::new(GitHubConfig::new("sqlitebrowser", "sqlitebrowser"))?;
//! let service = DefaultIngestionService::new(Arc::new(source), ledger);
//!
//! let summary = service.run().await?;
//! println!("{} samples recorded", summary.samples_written);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod github;
pub mod ingestion;
pub mod source;

pub use error::{ErrorKind, ServiceError, ServiceResult, SourceError, SourceResult};
pub use github::{GitHubConfig, GitHubReleaseSource, DEFAULT_API_URL};
pub use ingestion::{DefaultIngestionService, IngestionService};
pub use source::{RateLimit, ReleasePage, ReleaseSource};

use dlstats_db::DownloadLedger;
use std::sync::Arc;

/// Wire a release source and a ledger into an ingestion service
pub fn ingestion_service(
    source: Arc<dyn ReleaseSource>,
    ledger: Arc<dyn DownloadLedger>,
) -> Arc<dyn IngestionService> {
    Arc::new(DefaultIngestionService::new(source, ledger))
}
