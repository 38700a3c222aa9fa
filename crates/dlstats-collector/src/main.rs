//! Release download-count collector
//!
//! Main entry point. Loads configuration, connects to PostgreSQL, fetches the
//! repository's releases and records one download-count sample per asset in a
//! single transaction. Intended to be run periodically (cron, systemd timer).

mod config;
mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use dlstats_db::{
    close_pool, create_pool, mask_password, DownloadLedger, PgPool, PoolConfig, PostgresLedger,
};
use dlstats_service::{ingestion_service, GitHubReleaseSource};
use secrecy::SecretString;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use config::{config_file_path, CollectorConfig};
use telemetry::TelemetryConfig;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (defaults to ~/.db4s/github_stats.toml)
    #[arg(short, long, env = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Database URL, overriding the [pg] section
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Log level
    #[arg(long)]
    log_level: Option<String>,

    /// Fetch and list the download counts without writing them
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let (config_path, explicit) = config_file_path(args.config)?;
    let mut config = CollectorConfig::load(&config_path, explicit)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;

    // Override with command-line arguments
    if let Some(database_url) = args.database_url {
        config.database.url = Some(SecretString::new(database_url));
    }
    if let Some(log_level) = args.log_level {
        config.logging.level = log_level;
    }

    telemetry::init_with_config(TelemetryConfig::from(&config.logging));

    config.validate()?;

    info!(
        "Collecting release downloads for {}/{}",
        config.github.owner, config.github.repo
    );

    let source = GitHubReleaseSource::new(config.github.source_config())
        .context("Failed to build GitHub client")?;

    let pool = setup_database(&config).await?;
    let ledger = Arc::new(PostgresLedger::new(pool.clone()));
    if args.dry_run {
        ledger
            .health_check()
            .await
            .context("Database health check failed")?;
    }
    let service = ingestion_service(Arc::new(source), ledger);

    let outcome = if args.dry_run {
        service.preview().await.map(|assets| {
            for asset in &assets {
                println!("Asset: {}, downloads: {}", asset.name, asset.download_count);
            }
            info!(assets = assets.len(), "Dry run complete, nothing written");
        })
    } else {
        service.run().await.map(|summary| {
            info!(
                recorded_at = %summary.recorded_at,
                releases = summary.releases_seen,
                skipped = summary.releases_skipped,
                new_assets = summary.assets_registered,
                samples = summary.samples_written,
                "Download counts updated"
            );
        })
    };

    close_pool(pool).await;

    if let Err(e) = &outcome {
        error!(kind = %e.kind(), "Run failed: {}", e);
    }
    outcome.context("Collection run failed")
}

/// Setup database connection pool
async fn setup_database(config: &CollectorConfig) -> Result<PgPool> {
    let database_url = config.database.connection_url()?;
    info!("Connecting to database {}", mask_password(&database_url));

    let pool_config = PoolConfig::new(database_url)
        .max_connections(config.database.num_connections)
        .connect_timeout(Duration::from_secs(config.database.connect_timeout_seconds))
        .enable_logging(config.logging.level.eq_ignore_ascii_case("trace"));

    let pool = create_pool(&pool_config)
        .await
        .context("Couldn't connect to PostgreSQL server")?;

    info!("Database connection established");
    Ok(pool)
}
