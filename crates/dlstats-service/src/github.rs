//! GitHub releases API client
//!
//! Lists the releases of one repository, following `Link: rel="next"`
//! pagination, and reports the quota headers from the last page.

use async_trait::async_trait;
use dlstats_core::Release;
use reqwest::header::{HeaderMap, ACCEPT, LINK};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::{SourceError, SourceResult};
use crate::source::{RateLimit, ReleasePage, ReleaseSource};

/// Public GitHub REST endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// REST API version pinned in every request
pub const API_VERSION: &str = "2022-11-28";

/// Configuration for the GitHub release source.
///
/// # Example
///
/// ```
/// use dlstats_service::GitHubConfig;
/// use std::time::Duration;
///
/// let config = GitHubConfig::new("sqlitebrowser", "sqlitebrowser")
///     .with_per_page(50)
///     .with_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug)]
pub struct GitHubConfig {
    /// Base URL of the REST API
    pub api_url: String,
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Personal access token
    pub token: Option<SecretString>,
    /// Releases requested per page (GitHub caps this at 100)
    pub per_page: u8,
    /// Upper bound on pages followed
    pub max_pages: u32,
    /// Per-request timeout
    pub timeout: Duration,
    /// User agent; GitHub rejects requests without one
    pub user_agent: String,
}

impl GitHubConfig {
    /// Configuration for `owner/repo` with default settings
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            owner: owner.into(),
            repo: repo.into(),
            token: None,
            per_page: 100,
            max_pages: 10,
            timeout: Duration::from_secs(30),
            user_agent: concat!("dlstats-collector/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Point at a different API host (GitHub Enterprise, test servers)
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Authenticate with a personal access token
    #[must_use]
    pub fn with_token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }

    /// Set releases per page, clamped to 1..=100
    #[must_use]
    pub fn with_per_page(mut self, per_page: u8) -> Self {
        self.per_page = per_page.clamp(1, 100);
        self
    }

    /// Set the maximum number of pages to follow
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Set the request timeout.
    ///
    /// Defaults to 30 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// First page of the release listing
    pub fn releases_url(&self) -> SourceResult<Url> {
        let mut url = Url::parse(&format!(
            "{}/repos/{}/{}/releases",
            self.api_url.trim_end_matches('/'),
            self.owner,
            self.repo
        ))?;
        url.query_pairs_mut()
            .append_pair("per_page", &self.per_page.to_string())
            .append_pair("page", "1");
        Ok(url)
    }
}

/// Release source backed by the GitHub REST API
pub struct GitHubReleaseSource {
    client: reqwest::Client,
    config: GitHubConfig,
}

impl GitHubReleaseSource {
    /// Build the HTTP client for `config`
    pub fn new(config: GitHubConfig) -> SourceResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client, config })
    }

    async fn get(&self, url: &Url) -> SourceResult<reqwest::Response> {
        let mut request = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let rate_limit = RateLimit::from_headers(response.headers());
        if matches!(status, StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS)
            && rate_limit.is_exhausted()
        {
            return Err(SourceError::RateLimited {
                reset_at: rate_limit.reset_at,
            });
        }

        Err(SourceError::Api {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl ReleaseSource for GitHubReleaseSource {
    #[instrument(skip(self), fields(owner = %self.config.owner, repo = %self.config.repo))]
    async fn fetch_releases(&self) -> SourceResult<ReleasePage> {
        let mut releases = Vec::new();
        let mut rate_limit = RateLimit::default();
        let mut next = Some(self.config.releases_url()?);
        let mut pages = 0u32;

        while let Some(url) = next.take() {
            if pages == self.config.max_pages {
                warn!(max_pages = pages, "Stopping release pagination early");
                break;
            }
            pages += 1;

            debug!(%url, "Fetching release page");
            let response = self.get(&url).await?;
            rate_limit = RateLimit::from_headers(response.headers());
            next = next_page_url(response.headers())
                .map(|link| Url::parse(&link))
                .transpose()?;

            let body = response.text().await?;
            let batch: Vec<Release> = serde_json::from_str(&body)?;
            releases.extend(batch);
        }

        debug!(
            releases = releases.len(),
            pages,
            remaining = ?rate_limit.remaining,
            "Release listing complete"
        );

        Ok(ReleasePage {
            releases,
            rate_limit,
        })
    }
}

/// Extract the `rel="next"` target from a `Link` header
pub fn next_page_url(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        if !parts.any(|p| p.trim() == r#"rel="next""#) {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}
