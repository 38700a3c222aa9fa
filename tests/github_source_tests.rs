//! GitHub Release Source Integration Tests
//!
//! Runs the GitHub client against a local mock of the releases endpoint.

mod common;

use common::fixtures::release_json;
use dlstats_db::SqliteLedger;
use dlstats_service::{
    DefaultIngestionService, ErrorKind, GitHubConfig, GitHubReleaseSource, IngestionService,
    ReleaseSource, ServiceError, SourceError,
};
use secrecy::SecretString;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RELEASES_PATH: &str = "/repos/sqlitebrowser/sqlitebrowser/releases";

fn source_for(server: &MockServer) -> GitHubReleaseSource {
    let config = GitHubConfig::new("sqlitebrowser", "sqlitebrowser")
        .with_api_url(server.uri())
        .with_token(SecretString::new("test-token".to_string()))
        .with_per_page(2)
        .with_timeout(Duration::from_secs(5));
    GitHubReleaseSource::new(config).expect("Failed to build client")
}

#[tokio::test]
async fn test_fetch_parses_releases_and_quota() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RELEASES_PATH))
        .and(query_param("per_page", "2"))
        .and(query_param("page", "1"))
        .and(header("authorization", "Bearer test-token"))
        .and(header("accept", "application/vnd.github+json"))
        .and(header("x-github-api-version", "2022-11-28"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-ratelimit-limit", "5000")
                .insert_header("x-ratelimit-remaining", "4998")
                .insert_header("x-ratelimit-reset", "1700000000")
                .set_body_json(json!([
                    release_json("v3.12.2", &[("DB.Browser.for.SQLite-3.12.2.dmg", 152301)]),
                    release_json("continuous", &[("nightly.AppImage", 999)]),
                ])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let page = source_for(&server).fetch_releases().await.unwrap();

    assert_eq!(page.releases.len(), 2);
    assert_eq!(page.releases[0].tag_name, "v3.12.2");
    assert_eq!(page.releases[0].assets[0].download_count, 152301);
    assert!(page.releases[1].is_continuous());
    assert_eq!(page.rate_limit.limit, Some(5000));
    assert_eq!(page.rate_limit.remaining, Some(4998));
    assert!(page.rate_limit.reset_at.is_some());
}

#[tokio::test]
async fn test_fetch_follows_next_links() {
    let server = MockServer::start().await;
    let next = format!("<{}{}?per_page=2&page=2>; rel=\"next\"", server.uri(), RELEASES_PATH);

    Mock::given(method("GET"))
        .and(path(RELEASES_PATH))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("link", next.as_str())
                .insert_header("x-ratelimit-remaining", "10")
                .set_body_json(json!([
                    release_json("v3", &[("c.exe", 3)]),
                    release_json("v2", &[("b.exe", 2)]),
                ])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(RELEASES_PATH))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-ratelimit-remaining", "9")
                .set_body_json(json!([release_json("v1", &[("a.exe", 1)])])),
        )
        .mount(&server)
        .await;

    let page = source_for(&server).fetch_releases().await.unwrap();

    let tags: Vec<_> = page.releases.iter().map(|r| r.tag_name.as_str()).collect();
    assert_eq!(tags, vec!["v3", "v2", "v1"]);
    assert_eq!(page.rate_limit.remaining, Some(9));
}

#[tokio::test]
async fn test_fetch_stops_at_page_limit() {
    let server = MockServer::start().await;
    let next = format!("<{}{}?per_page=2&page=2>; rel=\"next\"", server.uri(), RELEASES_PATH);

    Mock::given(method("GET"))
        .and(path(RELEASES_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("link", next.as_str())
                .set_body_json(json!([release_json("v1", &[("a.exe", 1)])])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = GitHubConfig::new("sqlitebrowser", "sqlitebrowser")
        .with_api_url(server.uri())
        .with_max_pages(1);
    let source = GitHubReleaseSource::new(config).unwrap();

    let page = source.fetch_releases().await.unwrap();
    assert_eq!(page.releases.len(), 1);
}

#[tokio::test]
async fn test_forbidden_with_no_quota_is_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RELEASES_PATH))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("x-ratelimit-remaining", "0")
                .insert_header("x-ratelimit-reset", "1700000000")
                .set_body_json(json!({ "message": "API rate limit exceeded" })),
        )
        .mount(&server)
        .await;

    let err = source_for(&server).fetch_releases().await.unwrap_err();
    match err {
        SourceError::RateLimited { reset_at } => {
            assert_eq!(reset_at.map(|t| t.timestamp()), Some(1_700_000_000));
        }
        other => panic!("expected rate limit error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_forbidden_with_quota_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RELEASES_PATH))
        .respond_with(ResponseTemplate::new(403).insert_header("x-ratelimit-remaining", "42"))
        .mount(&server)
        .await;

    let err = source_for(&server).fetch_releases().await.unwrap_err();
    assert!(matches!(err, SourceError::Api { status: 403, .. }));
}

#[tokio::test]
async fn test_server_error_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RELEASES_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = source_for(&server).fetch_releases().await.unwrap_err();
    match err {
        SourceError::Api { status, url } => {
            assert_eq!(status, 500);
            assert!(url.contains(RELEASES_PATH));
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RELEASES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"not\": \"a list\"}"))
        .mount(&server)
        .await;

    let err = source_for(&server).fetch_releases().await.unwrap_err();
    assert!(matches!(err, SourceError::JsonParse(_)));
}

#[tokio::test]
async fn test_run_against_github_records_downloads() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RELEASES_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-ratelimit-remaining", "4999")
                .set_body_json(json!([
                    release_json("v1", &[("a.exe", 10)]),
                    release_json("continuous", &[("b.exe", 999)]),
                ])),
        )
        .mount(&server)
        .await;

    let ledger = SqliteLedger::in_memory().await.unwrap();
    let service =
        DefaultIngestionService::new(Arc::new(source_for(&server)), Arc::new(ledger.clone()));

    let summary = service.run().await.unwrap();
    assert_eq!(summary.samples_written, 1);

    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT a.name, s.download_count FROM download_samples s JOIN release_assets a ON a.id = s.asset_id",
    )
    .fetch_all(ledger.pool())
    .await
    .unwrap();
    assert_eq!(rows, vec![("a.exe".to_string(), 10)]);
}

#[tokio::test]
async fn test_run_with_exhausted_quota_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RELEASES_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-ratelimit-remaining", "0")
                .set_body_json(json!([release_json("v1", &[("a.exe", 10)])])),
        )
        .mount(&server)
        .await;

    let ledger = SqliteLedger::in_memory().await.unwrap();
    let service =
        DefaultIngestionService::new(Arc::new(source_for(&server)), Arc::new(ledger.clone()));

    let err = service.run().await.unwrap_err();
    assert!(matches!(err, ServiceError::RateLimitExhausted { .. }));
    assert_eq!(err.kind(), ErrorKind::Precondition);

    let assets: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM release_assets")
        .fetch_one(ledger.pool())
        .await
        .unwrap();
    assert_eq!(assets, 0);
}
