//! Test fixtures
//!
//! Release listings shaped like the sqlitebrowser repository's.

use dlstats_core::{Release, ReleaseAsset};
use serde_json::{json, Value};

/// A stable release with the usual platform builds
pub fn stable_release() -> Release {
    Release::new(
        "v3.12.2",
        vec![
            ReleaseAsset::new("DB.Browser.for.SQLite-3.12.2.dmg", 152_301),
            ReleaseAsset::new("DB.Browser.for.SQLite-3.12.2-win32.msi", 48_112),
            ReleaseAsset::new("DB.Browser.for.SQLite-3.12.2-win64.msi", 201_877),
        ],
    )
    .with_name("3.12.2")
}

/// The rolling nightly release
pub fn continuous_release() -> Release {
    Release::new(
        "continuous",
        vec![
            ReleaseAsset::new("DB.Browser.for.SQLite-nightly.AppImage", 999),
            ReleaseAsset::new("DB.Browser.for.SQLite-nightly-win64.msi", 512),
        ],
    )
}

/// GitHub API JSON for one release
pub fn release_json(tag: &str, assets: &[(&str, u64)]) -> Value {
    json!({
        "url": format!("https://api.github.com/repos/sqlitebrowser/sqlitebrowser/releases/{}", tag),
        "tag_name": tag,
        "name": tag,
        "draft": false,
        "prerelease": false,
        "created_at": "2020-06-15T10:00:00Z",
        "assets": assets
            .iter()
            .map(|(name, count)| json!({
                "name": name,
                "content_type": "application/octet-stream",
                "size": 1024,
                "download_count": count,
            }))
            .collect::<Vec<_>>(),
    })
}
