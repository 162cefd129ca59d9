//! Synchronizes the user's GitHub stars into the local cache
//!
//! The sync pages through `/user/starred`, keeps only repos whose
//! latest stable release has an asset installable on this platform, and
//! replaces the local table wholesale in one transaction. There is no
//! incremental merge: a sync either lands completely or not at all.

use chrono::{DateTime, Duration, Utc};
use futures::stream::{self, StreamExt};

use crate::core::config::Config;
use crate::core::db::{Database, StarredRepo};
use crate::core::installer::Platform;
use crate::error::Result;
use crate::github::client::{GitHubClient, ACCEPT_STAR_JSON};
use crate::github::releases::ReleasesHandler;
use crate::github::types::StarredItem;

/// Stars fetched per page (the API maximum)
const STARS_PER_PAGE: u32 = 100;

/// Concurrent release checks while filtering
const CHECK_CONCURRENCY: usize = 25;

/// Whether the cache is stale enough to warrant a sync
pub fn needs_sync(db: &Database, staleness_hours: u64) -> Result<bool> {
    match db.starred_synced_at()? {
        None => Ok(true),
        Some(synced_at) => {
            let age = Utc::now() - synced_at;
            // Config::set bounds the value, but a hand-edited config can
            // still hold anything a u64 holds; an unrepresentable window
            // means the cache never goes stale.
            let window = i64::try_from(staleness_hours)
                .ok()
                .and_then(Duration::try_hours)
                .unwrap_or(Duration::MAX);
            Ok(age > window)
        }
    }
}

/// Run a starred sync.
///
/// Skipped (returning `None`) when the cache is fresh and `force` is
/// not set; otherwise returns the number of repos cached.
pub async fn sync(
    client: &GitHubClient,
    db: &mut Database,
    config: &Config,
    force: bool,
) -> Result<Option<usize>> {
    if !force && !needs_sync(db, config.sync_staleness_hours)? {
        tracing::debug!("starred cache is fresh, skipping sync");
        return Ok(None);
    }

    let starred = fetch_all_starred(client).await?;
    tracing::info!(total = starred.len(), "fetched starred repos");

    let rows = filter_installable(client, starred, Platform::current()).await;
    let count = rows.len();

    db.replace_starred(&rows)?;
    tracing::info!(kept = count, "starred cache replaced");

    Ok(Some(count))
}

/// Page through the authenticated user's stars until a short page
async fn fetch_all_starred(client: &GitHubClient) -> Result<Vec<StarredItem>> {
    let mut all = Vec::new();
    let mut page: u32 = 1;

    loop {
        let items: Vec<StarredItem> = client
            .get_json_with_accept(
                "/user/starred",
                &[
                    ("per_page", STARS_PER_PAGE.to_string()),
                    ("page", page.to_string()),
                ],
                ACCEPT_STAR_JSON,
            )
            .await?;

        let page_len = items.len();
        all.extend(items);

        if page_len < STARS_PER_PAGE as usize {
            return Ok(all);
        }
        page += 1;
    }
}

/// Check each starred repo's latest stable release and keep the ones
/// with something installable. Lookup failures drop the repo from this
/// sync rather than aborting it.
async fn filter_installable(
    client: &GitHubClient,
    items: Vec<StarredItem>,
    platform: Platform,
) -> Vec<StarredRepo> {
    let releases = ReleasesHandler::new(client);
    let now = Utc::now();

    stream::iter(items)
        .map(|item| {
            let releases = &releases;
            async move {
                let release = releases
                    .latest_installable(&item.repo.owner.login, &item.repo.name, platform)
                    .await
                    .ok()
                    .flatten()?;
                Some(to_row(item, Some(release.tag_name), now))
            }
        })
        .buffered(CHECK_CONCURRENCY)
        .filter_map(|row| async move { row })
        .collect()
        .await
}

fn to_row(item: StarredItem, latest_version: Option<String>, now: DateTime<Utc>) -> StarredRepo {
    let starred_at = item
        .starred_at
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    StarredRepo {
        repo_id: item.repo.id,
        repo_owner: item.repo.owner.login,
        repo_name: item.repo.name,
        owner_avatar_url: item.repo.owner.avatar_url,
        description: item.repo.description,
        language: item.repo.language,
        html_url: item.repo.html_url,
        stargazers_count: item.repo.stargazers_count,
        forks_count: item.repo.forks_count,
        open_issues_count: item.repo.open_issues_count,
        latest_version,
        starred_at,
        // replace_starred carries the previous added_at forward for
        // repos already in the cache
        added_at: now,
        last_synced_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::types::{Owner, Repo};
    use tempfile::tempdir;

    fn sample_item(starred_at: Option<&str>) -> StarredItem {
        StarredItem {
            starred_at: starred_at.map(String::from),
            repo: Repo {
                id: 1,
                name: "tool".to_string(),
                full_name: "dev/tool".to_string(),
                owner: Owner {
                    id: 2,
                    login: "dev".to_string(),
                    avatar_url: "https://example.com/a.png".to_string(),
                    html_url: "https://github.com/dev".to_string(),
                },
                description: None,
                html_url: "https://github.com/dev/tool".to_string(),
                stargazers_count: 10,
                forks_count: 1,
                open_issues_count: 0,
                language: None,
                topics: Vec::new(),
                updated_at: None,
                default_branch: None,
            },
        }
    }

    #[test]
    fn fresh_database_needs_sync() {
        let dir = tempdir().unwrap();
        let db = Database::open_path(&dir.path().join("t.sqlite")).unwrap();
        assert!(needs_sync(&db, 6).unwrap());
    }

    #[test]
    fn recent_sync_is_fresh() {
        let dir = tempdir().unwrap();
        let mut db = Database::open_path(&dir.path().join("t.sqlite")).unwrap();

        // A replace stamps the sync time even when nothing was kept
        db.replace_starred(&[]).unwrap();
        assert!(!needs_sync(&db, 6).unwrap());
        // Zero staleness means any past sync is stale
        assert!(needs_sync(&db, 0).unwrap());
    }

    #[test]
    fn absurd_staleness_window_never_goes_stale() {
        let dir = tempdir().unwrap();
        let mut db = Database::open_path(&dir.path().join("t.sqlite")).unwrap();
        db.replace_starred(&[]).unwrap();

        // Values beyond what chrono can represent must not panic
        assert!(!needs_sync(&db, u64::MAX).unwrap());
        assert!(!needs_sync(&db, 3_000_000_000_000_000).unwrap());
    }

    #[test]
    fn row_conversion_parses_star_timestamp() {
        let row = to_row(
            sample_item(Some("2023-06-01T12:00:00Z")),
            Some("v2.0.0".to_string()),
            Utc::now(),
        );
        assert_eq!(row.repo_owner, "dev");
        assert_eq!(row.latest_version.as_deref(), Some("v2.0.0"));
        assert_eq!(
            row.starred_at.unwrap().to_rfc3339(),
            "2023-06-01T12:00:00+00:00"
        );
    }

    #[test]
    fn unparseable_star_timestamp_becomes_none() {
        let row = to_row(sample_item(Some("garbage")), None, Utc::now());
        assert!(row.starred_at.is_none());
    }
}
