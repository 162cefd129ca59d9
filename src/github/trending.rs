//! Home feed: recently active popular repos with installable releases
//!
//! Candidates come from one search query (popular repos pushed within
//! the last week, sorted by stars); each candidate's latest stable
//! release is then checked for a platform-installable asset with
//! bounded concurrency. Repos without one never reach the feed.

use chrono::{Duration, Utc};
use futures::stream::{self, StreamExt};

use crate::core::installer::Platform;
use crate::error::Result;
use crate::github::client::GitHubClient;
use crate::github::releases::ReleasesHandler;
use crate::github::types::{Paginated, Repo, SearchResponse};

/// Candidates fetched per search page. Generous because the installable
/// filter discards most of them.
const CANDIDATES_PER_PAGE: u32 = 100;

/// Concurrent release checks in flight
const CHECK_CONCURRENCY: usize = 25;

/// Trending feed handler
pub struct TrendingHandler<'a> {
    client: &'a GitHubClient,
}

impl<'a> TrendingHandler<'a> {
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// One page of trending repos that have something to install
    pub async fn trending(&self, platform: Platform, page: u32) -> Result<Paginated<Repo>> {
        let one_week_ago = (Utc::now() - Duration::days(7)).format("%Y-%m-%d");
        let query = format!("stars:>500 archived:false pushed:>={one_week_ago}");

        let response: SearchResponse = self
            .client
            .get_json(
                "/search/repositories",
                &[
                    ("q", query),
                    ("sort", "stars".to_string()),
                    ("order", "desc".to_string()),
                    ("per_page", CANDIDATES_PER_PAGE.to_string()),
                    ("page", page.to_string()),
                ],
            )
            .await?;

        let has_more = (page as u64 * CANDIDATES_PER_PAGE as u64)
            < response.total_count as u64
            && !response.items.is_empty();

        let items = self.filter_installable(response.items, platform).await;
        tracing::debug!(page, kept = items.len(), "trending feed filtered");

        Ok(Paginated {
            items,
            has_more,
            next_page: page + 1,
            total_count: None,
        })
    }

    /// Keep only repos whose latest stable release carries an asset
    /// installable on `platform`, preserving the incoming (stars) order.
    ///
    /// A repo whose release lookup fails is skipped rather than failing
    /// the whole feed; one flaky repo should not blank the home screen.
    async fn filter_installable(&self, repos: Vec<Repo>, platform: Platform) -> Vec<Repo> {
        let releases = ReleasesHandler::new(self.client);

        let checks = stream::iter(repos)
            .map(|repo| {
                let releases = &releases;
                async move {
                    let installable = releases
                        .latest_installable(&repo.owner.login, &repo.name, platform)
                        .await
                        .ok()
                        .flatten()
                        .is_some();
                    (repo, installable)
                }
            })
            .buffered(CHECK_CONCURRENCY)
            .collect::<Vec<_>>()
            .await;

        checks
            .into_iter()
            .filter_map(|(repo, installable)| installable.then_some(repo))
            .collect()
    }
}
