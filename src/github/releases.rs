//! Release lookup and installable-asset checks

use crate::core::installer::Platform;
use crate::error::Result;
use crate::github::client::GitHubClient;
use crate::github::types::{Asset, Release};

/// How many releases to scan when looking for the latest stable one.
/// Projects that cut frequent prereleases still surface their last
/// stable release within this window.
const RELEASE_SCAN_DEPTH: u32 = 10;

/// Whether a release carries at least one asset installable on `platform`
pub fn has_installable_asset(release: &Release, platform: Platform) -> bool {
    release
        .assets
        .iter()
        .any(|asset| platform.is_installable(&asset.name))
}

/// Release API handler
pub struct ReleasesHandler<'a> {
    client: &'a GitHubClient,
}

impl<'a> ReleasesHandler<'a> {
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// The most recent published release that is neither a draft nor a
    /// prerelease, or `None` if the repo has no stable release
    pub async fn latest_stable(&self, owner: &str, repo: &str) -> Result<Option<Release>> {
        let releases: Vec<Release> = self
            .client
            .get_json(
                &format!("/repos/{owner}/{repo}/releases"),
                &[("per_page", RELEASE_SCAN_DEPTH.to_string())],
            )
            .await?;

        Ok(releases.into_iter().find(Release::is_stable))
    }

    /// Recent releases including drafts and prereleases
    pub async fn list(&self, owner: &str, repo: &str, limit: u32) -> Result<Vec<Release>> {
        self.client
            .get_json(
                &format!("/repos/{owner}/{repo}/releases"),
                &[("per_page", limit.to_string())],
            )
            .await
    }

    /// Latest stable release if it has an asset installable on `platform`
    pub async fn latest_installable(
        &self,
        owner: &str,
        repo: &str,
        platform: Platform,
    ) -> Result<Option<Release>> {
        Ok(self
            .latest_stable(owner, repo)
            .await?
            .filter(|release| has_installable_asset(release, platform)))
    }
}
