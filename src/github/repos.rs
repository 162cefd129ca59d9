//! Single-repo lookup and starring

use reqwest::StatusCode;

use crate::error::{Result, StoreError};
use crate::github::client::{GitHubClient, ACCEPT_JSON};
use crate::github::types::Repo;

/// Repository API handler
pub struct RepoHandler<'a> {
    client: &'a GitHubClient,
}

impl<'a> RepoHandler<'a> {
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Fetch a repo by its `owner/repo` coordinates
    pub async fn get(&self, owner: &str, repo: &str) -> Result<Repo> {
        match self
            .client
            .get_json(&format!("/repos/{owner}/{repo}"), &[])
            .await
        {
            Err(StoreError::NotFound(_)) => {
                Err(StoreError::NotFound(format!("{owner}/{repo}")))
            }
            other => other,
        }
    }

    /// Star a repo as the authenticated user
    pub async fn star(&self, owner: &str, repo: &str) -> Result<()> {
        self.client
            .put_empty(&format!("/user/starred/{owner}/{repo}"))
            .await
    }

    /// Remove the authenticated user's star
    pub async fn unstar(&self, owner: &str, repo: &str) -> Result<()> {
        self.client
            .delete(&format!("/user/starred/{owner}/{repo}"))
            .await
    }

    /// Whether the authenticated user has starred the repo.
    /// The endpoint answers 204 when starred and 404 when not.
    pub async fn is_starred(&self, owner: &str, repo: &str) -> Result<bool> {
        let probe = self
            .client
            .get_raw(&format!("/user/starred/{owner}/{repo}"), &[], ACCEPT_JSON)
            .await
            .map(|response| response.status());
        interpret_star_probe(probe)
    }
}

/// Map the star-probe outcome: any success means starred, 404 means not
fn interpret_star_probe(probe: Result<StatusCode>) -> Result<bool> {
    match probe {
        Ok(_) => Ok(true),
        Err(StoreError::NotFound(_)) => Ok(false),
        Err(e) => Err(e),
    }
}
