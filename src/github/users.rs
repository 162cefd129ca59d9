//! Developer profiles and their repositories

use crate::error::Result;
use crate::github::client::GitHubClient;
use crate::github::types::{Paginated, Repo, UserProfile};

const REPOS_PER_PAGE: u32 = 30;

/// Users API handler
pub struct UsersHandler<'a> {
    client: &'a GitHubClient,
}

impl<'a> UsersHandler<'a> {
    pub fn new(client: &'a GitHubClient) -> Self {
        Self { client }
    }

    /// Public profile for a login
    pub async fn profile(&self, login: &str) -> Result<UserProfile> {
        self.client
            .get_json(&format!("/users/{login}"), &[])
            .await
    }

    /// A developer's repositories, most recently updated first
    pub async fn repos(&self, login: &str, page: u32) -> Result<Paginated<Repo>> {
        let items: Vec<Repo> = self
            .client
            .get_json(
                &format!("/users/{login}/repos"),
                &[
                    ("sort", "updated".to_string()),
                    ("per_page", REPOS_PER_PAGE.to_string()),
                    ("page", page.to_string()),
                ],
            )
            .await?;

        let has_more = items.len() as u32 == REPOS_PER_PAGE;
        Ok(Paginated {
            items,
            has_more,
            next_page: page + 1,
            total_count: None,
        })
    }

    /// The authenticated user's profile
    pub async fn authenticated(&self) -> Result<UserProfile> {
        self.client.get_json("/user", &[]).await
    }
}
