//! Wire types for the GitHub REST API (v2022-11-28)

use serde::Deserialize;

/// Repository owner as embedded in repo payloads
#[derive(Debug, Clone, Deserialize)]
pub struct Owner {
    pub id: u64,
    pub login: String,
    pub avatar_url: String,
    pub html_url: String,
}

/// Repository summary as returned by search, listing, and lookup endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct Repo {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub owner: Owner,
    pub description: Option<String>,
    pub html_url: String,
    pub stargazers_count: u32,
    pub forks_count: u32,
    #[serde(default)]
    pub open_issues_count: u32,
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    pub updated_at: Option<String>,
    pub default_branch: Option<String>,
}

/// Response envelope for `/search/repositories`
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub total_count: u32,
    pub items: Vec<Repo>,
}

/// A GitHub release
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub tag_name: String,
    pub name: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
    pub published_at: Option<String>,
    pub html_url: String,
    pub body: Option<String>,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl Release {
    /// Published, stable release (not a draft, not a prerelease)
    pub fn is_stable(&self) -> bool {
        !self.draft && !self.prerelease
    }
}

/// A downloadable artifact attached to a release
#[derive(Debug, Clone, Deserialize)]
pub struct Asset {
    pub name: String,
    pub browser_download_url: String,
    pub size: u64,
    #[serde(default)]
    pub download_count: u64,
    pub content_type: Option<String>,
}

/// Entry from `/user/starred` with the star timestamp
///
/// Requires `Accept: application/vnd.github.star+json`; the plain media
/// type returns bare repos without `starred_at`.
#[derive(Debug, Clone, Deserialize)]
pub struct StarredItem {
    pub starred_at: Option<String>,
    pub repo: Repo,
}

/// Developer profile from `/users/{login}`
#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: String,
    pub html_url: String,
    pub bio: Option<String>,
    pub company: Option<String>,
    pub blog: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub public_repos: u32,
    #[serde(default)]
    pub followers: u32,
    #[serde(default)]
    pub following: u32,
    pub created_at: Option<String>,
}

/// A page of results plus the cursor state the UI needs
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub has_more: bool,
    pub next_page: u32,
    pub total_count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_search_response() {
        let json = r#"{
            "total_count": 1,
            "items": [{
                "id": 42,
                "name": "hello",
                "full_name": "octocat/hello",
                "owner": {
                    "id": 1,
                    "login": "octocat",
                    "avatar_url": "https://example.com/a.png",
                    "html_url": "https://github.com/octocat"
                },
                "description": null,
                "html_url": "https://github.com/octocat/hello",
                "stargazers_count": 1200,
                "forks_count": 9,
                "language": "Rust",
                "updated_at": "2024-01-01T00:00:00Z",
                "default_branch": "main"
            }]
        }"#;

        let resp: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.total_count, 1);
        assert_eq!(resp.items[0].full_name, "octocat/hello");
        assert_eq!(resp.items[0].open_issues_count, 0);
        assert!(resp.items[0].topics.is_empty());
    }

    #[test]
    fn stable_release_excludes_drafts_and_prereleases() {
        let json = r#"{
            "tag_name": "v1.0.0",
            "name": "1.0.0",
            "draft": false,
            "prerelease": true,
            "published_at": "2024-01-01T00:00:00Z",
            "html_url": "https://example.com",
            "body": null,
            "assets": []
        }"#;

        let release: Release = serde_json::from_str(json).unwrap();
        assert!(!release.is_stable());
    }

    #[test]
    fn starred_item_carries_star_timestamp() {
        let json = r#"{
            "starred_at": "2023-06-01T12:00:00Z",
            "repo": {
                "id": 7,
                "name": "tool",
                "full_name": "dev/tool",
                "owner": {
                    "id": 2,
                    "login": "dev",
                    "avatar_url": "https://example.com/d.png",
                    "html_url": "https://github.com/dev"
                },
                "description": "a tool",
                "html_url": "https://github.com/dev/tool",
                "stargazers_count": 10,
                "forks_count": 1,
                "open_issues_count": 3,
                "language": null,
                "updated_at": null,
                "default_branch": null
            }
        }"#;

        let item: StarredItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.starred_at.as_deref(), Some("2023-06-01T12:00:00Z"));
        assert_eq!(item.repo.id, 7);
    }
}
