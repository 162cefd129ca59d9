//! Repository search with per-session result memoization
//!
//! Search counts against its own, much smaller rate-limit bucket
//! (30 requests/minute authenticated), so each (query, platform, page)
//! result is memoized in a bounded LRU cache for the life of the
//! process.

use tokio::sync::Mutex;

use crate::core::installer::Platform;
use crate::core::lru::LruCache;
use crate::error::Result;
use crate::github::client::GitHubClient;
use crate::github::types::{Paginated, Repo, SearchResponse};

const PER_PAGE: u32 = 30;
const CACHE_CAPACITY: usize = 500;

type CacheKey = (String, &'static str, u32);

/// Search API handler
pub struct SearchHandler<'a> {
    client: &'a GitHubClient,
    cache: Mutex<LruCache<CacheKey, Paginated<Repo>>>,
}

impl<'a> SearchHandler<'a> {
    pub fn new(client: &'a GitHubClient) -> Self {
        Self {
            client,
            cache: Mutex::new(LruCache::new(CACHE_CAPACITY)),
        }
    }

    /// Search repositories, scoped by a platform hint.
    ///
    /// Repeated identical searches in one session are served from the
    /// cache without touching the API.
    pub async fn search(
        &self,
        query: &str,
        platform: Platform,
        page: u32,
    ) -> Result<Paginated<Repo>> {
        let key: CacheKey = (query.to_string(), platform.name(), page);

        {
            let mut cache = self.cache.lock().await;
            if let Some(hit) = cache.get(&key) {
                tracing::debug!(query, page, "search cache hit");
                return Ok(hit.clone());
            }
        }

        let q = build_search_query(query, platform);
        let response: SearchResponse = self
            .client
            .get_json(
                "/search/repositories",
                &[
                    ("q", q),
                    ("per_page", PER_PAGE.to_string()),
                    ("page", page.to_string()),
                ],
            )
            .await?;

        let has_more =
            (page as u64 * PER_PAGE as u64) < response.total_count as u64 && !response.items.is_empty();
        let result = Paginated {
            items: response.items,
            has_more,
            next_page: page + 1,
            total_count: Some(response.total_count),
        };

        self.cache.lock().await.put(key, result.clone());
        Ok(result)
    }
}

/// Build the search qualifier string.
///
/// A blank query falls back to popular repos; multi-word queries are
/// quoted so GitHub treats them as a phrase. The platform hint widens
/// the match to topics and package-format mentions rather than relying
/// on topics alone, which most repos never set.
fn build_search_query(user_query: &str, platform: Platform) -> String {
    let clean = user_query.trim();
    let q = if clean.is_empty() {
        "stars:>100".to_string()
    } else if clean.contains(char::is_whitespace) {
        format!("\"{clean}\"")
    } else {
        clean.to_string()
    };

    let platform_hint = match platform {
        Platform::All => "",
        Platform::Windows => {
            " (topic:windows OR exe in:name,description,readme OR msi in:name,description,readme)"
        }
        Platform::Macos => {
            " (topic:macos OR dmg in:name,description,readme OR pkg in:name,description,readme)"
        }
        Platform::Linux => {
            " (topic:linux OR appimage in:name,description,readme OR deb in:name,description,readme)"
        }
    };

    format!("{q} in:name,description,readme archived:false fork:false{platform_hint}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_query_falls_back_to_popular() {
        let q = build_search_query("  ", Platform::All);
        assert!(q.starts_with("stars:>100 "));
        assert!(q.contains("archived:false"));
        assert!(q.contains("fork:false"));
    }

    #[test]
    fn multiword_queries_are_quoted() {
        let q = build_search_query("music player", Platform::All);
        assert!(q.starts_with("\"music player\" "));
    }

    #[test]
    fn single_word_queries_are_not_quoted() {
        let q = build_search_query("terminal", Platform::All);
        assert!(q.starts_with("terminal "));
        assert!(!q.contains('"'));
    }

    #[test]
    fn platform_hint_is_appended() {
        let q = build_search_query("editor", Platform::Linux);
        assert!(q.contains("topic:linux"));
        assert!(q.contains("appimage"));

        let all = build_search_query("editor", Platform::All);
        assert!(!all.contains("topic:"));
    }
}
