//! Rate-limit-aware GitHub REST client
//!
//! One client instance is shared by all feature handlers. Every request
//! goes through a single send path that:
//!
//! - signs the request with a bearer token when one is stored,
//! - inspects `X-RateLimit-*` headers on every response and publishes
//!   the snapshot to the shared [`RateLimitTracker`],
//! - fails fast with [`StoreError::RateLimited`] on a 403 whose
//!   remaining quota is zero (retrying cannot succeed before the reset),
//! - retries 5xx responses and transport failures with bounded
//!   exponential backoff (at most 3 retries).

use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use url::Url;

use crate::core::token_store::TokenStore;
use crate::error::{Result, StoreError};
use crate::github::rate_limit::{RateLimitInfo, RateLimitTracker};

/// GitHub REST API base URL
const API_BASE_URL: &str = "https://api.github.com";

/// Media type for the versioned REST API
pub const ACCEPT_JSON: &str = "application/vnd.github+json";

/// Media type that adds `starred_at` to `/user/starred` entries
pub const ACCEPT_STAR_JSON: &str = "application/vnd.github.star+json";

/// Maximum retry attempts after the initial request
const MAX_RETRIES: usize = 3;

/// GitHub REST API client
pub struct GitHubClient {
    http: Client,
    base_url: Url,
    token: Option<SecretString>,
    rate_limits: RateLimitTracker,
}

impl GitHubClient {
    /// Create a client, signing requests with the stored token if present.
    ///
    /// An unauthenticated client still works against the public API,
    /// just with a much smaller quota (60 requests/hour).
    pub fn new() -> Result<Self> {
        let token = TokenStore::load()?.map(|t| t.access_token);
        Self::with_token(token)
    }

    /// Create a client with an explicit token (or none)
    pub fn with_token(token: Option<SecretString>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(format!("ghstore/{}", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(30))
            .timeout(Duration::from_secs(30))
            .build()?;

        let base_url = Url::parse(API_BASE_URL).expect("static base URL is valid");

        Ok(Self {
            http,
            base_url,
            token,
            rate_limits: RateLimitTracker::new(),
        })
    }

    /// Whether requests are signed with a token
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// The shared rate-limit record updated by every response
    pub fn rate_limits(&self) -> &RateLimitTracker {
        &self.rate_limits
    }

    /// GET an API path and deserialize the JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        self.get_json_with_accept(path, query, ACCEPT_JSON).await
    }

    /// GET with an explicit Accept media type
    pub async fn get_json_with_accept<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        accept: &str,
    ) -> Result<T> {
        let response = self.get_with_retry(path, query, accept).await?;
        Ok(response.json::<T>().await?)
    }

    /// PUT with an empty body (starring), returning nothing on success
    pub async fn put_empty(&self, path: &str) -> Result<()> {
        let url = self.api_url(path)?;
        let op = || async {
            let mut request = self
                .http
                .put(url.clone())
                .header(reqwest::header::ACCEPT, ACCEPT_JSON)
                .header("X-GitHub-Api-Version", "2022-11-28")
                .header(reqwest::header::CONTENT_LENGTH, "0");
            if let Some(token) = &self.token {
                request = request.bearer_auth(token.expose_secret());
            }
            let response = request.send().await?;
            self.check_response(response).await.map(|_| ())
        };
        self.retrying(op, path).await
    }

    /// DELETE (unstarring), returning nothing on success
    pub async fn delete(&self, path: &str) -> Result<()> {
        let url = self.api_url(path)?;
        let op = || async {
            let mut request = self
                .http
                .delete(url.clone())
                .header(reqwest::header::ACCEPT, ACCEPT_JSON)
                .header("X-GitHub-Api-Version", "2022-11-28");
            if let Some(token) = &self.token {
                request = request.bearer_auth(token.expose_secret());
            }
            let response = request.send().await?;
            self.check_response(response).await.map(|_| ())
        };
        self.retrying(op, path).await
    }

    /// GET returning the raw successful response (for streaming downloads)
    pub async fn get_raw(&self, path: &str, query: &[(&str, String)], accept: &str) -> Result<Response> {
        self.get_with_retry(path, query, accept).await
    }

    async fn get_with_retry(
        &self,
        path: &str,
        query: &[(&str, String)],
        accept: &str,
    ) -> Result<Response> {
        let url = self.api_url(path)?;
        let op = || async {
            let mut request = self
                .http
                .get(url.clone())
                .query(query)
                .header(reqwest::header::ACCEPT, accept)
                .header("X-GitHub-Api-Version", "2022-11-28");
            if let Some(token) = &self.token {
                request = request.bearer_auth(token.expose_secret());
            }
            let response = request.send().await?;
            self.check_response(response).await
        };
        self.retrying(op, path).await
    }

    async fn retrying<T, F, Fut>(&self, op: F, path: &str) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        op.retry(retry_policy())
            .when(|e: &StoreError| e.is_retryable())
            .notify(|err, dur| {
                tracing::debug!(path, delay_ms = dur.as_millis() as u64, error = %err, "retrying request");
            })
            .await
    }

    /// Inspect rate-limit headers and map non-success statuses to errors.
    ///
    /// Runs for every response, success or failure, so the shared record
    /// stays current even on error paths.
    async fn check_response(&self, response: Response) -> Result<Response> {
        let status = response.status();
        let rate_limit = RateLimitInfo::from_headers(response.headers());

        if let Some(info) = &rate_limit {
            self.rate_limits.update(info.clone());
        }

        if status.is_success() {
            return Ok(response);
        }

        // 403 with an exhausted quota is a rate-limit failure, not a
        // permission failure; fail fast so the retry policy does not
        // burn attempts that cannot succeed before the reset.
        if status == StatusCode::FORBIDDEN {
            if let Some(info) = rate_limit {
                if info.is_exhausted() {
                    return Err(StoreError::RateLimited(info));
                }
            }
        }

        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound("Resource".to_string()));
        }

        if status == StatusCode::UNAUTHORIZED {
            return Err(StoreError::NotAuthenticated);
        }

        let message = response.text().await.unwrap_or_default();
        Err(StoreError::GitHubApi {
            status: status.as_u16(),
            message: truncate_message(&message),
        })
    }

    fn api_url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| StoreError::Custom(format!("Invalid API path '{}': {}", path, e)))
    }
}

/// Exponential backoff for transient failures: 0.5s, 1s, 2s (with jitter)
fn retry_policy() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(500))
        .with_max_delay(Duration::from_secs(10))
        .with_max_times(MAX_RETRIES)
        .with_jitter()
}

fn truncate_message(message: &str) -> String {
    const MAX_LEN: usize = 200;
    if message.len() > MAX_LEN {
        let mut end = MAX_LEN;
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &message[..end])
    } else {
        message.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Far-future reset so exhausted snapshots stay inside their window
    const RESET_2100: &str = "4102444800";

    fn api_response(status: u16, remaining: &str) -> Response {
        let inner = http::Response::builder()
            .status(status)
            .header("X-RateLimit-Limit", "60")
            .header("X-RateLimit-Remaining", remaining)
            .header("X-RateLimit-Reset", RESET_2100)
            .header("X-RateLimit-Resource", "core")
            .body("quota exceeded")
            .unwrap();
        Response::from(inner)
    }

    #[tokio::test]
    async fn forbidden_with_exhausted_quota_is_rate_limited() {
        let client = GitHubClient::with_token(None).unwrap();
        let err = client
            .check_response(api_response(403, "0"))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::RateLimited(_)));
        // Waiting out the reset is the only cure, so no retry
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn forbidden_with_quota_left_is_a_plain_api_error() {
        let client = GitHubClient::with_token(None).unwrap();
        let err = client
            .check_response(api_response(403, "1"))
            .await
            .unwrap_err();

        match err {
            StoreError::GitHubApi { status, .. } => assert_eq!(status, 403),
            other => panic!("expected GitHubApi, got {other}"),
        }
    }

    #[tokio::test]
    async fn success_passes_through_unchanged() {
        let client = GitHubClient::with_token(None).unwrap();
        let response = client
            .check_response(api_response(200, "59"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn rate_limit_record_updates_even_on_errors() {
        let client = GitHubClient::with_token(None).unwrap();
        let _ = client.check_response(api_response(500, "7")).await;
        assert_eq!(client.rate_limits().current().unwrap().remaining, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn server_errors_retry_up_to_the_limit() {
        let client = GitHubClient::with_token(None).unwrap();
        let attempts = AtomicUsize::new(0);
        let attempts_ref = &attempts;

        let result: Result<()> = client
            .retrying(
                || async move {
                    attempts_ref.fetch_add(1, Ordering::SeqCst);
                    Err(StoreError::GitHubApi {
                        status: 503,
                        message: "service unavailable".to_string(),
                    })
                },
                "/test",
            )
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), MAX_RETRIES + 1);
    }

    #[tokio::test]
    async fn not_found_is_never_retried() {
        let client = GitHubClient::with_token(None).unwrap();
        let attempts = AtomicUsize::new(0);
        let attempts_ref = &attempts;

        let result: Result<()> = client
            .retrying(
                || async move {
                    attempts_ref.fetch_add(1, Ordering::SeqCst);
                    Err(StoreError::NotFound("missing".to_string()))
                },
                "/test",
            )
            .await;

        assert!(matches!(result, Err(StoreError::NotFound(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausted_quota_is_never_retried() {
        let client = GitHubClient::with_token(None).unwrap();
        let attempts = AtomicUsize::new(0);
        let attempts_ref = &attempts;

        let result: Result<()> = client
            .retrying(
                || async move {
                    attempts_ref.fetch_add(1, Ordering::SeqCst);
                    Err(StoreError::RateLimited(RateLimitInfo::new(
                        60, 0, 4_102_444_800, "core",
                    )))
                },
                "/test",
            )
            .await;

        assert!(matches!(result, Err(StoreError::RateLimited(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn builds_api_urls_from_paths() {
        let client = GitHubClient::with_token(None).unwrap();
        assert_eq!(
            client.api_url("/search/repositories").unwrap().as_str(),
            "https://api.github.com/search/repositories"
        );
        assert_eq!(
            client.api_url("repos/octocat/hello").unwrap().as_str(),
            "https://api.github.com/repos/octocat/hello"
        );
    }

    #[test]
    fn unauthenticated_client_has_no_token() {
        let client = GitHubClient::with_token(None).unwrap();
        assert!(!client.is_authenticated());
    }

    #[test]
    fn truncates_long_error_bodies() {
        let long = "x".repeat(500);
        let truncated = truncate_message(&long);
        assert!(truncated.len() < 210);
        assert!(truncated.ends_with('…'));
        assert_eq!(truncate_message("short"), "short");
    }
}
