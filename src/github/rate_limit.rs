//! GitHub rate-limit tracking
//!
//! Every API response carries `X-RateLimit-*` headers describing the
//! caller's remaining quota. The tracker keeps the most recent snapshot
//! (last response processed wins) and lets interested parties observe
//! changes reactively. The record is a display-only signal; it is never
//! persisted.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::header::HeaderMap;
use tokio::sync::watch;

/// Snapshot of the rate-limit headers from a single API response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Maximum requests allowed in the current window
    pub limit: u32,
    /// Requests remaining in the current window
    pub remaining: u32,
    /// Unix timestamp (seconds) at which the window resets
    pub reset_timestamp: u64,
    /// Which quota bucket the response counted against (usually "core" or "search")
    pub resource: String,
}

impl RateLimitInfo {
    pub fn new(limit: u32, remaining: u32, reset_timestamp: u64, resource: &str) -> Self {
        Self {
            limit,
            remaining,
            reset_timestamp,
            resource: resource.to_string(),
        }
    }

    /// Parse the `X-RateLimit-*` headers from a response.
    ///
    /// Returns `None` when the limit or remaining header is missing,
    /// which happens for endpoints outside the rate-limited API surface
    /// (raw file downloads, the OAuth endpoints).
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let parse_u64 = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
        };

        let limit = parse_u64("X-RateLimit-Limit")? as u32;
        let remaining = parse_u64("X-RateLimit-Remaining")? as u32;
        let reset_timestamp = parse_u64("X-RateLimit-Reset")?;
        let resource = headers
            .get("X-RateLimit-Resource")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("core")
            .to_string();

        Some(Self {
            limit,
            remaining,
            reset_timestamp,
            resource,
        })
    }

    /// Whether the quota for this window is fully consumed
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Time remaining until the window resets (zero if already reset)
    pub fn time_until_reset(&self) -> Duration {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Duration::from_secs(self.reset_timestamp.saturating_sub(now))
    }

    /// Exhausted and the reset time has not yet passed
    pub fn is_currently_limited(&self) -> bool {
        self.is_exhausted() && self.time_until_reset() > Duration::ZERO
    }
}

/// Shared last-value-wins record of the most recent rate-limit snapshot.
///
/// Updated from whichever request happens to complete last; there is no
/// ordering guarantee across concurrent in-flight requests, which is
/// acceptable for a display-only signal.
#[derive(Debug, Clone)]
pub struct RateLimitTracker {
    tx: watch::Sender<Option<RateLimitInfo>>,
}

impl RateLimitTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Overwrite the shared record and notify observers
    pub fn update(&self, info: RateLimitInfo) {
        if info.is_exhausted() {
            tracing::warn!(
                resource = %info.resource,
                reset_in_secs = info.time_until_reset().as_secs(),
                "rate limit exhausted"
            );
        }
        self.tx.send_replace(Some(info));
    }

    /// The most recently observed snapshot, if any response has carried one
    pub fn current(&self) -> Option<RateLimitInfo> {
        self.tx.borrow().clone()
    }

    /// Subscribe to snapshot changes
    pub fn subscribe(&self) -> watch::Receiver<Option<RateLimitInfo>> {
        self.tx.subscribe()
    }

    /// Whether the last snapshot says we are exhausted and still inside the window
    pub fn is_currently_limited(&self) -> bool {
        self.current().is_some_and(|info| info.is_currently_limited())
    }

    /// Forget the last snapshot (e.g. after logout switches quota buckets)
    pub fn clear(&self) {
        self.tx.send_replace(None);
    }
}

impl Default for RateLimitTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue};

    fn headers(limit: &str, remaining: &str, reset: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert("X-RateLimit-Limit", HeaderValue::from_str(limit).unwrap());
        h.insert(
            "X-RateLimit-Remaining",
            HeaderValue::from_str(remaining).unwrap(),
        );
        h.insert("X-RateLimit-Reset", HeaderValue::from_str(reset).unwrap());
        h
    }

    fn now_secs() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    #[test]
    fn parses_complete_headers() {
        let mut h = headers("60", "42", "1700000000");
        h.insert("X-RateLimit-Resource", HeaderValue::from_static("search"));

        let info = RateLimitInfo::from_headers(&h).unwrap();
        assert_eq!(info.limit, 60);
        assert_eq!(info.remaining, 42);
        assert_eq!(info.reset_timestamp, 1_700_000_000);
        assert_eq!(info.resource, "search");
    }

    #[test]
    fn resource_defaults_to_core() {
        let info = RateLimitInfo::from_headers(&headers("5000", "4999", "0")).unwrap();
        assert_eq!(info.resource, "core");
    }

    #[test]
    fn missing_headers_yield_none() {
        assert!(RateLimitInfo::from_headers(&HeaderMap::new()).is_none());

        let mut partial = HeaderMap::new();
        partial.insert("X-RateLimit-Limit", HeaderValue::from_static("60"));
        assert!(RateLimitInfo::from_headers(&partial).is_none());
    }

    #[test]
    fn exhaustion_requires_zero_remaining() {
        assert!(RateLimitInfo::new(60, 0, 0, "core").is_exhausted());
        assert!(!RateLimitInfo::new(60, 1, 0, "core").is_exhausted());
    }

    #[test]
    fn currently_limited_respects_reset_time() {
        let future = now_secs() + 600;
        assert!(RateLimitInfo::new(60, 0, future, "core").is_currently_limited());
        // Window already reset: exhausted snapshot is stale
        assert!(!RateLimitInfo::new(60, 0, 1, "core").is_currently_limited());
    }

    #[test]
    fn tracker_is_last_writer_wins() {
        let tracker = RateLimitTracker::new();
        assert!(tracker.current().is_none());

        tracker.update(RateLimitInfo::new(60, 10, 0, "core"));
        tracker.update(RateLimitInfo::new(60, 9, 0, "core"));
        assert_eq!(tracker.current().unwrap().remaining, 9);

        tracker.clear();
        assert!(tracker.current().is_none());
    }

    #[tokio::test]
    async fn tracker_notifies_subscribers() {
        let tracker = RateLimitTracker::new();
        let mut rx = tracker.subscribe();

        tracker.update(RateLimitInfo::new(60, 0, now_secs() + 60, "core"));
        rx.changed().await.unwrap();
        assert!(rx.borrow().as_ref().unwrap().is_exhausted());
    }
}
