//! Rate-limit CLI command handler

use serde::Deserialize;

use crate::error::Result;
use crate::github::client::GitHubClient;
use crate::github::rate_limit::RateLimitInfo;

/// Response envelope for `/rate_limit`.
/// The endpoint itself does not count against any quota.
#[derive(Debug, Deserialize)]
struct RateLimitResponse {
    resources: std::collections::BTreeMap<String, Bucket>,
}

#[derive(Debug, Deserialize)]
struct Bucket {
    limit: u32,
    remaining: u32,
    reset: u64,
}

/// Handle the limits command
pub async fn handle_limits() -> Result<()> {
    let client = GitHubClient::new()?;
    let response: RateLimitResponse = client.get_json("/rate_limit", &[]).await?;

    if !client.is_authenticated() {
        println!("Unauthenticated quotas (login raises them):\n");
    }

    println!("  {:<24} {:>9} {:>9}   resets in", "resource", "remaining", "limit");
    for (resource, bucket) in &response.resources {
        let info = RateLimitInfo::new(bucket.limit, bucket.remaining, bucket.reset, resource);
        let reset = info.time_until_reset();
        println!(
            "  {:<24} {:>9} {:>9}   {}m {}s",
            resource,
            bucket.remaining,
            bucket.limit,
            reset.as_secs() / 60,
            reset.as_secs() % 60
        );
    }

    // The request above also fed the in-process tracker
    if let Some(last) = client.rate_limits().current() {
        if last.is_currently_limited() {
            println!();
            println!(
                "⚠ The '{}' quota is exhausted; requests will fail until the reset.",
                last.resource
            );
        }
    }
    Ok(())
}
