//! GitHub API integration module
//!
//! This module provides all GitHub-related functionality:
//! - OAuth Device Flow authentication
//! - Rate-limit-aware REST client
//! - Repository search and trending feed
//! - Release and asset lookup
//! - Starring
//! - Developer profiles

pub mod auth;
pub mod client;
pub mod rate_limit;
pub mod releases;
pub mod repos;
pub mod search;
pub mod trending;
pub mod types;
pub mod users;

pub use auth::DeviceFlowAuth;
pub use client::GitHubClient;
pub use rate_limit::{RateLimitInfo, RateLimitTracker};
pub use releases::ReleasesHandler;
pub use repos::RepoHandler;
pub use search::SearchHandler;
pub use trending::TrendingHandler;
pub use users::UsersHandler;
