//! Custom error types for ghstore
//!
//! User-friendly error messages for all failure scenarios.

use thiserror::Error;

use crate::github::rate_limit::RateLimitInfo;

/// Main error type for the ghstore application
#[derive(Error, Debug)]
pub enum StoreError {
    /// User is not authenticated
    #[error("You are not logged in to GitHub.\n\n  → Run 'ghstore auth login' to authenticate.")]
    NotAuthenticated,

    /// Authentication process failed
    #[error("GitHub authentication failed: {0}\n\n  → Try running 'ghstore auth login' again.")]
    AuthenticationFailed(String),

    /// OAuth device flow expired
    #[error("Authentication timed out - the code expired.\n\n  → Run 'ghstore auth login' again and complete the process within 15 minutes.")]
    AuthenticationExpired,

    /// API rate limit exhausted; not retryable until the window resets
    #[error(
        "GitHub API rate limit exhausted ({limit} requests used).\n\n  → The limit resets in about {reset_mins} minutes.\n  → Sign in with 'ghstore auth login' for a much higher quota.",
        limit = .0.limit,
        reset_mins = .0.time_until_reset().as_secs() / 60 + 1
    )]
    RateLimited(RateLimitInfo),

    /// GitHub API returned a non-success status
    #[error("GitHub API request failed: HTTP {status}: {message}\n\n  → Check your internet connection.\n  → Your token may have expired - try 'ghstore auth logout' then 'ghstore auth login'.")]
    GitHubApi { status: u16, message: String },

    /// Repository, release, or user does not exist (or is private)
    #[error("{0} not found.\n\n  → It may be private or you may not have access.")]
    NotFound(String),

    /// No installable release asset for this platform
    #[error("No installable asset for this platform in '{owner}/{repo}'.\n\n  → Run 'ghstore show {owner}/{repo}' to list all release assets.")]
    NoInstallableAsset { owner: String, repo: String },

    /// Credential storage error
    #[error("Cannot access secure storage: {0}\n\n  → On macOS: Make sure Keychain Access is available.\n  → On Linux: Ensure a secret service (like gnome-keyring) is running.")]
    Credential(String),

    /// Local database error
    #[error("Local store operation failed: {0}")]
    Database(#[from] rusqlite::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),

    /// Network request error
    #[error("Network request failed: {0}\n\n  → Check your internet connection.")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("Failed to parse response: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML serialization/deserialization error
    #[error("Configuration file is invalid: {0}")]
    Toml(String),

    /// Download failed or was interrupted
    #[error("Download failed: {0}")]
    Download(String),

    /// Installation handoff failed
    #[error("Installation failed: {0}")]
    Install(String),

    /// Invalid input from user
    #[error("{0}")]
    InvalidInput(String),

    /// Operation cancelled by user
    #[error("Operation cancelled.")]
    Cancelled,

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),
}

impl StoreError {
    /// Whether the generic retry policy may re-attempt the request.
    ///
    /// Server errors and transport failures are transient; everything
    /// else (4xx, rate-limit exhaustion, local failures) is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::GitHubApi { status, .. } => (500..600).contains(status),
            StoreError::Network(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

impl From<keyring::Error> for StoreError {
    fn from(err: keyring::Error) -> Self {
        StoreError::Credential(err.to_string())
    }
}

impl From<toml::de::Error> for StoreError {
    fn from(err: toml::de::Error) -> Self {
        StoreError::Toml(err.to_string())
    }
}

impl From<toml::ser::Error> for StoreError {
    fn from(err: toml::ser::Error) -> Self {
        StoreError::Toml(err.to_string())
    }
}

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;
