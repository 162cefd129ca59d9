//! OAuth Device Flow authentication for GitHub
//!
//! Implements the OAuth 2.0 Device Authorization Grant flow for CLI login.
//! See: https://docs.github.com/en/apps/oauth-apps/building-oauth-apps/authorizing-oauth-apps#device-flow

use std::time::Duration;

use reqwest::Client;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::core::token_store::StoredToken;
use crate::error::{Result, StoreError};

/// GitHub OAuth App Client ID for ghstore
///
/// OAuth apps don't carry secrets in the device flow, so this identifier
/// is intentionally public. Override with the `GHSTORE_CLIENT_ID`
/// environment variable to use your own OAuth app.
const GITHUB_CLIENT_ID: &str = "Ov23liJGhStoreCliApp";

/// GitHub device authorization endpoint
const DEVICE_CODE_URL: &str = "https://github.com/login/device/code";

/// GitHub OAuth token endpoint
const TOKEN_URL: &str = "https://github.com/login/oauth/access_token";

/// OAuth scopes required for starring and reading the user's stars
const OAUTH_SCOPES: &str = "read:user repo";

/// Device code response from GitHub
#[derive(Debug, Deserialize)]
pub struct DeviceCodeResponse {
    /// The device verification code
    pub device_code: String,
    /// The user-facing code to enter on GitHub
    pub user_code: String,
    /// The URL where users should enter the code
    pub verification_uri: String,
    /// Time in seconds until the codes expire
    pub expires_in: u64,
    /// Minimum polling interval in seconds
    pub interval: u64,
}

/// Successful token response from GitHub
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    token_type: String,
    scope: String,
}

/// Error response from GitHub
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
    #[allow(dead_code)]
    error_description: Option<String>,
}

/// Device code request body
#[derive(Serialize)]
struct DeviceCodeRequest {
    client_id: String,
    scope: String,
}

/// Token request body (for device flow)
#[derive(Serialize)]
struct TokenRequest {
    client_id: String,
    device_code: String,
    grant_type: String,
}

/// OAuth Device Flow authentication handler
pub struct DeviceFlowAuth {
    client: Client,
    client_id: String,
}

impl DeviceFlowAuth {
    /// Create a new device flow auth handler
    pub fn new() -> Self {
        let client_id = std::env::var("GHSTORE_CLIENT_ID")
            .ok()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| GITHUB_CLIENT_ID.to_string());

        Self {
            client: Client::new(),
            client_id,
        }
    }

    /// Create with a custom client ID (for testing or custom OAuth apps)
    pub fn with_client_id(client_id: String) -> Self {
        Self {
            client: Client::new(),
            client_id,
        }
    }

    /// Request a device code from GitHub
    pub async fn request_device_code(&self) -> Result<DeviceCodeResponse> {
        let request = DeviceCodeRequest {
            client_id: self.client_id.clone(),
            scope: OAUTH_SCOPES.to_string(),
        };

        let response = self
            .client
            .post(DEVICE_CODE_URL)
            .header("Accept", "application/json")
            .form(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error: ErrorResponse = response.json().await?;
            return Err(StoreError::AuthenticationFailed(error.error));
        }

        let device_code: DeviceCodeResponse = response.json().await?;
        Ok(device_code)
    }

    /// Poll for the access token until the user authorizes or the code expires
    pub async fn poll_for_token(&self, device_code: &DeviceCodeResponse) -> Result<StoredToken> {
        let request = TokenRequest {
            client_id: self.client_id.clone(),
            device_code: device_code.device_code.clone(),
            grant_type: "urn:ietf:params:oauth:grant-type:device_code".to_string(),
        };

        let mut interval = Duration::from_secs(device_code.interval.max(5));
        let deadline = std::time::Instant::now() + Duration::from_secs(device_code.expires_in);

        loop {
            if std::time::Instant::now() > deadline {
                return Err(StoreError::AuthenticationExpired);
            }

            // Wait before polling
            tokio::time::sleep(interval).await;

            let response = self
                .client
                .post(TOKEN_URL)
                .header("Accept", "application/json")
                .form(&request)
                .send()
                .await?;

            let text = response.text().await?;

            if let Ok(token) = serde_json::from_str::<TokenResponse>(&text) {
                return Ok(StoredToken {
                    access_token: SecretString::from(token.access_token),
                    token_type: token.token_type,
                    scope: token.scope,
                    created_at: chrono::Utc::now(),
                });
            }

            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&text) {
                match error_response.error.as_str() {
                    "authorization_pending" => {
                        // User hasn't authorized yet, continue polling
                        continue;
                    }
                    "slow_down" => {
                        // GitHub asks for a longer polling interval
                        interval += Duration::from_secs(5);
                        continue;
                    }
                    "expired_token" | "expired_device_code" => {
                        return Err(StoreError::AuthenticationExpired);
                    }
                    "access_denied" => {
                        return Err(StoreError::AuthenticationFailed(
                            "Authorization was denied by the user".to_string(),
                        ));
                    }
                    _ => {
                        return Err(StoreError::AuthenticationFailed(error_response.error));
                    }
                }
            }

            // Unknown response, try again
            continue;
        }
    }
}

impl Default for DeviceFlowAuth {
    fn default() -> Self {
        Self::new()
    }
}
