//! Persistent storage for the single OAuth device-flow token
//!
//! The token is encoded as JSON and stored in the system keyring
//! (macOS Keychain, Linux Secret Service), with an in-memory cache to
//! minimize keychain prompts. There is exactly one token: login creates
//! it, logout destroys it.
//!
//! ## Environment Variable Fallback
//!
//! For development and CI, `GITHUB_TOKEN` bypasses the keyring entirely.
//!
//! Priority: env var > cache > keyring

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use keyring::Entry;
use once_cell::sync::Lazy;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

const SERVICE_NAME: &str = "ghstore";
const TOKEN_KEY: &str = "github_token";
const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

// In-memory token cache
// Option<Option<T>>:
//   - None = not yet fetched from keyring
//   - Some(None) = fetched, but no token exists
//   - Some(Some(token)) = fetched and cached
static TOKEN_CACHE: Lazy<RwLock<Option<Option<StoredToken>>>> = Lazy::new(|| RwLock::new(None));

/// The OAuth token with its grant metadata
#[derive(Debug, Clone)]
pub struct StoredToken {
    /// The access token for API requests
    pub access_token: SecretString,
    /// Token type (usually "bearer")
    pub token_type: String,
    /// Granted scopes
    pub scope: String,
    /// When the token was obtained
    pub created_at: DateTime<Utc>,
}

/// Serializable format for keyring storage
///
/// Uses plain strings since SecretString doesn't implement Serialize.
#[derive(Debug, Serialize, Deserialize)]
struct TokenJson {
    access_token: String,
    token_type: String,
    scope: String,
    created_at: String,
    /// Version for future migrations
    version: u8,
}

impl StoredToken {
    fn to_json(&self) -> TokenJson {
        TokenJson {
            access_token: self.access_token.expose_secret().to_string(),
            token_type: self.token_type.clone(),
            scope: self.scope.clone(),
            created_at: self.created_at.to_rfc3339(),
            version: 1,
        }
    }

    fn from_json(json: TokenJson) -> Result<Self> {
        let created_at = DateTime::parse_from_rfc3339(&json.created_at)
            .map_err(|e| StoreError::Config(format!("Invalid token timestamp: {}", e)))?
            .with_timezone(&Utc);

        Ok(Self {
            access_token: SecretString::from(json.access_token),
            token_type: json.token_type,
            scope: json.scope,
            created_at,
        })
    }
}

/// Token store for the single login credential
pub struct TokenStore;

impl TokenStore {
    /// Persist the token, updating both the keyring and the cache
    pub fn save(token: &StoredToken) -> Result<()> {
        let json = serde_json::to_string(&token.to_json())?;

        let entry = Entry::new(SERVICE_NAME, TOKEN_KEY)?;
        entry.set_password(&json)?;

        if let Ok(mut cache) = TOKEN_CACHE.write() {
            *cache = Some(Some(token.clone()));
        }

        Ok(())
    }

    /// Retrieve the stored token
    ///
    /// Priority: environment variable > cache > keyring
    pub fn load() -> Result<Option<StoredToken>> {
        if let Ok(raw) = std::env::var(GITHUB_TOKEN_ENV) {
            if !raw.is_empty() {
                return Ok(Some(StoredToken {
                    access_token: SecretString::from(raw),
                    token_type: "bearer".to_string(),
                    scope: String::new(),
                    created_at: Utc::now(),
                }));
            }
        }

        if let Ok(cache) = TOKEN_CACHE.read() {
            if let Some(cached) = cache.as_ref() {
                return Ok(cached.clone());
            }
        }

        let result = Self::fetch_from_keyring()?;

        if let Ok(mut cache) = TOKEN_CACHE.write() {
            *cache = Some(result.clone());
        }

        Ok(result)
    }

    fn fetch_from_keyring() -> Result<Option<StoredToken>> {
        let entry = Entry::new(SERVICE_NAME, TOKEN_KEY)?;
        match entry.get_password() {
            Ok(json) => {
                let parsed: TokenJson = serde_json::from_str(&json)
                    .map_err(|e| StoreError::Config(format!("Invalid stored token: {}", e)))?;
                Ok(Some(StoredToken::from_json(parsed)?))
            }
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(StoreError::Credential(format!(
                "Cannot access system keychain. Make sure your keyring is unlocked. ({})",
                e
            ))),
        }
    }

    /// Delete the stored token (logout)
    pub fn clear() -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, TOKEN_KEY)?;
        let result = match entry.delete_credential() {
            Ok(()) => Ok(()),
            Err(keyring::Error::NoEntry) => Ok(()), // Already deleted
            Err(e) => Err(StoreError::Credential(e.to_string())),
        };

        if let Ok(mut cache) = TOKEN_CACHE.write() {
            *cache = Some(None);
        }

        result
    }

    /// Whether any form of authentication is available
    pub fn is_authenticated() -> Result<bool> {
        Ok(Self::load()?.is_some())
    }

    /// Get the token, returning an error if not authenticated
    pub fn require() -> Result<StoredToken> {
        Self::load()?.ok_or(StoreError::NotAuthenticated)
    }

    /// Get a masked version of a token for display (shows first 4 and last 4 chars)
    pub fn mask_token(token: &SecretString) -> String {
        let exposed = token.expose_secret();
        let count = exposed.chars().count();
        if count <= 8 {
            "*".repeat(count)
        } else {
            let head: String = exposed.chars().take(4).collect();
            let tail: String = exposed.chars().skip(count - 4).collect();
            format!("{}...{}", head, tail)
        }
    }
}
