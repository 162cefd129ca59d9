//! CLI module for ghstore
//!
//! This module contains all CLI command definitions and handlers using clap.

pub mod apps;
pub mod auth;
pub mod commands;
pub mod config;
pub mod details;
pub mod dev;
pub mod favourites;
pub mod home;
pub mod install;
pub mod limits;
pub mod search;
pub mod starred;

pub use commands::{Cli, Commands};

use crate::error::{Result, StoreError};

/// Split an `owner/repo` argument into its two coordinates
pub fn parse_repo_slug(slug: &str) -> Result<(String, String)> {
    match slug.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner.to_string(), repo.to_string()))
        }
        _ => Err(StoreError::InvalidInput(format!(
            "'{}' is not a valid repository. Use the owner/repo form, e.g. 'sharkdp/bat'",
            slug
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_slugs() {
        assert_eq!(
            parse_repo_slug("sharkdp/bat").unwrap(),
            ("sharkdp".to_string(), "bat".to_string())
        );
    }

    #[test]
    fn rejects_malformed_slugs() {
        assert!(parse_repo_slug("bat").is_err());
        assert!(parse_repo_slug("/bat").is_err());
        assert!(parse_repo_slug("sharkdp/").is_err());
        assert!(parse_repo_slug("a/b/c").is_err());
    }
}
