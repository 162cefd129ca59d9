//! ghstore - an unofficial app store for GitHub releases
//!
//! This library backs the `ghstore` CLI: browsing and searching
//! repositories that publish installable release artifacts, caching the
//! user's stars locally, and downloading, verifying, and installing
//! assets.

pub mod cli;
pub mod core;
pub mod error;
pub mod github;

pub use error::{Result, StoreError};
