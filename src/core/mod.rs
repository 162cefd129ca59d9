//! Core functionality for ghstore
//!
//! This module contains shared business logic including:
//! - Token persistence
//! - The local SQLite store and starred sync
//! - Search-result caching
//! - Asset download and installation
//! - Application configuration

pub mod apps;
pub mod config;
pub mod db;
pub mod downloader;
pub mod installer;
pub mod lru;
pub mod paths;
pub mod starred_sync;
pub mod token_store;

pub use config::Config;
pub use db::Database;
pub use downloader::{DownloadProgress, Downloader};
pub use installer::{AssetKind, Platform};
pub use lru::LruCache;
pub use token_store::{StoredToken, TokenStore};
