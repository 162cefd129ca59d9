//! Filesystem locations for config, data, and download staging

use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::{Result, StoreError};

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "ghstore", "ghstore")
        .ok_or_else(|| StoreError::Config("Could not determine a home directory".into()))
}

/// Config directory (holds `config.toml`)
pub fn config_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().to_path_buf())
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Data directory (holds the SQLite database)
pub fn data_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().to_path_buf())
}

pub fn database_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("ghstore.sqlite"))
}

/// Staging directory for in-progress downloads, created on demand
pub fn staging_dir() -> Result<PathBuf> {
    let dir = project_dirs()?.cache_dir().join("downloads");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Default final destination for installed artifacts
pub fn install_dir() -> Result<PathBuf> {
    let dir = data_dir()?.join("apps");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}
