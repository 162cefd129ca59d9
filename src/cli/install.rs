//! Install CLI command handler

use std::io::{self, Write};

use tokio::sync::mpsc;

use crate::cli::parse_repo_slug;
use crate::core::apps;
use crate::core::config::Config;
use crate::core::db::Database;
use crate::core::downloader::{DownloadProgress, Downloader};
use crate::core::installer::{self, AssetKind, InstallOutcome, Platform};
use crate::core::paths;
use crate::error::{Result, StoreError};
use crate::github::client::GitHubClient;
use crate::github::releases::ReleasesHandler;
use crate::github::repos::RepoHandler;
use crate::github::types::{Asset, Release};

/// Handle the install command
pub async fn handle_install(slug: String, asset_name: Option<String>) -> Result<()> {
    let (owner, name) = parse_repo_slug(&slug)?;
    let config = Config::load()?;

    let client = GitHubClient::new()?;
    let repo = RepoHandler::new(&client).get(&owner, &name).await?;

    let release = ReleasesHandler::new(&client)
        .latest_stable(&owner, &name)
        .await?
        .ok_or_else(|| StoreError::NoInstallableAsset {
            owner: owner.clone(),
            repo: name.clone(),
        })?;

    let asset = select_asset(&release, asset_name.as_deref(), &config, &owner, &name)?;
    let kind = AssetKind::classify(&asset.name).ok_or_else(|| {
        StoreError::InvalidInput(format!(
            "'{}' is not an installable asset type",
            asset.name
        ))
    })?;

    println!(
        "Installing {} {} ({})",
        repo.full_name, release.tag_name, asset.name
    );

    let db = Database::open()?;
    let previous_version = db
        .get_installed_app(&repo.full_name)?
        .map(|app| app.installed_version);

    let result = download_and_install(asset, kind, &config, &repo.full_name).await;

    match result {
        Ok(outcome) => {
            apps::record_install(
                &db,
                &repo,
                &release,
                asset,
                &outcome,
                previous_version.as_deref(),
            )?;

            match &outcome {
                InstallOutcome::Placed(path) => {
                    println!("\n✓ Installed to {}", path.display());
                }
                InstallOutcome::Extracted(dir) => {
                    println!("\n✓ Extracted to {}", dir.display());
                }
                InstallOutcome::HandedOff(path) => {
                    println!("\n✓ Handed '{}' to the system installer.", path.display());
                }
            }
            Ok(())
        }
        Err(e) => {
            apps::record_failed_install(
                &db,
                &repo,
                &release.tag_name,
                previous_version.as_deref(),
                &e.to_string(),
            )?;
            Err(e)
        }
    }
}

/// Pick the asset to install: an explicit name, or the best match for
/// this platform
fn select_asset<'a>(
    release: &'a Release,
    requested: Option<&str>,
    config: &Config,
    owner: &str,
    repo: &str,
) -> Result<&'a Asset> {
    match requested {
        Some(name) => release
            .assets
            .iter()
            .find(|a| a.name == name)
            .ok_or_else(|| {
                let available = release
                    .assets
                    .iter()
                    .map(|a| a.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                StoreError::InvalidInput(format!(
                    "Release {} has no asset named '{}'. Available: {}",
                    release.tag_name, name, available
                ))
            }),
        None => installer::choose_primary_asset(
            &release.assets,
            Platform::current(),
            &config.preferred_asset_kinds,
        )
        .ok_or_else(|| StoreError::NoInstallableAsset {
            owner: owner.to_string(),
            repo: repo.to_string(),
        }),
    }
}

async fn download_and_install(
    asset: &Asset,
    kind: AssetKind,
    config: &Config,
    app_slug: &str,
) -> Result<InstallOutcome> {
    let staging = paths::staging_dir()?;
    let downloader = Downloader::new()?;

    let (tx, rx) = mpsc::channel::<DownloadProgress>(32);
    let reporter = tokio::spawn(report_progress(rx));

    let downloaded = downloader
        .download(&asset.browser_download_url, &staging, &asset.name, Some(tx))
        .await?;
    let _ = reporter.await;

    let install_dir = match &config.download_dir {
        Some(dir) => dir.clone(),
        None => paths::install_dir()?,
    };

    installer::install_asset(&downloaded, kind, &install_dir, app_slug)
}

/// Render download progress on a single rewritten line
async fn report_progress(mut rx: mpsc::Receiver<DownloadProgress>) {
    while let Some(update) = rx.recv().await {
        match update.fraction() {
            Some(fraction) => {
                print!("\r  Downloading... {:>3.0}%", fraction * 100.0);
            }
            None => {
                print!(
                    "\r  Downloading... {:.1} MiB",
                    update.downloaded as f64 / (1024.0 * 1024.0)
                );
            }
        }
        let _ = io::stdout().flush();
    }
    println!();
}
