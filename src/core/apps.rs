//! Installed-app registry and update checking

use chrono::Utc;
use semver::Version;

use crate::core::db::{Database, InstalledApp};
use crate::core::installer::InstallOutcome;
use crate::error::Result;
use crate::github::client::GitHubClient;
use crate::github::releases::ReleasesHandler;
use crate::github::types::{Asset, Release, Repo};

/// Outcome of an update check for one installed app
#[derive(Debug, Clone)]
pub struct UpdateStatus {
    pub app_id: String,
    pub installed_version: String,
    pub latest_version: Option<String>,
    pub update_available: bool,
}

/// Record a completed install in the registry and the history log
pub fn record_install(
    db: &Database,
    repo: &Repo,
    release: &Release,
    asset: &Asset,
    outcome: &InstallOutcome,
    previous_version: Option<&str>,
) -> Result<()> {
    let now = Utc::now();
    let app = InstalledApp {
        app_id: repo.full_name.clone(),
        repo_id: repo.id,
        repo_owner: repo.owner.login.clone(),
        repo_name: repo.name.clone(),
        description: repo.description.clone(),
        language: repo.language.clone(),
        html_url: repo.html_url.clone(),
        installed_version: release.tag_name.clone(),
        installed_asset_name: Some(asset.name.clone()),
        install_path: Some(outcome.path().display().to_string()),
        latest_version: Some(release.tag_name.clone()),
        latest_asset_name: Some(asset.name.clone()),
        update_available: false,
        installed_at: now,
        last_checked_at: now,
        last_updated_at: now,
    };
    db.upsert_installed_app(&app)?;

    db.record_update(
        &repo.full_name,
        &repo.owner.login,
        &repo.name,
        previous_version,
        &release.tag_name,
        true,
        None,
    )?;
    Ok(())
}

/// Log a failed install attempt without touching the registry
pub fn record_failed_install(
    db: &Database,
    repo: &Repo,
    attempted_version: &str,
    previous_version: Option<&str>,
    error: &str,
) -> Result<()> {
    db.record_update(
        &repo.full_name,
        &repo.owner.login,
        &repo.name,
        previous_version,
        attempted_version,
        false,
        Some(error),
    )
}

/// Check every installed app against its latest stable release and
/// persist the result.
///
/// A repo whose release lookup fails keeps its previous status; the
/// check reports on the rest.
pub async fn check_updates(client: &GitHubClient, db: &Database) -> Result<Vec<UpdateStatus>> {
    let releases = ReleasesHandler::new(client);
    let apps = db.get_installed_apps()?;
    let mut statuses = Vec::with_capacity(apps.len());

    for app in apps {
        let latest = match releases.latest_stable(&app.repo_owner, &app.repo_name).await {
            Ok(release) => release,
            Err(e) => {
                tracing::warn!(app = %app.app_id, error = %e, "update check failed");
                continue;
            }
        };

        let latest_tag = latest.as_ref().map(|r| r.tag_name.clone());
        let update_available = latest_tag
            .as_deref()
            .is_some_and(|tag| is_newer(&app.installed_version, tag));

        db.set_update_status(
            &app.app_id,
            latest_tag.as_deref(),
            latest.as_ref().and_then(|r| r.assets.first().map(|a| a.name.clone())).as_deref(),
            update_available,
        )?;

        statuses.push(UpdateStatus {
            app_id: app.app_id,
            installed_version: app.installed_version,
            latest_version: latest_tag,
            update_available,
        });
    }

    Ok(statuses)
}

/// Whether `latest` is a newer version than `installed`.
///
/// Compares semver when both tags parse (ignoring a leading `v`);
/// otherwise any differing tag counts as an update, since projects
/// with non-semver tags still move forward.
pub fn is_newer(installed: &str, latest: &str) -> bool {
    let parse = |tag: &str| Version::parse(tag.trim_start_matches('v')).ok();

    match (parse(installed), parse(latest)) {
        (Some(current), Some(candidate)) => candidate > current,
        _ => installed != latest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semver_comparison_ignores_v_prefix() {
        assert!(is_newer("v1.0.0", "v1.1.0"));
        assert!(is_newer("1.0.0", "v2.0.0"));
        assert!(!is_newer("v2.0.0", "1.9.9"));
        assert!(!is_newer("v1.0.0", "v1.0.0"));
    }

    #[test]
    fn prerelease_tags_compare_below_release() {
        assert!(is_newer("v1.0.0-rc.1", "v1.0.0"));
        assert!(!is_newer("v1.0.0", "v1.0.0-rc.1"));
    }

    #[test]
    fn non_semver_tags_fall_back_to_inequality() {
        assert!(is_newer("build-2024-01", "build-2024-02"));
        assert!(!is_newer("nightly", "nightly"));
    }
}
