//! Repository details CLI command handler

use crate::cli::parse_repo_slug;
use crate::core::db::Database;
use crate::core::installer::Platform;
use crate::error::Result;
use crate::github::client::GitHubClient;
use crate::github::releases::ReleasesHandler;
use crate::github::repos::RepoHandler;

/// Handle the show command: repo stats, latest release, assets
pub async fn handle_show(slug: String) -> Result<()> {
    let (owner, name) = parse_repo_slug(&slug)?;

    let client = GitHubClient::new()?;
    let repos = RepoHandler::new(&client);
    let releases = ReleasesHandler::new(&client);

    let repo = repos.get(&owner, &name).await?;

    println!("{}", repo.full_name);
    if let Some(description) = &repo.description {
        println!("{}", description);
    }
    println!();
    println!(
        "  ★ {}   forks {}   open issues {}",
        repo.stargazers_count, repo.forks_count, repo.open_issues_count
    );
    if let Some(language) = &repo.language {
        println!("  Language: {}", language);
    }
    if !repo.topics.is_empty() {
        println!("  Topics: {}", repo.topics.join(", "));
    }
    println!("  {}", repo.html_url);

    if let Ok(db) = Database::open() {
        if db.is_favourite(repo.id)? {
            println!("  ✓ In your favourites");
        }
        if let Some(app) = db.get_installed_app(&repo.full_name)? {
            println!("  ✓ Installed ({})", app.installed_version);
        }
    }

    if client.is_authenticated() {
        if let Ok(true) = repos.is_starred(&owner, &name).await {
            println!("  ✓ Starred by you");
        }
    }

    println!();
    match releases.latest_stable(&owner, &name).await? {
        None => println!("No stable release published."),
        Some(release) => {
            let title = release.name.as_deref().unwrap_or(&release.tag_name);
            println!("Latest release: {} ({})", title, release.tag_name);
            if let Some(published) = &release.published_at {
                println!("  Published: {}", published);
            }

            if release.assets.is_empty() {
                println!("  No assets attached.");
            } else {
                let platform = Platform::current();
                println!("  Assets:");
                for asset in &release.assets {
                    let marker = if platform.is_installable(&asset.name) {
                        "●"
                    } else {
                        " "
                    };
                    println!(
                        "    {} {:<50} {:>10}",
                        marker,
                        asset.name,
                        format_size(asset.size)
                    );
                }
                println!();
                println!("  ● installable on this machine");
            }
        }
    }

    Ok(())
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_sizes_human_readably() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KiB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MiB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.0 GiB");
    }
}
