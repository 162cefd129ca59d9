//! Starred-cache CLI command handlers

use crate::cli::commands::StarredCommand;
use crate::cli::parse_repo_slug;
use crate::core::config::Config;
use crate::core::db::Database;
use crate::core::starred_sync;
use crate::error::Result;
use crate::github::client::GitHubClient;
use crate::github::repos::RepoHandler;

/// Handle starred commands
pub async fn handle_starred(command: StarredCommand) -> Result<()> {
    match command {
        StarredCommand::List => handle_list(),
        StarredCommand::Sync { force } => handle_sync(force).await,
        StarredCommand::Add { repo } => handle_add(repo).await,
        StarredCommand::Remove { repo } => handle_remove(repo).await,
    }
}

fn handle_list() -> Result<()> {
    let db = Database::open()?;
    let repos = db.get_starred()?;

    if repos.is_empty() {
        println!("No starred repos cached.");
        println!();
        println!("  Run: ghstore starred sync");
        return Ok(());
    }

    if let Some(synced_at) = db.starred_synced_at()? {
        println!(
            "Starred apps (synced {}):\n",
            synced_at.format("%Y-%m-%d %H:%M UTC")
        );
    }

    for repo in &repos {
        let version = repo.latest_version.as_deref().unwrap_or("-");
        println!(
            "  {}/{:<35} ★ {:<8} {}",
            repo.repo_owner, repo.repo_name, repo.stargazers_count, version
        );
    }
    Ok(())
}

async fn handle_sync(force: bool) -> Result<()> {
    let config = Config::load()?;
    let client = GitHubClient::new()?;
    let mut db = Database::open()?;

    println!("Syncing starred repos (filtering to installable apps)...");
    match starred_sync::sync(&client, &mut db, &config, force).await? {
        None => {
            println!("Cache is fresh; nothing to do.");
            println!();
            println!("  Force a refresh with: ghstore starred sync --force");
        }
        Some(count) => {
            println!("✓ Cached {} installable starred repos.", count);
        }
    }
    Ok(())
}

async fn handle_add(slug: String) -> Result<()> {
    let (owner, name) = parse_repo_slug(&slug)?;
    let client = GitHubClient::new()?;
    RepoHandler::new(&client).star(&owner, &name).await?;
    println!("✓ Starred {}/{}.", owner, name);
    println!("  The local cache updates on the next sync.");
    Ok(())
}

async fn handle_remove(slug: String) -> Result<()> {
    let (owner, name) = parse_repo_slug(&slug)?;
    let client = GitHubClient::new()?;
    RepoHandler::new(&client).unstar(&owner, &name).await?;
    println!("✓ Unstarred {}/{}.", owner, name);
    Ok(())
}
