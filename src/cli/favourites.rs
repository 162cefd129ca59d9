//! Favourites CLI command handlers

use chrono::Utc;

use crate::cli::commands::FavCommand;
use crate::cli::parse_repo_slug;
use crate::core::db::{Database, FavouriteRepo};
use crate::error::Result;
use crate::github::client::GitHubClient;
use crate::github::repos::RepoHandler;

/// Handle favourites commands
pub async fn handle_fav(command: FavCommand) -> Result<()> {
    match command {
        FavCommand::List => handle_list(),
        FavCommand::Add { repo } => handle_add(repo).await,
        FavCommand::Remove { repo } => handle_remove(repo).await,
    }
}

fn handle_list() -> Result<()> {
    let db = Database::open()?;
    let favourites = db.get_favourites()?;

    if favourites.is_empty() {
        println!("No favourites yet.");
        println!();
        println!("  Add one with: ghstore fav add owner/repo");
        return Ok(());
    }

    for fav in &favourites {
        let language = fav.language.as_deref().unwrap_or("-");
        println!("  {}/{:<35} {}", fav.repo_owner, fav.repo_name, language);
        if let Some(description) = &fav.description {
            println!("    {}", description);
        }
    }
    Ok(())
}

async fn handle_add(slug: String) -> Result<()> {
    let (owner, name) = parse_repo_slug(&slug)?;

    // Fetch the repo so the local row carries real metadata
    let client = GitHubClient::new()?;
    let repo = RepoHandler::new(&client).get(&owner, &name).await?;

    let db = Database::open()?;
    db.add_favourite(&FavouriteRepo {
        repo_id: repo.id,
        repo_owner: repo.owner.login,
        repo_name: repo.name,
        description: repo.description,
        language: repo.language,
        html_url: repo.html_url,
        added_at: Utc::now(),
    })?;

    println!("✓ Added {} to favourites.", repo.full_name);
    Ok(())
}

async fn handle_remove(slug: String) -> Result<()> {
    let (owner, name) = parse_repo_slug(&slug)?;

    let db = Database::open()?;
    let removed = db
        .get_favourites()?
        .into_iter()
        .find(|f| f.repo_owner == owner && f.repo_name == name)
        .map(|f| db.remove_favourite(f.repo_id))
        .transpose()?
        .unwrap_or(false);

    if removed {
        println!("✓ Removed {}/{} from favourites.", owner, name);
    } else {
        println!("{}/{} was not in your favourites.", owner, name);
    }
    Ok(())
}
