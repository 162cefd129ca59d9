//! Search CLI command handler

use crate::cli::home::print_repo_list;
use crate::core::installer::Platform;
use crate::error::{Result, StoreError};
use crate::github::client::GitHubClient;
use crate::github::search::SearchHandler;

/// Handle the search command
pub async fn handle_search(query: String, platform: Option<String>, page: u32) -> Result<()> {
    let platform = match platform.as_deref() {
        None => Platform::current(),
        Some(name) => Platform::parse(name).ok_or_else(|| {
            StoreError::InvalidInput(format!(
                "Unknown platform '{}'. Use linux, macos, windows, or all",
                name
            ))
        })?,
    };

    let client = GitHubClient::new()?;
    let search = SearchHandler::new(&client);
    let results = search.search(&query, platform, page).await?;

    if results.items.is_empty() {
        println!("No repositories matched '{}'.", query);
        return Ok(());
    }

    if let Some(total) = results.total_count {
        println!("{} matches ({} platform):\n", total, platform.name());
    }
    print_repo_list(&results.items);

    if results.has_more {
        println!();
        println!(
            "More: ghstore search '{}' --page {}",
            query, results.next_page
        );
    }
    Ok(())
}
