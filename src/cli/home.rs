//! Home feed CLI command handler

use crate::core::installer::Platform;
use crate::error::Result;
use crate::github::client::GitHubClient;
use crate::github::trending::TrendingHandler;
use crate::github::types::Repo;

/// Handle the home command: trending repos with installable releases
pub async fn handle_home(page: u32) -> Result<()> {
    let client = GitHubClient::new()?;
    let trending = TrendingHandler::new(&client);

    println!("Fetching trending apps (this checks each repo's releases)...\n");
    let feed = trending.trending(Platform::current(), page).await?;

    if feed.items.is_empty() {
        println!("Nothing trending with an installable release right now.");
        return Ok(());
    }

    print_repo_list(&feed.items);

    if feed.has_more {
        println!();
        println!("More: ghstore home --page {}", feed.next_page);
    }
    Ok(())
}

/// Print a repo table shared by home and search output
pub fn print_repo_list(repos: &[Repo]) {
    for repo in repos {
        let language = repo.language.as_deref().unwrap_or("-");
        println!(
            "  {:<40} ★ {:<8} {}",
            repo.full_name, repo.stargazers_count, language
        );
        if let Some(description) = &repo.description {
            println!("    {}", truncate(description, 100));
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate("short", 100), "short");
        let long = "é".repeat(150);
        let cut = truncate(&long, 100);
        assert_eq!(cut.chars().count(), 101);
        assert!(cut.ends_with('…'));
    }
}
