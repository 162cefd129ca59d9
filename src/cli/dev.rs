//! Developer profile CLI command handler

use crate::cli::home::print_repo_list;
use crate::error::Result;
use crate::github::client::GitHubClient;
use crate::github::users::UsersHandler;

/// Handle the dev command: profile plus recent repositories
pub async fn handle_dev(login: String) -> Result<()> {
    let client = GitHubClient::new()?;
    let users = UsersHandler::new(&client);

    let profile = users.profile(&login).await?;

    match &profile.name {
        Some(name) => println!("{} (@{})", name, profile.login),
        None => println!("@{}", profile.login),
    }
    if let Some(bio) = &profile.bio {
        println!("{}", bio);
    }
    println!();
    println!(
        "  {} public repos   {} followers   {} following",
        profile.public_repos, profile.followers, profile.following
    );
    if let Some(company) = &profile.company {
        println!("  Company: {}", company);
    }
    if let Some(location) = &profile.location {
        println!("  Location: {}", location);
    }
    if let Some(blog) = profile.blog.as_deref().filter(|b| !b.is_empty()) {
        println!("  Blog: {}", blog);
    }
    println!("  {}", profile.html_url);

    let repos = users.repos(&login, 1).await?;
    if !repos.items.is_empty() {
        println!();
        println!("Recently updated repositories:\n");
        print_repo_list(&repos.items);
    }
    Ok(())
}
