//! Authentication CLI command handlers

use std::process::Command;

use crate::cli::commands::AuthCommand;
use crate::core::token_store::TokenStore;
use crate::error::Result;
use crate::github::auth::DeviceFlowAuth;
use crate::github::client::GitHubClient;
use crate::github::users::UsersHandler;

/// Handle authentication commands
pub async fn handle_auth(command: AuthCommand) -> Result<()> {
    match command {
        AuthCommand::Login => handle_login().await,
        AuthCommand::Logout => handle_logout(),
        AuthCommand::Status => handle_status().await,
    }
}

/// Handle the login command using the OAuth device flow
async fn handle_login() -> Result<()> {
    if TokenStore::is_authenticated()? {
        println!("✓ Already authenticated with GitHub.");
        println!();
        println!("  To re-authenticate, first run: ghstore auth logout");
        return Ok(());
    }

    println!("Starting GitHub authentication...\n");

    let auth = DeviceFlowAuth::new();
    let device_code = auth.request_device_code().await?;

    println!("┌────────────────────────────────────┐");
    println!("│  Your code:  {:<21} │", device_code.user_code);
    println!("└────────────────────────────────────┘");
    println!();
    println!("Open this URL in your browser:");
    println!("  {}", device_code.verification_uri);
    println!();

    if open_browser(&device_code.verification_uri) {
        println!("✓ Browser opened automatically.");
    }

    println!("Enter the code shown above and authorize the app.");
    println!();
    println!("Waiting for authorization...");

    let token = auth.poll_for_token(&device_code).await?;
    TokenStore::save(&token)?;

    println!("\n✓ Successfully authenticated with GitHub!");

    // Greet the user to confirm the token actually works
    let client = GitHubClient::with_token(Some(token.access_token.clone()))?;
    if let Ok(profile) = UsersHandler::new(&client).authenticated().await {
        println!("  Logged in as @{}", profile.login);
    }

    Ok(())
}

/// Handle the logout command
fn handle_logout() -> Result<()> {
    if !TokenStore::is_authenticated()? {
        println!("Not currently authenticated.");
        return Ok(());
    }

    TokenStore::clear()?;
    println!("Successfully logged out.");
    Ok(())
}

/// Handle the status command
async fn handle_status() -> Result<()> {
    match TokenStore::load()? {
        None => {
            println!("Not authenticated.");
            println!();
            println!("  Run: ghstore auth login");
        }
        Some(token) => {
            println!("Authenticated with GitHub.");
            println!("  Token: {}", TokenStore::mask_token(&token.access_token));
            if !token.scope.is_empty() {
                println!("  Scopes: {}", token.scope);
            }
            println!(
                "  Obtained: {}",
                token.created_at.format("%Y-%m-%d %H:%M UTC")
            );

            let client = GitHubClient::with_token(Some(token.access_token.clone()))?;
            match UsersHandler::new(&client).authenticated().await {
                Ok(profile) => println!("  Logged in as @{}", profile.login),
                Err(e) => println!("  Warning: token check failed: {}", e),
            }
        }
    }
    Ok(())
}

/// Try to open a URL in the default browser
fn open_browser(url: &str) -> bool {
    #[cfg(target_os = "macos")]
    {
        Command::new("open").arg(url).spawn().is_ok()
    }

    #[cfg(target_os = "linux")]
    {
        Command::new("xdg-open").arg(url).spawn().is_ok()
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        let _ = url;
        false
    }
}
