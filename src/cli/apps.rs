//! Installed-app CLI command handlers

use crate::cli::commands::AppsCommand;
use crate::cli::parse_repo_slug;
use crate::core::apps;
use crate::core::db::Database;
use crate::error::Result;
use crate::github::client::GitHubClient;

/// Handle apps commands
pub async fn handle_apps(command: AppsCommand) -> Result<()> {
    match command {
        AppsCommand::List => handle_list(),
        AppsCommand::CheckUpdates => handle_check_updates().await,
        AppsCommand::History { app, limit } => handle_history(app, limit),
        AppsCommand::Remove { repo } => handle_remove(repo),
    }
}

fn handle_list() -> Result<()> {
    let db = Database::open()?;
    let apps = db.get_installed_apps()?;

    if apps.is_empty() {
        println!("No apps installed through ghstore.");
        println!();
        println!("  Install one with: ghstore install owner/repo");
        return Ok(());
    }

    for app in &apps {
        let marker = if app.update_available { "↑" } else { " " };
        println!(
            "  {} {:<40} {:<12} installed {}",
            marker,
            app.app_id,
            app.installed_version,
            app.installed_at.format("%Y-%m-%d")
        );
        if app.update_available {
            if let Some(latest) = &app.latest_version {
                println!("      update available: {}", latest);
            }
        }
    }
    Ok(())
}

async fn handle_check_updates() -> Result<()> {
    let db = Database::open()?;
    if db.get_installed_apps()?.is_empty() {
        println!("No apps installed through ghstore.");
        return Ok(());
    }

    println!("Checking releases...\n");
    let client = GitHubClient::new()?;
    let statuses = apps::check_updates(&client, &db).await?;

    let mut updates = 0;
    for status in &statuses {
        if status.update_available {
            updates += 1;
            println!(
                "  ↑ {:<40} {} → {}",
                status.app_id,
                status.installed_version,
                status.latest_version.as_deref().unwrap_or("?")
            );
        }
    }

    if updates == 0 {
        println!("✓ Everything is up to date.");
    } else {
        println!();
        println!("Update with: ghstore install owner/repo");
    }
    Ok(())
}

fn handle_history(app: Option<String>, limit: usize) -> Result<()> {
    let db = Database::open()?;
    let records = db.get_update_history(app.as_deref(), limit)?;

    if records.is_empty() {
        println!("No install history.");
        return Ok(());
    }

    for record in &records {
        let outcome = if record.success { "✓" } else { "✗" };
        let transition = match &record.from_version {
            Some(from) => format!("{} → {}", from, record.to_version),
            None => record.to_version.clone(),
        };
        println!(
            "  {} {:<40} {:<24} {}",
            outcome,
            record.app_id,
            transition,
            record.updated_at.format("%Y-%m-%d %H:%M")
        );
        if let Some(error) = &record.error_message {
            println!("      {}", error);
        }
    }
    Ok(())
}

fn handle_remove(slug: String) -> Result<()> {
    let (owner, name) = parse_repo_slug(&slug)?;
    let app_id = format!("{owner}/{name}");

    let db = Database::open()?;
    match db.get_installed_app(&app_id)? {
        None => println!("{} is not in the installed registry.", app_id),
        Some(app) => {
            db.remove_installed_app(&app_id)?;
            println!("✓ Forgot {}.", app_id);
            if let Some(path) = &app.install_path {
                println!("  Files were left in place: {}", path);
            }
        }
    }
    Ok(())
}
