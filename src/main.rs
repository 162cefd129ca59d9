//! ghstore - an unofficial app store for GitHub releases
//!
//! Browse, search, star, and install applications published as GitHub
//! release artifacts.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ghstore::cli::commands::{Cli, Commands};
use ghstore::cli::{apps, auth, config, details, dev, favourites, home, install, limits, search, starred};
use ghstore::error::Result;

#[tokio::main]
async fn main() {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Auth(args) => auth::handle_auth(args.command).await,
        Commands::Home { page } => home::handle_home(page).await,
        Commands::Search {
            query,
            platform,
            page,
        } => search::handle_search(query, platform, page).await,
        Commands::Show { repo } => details::handle_show(repo).await,
        Commands::Install { repo, asset } => install::handle_install(repo, asset).await,
        Commands::Starred(args) => starred::handle_starred(args.command).await,
        Commands::Fav(args) => favourites::handle_fav(args.command).await,
        Commands::Apps(args) => apps::handle_apps(args.command).await,
        Commands::Dev { login } => dev::handle_dev(login).await,
        Commands::Config(args) => config::handle_config(args.command),
        Commands::Limits => limits::handle_limits().await,
    }
}
