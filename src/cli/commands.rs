//! CLI command definitions using clap
//!
//! Defines the command structure for the `ghstore` CLI tool.

use clap::{Parser, Subcommand};

/// ghstore - an unofficial app store for GitHub releases
///
/// Browse, search, star, and install applications published as
/// GitHub release artifacts.
#[derive(Parser, Debug)]
#[command(name = "ghstore", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authenticate with GitHub
    Auth(AuthArgs),

    /// Browse trending installable apps
    Home {
        /// Result page
        #[arg(long, default_value = "1")]
        page: u32,
    },

    /// Search for installable repositories
    Search {
        /// Search query
        query: String,

        /// Platform filter: linux, macos, windows, or all
        #[arg(long, short)]
        platform: Option<String>,

        /// Result page
        #[arg(long, default_value = "1")]
        page: u32,
    },

    /// Show repository details and its latest release
    Show {
        /// Repository as owner/repo
        repo: String,
    },

    /// Download and install a repository's latest release
    Install {
        /// Repository as owner/repo
        repo: String,

        /// Install a specific asset by name instead of the best match
        #[arg(long)]
        asset: Option<String>,
    },

    /// Manage the local cache of your starred repos
    Starred(StarredArgs),

    /// Manage locally bookmarked repos
    Fav(FavArgs),

    /// Manage installed apps
    Apps(AppsArgs),

    /// Show a developer's profile and repositories
    Dev {
        /// GitHub login
        login: String,
    },

    /// Manage configuration
    Config(ConfigArgs),

    /// Show the last observed API rate-limit state
    Limits,
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Authentication commands
#[derive(Parser, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Login to GitHub via the OAuth device flow
    Login,
    /// Logout and remove the stored token
    Logout,
    /// Show current authentication status
    Status,
}

// ─────────────────────────────────────────────────────────────────────────────
// Starred Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Starred-cache commands
#[derive(Parser, Debug)]
pub struct StarredArgs {
    #[command(subcommand)]
    pub command: StarredCommand,
}

#[derive(Subcommand, Debug)]
pub enum StarredCommand {
    /// List the locally cached starred repos
    List,
    /// Refresh the cache from GitHub (skipped while fresh unless forced)
    Sync {
        /// Sync even if the cache is fresh
        #[arg(long)]
        force: bool,
    },
    /// Star a repo on GitHub
    Add {
        /// Repository as owner/repo
        repo: String,
    },
    /// Remove your star from a repo
    Remove {
        /// Repository as owner/repo
        repo: String,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Favourite Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Favourites commands
#[derive(Parser, Debug)]
pub struct FavArgs {
    #[command(subcommand)]
    pub command: FavCommand,
}

#[derive(Subcommand, Debug)]
pub enum FavCommand {
    /// List favourites
    List,
    /// Add a repo to favourites
    Add {
        /// Repository as owner/repo
        repo: String,
    },
    /// Remove a repo from favourites
    Remove {
        /// Repository as owner/repo
        repo: String,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Apps Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Installed-app commands
#[derive(Parser, Debug)]
pub struct AppsArgs {
    #[command(subcommand)]
    pub command: AppsCommand,
}

#[derive(Subcommand, Debug)]
pub enum AppsCommand {
    /// List installed apps
    List,
    /// Check installed apps for newer releases
    CheckUpdates,
    /// Show the install and update history
    History {
        /// Limit to one app (owner/repo)
        #[arg(long)]
        app: Option<String>,

        /// Maximum entries to show
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },
    /// Forget an installed app (does not remove files)
    Remove {
        /// Repository as owner/repo
        repo: String,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Config Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration commands
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show a setting (or all settings when no key is given)
    Get {
        /// Setting key
        key: Option<String>,
    },
    /// Change a setting
    Set {
        /// Setting key
        key: String,
        /// New value
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_search_with_platform() {
        let cli = Cli::parse_from(["ghstore", "search", "music player", "--platform", "linux"]);
        match cli.command {
            Commands::Search {
                query,
                platform,
                page,
            } => {
                assert_eq!(query, "music player");
                assert_eq!(platform.as_deref(), Some("linux"));
                assert_eq!(page, 1);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_starred_sync_force() {
        let cli = Cli::parse_from(["ghstore", "starred", "sync", "--force"]);
        match cli.command {
            Commands::Starred(args) => {
                assert!(matches!(args.command, StarredCommand::Sync { force: true }));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
