//! Configuration CLI command handlers

use crate::cli::commands::ConfigCommand;
use crate::core::config::Config;
use crate::core::paths;
use crate::error::Result;

const KEYS: [&str; 3] = ["sync_staleness_hours", "download_dir", "preferred_asset_kinds"];

/// Handle config commands
pub fn handle_config(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Get { key } => handle_get(key),
        ConfigCommand::Set { key, value } => handle_set(key, value),
    }
}

fn handle_get(key: Option<String>) -> Result<()> {
    let config = Config::load()?;

    match key {
        Some(key) => {
            println!("{}", config.get(&key)?);
        }
        None => {
            for key in KEYS {
                println!("{} = {}", key, config.get(key)?);
            }
            println!();
            println!("Config file: {}", paths::config_path()?.display());
        }
    }
    Ok(())
}

fn handle_set(key: String, value: String) -> Result<()> {
    let mut config = Config::load()?;
    config.set(&key, &value)?;
    config.save()?;
    println!("✓ {} = {}", key, config.get(&key)?);
    Ok(())
}
