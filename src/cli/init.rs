//! Init command implementation

use anyhow::{Result, bail};
use std::path::Path;

use questboard::GameDb;
use questboard::config::Config;

/// Write a default config file and create the database
pub fn init_command(config_path: Option<&Path>, database: Option<&Path>, force: bool) -> Result<()> {
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::global_config_path);

    if config_path.exists() && !force {
        bail!(
            "Configuration already exists: {}\nUse --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config::default();
    config.save_to_file(&config_path)?;
    println!("Created: {}", config_path.display());

    let db_path = database
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.database_path());
    GameDb::open(&db_path)?;
    println!("Database: {}", db_path.display());
    println!("Run `questboard seed` to install the built-in missions and badges.");

    Ok(())
}
