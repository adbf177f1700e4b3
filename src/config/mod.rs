//! Configuration loading and management

mod io;
mod settings;

pub use settings::{
    DatabaseSettings, LeaderboardSettings, RewardSettings, SchedulerSettings, TimeSettings,
};

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::time_window::parse_offset;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Database location and locking
    #[serde(default)]
    pub database: DatabaseSettings,

    /// Operator timezone used for local days, weeks and months
    #[serde(default)]
    pub time: TimeSettings,

    /// Flat XP amounts for domain events
    #[serde(default)]
    pub rewards: RewardSettings,

    /// Leaderboard snapshot settings
    #[serde(default)]
    pub leaderboard: LeaderboardSettings,

    /// Cadence of the `run` daemon
    #[serde(default)]
    pub scheduler: SchedulerSettings,
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values that would only fail later at runtime
    pub fn validate(&self) -> Result<()> {
        self.time.offset()?;
        if self.leaderboard.size == 0 {
            anyhow::bail!("leaderboard.size must be at least 1");
        }
        if self.scheduler.leaderboard_interval_secs == 0 {
            anyhow::bail!("scheduler.leaderboard_interval_secs must be at least 1");
        }
        Ok(())
    }

    /// Database file, falling back to `~/.questboard/questboard.db`
    pub fn database_path(&self) -> PathBuf {
        match &self.database.path {
            Some(path) => expand_home(path),
            None => Self::global_config_dir().join("questboard.db"),
        }
    }

    /// Operator timezone as a fixed offset
    pub fn offset(&self) -> Result<FixedOffset> {
        self.time.offset()
    }
}

impl TimeSettings {
    pub fn offset(&self) -> Result<FixedOffset> {
        parse_offset(&self.utc_offset)
            .with_context(|| format!("Invalid time.utc_offset: {:?}", self.utc_offset))
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(rest),
        Err(_) => path.to_path_buf(),
    }
}
