//! CLI command implementations

pub mod event;
pub mod init;
pub mod leaderboard;
pub mod progress;
pub mod reset;
pub mod run;
pub mod seed;
pub mod user;
pub mod xp;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context as _, Result};

use questboard::config::Config;
use questboard::jobs::JobRunner;
use questboard::models::{AccountKind, LeaderboardKind, XpReason};
use questboard::{GameDb, MissionEngine};

/// Loaded configuration plus an open database
pub struct Context {
    pub config: Config,
    pub db: GameDb,
}

impl Context {
    /// Load config (explicit path or the global one) and open the database
    /// (explicit path or the configured one)
    pub fn open(config_path: Option<&Path>, database: Option<&Path>) -> Result<Self> {
        let config = Config::load(config_path)?;
        let db_path = database
            .map(Path::to_path_buf)
            .unwrap_or_else(|| config.database_path());
        let db = GameDb::open_with_timeout(
            &db_path,
            Duration::from_millis(config.database.busy_timeout_ms),
        )
        .with_context(|| format!("Failed to open database: {}", db_path.display()))?;
        tracing::debug!("Using database {}", db_path.display());
        Ok(Self { config, db })
    }

    pub fn engine(&self) -> Result<MissionEngine> {
        Ok(MissionEngine::new(self.db.clone(), self.config.offset()?)
            .with_rewards(self.config.rewards.clone()))
    }

    pub fn runner(&self) -> Result<JobRunner> {
        Ok(JobRunner::new(
            self.db.clone(),
            self.config.offset()?,
            self.config.leaderboard.size,
        ))
    }
}

pub fn parse_account_kind(s: &str) -> Result<AccountKind, String> {
    AccountKind::from_db(&s.to_lowercase())
        .ok_or_else(|| format!("unknown account kind '{s}' (player, employee, staff)"))
}

pub fn parse_board(s: &str) -> Result<LeaderboardKind, String> {
    let normalized = s.to_lowercase().replace('-', "_");
    LeaderboardKind::from_db(&normalized).ok_or_else(|| {
        let known: Vec<_> = LeaderboardKind::all().iter().map(|k| k.as_str()).collect();
        format!("unknown board '{s}' ({})", known.join(", "))
    })
}

pub fn parse_reason(s: &str) -> Result<XpReason, String> {
    XpReason::from_db(&s.to_lowercase().replace('-', "_"))
        .ok_or_else(|| format!("unknown XP reason '{s}'"))
}
