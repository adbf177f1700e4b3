//! Settings configuration types

mod rewards;
mod scheduler;

pub use rewards::RewardSettings;
pub use scheduler::SchedulerSettings;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Database settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Database file. `~` expands to the home directory.
    /// Default: ~/.questboard/questboard.db
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// How long a writer waits for the SQLite write lock before failing
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

/// Operator timezone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSettings {
    /// Fixed UTC offset such as "+00:00" or "-03:00". Days, weeks
    /// (starting Monday) and months are computed in this offset.
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
}

fn default_utc_offset() -> String {
    "+00:00".to_string()
}

impl Default for TimeSettings {
    fn default() -> Self {
        Self {
            utc_offset: default_utc_offset(),
        }
    }
}

/// Leaderboard settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardSettings {
    /// Rows kept per board on every refresh
    #[serde(default = "default_leaderboard_size")]
    pub size: usize,
}

fn default_leaderboard_size() -> usize {
    100
}

impl Default for LeaderboardSettings {
    fn default() -> Self {
        Self {
            size: default_leaderboard_size(),
        }
    }
}
