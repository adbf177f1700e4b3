//! Settings for the `run` daemon

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerSettings {
    /// Seconds between leaderboard refreshes
    #[serde(default = "default_leaderboard_interval_secs")]
    pub leaderboard_interval_secs: u64,

    /// Refresh leaderboards once as soon as the daemon starts
    #[serde(default = "default_true")]
    pub refresh_on_start: bool,

    /// Zero daily missions at local midnight
    #[serde(default = "default_true")]
    pub daily_reset: bool,

    /// Zero weekly missions at local Monday midnight
    #[serde(default = "default_true")]
    pub weekly_reset: bool,

    /// Zero monthly XP and monthly missions on the 1st
    #[serde(default = "default_true")]
    pub monthly_reset: bool,
}

fn default_leaderboard_interval_secs() -> u64 {
    3600
}

fn default_true() -> bool {
    true
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            leaderboard_interval_secs: default_leaderboard_interval_secs(),
            refresh_on_start: true,
            daily_reset: true,
            weekly_reset: true,
            monthly_reset: true,
        }
    }
}
