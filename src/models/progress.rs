//! Mission progress records and engine outcomes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserId;

/// One row per (user, mission)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionProgress {
    pub user_id: UserId,
    pub mission_id: String,
    pub progress: u32,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// What a progress call did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    /// Progress stored, threshold not reached
    InProgress,
    /// This call crossed the threshold and granted the rewards
    NewlyCompleted,
    /// The record was already completed; nothing changed
    AlreadyCompleted,
    /// The mission is switched off or outside its window; nothing changed
    Inactive,
}

/// A change of level caused by an XP grant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUp {
    pub old_level: u32,
    pub new_level: u32,
    pub new_title: String,
}

/// Result of `record_progress` / `set_progress_absolute`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressOutcome {
    pub mission_id: String,
    pub status: ProgressStatus,
    pub progress: u32,
    pub target: u32,
    pub xp_awarded: i64,
    /// The mission's configured badge, when this call granted it
    pub badge_awarded: Option<String>,
    /// Threshold badges unlocked as a consequence of this call
    pub badges_unlocked: Vec<String>,
    pub level_up: Option<LevelUp>,
}

impl ProgressOutcome {
    /// True only for the call that completed the mission
    pub fn completed(&self) -> bool {
        self.status == ProgressStatus::NewlyCompleted
    }
}

/// Result of `grant_xp`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpGrant {
    pub user_id: UserId,
    pub amount: i64,
    pub total_xp: i64,
    pub monthly_xp: i64,
    pub level: u32,
    pub level_up: Option<LevelUp>,
    pub current_streak: u32,
    pub streak_extended: bool,
    pub badges_unlocked: Vec<String>,
}
