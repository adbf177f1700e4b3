//! Leaderboard snapshot rows

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaderboardKind {
    /// All-time XP
    Global,
    /// XP earned this calendar month
    Monthly,
    /// XP earned since local Monday midnight
    Weekly,
    /// Meaningful reviews written
    TopReviewers,
    /// Approved photos
    TopPhotographers,
    /// Verified check-ins, then all check-ins
    TopCheckIns,
    /// Helpful votes received
    MostHelpful,
}

impl LeaderboardKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "global",
            Self::Monthly => "monthly",
            Self::Weekly => "weekly",
            Self::TopReviewers => "top_reviewers",
            Self::TopPhotographers => "top_photographers",
            Self::TopCheckIns => "top_check_ins",
            Self::MostHelpful => "most_helpful",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.as_str() == s)
    }

    pub fn all() -> &'static [LeaderboardKind] {
        &[
            Self::Global,
            Self::Monthly,
            Self::Weekly,
            Self::TopReviewers,
            Self::TopPhotographers,
            Self::TopCheckIns,
            Self::MostHelpful,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Global => "All-time XP",
            Self::Monthly => "Monthly XP",
            Self::Weekly => "Weekly XP",
            Self::TopReviewers => "Top Reviewers",
            Self::TopPhotographers => "Top Photographers",
            Self::TopCheckIns => "Top Check-ins",
            Self::MostHelpful => "Most Helpful",
        }
    }
}

impl std::fmt::Display for LeaderboardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One ranked row of a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub board: LeaderboardKind,
    pub rank: u32,
    pub user_id: UserId,
    pub display_name: String,
    pub score: i64,
    /// Secondary ordering key (all check-ins on the check-in board)
    pub secondary_score: i64,
    pub refreshed_at: DateTime<Utc>,
}
