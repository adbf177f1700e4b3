//! Error type for the gamification engine
//!
//! Input errors (unknown ids, negative values, malformed definitions) are
//! caller bugs and always abort the operation before anything is written.
//! Business outcomes such as "already completed" are not errors; see
//! [`crate::models::ProgressStatus`].

use crate::models::UserId;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Unknown user: {0}")]
    UnknownUser(UserId),

    #[error("Unknown mission: {0}")]
    UnknownMission(String),

    #[error("Unknown badge: {0}")]
    UnknownBadge(String),

    #[error("Negative progress value {value} for mission {mission_id}")]
    NegativeProgress { mission_id: String, value: i64 },

    #[error("XP grant of {amount} would overflow the totals of user {user_id}")]
    XpOverflow { user_id: UserId, amount: i64 },

    #[error("Invalid requirement: {0}")]
    InvalidRequirement(String),

    #[error("Invalid mission {id}: {reason}")]
    InvalidMission { id: String, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EngineError {
    /// True for errors caused by bad input rather than by the store
    pub fn is_input_error(&self) -> bool {
        !matches!(self, Self::Database(_) | Self::Serialization(_))
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
