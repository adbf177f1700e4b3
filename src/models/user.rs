//! User accounts and their cached gamification aggregates

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;

/// Account category. Only players take part in rankings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// Regular visitor account
    Player,
    /// Employee of a listed establishment
    Employee,
    /// Platform staff (moderators, admins)
    Staff,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Employee => "employee",
            Self::Staff => "staff",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "player" => Some(Self::Player),
            "employee" => Some(Self::Employee),
            "staff" => Some(Self::Staff),
            _ => None,
        }
    }

    /// Non-player accounts never appear on a leaderboard
    pub fn is_player(&self) -> bool {
        matches!(self, Self::Player)
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user row with its cached XP, level and streak
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub display_name: String,
    pub account_kind: AccountKind,
    pub total_xp: i64,
    pub level: u32,
    /// Reset to zero on the first of every month
    pub monthly_xp: i64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_activity_date: Option<NaiveDate>,
    /// Soft deactivation flag; users are never deleted
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Registration payload
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: UserId,
    pub display_name: String,
    pub account_kind: AccountKind,
}

impl NewUser {
    pub fn player(display_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            display_name: display_name.into(),
            account_kind: AccountKind::Player,
        }
    }

    pub fn with_kind(display_name: impl Into<String>, account_kind: AccountKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            display_name: display_name.into(),
            account_kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_kind_roundtrip_and_player_flag() {
        for kind in [AccountKind::Player, AccountKind::Employee, AccountKind::Staff] {
            assert_eq!(AccountKind::from_db(kind.as_str()), Some(kind));
        }
        assert!(AccountKind::Player.is_player());
        assert!(!AccountKind::Employee.is_player());
        assert!(!AccountKind::Staff.is_player());
        assert_eq!(AccountKind::from_db("visitor"), None);
    }
}
