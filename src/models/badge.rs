//! Badge definitions and grants

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::activity::ActivityMetric;
use super::user::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeCategory {
    Reviews,
    Photos,
    CheckIns,
    Social,
    Exploration,
    Progression,
    Missions,
}

impl BadgeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reviews => "reviews",
            Self::Photos => "photos",
            Self::CheckIns => "checkins",
            Self::Social => "social",
            Self::Exploration => "exploration",
            Self::Progression => "progression",
            Self::Missions => "missions",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "reviews" => Some(Self::Reviews),
            "photos" => Some(Self::Photos),
            "checkins" => Some(Self::CheckIns),
            "social" => Some(Self::Social),
            "exploration" => Some(Self::Exploration),
            "progression" => Some(Self::Progression),
            "missions" => Some(Self::Missions),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeRarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl BadgeRarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Uncommon => "uncommon",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "common" => Some(Self::Common),
            "uncommon" => Some(Self::Uncommon),
            "rare" => Some(Self::Rare),
            "epic" => Some(Self::Epic),
            "legendary" => Some(Self::Legendary),
            _ => None,
        }
    }
}

/// Unlock condition: `metric` must reach `threshold`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeRequirement {
    pub metric: ActivityMetric,
    pub threshold: u32,
}

/// Reference data for a badge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: BadgeCategory,
    pub rarity: BadgeRarity,
    /// `None` for badges only granted as mission rewards
    pub requirement: Option<BadgeRequirement>,
    pub active: bool,
    pub hidden: bool,
}

/// A badge earned by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserBadge {
    pub user_id: UserId,
    pub badge_id: String,
    pub earned_at: DateTime<Utc>,
}
