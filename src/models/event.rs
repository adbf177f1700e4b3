//! Domain events produced by the CRUD layer and the notifications the
//! engine returns for them

use serde::{Deserialize, Serialize};

use super::progress::LevelUp;
use super::user::UserId;

/// Something a user did, reported after the producer's own write committed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    ReviewCreated {
        user_id: UserId,
        review_id: String,
        #[serde(default)]
        category: Option<String>,
        #[serde(default)]
        zone: Option<String>,
        /// Long enough to count as a meaningful review
        #[serde(default)]
        meaningful: bool,
    },
    CheckInCreated {
        user_id: UserId,
        check_in_id: String,
        #[serde(default)]
        category: Option<String>,
        #[serde(default)]
        zone: Option<String>,
        /// Within 100 m of the establishment, as computed by the producer
        #[serde(default)]
        verified: bool,
        /// Distinct establishments this user has checked in at, this one included
        unique_establishments: u32,
    },
    VoteCast {
        voter_id: UserId,
        vote_id: String,
        review_author_id: UserId,
        helpful: bool,
    },
    FollowCreated {
        follower_id: UserId,
        follow_id: String,
        followee_id: UserId,
    },
    PhotoUploaded {
        user_id: UserId,
        photo_id: String,
        /// Total uploads by this user, this one included
        upload_count: u32,
        /// Total high-resolution uploads by this user, this one included
        #[serde(default)]
        high_res_count: u32,
        #[serde(default)]
        high_resolution: bool,
    },
    PhotoApproved {
        user_id: UserId,
        photo_id: String,
    },
}

impl GamificationEvent {
    pub fn level_up(user_id: UserId, level_up: &LevelUp) -> Self {
        Self::LevelUp {
            user_id,
            old_level: level_up.old_level,
            new_level: level_up.new_level,
            new_title: level_up.new_title.clone(),
        }
    }
}

impl DomainEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ReviewCreated { .. } => "review_created",
            Self::CheckInCreated { .. } => "check_in_created",
            Self::VoteCast { .. } => "vote_cast",
            Self::FollowCreated { .. } => "follow_created",
            Self::PhotoUploaded { .. } => "photo_uploaded",
            Self::PhotoApproved { .. } => "photo_approved",
        }
    }
}

/// Notable consequences of handling an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GamificationEvent {
    XpAwarded {
        user_id: UserId,
        amount: i64,
        reason: String,
    },
    MissionProgressed {
        user_id: UserId,
        mission_id: String,
        progress: u32,
        target: u32,
    },
    MissionCompleted {
        user_id: UserId,
        mission_id: String,
        xp_reward: i64,
    },
    BadgeEarned {
        user_id: UserId,
        badge_id: String,
    },
    LevelUp {
        user_id: UserId,
        old_level: u32,
        new_level: u32,
        new_title: String,
    },
    StreakExtended {
        user_id: UserId,
        count: u32,
    },
}
