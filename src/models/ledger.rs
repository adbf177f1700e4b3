//! XP ledger records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserId;

/// Why XP was granted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XpReason {
    MissionCompleted,
    ReviewWritten,
    MeaningfulReview,
    CheckIn,
    VerifiedCheckIn,
    VoteCast,
    HelpfulVoteReceived,
    FollowCreated,
    PhotoUploaded,
    HighResPhoto,
    /// Manual operator correction, may be negative
    Adjustment,
}

impl XpReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissionCompleted => "mission_completed",
            Self::ReviewWritten => "review_written",
            Self::MeaningfulReview => "meaningful_review",
            Self::CheckIn => "check_in",
            Self::VerifiedCheckIn => "verified_check_in",
            Self::VoteCast => "vote_cast",
            Self::HelpfulVoteReceived => "helpful_vote_received",
            Self::FollowCreated => "follow_created",
            Self::PhotoUploaded => "photo_uploaded",
            Self::HighResPhoto => "high_res_photo",
            Self::Adjustment => "adjustment",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|r| r.as_str() == s)
    }

    pub fn all() -> &'static [XpReason] {
        &[
            Self::MissionCompleted,
            Self::ReviewWritten,
            Self::MeaningfulReview,
            Self::CheckIn,
            Self::VerifiedCheckIn,
            Self::VoteCast,
            Self::HelpfulVoteReceived,
            Self::FollowCreated,
            Self::PhotoUploaded,
            Self::HighResPhoto,
            Self::Adjustment,
        ]
    }
}

impl std::fmt::Display for XpReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Entity an XP transaction refers to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RelatedEntity {
    Mission(String),
    Badge(String),
    Review(String),
    CheckIn(String),
    Vote(String),
    Follow(String),
    Photo(String),
}

impl RelatedEntity {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Mission(_) => "mission",
            Self::Badge(_) => "badge",
            Self::Review(_) => "review",
            Self::CheckIn(_) => "check_in",
            Self::Vote(_) => "vote",
            Self::Follow(_) => "follow",
            Self::Photo(_) => "photo",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Mission(id)
            | Self::Badge(id)
            | Self::Review(id)
            | Self::CheckIn(id)
            | Self::Vote(id)
            | Self::Follow(id)
            | Self::Photo(id) => id,
        }
    }

    /// Rebuild from the `(related_kind, related_id)` column pair
    pub fn from_parts(kind: &str, id: String) -> Option<Self> {
        match kind {
            "mission" => Some(Self::Mission(id)),
            "badge" => Some(Self::Badge(id)),
            "review" => Some(Self::Review(id)),
            "check_in" => Some(Self::CheckIn(id)),
            "vote" => Some(Self::Vote(id)),
            "follow" => Some(Self::Follow(id)),
            "photo" => Some(Self::Photo(id)),
            _ => None,
        }
    }
}

/// Append-only audit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XpTransaction {
    pub id: i64,
    pub user_id: UserId,
    pub amount: i64,
    pub reason: XpReason,
    pub related: Option<RelatedEntity>,
    pub created_at: DateTime<Utc>,
}
