//! Per-user activity counters
//!
//! Written by the engine while handling domain events; read by badge
//! evaluation and the category leaderboards.

use serde::{Deserialize, Serialize};

use super::user::User;

/// A measurable quantity a badge threshold can refer to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityMetric {
    ReviewsWritten,
    MeaningfulReviews,
    CheckIns,
    VerifiedCheckIns,
    VotesCast,
    HelpfulVotesReceived,
    Follows,
    PhotosUploaded,
    HighResPhotos,
    PhotosApproved,
    UniqueEstablishments,
    MissionsCompleted,
    // Derived from the user row rather than the counters table
    Level,
    TotalXp,
    LongestStreak,
}

impl ActivityMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReviewsWritten => "reviews_written",
            Self::MeaningfulReviews => "meaningful_reviews",
            Self::CheckIns => "check_ins",
            Self::VerifiedCheckIns => "verified_check_ins",
            Self::VotesCast => "votes_cast",
            Self::HelpfulVotesReceived => "helpful_votes_received",
            Self::Follows => "follows",
            Self::PhotosUploaded => "photos_uploaded",
            Self::HighResPhotos => "high_res_photos",
            Self::PhotosApproved => "photos_approved",
            Self::UniqueEstablishments => "unique_establishments",
            Self::MissionsCompleted => "missions_completed",
            Self::Level => "level",
            Self::TotalXp => "total_xp",
            Self::LongestStreak => "longest_streak",
        }
    }

    pub fn from_db(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|m| m.as_str() == s)
    }

    pub fn all() -> &'static [ActivityMetric] {
        &[
            Self::ReviewsWritten,
            Self::MeaningfulReviews,
            Self::CheckIns,
            Self::VerifiedCheckIns,
            Self::VotesCast,
            Self::HelpfulVotesReceived,
            Self::Follows,
            Self::PhotosUploaded,
            Self::HighResPhotos,
            Self::PhotosApproved,
            Self::UniqueEstablishments,
            Self::MissionsCompleted,
            Self::Level,
            Self::TotalXp,
            Self::LongestStreak,
        ]
    }

    /// Column in `user_activity` backing this metric, if any.
    ///
    /// The names double as SQL identifiers, so this is the only place
    /// allowed to produce them.
    pub fn counter_column(&self) -> Option<&'static str> {
        match self {
            Self::Level | Self::TotalXp | Self::LongestStreak => None,
            other => Some(other.as_str()),
        }
    }
}

/// Counter row for one user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityCounters {
    pub reviews_written: u32,
    pub meaningful_reviews: u32,
    pub check_ins: u32,
    pub verified_check_ins: u32,
    pub votes_cast: u32,
    pub helpful_votes_received: u32,
    pub follows: u32,
    pub photos_uploaded: u32,
    pub high_res_photos: u32,
    pub photos_approved: u32,
    pub unique_establishments: u32,
    pub missions_completed: u32,
}

impl ActivityCounters {
    /// Current value of `metric` for this user
    pub fn value(&self, metric: ActivityMetric, user: &User) -> u64 {
        match metric {
            ActivityMetric::ReviewsWritten => self.reviews_written.into(),
            ActivityMetric::MeaningfulReviews => self.meaningful_reviews.into(),
            ActivityMetric::CheckIns => self.check_ins.into(),
            ActivityMetric::VerifiedCheckIns => self.verified_check_ins.into(),
            ActivityMetric::VotesCast => self.votes_cast.into(),
            ActivityMetric::HelpfulVotesReceived => self.helpful_votes_received.into(),
            ActivityMetric::Follows => self.follows.into(),
            ActivityMetric::PhotosUploaded => self.photos_uploaded.into(),
            ActivityMetric::HighResPhotos => self.high_res_photos.into(),
            ActivityMetric::PhotosApproved => self.photos_approved.into(),
            ActivityMetric::UniqueEstablishments => self.unique_establishments.into(),
            ActivityMetric::MissionsCompleted => self.missions_completed.into(),
            ActivityMetric::Level => user.level.into(),
            ActivityMetric::TotalXp => u64::try_from(user.total_xp).unwrap_or(0),
            ActivityMetric::LongestStreak => user.longest_streak.into(),
        }
    }
}

/// How an event changes a counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterUpdate {
    /// Add to the stored value
    Add(u32),
    /// Raise the stored value to at least this total
    AtLeast(u32),
}
