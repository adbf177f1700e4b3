//! Flat XP rewards for domain events

use serde::{Deserialize, Serialize};

/// XP granted directly for an action, independent of missions.
/// A zero amount disables the grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardSettings {
    pub review: u32,
    /// Extra XP when the review is meaningful
    pub meaningful_review_bonus: u32,
    pub check_in: u32,
    /// Replaces `check_in` when the visit was verified on site
    pub verified_check_in: u32,
    /// Granted to the voter
    pub vote: u32,
    /// Granted to the review author when a vote is helpful
    pub helpful_vote: u32,
    pub follow: u32,
    pub photo: u32,
    /// Extra XP for a high-resolution upload
    pub high_res_photo_bonus: u32,
}

impl Default for RewardSettings {
    fn default() -> Self {
        Self {
            review: 10,
            meaningful_review_bonus: 5,
            check_in: 5,
            verified_check_in: 10,
            vote: 1,
            helpful_vote: 2,
            follow: 2,
            photo: 5,
            high_res_photo_bonus: 3,
        }
    }
}
