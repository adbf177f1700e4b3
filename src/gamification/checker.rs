//! Badge threshold checking
//!
//! Pure: decides which badges a user has newly earned from their counters.

use crate::models::{ActivityCounters, Badge, User};

/// Ids of active threshold badges the user qualifies for and does not hold
pub fn check_threshold_badges(
    badges: &[Badge],
    counters: &ActivityCounters,
    user: &User,
    earned: &[String],
) -> Vec<String> {
    let mut newly_unlocked = Vec::new();

    for badge in badges.iter().filter(|b| b.active) {
        let Some(requirement) = badge.requirement else {
            continue;
        };
        if counters.value(requirement.metric, user) >= u64::from(requirement.threshold)
            && !earned.contains(&badge.id)
        {
            newly_unlocked.push(badge.id.clone());
        }
    }

    newly_unlocked
}
