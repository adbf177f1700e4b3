//! Activity streak tracking
//!
//! A streak counts consecutive local days with at least one XP grant.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Streak fields of a user row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakInfo {
    pub current: u32,
    pub longest: u32,
    pub last_activity_day: Option<NaiveDate>,
}

impl StreakInfo {
    /// Streak after activity on `today`.
    ///
    /// Activity yesterday extends the streak, activity earlier today keeps
    /// it, anything else (a gap, no history, or a date after today) starts
    /// over at 1.
    pub fn advance(&self, today: NaiveDate) -> StreakInfo {
        let current = match self.last_activity_day {
            Some(last) if last == today => self.current.max(1),
            Some(last) if last.succ_opt() == Some(today) => self.current.saturating_add(1),
            _ => 1,
        };
        StreakInfo {
            current,
            longest: self.longest.max(current),
            last_activity_day: Some(today),
        }
    }

    /// Activity today or yesterday
    pub fn is_active(&self, today: NaiveDate) -> bool {
        match self.last_activity_day {
            Some(last) => last == today || last.succ_opt() == Some(today),
            None => false,
        }
    }

    /// Whether activity on `today` would extend the streak
    pub fn can_extend(&self, today: NaiveDate) -> bool {
        self.last_activity_day
            .is_some_and(|last| last.succ_opt() == Some(today))
    }
}
