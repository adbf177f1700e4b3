//! XP and Level system
//!
//! Defines level thresholds and titles.

use serde::{Deserialize, Serialize};

/// Level definition
#[derive(Debug, Clone)]
pub struct Level {
    pub level: u32,
    pub xp_required: i64,
    pub title: &'static str,
}

/// All level definitions (must be sorted by level)
pub static LEVELS: &[Level] = &[
    Level {
        level: 1,
        xp_required: 0,
        title: "Newcomer",
    },
    Level {
        level: 2,
        xp_required: 100,
        title: "Explorer",
    },
    Level {
        level: 3,
        xp_required: 300,
        title: "Regular",
    },
    Level {
        level: 4,
        xp_required: 700,
        title: "Local Guide",
    },
    Level {
        level: 5,
        xp_required: 1500,
        title: "Connoisseur",
    },
    Level {
        level: 6,
        xp_required: 3000,
        title: "Critic",
    },
    Level {
        level: 7,
        xp_required: 6000,
        title: "Legend",
    },
];

/// Level number for a cumulative XP total. Negative totals count as zero.
pub fn level_for(total_xp: i64) -> u32 {
    Level::for_xp(total_xp).level
}

impl Level {
    /// Calculate level and title for given XP
    pub fn for_xp(xp: i64) -> &'static Level {
        let xp = xp.max(0);
        LEVELS
            .iter()
            .rev()
            .find(|l| xp >= l.xp_required)
            .unwrap_or(&LEVELS[0])
    }

    /// Get XP needed for next level (None if max level)
    pub fn xp_for_next(current_level: u32) -> Option<i64> {
        LEVELS
            .iter()
            .find(|l| l.level == current_level + 1)
            .map(|l| l.xp_required)
    }

    /// Title for a level number
    pub fn title_of(level: u32) -> &'static str {
        LEVELS
            .iter()
            .find(|l| l.level == level)
            .map(|l| l.title)
            .unwrap_or(LEVELS[0].title)
    }

    /// Get max level
    pub fn max_level() -> u32 {
        LEVELS.last().map(|l| l.level).unwrap_or(1)
    }
}

/// Level position of a user, for display
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelInfo {
    pub total_xp: i64,
    pub level: u32,
    pub title: String,
    /// XP needed for current level
    pub current_level_xp: i64,
    /// XP needed for next level (None if max)
    pub next_level_xp: Option<i64>,
}

impl LevelInfo {
    pub fn new(total_xp: i64) -> Self {
        let level_info = Level::for_xp(total_xp);
        let next_xp = Level::xp_for_next(level_info.level);

        Self {
            total_xp,
            level: level_info.level,
            title: level_info.title.to_string(),
            current_level_xp: level_info.xp_required,
            next_level_xp: next_xp,
        }
    }

    /// Calculate progress percentage to next level (0.0 - 1.0)
    pub fn progress_to_next(&self) -> f32 {
        match self.next_level_xp {
            Some(next) => {
                let xp_in_level = (self.total_xp.max(0) - self.current_level_xp).max(0);
                let xp_for_level = next - self.current_level_xp;
                if xp_for_level <= 0 {
                    1.0
                } else {
                    (xp_in_level as f32) / (xp_for_level as f32)
                }
            }
            None => 1.0, // Max level
        }
    }

    pub fn is_max_level(&self) -> bool {
        self.next_level_xp.is_none()
    }
}
