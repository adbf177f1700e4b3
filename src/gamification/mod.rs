//! Gamification layer: missions, XP, levels, streaks and badges
//!
//! [`MissionEngine`] is the only writer of progress, the XP ledger and the
//! cached user aggregates. Everything else here is pure.

pub mod catalog;
pub mod checker;
pub mod clock;
pub mod dispatch;
mod engine;
pub mod levels;
pub mod streaks;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::MissionEngine;
pub use levels::{LEVELS, Level, LevelInfo, level_for};
pub use streaks::StreakInfo;
