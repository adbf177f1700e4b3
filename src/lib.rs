//! Questboard - missions, XP, badges and leaderboards for a directory and
//! review platform
//!
//! The CRUD layer (reviews, check-ins, votes, follows, photos) reports what
//! users did after its own writes commit; Questboard turns that into
//! mission progress, XP, levels, streaks and badges, and periodically
//! resets missions and rebuilds the leaderboards.
//!
//! ## Entry Points
//!
//! 1. **Engine**: [`MissionEngine`] exposes `record_progress`,
//!    `set_progress_absolute`, `grant_xp` and `handle_event`.
//!
//! 2. **Jobs**: [`jobs::JobRunner`] runs the daily, weekly and monthly
//!    resets and the leaderboard refresh; [`jobs::Scheduler`] fires them on
//!    the operator's local calendar.

pub mod config;
pub mod error;
pub mod gamification;
pub mod jobs;
pub mod models;
pub mod store;
pub mod time_window;

pub use config::Config;
pub use error::{EngineError, Result};
pub use gamification::MissionEngine;
pub use store::GameDb;
