//! Data models for the gamification store
//!
//! These structures represent the rows stored in and queried from the
//! database plus the outcomes the engine reports to callers.

mod activity;
mod badge;
mod event;
mod leaderboard;
mod ledger;
mod mission;
mod progress;
mod requirement;
mod user;

pub use activity::{ActivityCounters, ActivityMetric, CounterUpdate};
pub use badge::{Badge, BadgeCategory, BadgeRarity, BadgeRequirement, UserBadge};
pub use event::{DomainEvent, GamificationEvent};
pub use leaderboard::{LeaderboardEntry, LeaderboardKind};
pub use ledger::{RelatedEntity, XpReason, XpTransaction};
pub use mission::{Mission, MissionType, ResetCadence};
pub use progress::{LevelUp, MissionProgress, ProgressOutcome, ProgressStatus, XpGrant};
pub use requirement::{Action, ActionContext, Requirement, Tracking};
pub use user::{AccountKind, NewUser, User, UserId};
