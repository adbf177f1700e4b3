//! Mission progress engine
//!
//! Entry points called by the CRUD layer after its own writes commit.
//! Every call runs in one immediate write transaction: the progress row,
//! the completion flag and every reward it triggers commit together or
//! not at all.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use rusqlite::Connection;

use super::checker::check_threshold_badges;
use super::clock::{Clock, SystemClock};
use super::dispatch::{self, Step};
use super::levels::{Level, level_for};
use super::streaks::StreakInfo;
use crate::config::RewardSettings;
use crate::error::{EngineError, Result};
use crate::models::{
    ActivityMetric, CounterUpdate, DomainEvent, GamificationEvent, LevelUp, Mission,
    NewUser, ProgressOutcome, ProgressStatus, RelatedEntity, Tracking, User, UserId, XpGrant,
    XpReason,
};
use crate::store::{GameDb, activity, badges, ledger, missions, progress, users};
use crate::time_window::local_date;

/// How a call changes the stored counter
#[derive(Debug, Clone, Copy)]
enum ProgressUpdate {
    Add(u32),
    Set(u32),
}

/// The gamification engine over one database
#[derive(Clone)]
pub struct MissionEngine {
    db: GameDb,
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
    rewards: RewardSettings,
}

impl MissionEngine {
    /// Engine on the wall clock with default flat rewards
    pub fn new(db: GameDb, offset: FixedOffset) -> Self {
        Self {
            db,
            clock: Arc::new(SystemClock),
            offset,
            rewards: RewardSettings::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_rewards(mut self, rewards: RewardSettings) -> Self {
        self.rewards = rewards;
        self
    }

    pub fn db(&self) -> &GameDb {
        &self.db
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Register a user with zeroed aggregates
    pub fn register_user(&self, new_user: &NewUser) -> Result<User> {
        let now = self.clock.now();
        self.db.write(|tx| {
            let user = users::insert(tx, new_user, now)?;
            tracing::debug!("Registered user {} ({})", user.id, user.account_kind);
            Ok(user)
        })
    }

    /// Add `increment` to a user's progress on a counter mission.
    ///
    /// Completing the mission grants its XP and badge in the same
    /// transaction. Calls on an already-completed record change nothing.
    pub fn record_progress(
        &self,
        user_id: UserId,
        mission_id: &str,
        increment: i64,
    ) -> Result<ProgressOutcome> {
        let increment = non_negative(mission_id, increment)?;
        self.progress_call(user_id, mission_id, ProgressUpdate::Add(increment))
    }

    /// Overwrite a user's progress with a producer-computed total
    pub fn set_progress_absolute(
        &self,
        user_id: UserId,
        mission_id: &str,
        value: i64,
    ) -> Result<ProgressOutcome> {
        let value = non_negative(mission_id, value)?;
        self.progress_call(user_id, mission_id, ProgressUpdate::Set(value))
    }

    /// Append an XP transaction and update total XP, monthly XP, level and
    /// streak. Not idempotent: callers own deduplication.
    pub fn grant_xp(
        &self,
        user_id: UserId,
        amount: i64,
        reason: XpReason,
        related: Option<RelatedEntity>,
    ) -> Result<XpGrant> {
        let now = self.clock.now();
        self.db.write(|tx| {
            let mut grant = self.grant_in(tx, user_id, amount, reason, related.as_ref(), now)?;
            grant.badges_unlocked = self.settle_badges(tx, user_id, now)?;
            Ok(grant)
        })
    }

    /// Apply everything a domain event implies: mission progress, activity
    /// counters, flat XP and threshold badges, in one transaction.
    pub fn handle_event(&self, event: &DomainEvent) -> Result<Vec<GamificationEvent>> {
        let steps = dispatch::plan(event, &self.rewards);
        let participants = dispatch::participants(&steps);
        let now = self.clock.now();

        let events = self.db.write(|tx| {
            for user_id in &participants {
                users::require(tx, *user_id)?;
            }

            let mut events = Vec::new();
            for step in &steps {
                self.apply_step(tx, step, now, &mut events)?;
            }
            for user_id in &participants {
                for badge_id in self.settle_badges(tx, *user_id, now)? {
                    events.push(GamificationEvent::BadgeEarned {
                        user_id: *user_id,
                        badge_id,
                    });
                }
            }
            Ok::<_, EngineError>(events)
        })?;

        tracing::debug!("{} produced {} notifications", event.name(), events.len());
        Ok(events)
    }

    /// [`Self::handle_event`] for producers that must not fail because of
    /// gamification. Errors are logged and swallowed.
    pub fn track_event(&self, event: &DomainEvent) -> Vec<GamificationEvent> {
        match self.handle_event(event) {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!("Failed to apply {} event: {}", event.name(), e);
                Vec::new()
            }
        }
    }

    fn progress_call(
        &self,
        user_id: UserId,
        mission_id: &str,
        update: ProgressUpdate,
    ) -> Result<ProgressOutcome> {
        let now = self.clock.now();
        self.db.write(|tx| {
            users::require(tx, user_id)?;
            let mission = missions::require(tx, mission_id)?;
            let mut events = Vec::new();
            let mut outcome = self.apply_progress(tx, user_id, &mission, update, now, &mut events)?;
            if outcome.completed() {
                outcome.badges_unlocked = self.settle_badges(tx, user_id, now)?;
            }
            Ok(outcome)
        })
    }

    fn apply_step(
        &self,
        conn: &Connection,
        step: &Step,
        now: DateTime<Utc>,
        events: &mut Vec<GamificationEvent>,
    ) -> Result<()> {
        match step {
            Step::Progress {
                user_id,
                action,
                context,
                value,
            } => {
                let update = match action.tracking() {
                    Tracking::Counter => ProgressUpdate::Add(*value),
                    Tracking::Absolute => ProgressUpdate::Set(*value),
                };
                for mission in missions::for_action(conn, *action)? {
                    if mission.requirement.applies_to(*action, context) {
                        self.apply_progress(conn, *user_id, &mission, update, now, events)?;
                    }
                }
            }
            Step::Counter {
                user_id,
                metric,
                update,
            } => activity::apply(conn, *user_id, *metric, *update)?,
            Step::Xp {
                user_id,
                amount,
                reason,
                related,
            } => {
                let grant =
                    self.grant_in(conn, *user_id, i64::from(*amount), *reason, Some(related), now)?;
                push_grant_events(events, &grant, *reason);
            }
        }
        Ok(())
    }

    /// Core progress algorithm; the caller has verified the user exists
    fn apply_progress(
        &self,
        conn: &Connection,
        user_id: UserId,
        mission: &Mission,
        update: ProgressUpdate,
        now: DateTime<Utc>,
        events: &mut Vec<GamificationEvent>,
    ) -> Result<ProgressOutcome> {
        let target = mission.target();
        let existing = progress::get(conn, user_id, &mission.id)?;
        let current = existing.as_ref().map_or(0, |p| p.progress);
        let outcome = |status, progress| ProgressOutcome {
            mission_id: mission.id.clone(),
            status,
            progress,
            target,
            xp_awarded: 0,
            badge_awarded: None,
            badges_unlocked: Vec::new(),
            level_up: None,
        };

        if !mission.is_available(now) {
            tracing::debug!("Mission {} is not available, ignoring progress", mission.id);
            return Ok(outcome(ProgressStatus::Inactive, current));
        }
        if existing.as_ref().is_some_and(|p| p.completed) {
            return Ok(outcome(ProgressStatus::AlreadyCompleted, current));
        }

        let stored = match update {
            ProgressUpdate::Add(n) => progress::add(conn, user_id, &mission.id, n, now)?,
            ProgressUpdate::Set(n) => progress::set(conn, user_id, &mission.id, n, now)?,
        };
        let Some(stored) = stored else {
            return Ok(outcome(ProgressStatus::AlreadyCompleted, current));
        };

        if stored < target || !progress::mark_completed(conn, user_id, &mission.id, now)? {
            events.push(GamificationEvent::MissionProgressed {
                user_id,
                mission_id: mission.id.clone(),
                progress: stored,
                target,
            });
            return Ok(outcome(ProgressStatus::InProgress, stored));
        }

        let mut done = outcome(ProgressStatus::NewlyCompleted, stored);
        events.push(GamificationEvent::MissionCompleted {
            user_id,
            mission_id: mission.id.clone(),
            xp_reward: i64::from(mission.xp_reward),
        });

        if mission.xp_reward > 0 {
            let related = RelatedEntity::Mission(mission.id.clone());
            let grant = self.grant_in(
                conn,
                user_id,
                i64::from(mission.xp_reward),
                XpReason::MissionCompleted,
                Some(&related),
                now,
            )?;
            push_grant_events(events, &grant, XpReason::MissionCompleted);
            done.xp_awarded = grant.amount;
            done.level_up = grant.level_up;
        }

        if let Some(badge_id) = &mission.badge_reward {
            if badges::grant(conn, user_id, badge_id, now)? {
                events.push(GamificationEvent::BadgeEarned {
                    user_id,
                    badge_id: badge_id.clone(),
                });
                done.badge_awarded = Some(badge_id.clone());
            }
        }

        activity::apply(
            conn,
            user_id,
            ActivityMetric::MissionsCompleted,
            CounterUpdate::Add(1),
        )?;

        tracing::info!(
            "User {} completed mission {} (+{} XP)",
            user_id,
            mission.id,
            done.xp_awarded
        );
        Ok(done)
    }

    /// Ledger append plus aggregate update, inside the caller's transaction
    fn grant_in(
        &self,
        conn: &Connection,
        user_id: UserId,
        amount: i64,
        reason: XpReason,
        related: Option<&RelatedEntity>,
        now: DateTime<Utc>,
    ) -> Result<XpGrant> {
        let user = users::require(conn, user_id)?;
        // The ledger must keep summing to the cached total
        let (Some(total_xp), Some(monthly_xp)) = (
            user.total_xp.checked_add(amount),
            user.monthly_xp.checked_add(amount),
        ) else {
            return Err(EngineError::XpOverflow { user_id, amount });
        };
        ledger::append(conn, user_id, amount, reason, related, now)?;

        let level = level_for(total_xp);

        let today = local_date(now, self.offset);
        let before = StreakInfo {
            current: user.current_streak,
            longest: user.longest_streak,
            last_activity_day: user.last_activity_date,
        };
        let streak = before.advance(today);
        users::apply_xp(conn, user_id, total_xp, monthly_xp, level, &streak)?;

        let level_up = (level > user.level).then(|| LevelUp {
            old_level: user.level,
            new_level: level,
            new_title: Level::title_of(level).to_string(),
        });
        if let Some(up) = &level_up {
            tracing::info!("User {} reached level {} ({})", user_id, up.new_level, up.new_title);
        }
        tracing::debug!(
            "Granted {} XP to {} for {} (total {})",
            amount,
            user_id,
            reason,
            total_xp
        );

        Ok(XpGrant {
            user_id,
            amount,
            total_xp,
            monthly_xp,
            level,
            level_up,
            current_streak: streak.current,
            streak_extended: before.can_extend(today),
            badges_unlocked: Vec::new(),
        })
    }

    /// Grant every threshold badge the user now qualifies for
    fn settle_badges(
        &self,
        conn: &Connection,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>> {
        let user = users::require(conn, user_id)?;
        let counters = activity::get(conn, user_id)?;
        let definitions = badges::list_threshold(conn)?;
        let earned = badges::earned_ids(conn, user_id)?;

        let mut granted = Vec::new();
        for badge_id in check_threshold_badges(&definitions, &counters, &user, &earned) {
            if badges::grant(conn, user_id, &badge_id, now)? {
                tracing::info!("User {} earned badge {}", user_id, badge_id);
                granted.push(badge_id);
            }
        }
        Ok(granted)
    }
}

fn push_grant_events(events: &mut Vec<GamificationEvent>, grant: &XpGrant, reason: XpReason) {
    events.push(GamificationEvent::XpAwarded {
        user_id: grant.user_id,
        amount: grant.amount,
        reason: reason.to_string(),
    });
    if grant.streak_extended {
        events.push(GamificationEvent::StreakExtended {
            user_id: grant.user_id,
            count: grant.current_streak,
        });
    }
    if let Some(level_up) = &grant.level_up {
        events.push(GamificationEvent::level_up(grant.user_id, level_up));
    }
}

/// Negative progress is a caller bug; values past `u32::MAX` saturate
fn non_negative(mission_id: &str, value: i64) -> Result<u32> {
    if value < 0 {
        return Err(EngineError::NegativeProgress {
            mission_id: mission_id.to_string(),
            value,
        });
    }
    Ok(u32::try_from(value).unwrap_or(u32::MAX))
}
