//! Batch jobs: periodic resets and leaderboard refreshes
//!
//! [`JobRunner`] runs one job under the [`JobGuard`]; the CLI and the
//! `run` daemon both go through it, so a manual run and a scheduled one
//! never overlap.

mod guard;
pub mod leaderboard;
pub mod reset;
pub mod scheduler;

pub use guard::{JobGuard, JobKind, JobLease};
pub use leaderboard::{LeaderboardAggregator, RefreshSummary};
pub use reset::ResetSummary;
pub use scheduler::Scheduler;

use std::sync::Arc;

use anyhow::Result;
use chrono::FixedOffset;

use crate::gamification::{Clock, SystemClock};
use crate::store::GameDb;

/// Result of one job run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobReport {
    /// Another run of the same kind was active
    Skipped,
    Reset(ResetSummary),
    Monthly {
        xp_rows: usize,
        missions: ResetSummary,
    },
    Refreshed(RefreshSummary),
}

#[derive(Clone)]
pub struct JobRunner {
    db: GameDb,
    guard: JobGuard,
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
    leaderboard_size: usize,
}

impl JobRunner {
    pub fn new(db: GameDb, offset: FixedOffset, leaderboard_size: usize) -> Self {
        let guard = JobGuard::for_db(&db);
        Self {
            db,
            guard,
            clock: Arc::new(SystemClock),
            offset,
            leaderboard_size,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn guard(&self) -> &JobGuard {
        &self.guard
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Run `kind` now, or skip it if a run is already active
    pub fn run(&self, kind: JobKind) -> Result<JobReport> {
        let Some(_lease) = self.guard.try_acquire(kind)? else {
            tracing::warn!("Skipping {}: a previous run is still active", kind);
            return Ok(JobReport::Skipped);
        };

        let now = self.clock.now();
        tracing::debug!("Starting {} at {}", kind, now);
        let report = match kind {
            JobKind::DailyReset => JobReport::Reset(reset::daily_reset(&self.db, now)?),
            JobKind::WeeklyReset => JobReport::Reset(reset::weekly_reset(&self.db, now)?),
            JobKind::MonthlyReset => {
                let xp_rows = reset::monthly_xp_reset(&self.db)?;
                let missions = reset::monthly_mission_reset(&self.db, now)?;
                JobReport::Monthly { xp_rows, missions }
            }
            JobKind::LeaderboardRefresh => JobReport::Refreshed(self.aggregator().refresh_all(now)?),
        };
        Ok(report)
    }

    pub fn aggregator(&self) -> LeaderboardAggregator {
        LeaderboardAggregator::new(self.db.clone(), self.offset, self.leaderboard_size)
    }
}
