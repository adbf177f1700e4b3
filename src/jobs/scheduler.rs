//! In-process scheduler for the `run` daemon
//!
//! Fires the resets at local midnight (daily), local Monday midnight
//! (weekly) and local midnight on the 1st (monthly), and refreshes the
//! leaderboards on a fixed interval. Job bodies run on the blocking pool;
//! a failed job is logged and the loop keeps going.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, FixedOffset, Utc};
use tokio::task::{JoinError, JoinSet};

use super::{JobKind, JobReport, JobRunner};
use crate::config::SchedulerSettings;
use crate::time_window::{next_day_start, next_month_start, next_week_start};

/// Upper bound on one sleep, so clock jumps are noticed
const MAX_SLEEP: Duration = Duration::from_secs(300);

/// Next fire time of every enabled trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triggers {
    daily: Option<DateTime<Utc>>,
    weekly: Option<DateTime<Utc>>,
    monthly: Option<DateTime<Utc>>,
    leaderboard: DateTime<Utc>,
    interval: chrono::Duration,
    offset: FixedOffset,
}

impl Triggers {
    pub fn new(settings: &SchedulerSettings, now: DateTime<Utc>, offset: FixedOffset) -> Self {
        let interval = chrono::Duration::seconds(
            i64::try_from(settings.leaderboard_interval_secs.max(1)).unwrap_or(i64::MAX / 1000),
        );
        Self {
            daily: settings.daily_reset.then(|| next_day_start(now, offset)),
            weekly: settings.weekly_reset.then(|| next_week_start(now, offset)),
            monthly: settings.monthly_reset.then(|| next_month_start(now, offset)),
            leaderboard: if settings.refresh_on_start {
                now
            } else {
                now + interval
            },
            interval,
            offset,
        }
    }

    /// Jobs due at `now`; their next fire times move past `now`
    pub fn take_due(&mut self, now: DateTime<Utc>) -> Vec<JobKind> {
        let mut due = Vec::new();
        if self.daily.is_some_and(|at| at <= now) {
            due.push(JobKind::DailyReset);
            self.daily = Some(next_day_start(now, self.offset));
        }
        if self.weekly.is_some_and(|at| at <= now) {
            due.push(JobKind::WeeklyReset);
            self.weekly = Some(next_week_start(now, self.offset));
        }
        if self.monthly.is_some_and(|at| at <= now) {
            due.push(JobKind::MonthlyReset);
            self.monthly = Some(next_month_start(now, self.offset));
        }
        if self.leaderboard <= now {
            due.push(JobKind::LeaderboardRefresh);
            self.leaderboard = now + self.interval;
        }
        due
    }

    /// Earliest upcoming fire time
    pub fn next_wake(&self) -> DateTime<Utc> {
        [self.daily, self.weekly, self.monthly]
            .into_iter()
            .flatten()
            .fold(self.leaderboard, |earliest, at| earliest.min(at))
    }
}

pub struct Scheduler {
    runner: JobRunner,
    settings: SchedulerSettings,
}

impl Scheduler {
    pub fn new(runner: JobRunner, settings: SchedulerSettings) -> Self {
        Self { runner, settings }
    }

    /// Run until `shutdown` resolves, then wait for in-flight jobs
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<()> {
        tokio::pin!(shutdown);

        let offset = self.runner.offset();
        let mut triggers = Triggers::new(&self.settings, self.runner.clock().now(), offset);
        let mut jobs: JoinSet<(JobKind, Result<JobReport>)> = JoinSet::new();
        tracing::info!(
            "Scheduler started (UTC offset {}, leaderboard every {}s)",
            offset,
            self.settings.leaderboard_interval_secs
        );

        loop {
            for kind in triggers.take_due(self.runner.clock().now()) {
                let runner = self.runner.clone();
                jobs.spawn_blocking(move || (kind, runner.run(kind)));
            }

            let now = self.runner.clock().now();
            let sleep_for = (triggers.next_wake() - now)
                .to_std()
                .unwrap_or_default()
                .min(MAX_SLEEP);

            tokio::select! {
                _ = tokio::time::sleep(sleep_for) => {}
                Some(done) = jobs.join_next(), if !jobs.is_empty() => log_job(done),
                _ = &mut shutdown => break,
            }
        }

        tracing::info!("Scheduler stopping, waiting for {} jobs", jobs.len());
        while let Some(done) = jobs.join_next().await {
            log_job(done);
        }
        Ok(())
    }
}

fn log_job(done: Result<(JobKind, Result<JobReport>), JoinError>) {
    match done {
        Ok((kind, Ok(JobReport::Skipped))) => tracing::debug!("{} skipped", kind),
        Ok((kind, Ok(report))) => tracing::info!("{} finished: {:?}", kind, report),
        Ok((kind, Err(e))) => tracing::error!("{} failed: {:#}", kind, e),
        Err(e) => tracing::error!("Job task panicked: {}", e),
    }
}
