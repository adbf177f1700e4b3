//! Leaderboard aggregation
//!
//! Recomputes every board from the user rows, activity counters and the
//! XP ledger, then swaps all snapshots in one transaction. Readers on
//! another connection see either the previous set or the new one.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};

use crate::models::{LeaderboardEntry, LeaderboardKind, UserId};
use crate::store::{GameDb, leaderboard};
use crate::time_window::week_start;

/// Rows written per board by one refresh
pub type RefreshSummary = BTreeMap<&'static str, usize>;

pub struct LeaderboardAggregator {
    db: GameDb,
    offset: FixedOffset,
    size: usize,
}

impl LeaderboardAggregator {
    pub fn new(db: GameDb, offset: FixedOffset, size: usize) -> Self {
        Self { db, offset, size }
    }

    /// Rebuild all boards as of `now`
    pub fn refresh_all(&self, now: DateTime<Utc>) -> Result<RefreshSummary> {
        let since = week_start(now, self.offset);
        let summary = self
            .db
            .write(|tx| {
                let mut summary = RefreshSummary::new();
                for kind in LeaderboardKind::all() {
                    let standings = leaderboard::standings(tx, *kind, since, self.size)?;
                    let written = leaderboard::replace_board(tx, *kind, &standings, now)?;
                    summary.insert(kind.as_str(), written);
                }
                Ok::<_, crate::error::EngineError>(summary)
            })
            .context("Failed to refresh leaderboards")?;

        tracing::info!(
            "Refreshed {} leaderboards ({} rows)",
            summary.len(),
            summary.values().sum::<usize>()
        );
        Ok(summary)
    }

    /// Latest snapshot of one board
    pub fn top(&self, kind: LeaderboardKind, limit: usize) -> Result<Vec<LeaderboardEntry>> {
        let rows = self
            .db
            .read(|tx| leaderboard::top(tx, kind, limit))
            .with_context(|| format!("Failed to read {kind} leaderboard"))?;
        Ok(rows)
    }

    /// A user's position in the latest snapshot
    pub fn rank_of(&self, kind: LeaderboardKind, user_id: UserId) -> Result<Option<LeaderboardEntry>> {
        let entry = self
            .db
            .read(|tx| leaderboard::rank_of(tx, kind, user_id))
            .with_context(|| format!("Failed to read {kind} leaderboard"))?;
        Ok(entry)
    }
}
