//! Activity counters

use rusqlite::{Connection, OptionalExtension};

use super::u32_col;
use crate::error::Result;
use crate::models::{ActivityCounters, ActivityMetric, CounterUpdate, UserId};

/// Counter row for a user; all zeros when none exists yet
pub fn get(conn: &Connection, user_id: UserId) -> Result<ActivityCounters> {
    let counters = conn
        .query_row(
            "SELECT reviews_written, meaningful_reviews, check_ins, verified_check_ins, \
             votes_cast, helpful_votes_received, follows, photos_uploaded, high_res_photos, \
             photos_approved, unique_establishments, missions_completed \
             FROM user_activity WHERE user_id = ?1",
            [user_id.to_string()],
            |row| {
                Ok(ActivityCounters {
                    reviews_written: u32_col(row, 0)?,
                    meaningful_reviews: u32_col(row, 1)?,
                    check_ins: u32_col(row, 2)?,
                    verified_check_ins: u32_col(row, 3)?,
                    votes_cast: u32_col(row, 4)?,
                    helpful_votes_received: u32_col(row, 5)?,
                    follows: u32_col(row, 6)?,
                    photos_uploaded: u32_col(row, 7)?,
                    high_res_photos: u32_col(row, 8)?,
                    photos_approved: u32_col(row, 9)?,
                    unique_establishments: u32_col(row, 10)?,
                    missions_completed: u32_col(row, 11)?,
                })
            },
        )
        .optional()?;
    Ok(counters.unwrap_or_default())
}

/// Apply one counter change, creating the row on first use.
///
/// Derived metrics (level, XP, streak) live on the user row and are
/// ignored here.
pub fn apply(
    conn: &Connection,
    user_id: UserId,
    metric: ActivityMetric,
    update: CounterUpdate,
) -> Result<()> {
    let Some(column) = metric.counter_column() else {
        tracing::debug!("Ignoring counter update for derived metric {}", metric.as_str());
        return Ok(());
    };
    let (value, merge) = match update {
        CounterUpdate::Add(n) => (n, format!("{column} = {column} + excluded.{column}")),
        CounterUpdate::AtLeast(n) => (n, format!("{column} = MAX({column}, excluded.{column})")),
    };
    conn.execute(
        &format!(
            "INSERT INTO user_activity (user_id, {column}) VALUES (?1, ?2) \
             ON CONFLICT(user_id) DO UPDATE SET {merge}"
        ),
        rusqlite::params![user_id.to_string(), value],
    )?;
    Ok(())
}
