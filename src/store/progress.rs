//! Per (user, mission) progress records
//!
//! Increments are applied with a single upsert so concurrent callers can
//! never lose an update, even if they bypass the engine's transaction.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::{from_ms, to_ms, u32_col, uuid_col};
use crate::error::Result;
use crate::models::{MissionProgress, UserId};

const PROGRESS_COLUMNS: &str =
    "user_id, mission_id, progress, completed, completed_at, updated_at";

fn map_progress(row: &Row<'_>) -> rusqlite::Result<MissionProgress> {
    let completed_at: Option<i64> = row.get(4)?;
    Ok(MissionProgress {
        user_id: uuid_col(row, 0)?,
        mission_id: row.get(1)?,
        progress: u32_col(row, 2)?,
        completed: row.get(3)?,
        completed_at: completed_at.map(from_ms),
        updated_at: from_ms(row.get(5)?),
    })
}

pub fn get(conn: &Connection, user_id: UserId, mission_id: &str) -> Result<Option<MissionProgress>> {
    let progress = conn
        .query_row(
            &format!(
                "SELECT {PROGRESS_COLUMNS} FROM mission_progress \
                 WHERE user_id = ?1 AND mission_id = ?2"
            ),
            params![user_id.to_string(), mission_id],
            map_progress,
        )
        .optional()?;
    Ok(progress)
}

/// Add `increment` to a non-completed record, creating it at zero first.
///
/// Completed records are left alone. Returns the stored progress after the
/// write, or `None` when the record was already completed.
pub fn add(
    conn: &Connection,
    user_id: UserId,
    mission_id: &str,
    increment: u32,
    now: DateTime<Utc>,
) -> Result<Option<u32>> {
    let progress = conn
        .query_row(
            "INSERT INTO mission_progress (user_id, mission_id, progress, updated_at) \
             VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(user_id, mission_id) DO UPDATE SET \
                 progress = MIN(progress + excluded.progress, 4294967295), \
                 updated_at = excluded.updated_at \
             WHERE completed = 0 \
             RETURNING progress",
            params![user_id.to_string(), mission_id, increment, to_ms(now)],
            |row| u32_col(row, 0),
        )
        .optional()?;
    Ok(progress)
}

/// Overwrite the counter of a non-completed record with `value`.
///
/// Same contract as [`add`].
pub fn set(
    conn: &Connection,
    user_id: UserId,
    mission_id: &str,
    value: u32,
    now: DateTime<Utc>,
) -> Result<Option<u32>> {
    let progress = conn
        .query_row(
            "INSERT INTO mission_progress (user_id, mission_id, progress, updated_at) \
             VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(user_id, mission_id) DO UPDATE SET \
                 progress = excluded.progress, \
                 updated_at = excluded.updated_at \
             WHERE completed = 0 \
             RETURNING progress",
            params![user_id.to_string(), mission_id, value, to_ms(now)],
            |row| u32_col(row, 0),
        )
        .optional()?;
    Ok(progress)
}

/// Flip a record to completed. Returns false if it already was.
pub fn mark_completed(
    conn: &Connection,
    user_id: UserId,
    mission_id: &str,
    now: DateTime<Utc>,
) -> Result<bool> {
    let updated = conn.execute(
        "UPDATE mission_progress SET completed = 1, completed_at = ?1, updated_at = ?1 \
         WHERE user_id = ?2 AND mission_id = ?3 AND completed = 0",
        params![to_ms(now), user_id.to_string(), mission_id],
    )?;
    Ok(updated > 0)
}

/// Zero every record of one mission that is not already pristine.
/// Returns the number of rows changed.
pub fn reset_mission(conn: &Connection, mission_id: &str, now: DateTime<Utc>) -> Result<usize> {
    let changed = conn.execute(
        "UPDATE mission_progress \
         SET progress = 0, completed = 0, completed_at = NULL, updated_at = ?1 \
         WHERE mission_id = ?2 AND (progress <> 0 OR completed = 1)",
        params![to_ms(now), mission_id],
    )?;
    Ok(changed)
}

/// All records for a user, by mission id
pub fn for_user(conn: &Connection, user_id: UserId) -> Result<Vec<MissionProgress>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PROGRESS_COLUMNS} FROM mission_progress WHERE user_id = ?1 ORDER BY mission_id"
    ))?;
    let rows = stmt
        .query_map([user_id.to_string()], map_progress)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}
