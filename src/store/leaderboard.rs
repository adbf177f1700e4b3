//! Leaderboard ranking queries and snapshot storage

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::{enum_col, from_ms, to_ms, u32_col, uuid_col};
use crate::error::Result;
use crate::models::{LeaderboardEntry, LeaderboardKind, UserId};

/// A scored user before ranks are assigned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    pub user_id: UserId,
    pub display_name: String,
    pub score: i64,
    pub secondary_score: i64,
}

/// Score and secondary-score expressions for a board, over `users u`
/// left-joined with `user_activity a`
fn score_columns(kind: LeaderboardKind) -> (&'static str, &'static str) {
    match kind {
        LeaderboardKind::Global => ("u.total_xp", "0"),
        LeaderboardKind::Monthly => ("u.monthly_xp", "0"),
        LeaderboardKind::Weekly => (
            "(SELECT COALESCE(SUM(t.amount), 0) FROM xp_transactions t \
              WHERE t.user_id = u.id AND t.created_at >= ?2)",
            "0",
        ),
        LeaderboardKind::TopReviewers => ("COALESCE(a.meaningful_reviews, 0)", "0"),
        LeaderboardKind::TopPhotographers => ("COALESCE(a.photos_approved, 0)", "0"),
        LeaderboardKind::TopCheckIns => (
            "COALESCE(a.verified_check_ins, 0)",
            "COALESCE(a.check_ins, 0)",
        ),
        LeaderboardKind::MostHelpful => ("COALESCE(a.helpful_votes_received, 0)", "0"),
    }
}

/// Rank active players with a positive score on `kind`.
///
/// Ties fall back to the secondary score, then account age, then id.
/// `week_start` bounds the weekly board and is ignored by the others.
pub fn standings(
    conn: &Connection,
    kind: LeaderboardKind,
    week_start: DateTime<Utc>,
    limit: usize,
) -> Result<Vec<Standing>> {
    let (score, secondary) = score_columns(kind);
    let sql = format!(
        "SELECT id, display_name, score, secondary FROM ( \
             SELECT u.id AS id, u.display_name AS display_name, u.created_at AS created_at, \
                    {score} AS score, {secondary} AS secondary \
             FROM users u LEFT JOIN user_activity a ON a.user_id = u.id \
             WHERE u.account_kind = 'player' AND u.active = 1 \
         ) WHERE score > 0 \
         ORDER BY score DESC, secondary DESC, created_at ASC, id ASC \
         LIMIT ?1"
    );
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let map = |row: &Row<'_>| -> rusqlite::Result<Standing> {
        Ok(Standing {
            user_id: uuid_col(row, 0)?,
            display_name: row.get(1)?,
            score: row.get(2)?,
            secondary_score: row.get(3)?,
        })
    };

    let mut stmt = conn.prepare(&sql)?;
    let rows = if kind == LeaderboardKind::Weekly {
        stmt.query_map(params![limit, to_ms(week_start)], map)?
            .collect::<rusqlite::Result<Vec<_>>>()?
    } else {
        stmt.query_map(params![limit], map)?
            .collect::<rusqlite::Result<Vec<_>>>()?
    };
    Ok(rows)
}

/// Replace the stored snapshot of one board. Callers wrap every board of
/// a refresh in one transaction so readers never see a mix.
pub fn replace_board(
    conn: &Connection,
    kind: LeaderboardKind,
    standings: &[Standing],
    refreshed_at: DateTime<Utc>,
) -> Result<usize> {
    conn.execute(
        "DELETE FROM leaderboard_entries WHERE board = ?1",
        [kind.as_str()],
    )?;
    let mut stmt = conn.prepare(
        "INSERT INTO leaderboard_entries \
         (board, rank, user_id, display_name, score, secondary_score, refreshed_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    for (idx, standing) in standings.iter().enumerate() {
        stmt.execute(params![
            kind.as_str(),
            i64::try_from(idx + 1).unwrap_or(i64::MAX),
            standing.user_id.to_string(),
            standing.display_name,
            standing.score,
            standing.secondary_score,
            to_ms(refreshed_at),
        ])?;
    }
    Ok(standings.len())
}

fn map_entry(row: &Row<'_>) -> rusqlite::Result<LeaderboardEntry> {
    Ok(LeaderboardEntry {
        board: enum_col(row, 0, LeaderboardKind::from_db)?,
        rank: u32_col(row, 1)?,
        user_id: uuid_col(row, 2)?,
        display_name: row.get(3)?,
        score: row.get(4)?,
        secondary_score: row.get(5)?,
        refreshed_at: from_ms(row.get(6)?),
    })
}

const ENTRY_COLUMNS: &str =
    "board, rank, user_id, display_name, score, secondary_score, refreshed_at";

/// First `limit` rows of the latest snapshot
pub fn top(conn: &Connection, kind: LeaderboardKind, limit: usize) -> Result<Vec<LeaderboardEntry>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ENTRY_COLUMNS} FROM leaderboard_entries WHERE board = ?1 ORDER BY rank ASC LIMIT ?2"
    ))?;
    let rows = stmt
        .query_map(
            params![kind.as_str(), i64::try_from(limit).unwrap_or(i64::MAX)],
            map_entry,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// A user's row in the latest snapshot, if ranked
pub fn rank_of(
    conn: &Connection,
    kind: LeaderboardKind,
    user_id: UserId,
) -> Result<Option<LeaderboardEntry>> {
    let entry = conn
        .query_row(
            &format!(
                "SELECT {ENTRY_COLUMNS} FROM leaderboard_entries WHERE board = ?1 AND user_id = ?2"
            ),
            params![kind.as_str(), user_id.to_string()],
            map_entry,
        )
        .optional()?;
    Ok(entry)
}
