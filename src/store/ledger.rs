//! Append-only XP transactions

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};

use super::{enum_col, from_ms, to_ms, uuid_col};
use crate::error::Result;
use crate::models::{RelatedEntity, UserId, XpReason, XpTransaction};

fn map_transaction(row: &Row<'_>) -> rusqlite::Result<XpTransaction> {
    let related_kind: Option<String> = row.get(4)?;
    let related_id: Option<String> = row.get(5)?;
    let related = match (related_kind, related_id) {
        (Some(kind), Some(id)) => RelatedEntity::from_parts(&kind, id),
        _ => None,
    };
    Ok(XpTransaction {
        id: row.get(0)?,
        user_id: uuid_col(row, 1)?,
        amount: row.get(2)?,
        reason: enum_col(row, 3, XpReason::from_db)?,
        related,
        created_at: from_ms(row.get(6)?),
    })
}

/// Append one transaction and return its id
pub fn append(
    conn: &Connection,
    user_id: UserId,
    amount: i64,
    reason: XpReason,
    related: Option<&RelatedEntity>,
    now: DateTime<Utc>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO xp_transactions (user_id, amount, reason, related_kind, related_id, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user_id.to_string(),
            amount,
            reason.as_str(),
            related.map(|r| r.kind()),
            related.map(|r| r.id()),
            to_ms(now),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Most recent transactions first
pub fn for_user(conn: &Connection, user_id: UserId, limit: usize) -> Result<Vec<XpTransaction>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, amount, reason, related_kind, related_id, created_at \
         FROM xp_transactions WHERE user_id = ?1 ORDER BY id DESC LIMIT ?2",
    )?;
    let rows = stmt
        .query_map(
            params![user_id.to_string(), i64::try_from(limit).unwrap_or(i64::MAX)],
            map_transaction,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Sum of every transaction for a user; always equals the user's total XP
pub fn sum_for_user(conn: &Connection, user_id: UserId) -> Result<i64> {
    let sum = conn.query_row(
        "SELECT COALESCE(SUM(amount), 0) FROM xp_transactions WHERE user_id = ?1",
        [user_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(sum)
}
