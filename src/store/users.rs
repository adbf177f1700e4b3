//! User rows

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::{enum_col, from_ms, to_ms, u32_col, uuid_col};
use crate::error::{EngineError, Result};
use crate::gamification::streaks::StreakInfo;
use crate::models::{AccountKind, NewUser, User, UserId};
use crate::time_window::{day_bucket, parse_day_bucket};

const USER_COLUMNS: &str = "id, display_name, account_kind, total_xp, level, monthly_xp, \
     current_streak, longest_streak, last_activity_day, active, created_at";

fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
    let last_day: Option<String> = row.get(8)?;
    Ok(User {
        id: uuid_col(row, 0)?,
        display_name: row.get(1)?,
        account_kind: enum_col(row, 2, AccountKind::from_db)?,
        total_xp: row.get(3)?,
        level: u32_col(row, 4)?,
        monthly_xp: row.get(5)?,
        current_streak: u32_col(row, 6)?,
        longest_streak: u32_col(row, 7)?,
        last_activity_date: last_day.as_deref().and_then(parse_day_bucket),
        active: row.get(9)?,
        created_at: from_ms(row.get(10)?),
    })
}

/// Register a user with zeroed aggregates
pub fn insert(conn: &Connection, new_user: &NewUser, now: DateTime<Utc>) -> Result<User> {
    conn.execute(
        "INSERT INTO users (id, display_name, account_kind, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            new_user.id.to_string(),
            new_user.display_name,
            new_user.account_kind.as_str(),
            to_ms(now),
        ],
    )?;
    require(conn, new_user.id)
}

pub fn get(conn: &Connection, id: UserId) -> Result<Option<User>> {
    let user = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            [id.to_string()],
            map_user,
        )
        .optional()?;
    Ok(user)
}

/// Load a user or fail with [`EngineError::UnknownUser`]
pub fn require(conn: &Connection, id: UserId) -> Result<User> {
    get(conn, id)?.ok_or(EngineError::UnknownUser(id))
}

pub fn list(conn: &Connection) -> Result<Vec<User>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC, id ASC"
    ))?;
    let users = stmt
        .query_map([], map_user)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(users)
}

/// Soft (de)activation; users are never deleted
pub fn set_active(conn: &Connection, id: UserId, active: bool) -> Result<()> {
    let updated = conn.execute(
        "UPDATE users SET active = ?1 WHERE id = ?2",
        params![active, id.to_string()],
    )?;
    if updated == 0 {
        return Err(EngineError::UnknownUser(id));
    }
    Ok(())
}

/// Write the aggregates computed by an XP grant
pub fn apply_xp(
    conn: &Connection,
    id: UserId,
    total_xp: i64,
    monthly_xp: i64,
    level: u32,
    streak: &StreakInfo,
) -> Result<()> {
    conn.execute(
        "UPDATE users SET total_xp = ?1, monthly_xp = ?2, level = ?3, current_streak = ?4, \
         longest_streak = ?5, last_activity_day = ?6 WHERE id = ?7",
        params![
            total_xp,
            monthly_xp,
            level,
            streak.current,
            streak.longest,
            streak.last_activity_day.map(day_bucket),
            id.to_string(),
        ],
    )?;
    Ok(())
}

/// Zero every non-zero monthly XP counter; returns rows changed
pub fn reset_monthly_xp(conn: &Connection) -> Result<usize> {
    Ok(conn.execute("UPDATE users SET monthly_xp = 0 WHERE monthly_xp <> 0", [])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::GameDb;

    #[test]
    fn test_insert_and_fetch() {
        let db = GameDb::open_in_memory().unwrap();
        let conn = db.conn();
        let new_user = NewUser::with_kind("Bruna", AccountKind::Employee);
        let user = insert(&conn, &new_user, Utc::now()).unwrap();
        assert_eq!(user.id, new_user.id);
        assert_eq!(user.level, 1);
        assert_eq!(user.total_xp, 0);
        assert_eq!(user.account_kind, AccountKind::Employee);
        assert!(user.active);
        assert!(user.last_activity_date.is_none());

        set_active(&conn, user.id, false).unwrap();
        assert!(!require(&conn, user.id).unwrap().active);
    }

    #[test]
    fn test_unknown_user() {
        let db = GameDb::open_in_memory().unwrap();
        let conn = db.conn();
        let id = uuid::Uuid::new_v4();
        assert!(matches!(require(&conn, id), Err(EngineError::UnknownUser(u)) if u == id));
        assert!(matches!(set_active(&conn, id, false), Err(EngineError::UnknownUser(_))));
    }
}
