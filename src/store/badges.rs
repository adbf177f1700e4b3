//! Badge definitions and user grants

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::{enum_col, from_ms, to_ms, uuid_col};
use crate::error::Result;
use crate::models::{
    ActivityMetric, Badge, BadgeCategory, BadgeRarity, BadgeRequirement, UserBadge, UserId,
};

const BADGE_COLUMNS: &str =
    "id, name, description, category, rarity, metric, threshold, active, hidden";

fn map_badge(row: &Row<'_>) -> rusqlite::Result<Badge> {
    let metric: Option<String> = row.get(5)?;
    let threshold: Option<i64> = row.get(6)?;
    let requirement = match (metric, threshold) {
        (Some(metric), Some(threshold)) => {
            let metric = ActivityMetric::from_db(&metric).ok_or(
                rusqlite::Error::InvalidColumnType(5, metric, rusqlite::types::Type::Text),
            )?;
            Some(BadgeRequirement {
                metric,
                threshold: u32::try_from(threshold.max(0)).unwrap_or(u32::MAX),
            })
        }
        _ => None,
    };
    Ok(Badge {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        category: enum_col(row, 3, BadgeCategory::from_db)?,
        rarity: enum_col(row, 4, BadgeRarity::from_db)?,
        requirement,
        active: row.get(7)?,
        hidden: row.get(8)?,
    })
}

/// Insert a badge definition unless it already exists
pub fn insert_if_absent(conn: &Connection, badge: &Badge) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO badges (id, name, description, category, rarity, metric, \
         threshold, active, hidden) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            badge.id,
            badge.name,
            badge.description,
            badge.category.as_str(),
            badge.rarity.as_str(),
            badge.requirement.map(|r| r.metric.as_str()),
            badge.requirement.map(|r| r.threshold),
            badge.active,
            badge.hidden,
        ],
    )?;
    Ok(inserted > 0)
}

pub fn get(conn: &Connection, id: &str) -> Result<Option<Badge>> {
    let badge = conn
        .query_row(
            &format!("SELECT {BADGE_COLUMNS} FROM badges WHERE id = ?1"),
            [id],
            map_badge,
        )
        .optional()?;
    Ok(badge)
}

/// Active badges that unlock on a metric threshold
pub fn list_threshold(conn: &Connection) -> Result<Vec<Badge>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BADGE_COLUMNS} FROM badges WHERE active = 1 AND metric IS NOT NULL \
         ORDER BY threshold ASC, id ASC"
    ))?;
    let badges = stmt
        .query_map([], map_badge)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(badges)
}

pub fn list(conn: &Connection) -> Result<Vec<Badge>> {
    let mut stmt = conn.prepare(&format!("SELECT {BADGE_COLUMNS} FROM badges ORDER BY id ASC"))?;
    let badges = stmt
        .query_map([], map_badge)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(badges)
}

/// Grant a badge at most once. Returns true only when this call granted it.
pub fn grant(conn: &Connection, user_id: UserId, badge_id: &str, now: DateTime<Utc>) -> Result<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO user_badges (user_id, badge_id, earned_at) VALUES (?1, ?2, ?3)",
        params![user_id.to_string(), badge_id, to_ms(now)],
    )?;
    Ok(inserted > 0)
}

/// Ids of badges the user holds
pub fn earned_ids(conn: &Connection, user_id: UserId) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT badge_id FROM user_badges WHERE user_id = ?1")?;
    let ids = stmt
        .query_map([user_id.to_string()], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(ids)
}

/// Badges the user holds, oldest first
pub fn for_user(conn: &Connection, user_id: UserId) -> Result<Vec<UserBadge>> {
    let mut stmt = conn.prepare(
        "SELECT user_id, badge_id, earned_at FROM user_badges WHERE user_id = ?1 \
         ORDER BY earned_at ASC, badge_id ASC",
    )?;
    let badges = stmt
        .query_map([user_id.to_string()], |row| {
            Ok(UserBadge {
                user_id: uuid_col(row, 0)?,
                badge_id: row.get(1)?,
                earned_at: from_ms(row.get(2)?),
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(badges)
}
