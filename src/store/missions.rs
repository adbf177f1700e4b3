//! Mission definitions

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::{enum_col, from_ms, to_ms, u32_col};
use crate::error::{EngineError, Result};
use crate::models::{Action, Mission, MissionType, Requirement, ResetCadence};

const MISSION_COLUMNS: &str = "id, title, mission_type, xp_reward, badge_reward, requirement, \
     reset_cadence, active, starts_at, ends_at";

fn map_mission(row: &Row<'_>) -> rusqlite::Result<Mission> {
    let requirement: String = row.get(5)?;
    let requirement = Requirement::from_json(&requirement).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let starts_at: Option<i64> = row.get(8)?;
    let ends_at: Option<i64> = row.get(9)?;
    Ok(Mission {
        id: row.get(0)?,
        title: row.get(1)?,
        mission_type: enum_col(row, 2, MissionType::from_db)?,
        xp_reward: u32_col(row, 3)?,
        badge_reward: row.get(4)?,
        requirement,
        reset_cadence: enum_col(row, 6, ResetCadence::from_db)?,
        active: row.get(7)?,
        starts_at: starts_at.map(from_ms),
        ends_at: ends_at.map(from_ms),
    })
}

fn badge_exists(conn: &Connection, badge_id: &str) -> Result<bool> {
    let found = conn
        .query_row("SELECT 1 FROM badges WHERE id = ?1", [badge_id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

/// Insert a validated mission unless one with the same id exists.
/// Returns whether a row was written.
pub fn insert_if_absent(conn: &Connection, mission: &Mission, now: DateTime<Utc>) -> Result<bool> {
    mission.validate()?;
    if let Some(badge) = &mission.badge_reward {
        if !badge_exists(conn, badge)? {
            return Err(EngineError::UnknownBadge(badge.clone()));
        }
    }

    let inserted = conn.execute(
        "INSERT OR IGNORE INTO missions (id, title, mission_type, xp_reward, badge_reward, \
         requirement, action, reset_cadence, active, starts_at, ends_at, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            mission.id,
            mission.title,
            mission.mission_type.as_str(),
            mission.xp_reward,
            mission.badge_reward,
            mission.requirement.to_json()?,
            mission.requirement.action().as_str(),
            mission.reset_cadence.as_str(),
            mission.active,
            mission.starts_at.map(to_ms),
            mission.ends_at.map(to_ms),
            to_ms(now),
        ],
    )?;
    Ok(inserted > 0)
}

pub fn get(conn: &Connection, id: &str) -> Result<Option<Mission>> {
    let mission = conn
        .query_row(
            &format!("SELECT {MISSION_COLUMNS} FROM missions WHERE id = ?1"),
            [id],
            map_mission,
        )
        .optional()?;
    Ok(mission)
}

/// Load a mission or fail with [`EngineError::UnknownMission`]
pub fn require(conn: &Connection, id: &str) -> Result<Mission> {
    get(conn, id)?.ok_or_else(|| EngineError::UnknownMission(id.to_string()))
}

pub fn list(conn: &Connection) -> Result<Vec<Mission>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MISSION_COLUMNS} FROM missions ORDER BY created_at ASC, id ASC"
    ))?;
    let missions = stmt
        .query_map([], map_mission)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(missions)
}

/// Active missions driven by `action`, in definition order
pub fn for_action(conn: &Connection, action: Action) -> Result<Vec<Mission>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MISSION_COLUMNS} FROM missions WHERE action = ?1 AND active = 1 \
         ORDER BY created_at ASC, id ASC"
    ))?;
    let missions = stmt
        .query_map([action.as_str()], map_mission)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(missions)
}

/// Ids of every mission with the given reset cadence, active or not
pub fn ids_with_cadence(conn: &Connection, cadence: ResetCadence) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT id FROM missions WHERE reset_cadence = ?1 ORDER BY id ASC")?;
    let ids = stmt
        .query_map([cadence.as_str()], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(ids)
}

pub fn set_active(conn: &Connection, id: &str, active: bool) -> Result<()> {
    let updated = conn.execute(
        "UPDATE missions SET active = ?1 WHERE id = ?2",
        params![active, id],
    )?;
    if updated == 0 {
        return Err(EngineError::UnknownMission(id.to_string()));
    }
    Ok(())
}

/// Replace a mission's requirement after validating it against the
/// mission's type. Existing progress is kept.
pub fn update_requirement(conn: &Connection, id: &str, requirement: &Requirement) -> Result<()> {
    let mut mission = require(conn, id)?;
    mission.requirement = requirement.clone();
    mission.validate()?;
    conn.execute(
        "UPDATE missions SET requirement = ?1, action = ?2 WHERE id = ?3",
        params![requirement.to_json()?, requirement.action().as_str(), id],
    )?;
    Ok(())
}
