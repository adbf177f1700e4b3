//! Periodic progress and monthly XP resets
//!
//! Each job is re-runnable: rows that are already pristine are not
//! touched, so a second run reports zero changes. Missions are reset one
//! transaction at a time; a crash mid-run leaves some missions reset and
//! the rest untouched, and the next run finishes the job.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::models::ResetCadence;
use crate::store::{GameDb, missions, progress, users};

/// What a progress reset changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetSummary {
    pub missions: usize,
    pub rows_changed: usize,
}

/// Zero progress and completion for every mission with `cadence`
pub fn reset_cadence(db: &GameDb, cadence: ResetCadence, now: DateTime<Utc>) -> Result<ResetSummary> {
    if cadence == ResetCadence::Never {
        return Ok(ResetSummary::default());
    }

    let ids = db
        .read(|tx| missions::ids_with_cadence(tx, cadence))
        .with_context(|| format!("Failed to list {cadence} missions"))?;

    let mut summary = ResetSummary::default();
    for mission_id in &ids {
        let changed = db
            .write(|tx| progress::reset_mission(tx, mission_id, now))
            .with_context(|| format!("Failed to reset mission {mission_id}"))?;
        tracing::debug!("Reset {} progress rows of {}", changed, mission_id);
        summary.missions += 1;
        summary.rows_changed += changed;
    }

    tracing::info!(
        "{} reset: {} rows across {} missions",
        cadence,
        summary.rows_changed,
        summary.missions
    );
    Ok(summary)
}

pub fn daily_reset(db: &GameDb, now: DateTime<Utc>) -> Result<ResetSummary> {
    reset_cadence(db, ResetCadence::Daily, now)
}

pub fn weekly_reset(db: &GameDb, now: DateTime<Utc>) -> Result<ResetSummary> {
    reset_cadence(db, ResetCadence::Weekly, now)
}

/// Progress reset for monthly-cadence missions; leaves XP alone
pub fn monthly_mission_reset(db: &GameDb, now: DateTime<Utc>) -> Result<ResetSummary> {
    reset_cadence(db, ResetCadence::Monthly, now)
}

/// Zero every user's monthly XP. Never touches mission progress or the
/// ledger. Returns the number of users changed.
pub fn monthly_xp_reset(db: &GameDb) -> Result<usize> {
    let changed = db
        .write(|tx| users::reset_monthly_xp(tx))
        .context("Failed to reset monthly XP")?;
    tracing::info!("Monthly XP reset: {} users", changed);
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Action, Mission, MissionType, NewUser, Requirement};

    fn mission(id: &str, mission_type: MissionType, cadence: ResetCadence) -> Mission {
        Mission {
            id: id.to_string(),
            title: id.to_string(),
            mission_type,
            xp_reward: 10,
            badge_reward: None,
            requirement: Requirement::count(Action::Follow, 5),
            reset_cadence: cadence,
            active: true,
            starts_at: None,
            ends_at: None,
        }
    }

    #[test]
    fn test_daily_reset_spares_other_cadences() {
        let db = GameDb::open_in_memory().unwrap();
        let now = Utc::now();
        let user = {
            let conn = db.conn();
            for m in [
                mission("d", MissionType::Daily, ResetCadence::Daily),
                mission("w", MissionType::Weekly, ResetCadence::Weekly),
                mission("n", MissionType::Narrative, ResetCadence::Never),
            ] {
                missions::insert_if_absent(&conn, &m, now).unwrap();
            }
            let user = users::insert(&conn, &NewUser::player("Sara"), now).unwrap();
            for id in ["d", "w", "n"] {
                progress::add(&conn, user.id, id, 3, now).unwrap();
            }
            user
        };

        let summary = daily_reset(&db, now).unwrap();
        assert_eq!(summary, ResetSummary { missions: 1, rows_changed: 1 });
        assert_eq!(daily_reset(&db, now).unwrap().rows_changed, 0);

        let conn = db.conn();
        assert_eq!(progress::get(&conn, user.id, "d").unwrap().unwrap().progress, 0);
        assert_eq!(progress::get(&conn, user.id, "w").unwrap().unwrap().progress, 3);
        assert_eq!(progress::get(&conn, user.id, "n").unwrap().unwrap().progress, 3);
    }

    #[test]
    fn test_monthly_xp_reset_leaves_progress() {
        let db = GameDb::open_in_memory().unwrap();
        let now = Utc::now();
        let user = {
            let conn = db.conn();
            missions::insert_if_absent(
                &conn,
                &mission("m", MissionType::Event, ResetCadence::Monthly),
                now,
            )
            .unwrap();
            let user = users::insert(&conn, &NewUser::player("Teo"), now).unwrap();
            progress::add(&conn, user.id, "m", 2, now).unwrap();
            conn.execute(
                "UPDATE users SET total_xp = 80, monthly_xp = 80 WHERE id = ?1",
                [user.id.to_string()],
            )
            .unwrap();
            user
        };

        assert_eq!(monthly_xp_reset(&db).unwrap(), 1);
        assert_eq!(monthly_xp_reset(&db).unwrap(), 0);
        {
            let conn = db.conn();
            let stored = users::require(&conn, user.id).unwrap();
            assert_eq!(stored.monthly_xp, 0);
            assert_eq!(stored.total_xp, 80);
            assert_eq!(progress::get(&conn, user.id, "m").unwrap().unwrap().progress, 2);
        }

        assert_eq!(monthly_mission_reset(&db, now).unwrap().rows_changed, 1);
    }
}
