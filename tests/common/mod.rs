//! Shared test utilities for engine and job integration tests

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use tempfile::TempDir;

use questboard::gamification::{ManualClock, MissionEngine, catalog};
use questboard::jobs::JobRunner;
use questboard::models::{Action, Mission, MissionType, NewUser, Requirement, ResetCadence, User};
use questboard::store::{GameDb, missions};

/// A file-backed database in a temp dir, driven by a manual clock
pub struct Fixture {
    pub dir: TempDir,
    pub db: GameDb,
    pub clock: Arc<ManualClock>,
    pub engine: MissionEngine,
}

/// Tuesday 2026-03-10 12:00 UTC
pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
}

pub fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db = GameDb::open(&dir.path().join("game.db")).expect("Failed to open database");
        let clock = Arc::new(ManualClock::new(start_time()));
        let engine = MissionEngine::new(db.clone(), utc()).with_clock(clock.clone());
        Self {
            dir,
            db,
            clock,
            engine,
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("game.db")
    }

    /// A second handle on the same file, as another process would open it
    pub fn reopen(&self) -> GameDb {
        GameDb::open(&self.db_path()).expect("Failed to reopen database")
    }

    pub fn runner(&self) -> JobRunner {
        JobRunner::new(self.db.clone(), utc(), 100).with_clock(self.clock.clone())
    }

    pub fn player(&self, name: &str) -> User {
        self.engine
            .register_user(&NewUser::player(name))
            .expect("Failed to register user")
    }

    pub fn add_mission(&self, mission: &Mission) {
        let conn = self.db.conn();
        missions::insert_if_absent(&conn, mission, start_time()).expect("Failed to add mission");
    }

    pub fn seed(&self) {
        self.db
            .write(|tx| catalog::seed(tx, start_time()))
            .expect("Failed to seed catalog");
    }
}

/// A never-resetting counter mission on `action`
pub fn narrative(id: &str, action: Action, target: u32, xp_reward: u32) -> Mission {
    Mission {
        id: id.to_string(),
        title: id.to_string(),
        mission_type: MissionType::Narrative,
        xp_reward,
        badge_reward: None,
        requirement: Requirement::count(action, target),
        reset_cadence: ResetCadence::Never,
        active: true,
        starts_at: None,
        ends_at: None,
    }
}

pub fn daily(id: &str, action: Action, target: u32, xp_reward: u32) -> Mission {
    Mission {
        mission_type: MissionType::Daily,
        reset_cadence: ResetCadence::Daily,
        ..narrative(id, action, target, xp_reward)
    }
}

pub fn weekly(id: &str, action: Action, target: u32, xp_reward: u32) -> Mission {
    Mission {
        mission_type: MissionType::Weekly,
        reset_cadence: ResetCadence::Weekly,
        ..narrative(id, action, target, xp_reward)
    }
}
