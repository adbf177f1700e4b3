//! SQLite database connection and schema management for the gamification store
//!
//! Manages the `~/.questboard/questboard.db` database with automatic schema
//! migration. Every engine write runs inside one `BEGIN IMMEDIATE`
//! transaction, so concurrent writers (threads sharing a handle or
//! separate processes on the same file) serialise on SQLite's write lock.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Default time a writer waits for the database lock
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database handle, cheap to clone
#[derive(Clone)]
pub struct GameDb {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl GameDb {
    /// Open or create the database at a specific path
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_timeout(path, DEFAULT_BUSY_TIMEOUT)
    }

    /// Open or create the database, waiting up to `busy_timeout` for locks
    pub fn open_with_timeout(path: &Path, busy_timeout: Duration) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database dir: {}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        // WAL lets readers keep their snapshot while a writer commits
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Self::configure(&conn, busy_timeout)?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path.to_path_buf()),
        };
        db.init_schema()?;
        Ok(db)
    }

    /// Open a private in-memory database (tests and dry runs)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::configure(&conn, DEFAULT_BUSY_TIMEOUT)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        };
        db.init_schema()?;
        Ok(db)
    }

    fn configure(conn: &Connection, busy_timeout: Duration) -> Result<()> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(busy_timeout)?;
        Ok(())
    }

    /// File backing this database, `None` when in memory
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Lock the connection for direct use
    pub fn conn(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock cannot leave an open transaction
        // behind: `Transaction` rolls back on drop.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` inside one immediate write transaction.
    ///
    /// The transaction commits only if `f` succeeds; any error (or a
    /// panic) rolls everything back.
    pub fn write<T, E>(&self, f: impl FnOnce(&Transaction<'_>) -> Result<T, E>) -> Result<T, E>
    where
        E: From<rusqlite::Error>,
    {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Run `f` inside a read transaction so it sees one consistent snapshot
    pub fn read<T, E>(&self, f: impl FnOnce(&Transaction<'_>) -> Result<T, E>) -> Result<T, E>
    where
        E: From<rusqlite::Error>,
    {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Initialize the database schema
    fn init_schema(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);",
        )?;
        let version: i32 = conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |r| r.get(0),
        )?;

        if version == 0 {
            tracing::info!("Initializing gamification schema v{SCHEMA_VERSION}");
            conn.execute_batch(SCHEMA_SQL)?;
            conn.execute(
                "INSERT OR REPLACE INTO schema_version VALUES (?1)",
                [SCHEMA_VERSION],
            )?;
        } else if version < SCHEMA_VERSION {
            for next in (version + 1)..=SCHEMA_VERSION {
                tracing::info!("Running migration to v{next}");
                run_migration(&conn, next)?;
                conn.execute("INSERT OR REPLACE INTO schema_version VALUES (?1)", [next])?;
            }
        } else if version > SCHEMA_VERSION {
            anyhow::bail!(
                "Database schema v{version} is newer than supported v{SCHEMA_VERSION}"
            );
        }
        Ok(())
    }
}

/// Run a specific forward migration
fn run_migration(_conn: &Connection, version: i32) -> Result<()> {
    match version {
        // Future migrations go here:
        // 2 => migration_v2(conn),
        _ => anyhow::bail!("Unknown migration version: {version}"),
    }
}

/// SQL schema for the gamification database. Timestamps are Unix
/// milliseconds, local dates are "YYYY-MM-DD" strings.
const SCHEMA_SQL: &str = r#"
-- Accounts with cached aggregates (owned by the engine)
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    display_name TEXT NOT NULL,
    account_kind TEXT NOT NULL DEFAULT 'player',
    total_xp INTEGER NOT NULL DEFAULT 0,
    level INTEGER NOT NULL DEFAULT 1,
    monthly_xp INTEGER NOT NULL DEFAULT 0,
    current_streak INTEGER NOT NULL DEFAULT 0,
    longest_streak INTEGER NOT NULL DEFAULT 0,
    last_activity_day TEXT,
    active INTEGER NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_users_kind ON users(account_kind, active);

-- Badge reference data
CREATE TABLE IF NOT EXISTS badges (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    category TEXT NOT NULL,
    rarity TEXT NOT NULL,
    metric TEXT,
    threshold INTEGER,
    active INTEGER NOT NULL DEFAULT 1,
    hidden INTEGER NOT NULL DEFAULT 0
);

-- Mission definitions; `action` is denormalised from `requirement`
CREATE TABLE IF NOT EXISTS missions (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    mission_type TEXT NOT NULL,
    xp_reward INTEGER NOT NULL DEFAULT 0,
    badge_reward TEXT REFERENCES badges(id),
    requirement TEXT NOT NULL,
    action TEXT NOT NULL,
    reset_cadence TEXT NOT NULL,
    active INTEGER NOT NULL DEFAULT 1,
    starts_at INTEGER,
    ends_at INTEGER,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_missions_action ON missions(action);
CREATE INDEX IF NOT EXISTS idx_missions_cadence ON missions(reset_cadence);

-- One row per (user, mission)
CREATE TABLE IF NOT EXISTS mission_progress (
    user_id TEXT NOT NULL REFERENCES users(id),
    mission_id TEXT NOT NULL REFERENCES missions(id),
    progress INTEGER NOT NULL DEFAULT 0 CHECK (progress >= 0),
    completed INTEGER NOT NULL DEFAULT 0,
    completed_at INTEGER,
    updated_at INTEGER NOT NULL,
    PRIMARY KEY (user_id, mission_id)
);
CREATE INDEX IF NOT EXISTS idx_progress_mission ON mission_progress(mission_id);

-- Append-only XP ledger
CREATE TABLE IF NOT EXISTS xp_transactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL REFERENCES users(id),
    amount INTEGER NOT NULL,
    reason TEXT NOT NULL,
    related_kind TEXT,
    related_id TEXT,
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_xp_user ON xp_transactions(user_id);
CREATE INDEX IF NOT EXISTS idx_xp_created_at ON xp_transactions(created_at);

-- Earned badges, at most once per pair
CREATE TABLE IF NOT EXISTS user_badges (
    user_id TEXT NOT NULL REFERENCES users(id),
    badge_id TEXT NOT NULL REFERENCES badges(id),
    earned_at INTEGER NOT NULL,
    PRIMARY KEY (user_id, badge_id)
);

-- Activity counters feeding badges and category boards
CREATE TABLE IF NOT EXISTS user_activity (
    user_id TEXT PRIMARY KEY REFERENCES users(id),
    reviews_written INTEGER NOT NULL DEFAULT 0,
    meaningful_reviews INTEGER NOT NULL DEFAULT 0,
    check_ins INTEGER NOT NULL DEFAULT 0,
    verified_check_ins INTEGER NOT NULL DEFAULT 0,
    votes_cast INTEGER NOT NULL DEFAULT 0,
    helpful_votes_received INTEGER NOT NULL DEFAULT 0,
    follows INTEGER NOT NULL DEFAULT 0,
    photos_uploaded INTEGER NOT NULL DEFAULT 0,
    high_res_photos INTEGER NOT NULL DEFAULT 0,
    photos_approved INTEGER NOT NULL DEFAULT 0,
    unique_establishments INTEGER NOT NULL DEFAULT 0,
    missions_completed INTEGER NOT NULL DEFAULT 0
);

-- Derived snapshots, replaced wholesale by the aggregator
CREATE TABLE IF NOT EXISTS leaderboard_entries (
    board TEXT NOT NULL,
    rank INTEGER NOT NULL,
    user_id TEXT NOT NULL,
    display_name TEXT NOT NULL,
    score INTEGER NOT NULL,
    secondary_score INTEGER NOT NULL DEFAULT 0,
    refreshed_at INTEGER NOT NULL,
    PRIMARY KEY (board, rank)
);
CREATE INDEX IF NOT EXISTS idx_leaderboard_user ON leaderboard_entries(board, user_id);
"#;
