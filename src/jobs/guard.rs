//! Overlap protection for batch jobs
//!
//! At most one run per job kind is active at a time: within the process
//! through a shared set, across processes through an exclusive lock file
//! next to the database.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use fs2::FileExt;

use crate::store::GameDb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    DailyReset,
    WeeklyReset,
    MonthlyReset,
    LeaderboardRefresh,
}

impl JobKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DailyReset => "daily_reset",
            Self::WeeklyReset => "weekly_reset",
            Self::MonthlyReset => "monthly_reset",
            Self::LeaderboardRefresh => "leaderboard_refresh",
        }
    }
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Hands out at most one [`JobLease`] per kind
#[derive(Debug, Clone, Default)]
pub struct JobGuard {
    /// Directory for lock files; `None` guards this process only
    lock_dir: Option<PathBuf>,
    /// Base name shared by every lock file of one database
    lock_stem: String,
    running: Arc<Mutex<HashSet<JobKind>>>,
}

impl JobGuard {
    /// Guard for jobs on `db`. File-backed databases also lock across
    /// processes; in-memory ones only within this process.
    pub fn for_db(db: &GameDb) -> Self {
        let lock_dir = db
            .path()
            .and_then(|p| p.parent())
            .map(|dir| dir.to_path_buf());
        let lock_stem = db
            .path()
            .and_then(|p| p.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "questboard".to_string());
        Self {
            lock_dir,
            lock_stem,
            running: Arc::default(),
        }
    }

    /// Start a run of `kind`, or `None` if one is already active
    pub fn try_acquire(&self, kind: JobKind) -> Result<Option<JobLease>> {
        {
            let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
            if !running.insert(kind) {
                return Ok(None);
            }
        }

        match self.lock_file(kind) {
            Ok(Some(file)) => Ok(Some(self.lease(kind, Some(file)))),
            Ok(None) if self.lock_dir.is_none() => Ok(Some(self.lease(kind, None))),
            Ok(None) => {
                self.release(kind);
                Ok(None)
            }
            Err(e) => {
                self.release(kind);
                Err(e)
            }
        }
    }

    /// Whether this process currently runs `kind`
    pub fn is_running(&self, kind: JobKind) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&kind)
    }

    fn lease(&self, kind: JobKind, file: Option<File>) -> JobLease {
        JobLease {
            kind,
            running: Arc::clone(&self.running),
            _file: file,
        }
    }

    fn release(&self, kind: JobKind) {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&kind);
    }

    /// Ok(None) when there is no lock dir or another process holds the lock
    fn lock_file(&self, kind: JobKind) -> Result<Option<File>> {
        let Some(dir) = &self.lock_dir else {
            return Ok(None);
        };
        let path = dir.join(format!("{}.{}.lock", self.lock_stem, kind.as_str()));
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .with_context(|| format!("Failed to create lock file: {}", path.display()))?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(file)),
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => Ok(None),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to lock {}", path.display()))
            }
        }
    }
}

/// An active run; dropping it releases the kind
#[derive(Debug)]
pub struct JobLease {
    kind: JobKind,
    running: Arc<Mutex<HashSet<JobKind>>>,
    // The OS releases the file lock when the handle closes
    _file: Option<File>,
}

impl JobLease {
    pub fn kind(&self) -> JobKind {
        self.kind
    }
}

impl Drop for JobLease {
    fn drop(&mut self) {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.kind);
    }
}
