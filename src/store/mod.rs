//! Persistence for users, missions, progress, the reward ledger and
//! leaderboard snapshots
//!
//! Query functions take a plain `&Connection` so they compose inside the
//! engine's write transactions (a `Transaction` derefs to a connection).

mod db;

pub mod activity;
pub mod badges;
pub mod leaderboard;
pub mod ledger;
pub mod missions;
pub mod progress;
pub mod users;

pub use db::{DEFAULT_BUSY_TIMEOUT, GameDb, SCHEMA_VERSION};

use chrono::{DateTime, Utc};
use rusqlite::Row;
use rusqlite::types::Type;
use uuid::Uuid;

/// Unix milliseconds for storage
pub(crate) fn to_ms(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

/// Stored milliseconds back to a timestamp
pub(crate) fn from_ms(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

/// Read a UUID stored as text
pub(crate) fn uuid_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Read a text column through one of the models' `from_db` parsers
pub(crate) fn enum_col<T>(
    row: &Row<'_>,
    idx: usize,
    parse: impl Fn(&str) -> Option<T>,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    parse(&raw).ok_or(rusqlite::Error::InvalidColumnType(idx, raw, Type::Text))
}

/// Read a non-negative counter column
pub(crate) fn u32_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<u32> {
    let raw: i64 = row.get(idx)?;
    Ok(u32::try_from(raw.max(0)).unwrap_or(u32::MAX))
}
