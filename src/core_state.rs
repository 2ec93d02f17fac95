//! Shared server state for the notification API.
//!
//! `CoreState` owns the single SQLite connection behind a `Mutex`.
//! Handlers borrow it only for the duration of one synchronous
//! repository call, never across an `.await`.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use crate::config;
use crate::db;

pub struct CoreState {
    conn: Mutex<rusqlite::Connection>,
    /// Row cap applied to every list call.
    pub list_limit: u32,
    started_at: Instant,
}

impl CoreState {
    /// Open (and migrate) the database at `path`.
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        let conn = db::open_database(path)?;
        tracing::info!(path = %path.display(), "Notification database opened");
        Ok(Self::with_connection(conn))
    }

    /// In-memory state (for testing).
    pub fn in_memory() -> Result<Self, CoreError> {
        Ok(Self::with_connection(db::open_memory_database()?))
    }

    fn with_connection(conn: rusqlite::Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            list_limit: config::MAX_LIST_SIZE,
            started_at: Instant::now(),
        }
    }

    /// Lock the connection.
    pub fn db(&self) -> Result<MutexGuard<'_, rusqlite::Connection>, CoreError> {
        self.conn.lock().map_err(|_| CoreError::LockPoisoned)
    }

    /// Run `f` against the locked connection.
    pub fn with_db<T>(
        &self,
        f: impl FnOnce(&rusqlite::Connection) -> Result<T, db::DatabaseError>,
    ) -> Result<T, CoreError> {
        let guard = self.db()?;
        f(&guard).map_err(CoreError::Database)
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
}
