use std::fs;
use std::path::Path;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};

/// Durable home of the saved exercises. The store owns exactly one connection
/// and does no locking of its own; whoever owns the store serializes access.
pub struct ExerciseStore {
    pub(crate) conn: Connection,
    strict_names: bool,
}

impl ExerciseStore {
    /// Open (or create) the database file, make sure the parent directory
    /// exists, and create the `SavedExercises` table if this is a first run.
    pub fn open(path: &Path, strict_names: bool) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path).map_err(StoreError::during("open the database"))?;
        info!(path = %path.display(), strict_names, "opened exercise store");
        Self::with_connection(conn, strict_names)
    }

    /// Throwaway store used by tests and dry runs.
    pub fn open_in_memory(strict_names: bool) -> StoreResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(StoreError::during("open the database"))?;
        Self::with_connection(conn, strict_names)
    }

    fn with_connection(conn: Connection, strict_names: bool) -> StoreResult<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS SavedExercises (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT,
                type TEXT,
                muscle TEXT,
                equipment TEXT,
                difficulty TEXT,
                instructions TEXT
            )",
            [],
        )
        .map_err(StoreError::during("create the SavedExercises table"))?;

        if strict_names {
            // Fails if an older database already holds duplicate names.
            conn.execute(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_saved_exercises_name
                 ON SavedExercises(name)",
                [],
            )
            .map_err(StoreError::during("create the unique name index"))?;
            debug!("unique name index in place");
        }

        Ok(Self { conn, strict_names })
    }

    /// Whether the unique index on `name` is active.
    pub fn strict_names(&self) -> bool {
        self.strict_names
    }
}
