//! Error types shared by the persistence layer and the catalog client. The UI
//! and `main` wrap these in `anyhow` so they can attach context, but the core
//! returns typed variants so callers can tell a missing row from a dead
//! database.

use thiserror::Error;

/// Failures raised by [`crate::db::ExerciseStore`] and, through it, the sync
/// coordinator.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The database could not be opened, or a statement could not be prepared
    /// or executed. `operation` names what we were trying to do.
    #[error("exercise store unavailable while trying to {operation}: {source}")]
    Unavailable {
        operation: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// Only raised when the unique index on `name` is enabled.
    #[error("an exercise named '{0}' is already saved")]
    DuplicateKey(String),

    #[error("no saved exercise with id {0}")]
    NotFound(i64),

    /// A row came back with a column we could not read as text.
    #[error("saved exercise row {id} is malformed: {source}")]
    MalformedRow {
        id: i64,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to prepare the data directory: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Build a closure that tags a rusqlite error with the operation name.
    /// Reads nicer than a hand-written closure at every `map_err` site.
    pub(crate) fn during(operation: &'static str) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| StoreError::Unavailable { operation, source }
    }
}

/// Failures from the remote exercise catalog.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("no API key configured; set api_key in config.toml or EXERCISE_GUIDE_API_KEY")]
    MissingApiKey,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("catalog responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode catalog response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The background worker hung up before sending a result.
    #[error("search worker stopped unexpectedly")]
    WorkerGone,
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
