//! Core library surface for the Exercise Guide TUI.
//!
//! `db` persists saved exercises in SQLite, `sync` keeps the in-memory view
//! and browsing cursor consistent with it, and `catalog` talks to the remote
//! exercise search. `ui` and `config` glue those together for the binary.
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod sync;
pub mod ui;

pub use catalog::{ExerciseCatalog, NinjasClient};
pub use config::Config;
pub use db::ExerciseStore;
pub use error::{FetchError, StoreError};
pub use models::{Difficulty, ExerciseRecord, SearchQuery, StoredExercise};
pub use sync::{filter_unsaved, Cursor, ExerciseLibrary, SaveOutcome};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
