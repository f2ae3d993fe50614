//! Keeps the in-memory view of saved exercises consistent with the store:
//! the name-based dedup filter, the browsing cursor, and the coordinator that
//! ties them to every save and delete.

mod cursor;
mod dedup;
mod library;

pub use cursor::Cursor;
pub use dedup::filter_unsaved;
pub use library::{ExerciseLibrary, SaveOutcome};
