//! SQLite-backed record store for saved exercises, split into the connection
//! setup and the row-level operations.

mod connection;
mod exercises;

pub use connection::ExerciseStore;
