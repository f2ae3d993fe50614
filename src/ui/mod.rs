//! Ratatui front-end: a search form, the filtered result list, and a
//! one-at-a-time browser over saved exercises.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
