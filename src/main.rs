//! Binary entry point: read configuration, open the store, and drive the
//! Ratatui event loop until the user exits.
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::Parser;
use exercise_guide::config::{default_config_path, default_log_path};
use exercise_guide::{run_app, App, Config, ExerciseLibrary, ExerciseStore, NinjasClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "exercise-guide")]
#[command(version, about = "Search an exercise catalog and keep a local guide of favourites")]
struct Cli {
    /// Path to the SQLite database (defaults to ~/.exercise-guide/saved_exercises.sqlite)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Path to config.toml (defaults to ~/.exercise-guide/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// API key for the exercise catalog
    #[arg(long, env = "EXERCISE_GUIDE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Enforce unique exercise names with a database index
    #[arg(long)]
    strict_names: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_path()?,
    };
    let mut config = Config::load(&config_path)?;
    if cli.api_key.is_some() {
        config.api_key = cli.api_key;
    }
    if cli.db.is_some() {
        config.database_path = cli.db;
    }
    config.strict_names |= cli.strict_names;

    // Without durable storage there is nothing useful to do.
    let db_path = config.database_path()?;
    let store = ExerciseStore::open(&db_path, config.strict_names)
        .with_context(|| format!("failed to open exercise store at {}", db_path.display()))?;
    let library = ExerciseLibrary::open(store).context("failed to load saved exercises")?;

    let catalog = NinjasClient::new(config.api_key.clone(), config.base_url.clone(), config.timeout())
        .context("failed to build catalog client")?;

    let mut app = App::new(library, Arc::new(catalog));
    run_app(&mut app)
}

/// Log to a file next to the database; stdout belongs to the terminal UI.
fn init_logging() -> anyhow::Result<()> {
    let log_path = default_log_path()?;
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "exercise_guide=info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .init();

    Ok(())
}
