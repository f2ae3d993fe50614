use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::catalog::DEFAULT_BASE_URL;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".exercise-guide";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "saved_exercises.sqlite";
const CONFIG_FILE_NAME: &str = "config.toml";
const LOG_FILE_NAME: &str = "exercise-guide.log";

/// Settings read from `~/.exercise-guide/config.toml`. Every field is
/// optional in the file; command-line flags win over file values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
    pub database_path: Option<PathBuf>,
    /// Put a unique index on exercise names. Opening fails if an existing
    /// database already holds duplicates.
    pub strict_names: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 15,
            database_path: None,
            strict_names: false,
        }
    }
}

impl Config {
    /// Read the file at `path`, or fall back to defaults when it is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid config.toml")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Configured database path, or the default one in the data directory.
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join(DB_FILE_NAME)),
        }
    }
}

/// Resolve `~/.exercise-guide`.
pub fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(data_dir()?.join(CONFIG_FILE_NAME))
}

pub fn default_log_path() -> Result<PathBuf> {
    Ok(data_dir()?.join(LOG_FILE_NAME))
}
