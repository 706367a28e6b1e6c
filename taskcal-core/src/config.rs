//! Global taskcal configuration.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{TaskCalError, TaskCalResult};

static DEFAULT_DATA_DIR: &str = "~/.local/share/taskcal";
static DEFAULT_TABLE: &str = "tasks";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Hosted task table (a PostgREST endpoint, e.g. a Supabase project).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RemoteConfig {
    /// Project base URL, without the `/rest/v1` suffix.
    pub url: String,
    pub anon_key: String,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Configuration at ~/.config/taskcal/config.toml, overridable with
/// `TASKCAL_*` environment variables (`TASKCAL_REMOTE__URL` etc).
///
/// Without a `[remote]` table taskcal works purely from the local cache.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TaskCalConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub remote: Option<RemoteConfig>,
}

impl TaskCalConfig {
    pub fn config_path() -> TaskCalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| TaskCalError::Config("Could not determine config directory".into()))?
            .join("taskcal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the global config, writing a commented-out default on first run.
    pub fn load() -> TaskCalResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> TaskCalResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("TASKCAL").separator("__"))
            .build()
            .map_err(|e| TaskCalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| TaskCalError::Config(e.to_string()))
    }

    /// Data directory with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> TaskCalResult<()> {
        let contents = format!(
            "\
# taskcal configuration

# Where tasks and the current session are cached:
# data_dir = \"{}\"

# Hosted task table to sync with (PostgREST / Supabase):
# [remote]
# url = \"https://your-project.supabase.co\"
# anon_key = \"your-anon-key\"
# table = \"{}\"
# timeout_secs = {}
",
            DEFAULT_DATA_DIR, DEFAULT_TABLE, DEFAULT_TIMEOUT_SECS
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                TaskCalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| TaskCalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
