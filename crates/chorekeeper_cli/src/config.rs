//! Layered configuration for the `chorekeeper` binary.
//!
//! Sources, lowest to highest priority:
//! 1. Built-in defaults
//! 2. `<config dir>/chorekeeper/chorekeeper.toml`
//! 3. `./chorekeeper.toml`
//! 4. The file passed with `--config`
//! 5. Environment variables (`CHOREKEEPER_` prefix, `__` between sections)
//!
//! `CHOREKEEPER_GENERATION__STRATEGY=round_robin` maps to `generation.strategy`.

use chorekeeper_core::{default_log_level, StrategyKind};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const APP_DIR: &str = "chorekeeper";
const CONFIG_FILE_NAME: &str = "chorekeeper.toml";
const DB_FILE_NAME: &str = "chorekeeper.db";
const ENV_PREFIX: &str = "CHOREKEEPER_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    #[error("Configuration file '{}' does not exist", path.display())]
    MissingFile { path: PathBuf },

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChorekeeperConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: data_dir().join(DB_FILE_NAME),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Log directory; `None` falls back to `<data dir>/chorekeeper/logs`.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

impl LoggingConfig {
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| data_dir().join("logs"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub strategy: StrategyKind,
    /// Fixed seed for `uniform_random`; unset means entropy.
    pub seed: Option<u64>,
}

impl ChorekeeperConfig {
    /// Loads every source; `explicit` must exist when given.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::MissingFile {
                    path: path.to_path_buf(),
                });
            }
        }

        let mut files = Vec::new();
        if let Some(global) = global_config_path() {
            files.push(global);
        }
        files.push(PathBuf::from(CONFIG_FILE_NAME));
        files.extend(explicit.map(Path::to_path_buf));

        let config: Self = Self::layered(files).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults, then each existing file in order, then the environment.
    pub fn layered(files: impl IntoIterator<Item = PathBuf>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        for path in files {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.path".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if let Some(dir) = &self.logging.dir {
            if !dir.is_absolute() {
                return Err(ConfigError::InvalidValue {
                    field: "logging.dir".to_string(),
                    reason: format!("must be an absolute path, got '{}'", dir.display()),
                });
            }
        }
        Ok(())
    }
}

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE_NAME))
}
