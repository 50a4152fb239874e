use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::search::DEFAULT_EXACT_WEIGHT;

const APP_DIR_NAME: &str = "quickglyph";
pub const MIN_EMIT_DELAY_MS: u64 = 10;
pub const MAX_EMIT_DELAY_MS: u64 = 2_000;
pub const MAX_EXACT_WEIGHT: i64 = 1_000_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write config {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to encode config: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageBackend {
    Sqlite,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library_path: Option<PathBuf>,
    pub usage_backend: UsageBackend,
    pub usage_path: PathBuf,
    pub emit_delay_ms: u64,
    pub grid_columns: u16,
    pub exact_weight: i64,
    #[serde(skip)]
    pub config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let base = stable_app_data_dir();
        Self {
            library_path: None,
            usage_backend: UsageBackend::Sqlite,
            usage_path: base.join("usage.sqlite3"),
            emit_delay_ms: 100,
            grid_columns: 10,
            exact_weight: DEFAULT_EXACT_WEIGHT,
            config_path: base.join("config.toml"),
        }
    }
}

pub fn stable_app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}

pub fn default_config_path() -> PathBuf {
    stable_app_data_dir().join("config.toml")
}

pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if !(MIN_EMIT_DELAY_MS..=MAX_EMIT_DELAY_MS).contains(&cfg.emit_delay_ms) {
        return Err(ConfigError::Invalid("emit_delay_ms out of range".into()));
    }

    if cfg.grid_columns < 1 || cfg.grid_columns > 40 {
        return Err(ConfigError::Invalid("grid_columns out of range".into()));
    }

    if !(1..=MAX_EXACT_WEIGHT).contains(&cfg.exact_weight) {
        return Err(ConfigError::Invalid("exact_weight out of range".into()));
    }

    if cfg.usage_path.as_os_str().is_empty() {
        return Err(ConfigError::Invalid("usage_path is required".into()));
    }

    Ok(())
}

/// Reads the TOML config at `path` (or the default location). A missing file
/// yields defaults; nothing is written.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);

    let mut cfg = match std::fs::read_to_string(&config_path) {
        Ok(raw) => toml::from_str::<Config>(&raw)?,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Config::default(),
        Err(source) => {
            return Err(ConfigError::Read {
                path: config_path,
                source,
            })
        }
    };
    cfg.config_path = config_path;
    validate(&cfg)?;
    Ok(cfg)
}

pub fn save(cfg: &Config) -> Result<(), ConfigError> {
    validate(cfg)?;
    let encoded = toml::to_string_pretty(cfg)?;
    if let Some(parent) = cfg.config_path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: cfg.config_path.clone(),
            source,
        })?;
    }
    std::fs::write(&cfg.config_path, encoded).map_err(|source| ConfigError::Write {
        path: cfg.config_path.clone(),
        source,
    })
}
