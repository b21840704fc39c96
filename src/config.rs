//! Configuration loading from environment variables and an optional TOML file.
//!
//! Values are read from `VISION_BRIDGE_*` environment variables with sensible
//! defaults. Invalid values fall back to defaults without crashing. When
//! `VISION_BRIDGE_CONFIG` names a TOML file, its keys override the
//! environment.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `VISION_BRIDGE_ASSETS` | `.` | Asset root directory |
//! | `VISION_BRIDGE_NUM_THREADS` | 1 | Engine threads per model |
//! | `VISION_BRIDGE_RESIZE_FILTER` | `triangle` | `triangle` or `nearest` |
//! | `VISION_BRIDGE_LOG_LEVEL` | `info` | Tracing filter directive |
//! | `VISION_BRIDGE_LOG_FORMAT` | `json` | `json` or `pretty` |
//! | `VISION_BRIDGE_CONFIG` | unset | TOML file applied over the above |

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::{InterpreterConfig, ResizeFilter, MAX_NUM_THREADS};
use crate::telemetry::{LogConfig, LogFormat};
use crate::RuntimeConfig;

pub const ENV_ASSETS: &str = "VISION_BRIDGE_ASSETS";
pub const ENV_NUM_THREADS: &str = "VISION_BRIDGE_NUM_THREADS";
pub const ENV_RESIZE_FILTER: &str = "VISION_BRIDGE_RESIZE_FILTER";
pub const ENV_LOG_LEVEL: &str = "VISION_BRIDGE_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "VISION_BRIDGE_LOG_FORMAT";
pub const ENV_CONFIG_FILE: &str = "VISION_BRIDGE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Effective configuration summary (serializable).
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub assets_root: String,
    pub num_threads: usize,
    pub resize_filter: String,
    pub log_level: String,
    pub log_format: String,
    pub config_file: Option<String>,
}

/// All configuration, after environment and file overrides.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub assets_root: PathBuf,
    pub num_threads: usize,
    pub resize_filter: ResizeFilter,
    pub log: LogConfig,
    pub config_file: Option<PathBuf>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            assets_root: PathBuf::from("."),
            num_threads: 1,
            resize_filter: ResizeFilter::default(),
            log: LogConfig::default(),
            config_file: None,
        }
    }
}

/// Keys accepted in the TOML config file. All optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub assets_root: Option<PathBuf>,
    pub num_threads: Option<usize>,
    pub resize_filter: Option<ResizeFilter>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub log_file: Option<PathBuf>,
}

impl FileConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

fn clamp_threads(n: usize) -> usize {
    n.clamp(1, MAX_NUM_THREADS)
}

/// Parse a value with `FromStr`, returning `default` on missing or invalid.
fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => val.trim().parse::<T>().unwrap_or(default),
        None => default,
    }
}

impl EnvConfig {
    /// Build configuration from an arbitrary key lookup.
    ///
    /// Environment values only; the config file is applied by [`load`].
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let assets_root = lookup(ENV_ASSETS)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.assets_root);
        let num_threads = clamp_threads(parse_or(&lookup, ENV_NUM_THREADS, 1usize));
        let resize_filter = parse_or(&lookup, ENV_RESIZE_FILTER, ResizeFilter::default());
        let level = lookup(ENV_LOG_LEVEL)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.log.level);
        let format = parse_or(&lookup, ENV_LOG_FORMAT, LogFormat::default());

        Self {
            assets_root,
            num_threads,
            resize_filter,
            log: LogConfig {
                format,
                level,
                output_path: None,
            },
            config_file: lookup(ENV_CONFIG_FILE).map(PathBuf::from),
        }
    }

    /// Apply file overrides on top of the environment values.
    pub fn apply_file(&mut self, file: FileConfig) {
        if let Some(root) = file.assets_root {
            self.assets_root = root;
        }
        if let Some(n) = file.num_threads {
            self.num_threads = clamp_threads(n);
        }
        if let Some(filter) = file.resize_filter {
            self.resize_filter = filter;
        }
        if let Some(level) = file.log_level {
            self.log.level = level;
        }
        if let Some(format) = file.log_format {
            self.log.format = format;
        }
        if file.log_file.is_some() {
            self.log.output_path = file.log_file;
        }
    }

    /// Runtime configuration derived from these values.
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            assets_root: self.assets_root.clone(),
            interpreter: InterpreterConfig::with_threads(self.num_threads),
            resize_filter: self.resize_filter,
        }
    }

    /// Return a serializable summary of all effective values.
    pub fn effective_config(&self) -> EffectiveConfig {
        EffectiveConfig {
            assets_root: self.assets_root.display().to_string(),
            num_threads: self.num_threads,
            resize_filter: self.resize_filter.to_string(),
            log_level: self.log.level.clone(),
            log_format: self.log.format.to_string(),
            config_file: self.config_file.as_ref().map(|p| p.display().to_string()),
        }
    }
}

/// Load configuration from the process environment and the optional file.
///
/// Missing or invalid environment values fall back to defaults. A config file
/// that is named but unreadable or malformed is an error.
pub fn load() -> Result<EnvConfig, ConfigError> {
    let mut config = EnvConfig::from_lookup(|key| std::env::var(key).ok());
    if let Some(path) = config.config_file.clone() {
        let file = FileConfig::from_path(&path)?;
        config.apply_file(file);
    }
    Ok(config)
}
