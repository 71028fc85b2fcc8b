//! Engine configuration
//!
//! Budgets and presentation settings, loaded from TOML.
//!
//! # Lookup order
//!
//! ```text
//! 1. CLI arguments (--config <FILE>)
//! 2. User-level ($XDG_CONFIG_HOME/ski-engine/config.toml
//!    or ~/.config/ski-engine/config.toml)
//! 3. Default values
//! ```
//!
//! # Usage
//!
//! ```rust
//! use ski_engine::util::config::load_user_config;
//!
//! let config = load_user_config().unwrap();
//! assert!(config.reduce.max_steps > 0);
//! ```

use crate::engine::canon::InferOptions;
use crate::engine::expr::FormatOptions;
use crate::engine::search::{Penalty, SearchOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub reduce: ReduceConfig,
    #[serde(default)]
    pub infer: InferConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub format: FormatConfig,
}

/// Reduction budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReduceConfig {
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

fn default_max_steps() -> usize {
    1000
}

impl Default for ReduceConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
        }
    }
}

/// Inference budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferConfig {
    #[serde(default = "default_max_args")]
    pub max_args: usize,
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

fn default_max_args() -> usize {
    InferOptions::default().max_args
}

impl Default for InferConfig {
    fn default() -> Self {
        Self {
            max_args: default_max_args(),
            max_steps: default_max_steps(),
        }
    }
}

/// Search budget and generation penalties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_max_tries")]
    pub max_tries: usize,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default)]
    pub penalty: Penalty,
}

fn default_max_tries() -> usize {
    SearchOptions::default().max_tries
}

fn default_max_depth() -> usize {
    SearchOptions::default().max_depth
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_tries: default_max_tries(),
            max_depth: default_max_depth(),
            penalty: Penalty::default(),
        }
    }
}

/// Output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatConfig {
    /// Omit spaces between atoms that cannot run together
    #[serde(default = "default_terse")]
    pub terse: bool,
}

fn default_terse() -> bool {
    true
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            terse: default_terse(),
        }
    }
}

impl EngineConfig {
    pub fn infer_options(&self) -> InferOptions {
        InferOptions {
            max_args: self.infer.max_args,
            max_steps: self.infer.max_steps,
        }
    }

    pub fn search_options(&self) -> SearchOptions {
        SearchOptions {
            max_tries: self.search.max_tries,
            max_depth: self.search.max_depth,
            penalty: self.search.penalty,
            infer: self.infer_options(),
        }
    }

    pub fn format_options(&self) -> FormatOptions {
        if self.format.terse {
            FormatOptions::plain()
        } else {
            FormatOptions::spaced()
        }
    }
}

/// Get the user config directory
pub fn get_config_dir() -> Option<PathBuf> {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg_config).join("ski-engine"));
    }

    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home).join(".config").join("ski-engine"));
    }

    if let Ok(appdata) = std::env::var("APPDATA") {
        return Some(PathBuf::from(appdata).join("ski-engine"));
    }

    None
}

/// Get the user config file path
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.toml"))
}

/// Load user-level configuration
/// Returns default config if file doesn't exist
pub fn load_user_config() -> Result<EngineConfig, ConfigError> {
    match get_config_path() {
        Some(path) if path.exists() => load_config(&path),
        _ => Ok(EngineConfig::default()),
    }
}

/// Load configuration from an explicit file
pub fn load_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse configuration from TOML text
pub fn parse_config(content: &str) -> Result<EngineConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Save configuration to a file, creating parent directories
pub fn save_config(
    config: &EngineConfig,
    path: &Path,
) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir)?;
        }
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

/// Save user-level configuration
pub fn save_user_config(config: &EngineConfig) -> Result<(), ConfigError> {
    let path = get_config_path().ok_or(ConfigError::NoConfigDir)?;
    save_config(config, &path)
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Config parse error: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Config serialize error: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Cannot determine config directory")]
    NoConfigDir,
}
