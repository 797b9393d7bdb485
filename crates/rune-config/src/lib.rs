//! Rune Motion configuration system
//!
//! This crate loads the transition settings used by the scenario runner from
//! `rune-motion.toml`, with environment variables layered on top.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rune_transition::{TransitionMode, TransitionOptions};

/// Default configuration file name, looked up in the current directory.
pub const CONFIG_FILE: &str = "rune-motion.toml";

/// Errors produced while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main configuration structure for Rune Motion
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct MotionConfig {
    /// Options for the single-slot `Transition`
    pub transition: TransitionOptions,
    /// Options for the keyed `TransitionGroup`
    pub group: TransitionOptions,
    /// Scenario runner settings
    pub demo: DemoConfig,
    /// Log output settings
    pub logging: LoggingConfig,
}

/// Which scripted scenario the runner plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Single,
    Modes,
    Group,
    #[default]
    All,
}

impl FromStr for Scenario {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "modes" => Ok(Self::Modes),
            "group" => Ok(Self::Group),
            "all" => Ok(Self::All),
            _ => Err(ConfigError::UnknownScenario(s.to_string())),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Single => "single",
            Self::Modes => "modes",
            Self::Group => "group",
            Self::All => "all",
        };
        f.write_str(name)
    }
}

/// Scenario runner configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub scenario: Scenario,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

fn parse_flag(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

impl MotionConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from `path`, falling back to defaults when the file
    /// does not exist. A file that exists but does not parse is an error.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    /// Load configuration from the default location (rune-motion.toml in the
    /// current directory) or return default configuration if that fails
    pub fn load_or_default() -> Self {
        Self::load_from_file(CONFIG_FILE).unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) -> Result<()> {
        // Single transition
        if let Ok(name) = std::env::var("RUNE_TRANSITION_NAME") {
            self.transition.name = Some(name);
        }
        if let Ok(val) = std::env::var("RUNE_TRANSITION_MODE") {
            self.transition.mode = match val.trim() {
                "" | "none" => None,
                mode => Some(TransitionMode::from_str(mode).map_err(|_| {
                    ConfigError::InvalidEnv {
                        var: "RUNE_TRANSITION_MODE",
                        value: val.clone(),
                    }
                })?),
            };
        }
        if let Ok(val) = std::env::var("RUNE_TRANSITION_APPEAR") {
            self.transition.appear = parse_flag(&val);
        }

        // Group
        if let Ok(name) = std::env::var("RUNE_GROUP_NAME") {
            self.group.name = Some(name);
        }
        if let Ok(class) = std::env::var("RUNE_GROUP_MOVE_CLASS") {
            self.group.move_class = Some(class);
        }

        // Runner
        if let Ok(val) = std::env::var("RUNE_DEMO_SCENARIO") {
            self.demo.scenario = val.parse().map_err(|_| ConfigError::InvalidEnv {
                var: "RUNE_DEMO_SCENARIO",
                value: val.clone(),
            })?;
        }
        if let Ok(filter) = std::env::var("RUNE_LOG") {
            self.logging.filter = filter;
        }
        Ok(())
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from rune-motion.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from_path(CONFIG_FILE)?;
        config.merge_with_env()?;
        Ok(config)
    }
}
