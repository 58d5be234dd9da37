//! Configuration settings for rulebot.
//!
//! Settings are loaded from `~/.rulebot/config.yaml`.

use serde::{Deserialize, Serialize};

use crate::cli::args::OutputFormat;
use crate::config::Paths;
use crate::error::RulebotError;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// General settings.
    pub general: GeneralConfig,
    /// Engine settings.
    pub engine: EngineConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default output format.
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    /// Disable colored output.
    #[serde(default)]
    pub no_color: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: default_output_format(),
            no_color: false,
        }
    }
}

/// Engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seconds between trigger heartbeats when running as a service.
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_seconds: default_tick_seconds(),
        }
    }
}

// Default value functions for serde
const fn default_output_format() -> OutputFormat {
    OutputFormat::Pretty
}

const fn default_tick_seconds() -> u32 {
    150
}

impl Settings {
    /// Load settings from the config file; missing files yield defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(paths: &Paths) -> Result<Self, RulebotError> {
        if !paths.config_file.exists() {
            return Ok(Self::default());
        }
        let yaml = std::fs::read_to_string(&paths.config_file)
            .map_err(|e| RulebotError::Config(format!("Failed to read config: {e}")))?;
        serde_yaml::from_str(&yaml)
            .map_err(|e| RulebotError::Config(format!("Failed to parse config: {e}")))
    }

    /// Save settings to the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, paths: &Paths) -> Result<(), RulebotError> {
        paths.ensure_dirs()?;
        let yaml = serde_yaml::to_string(self)
            .map_err(|e| RulebotError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(&paths.config_file, yaml)
            .map_err(|e| RulebotError::Config(format!("Failed to write config: {e}")))
    }
}
