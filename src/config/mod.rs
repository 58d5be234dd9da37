//! Configuration management for rulebot.
//!
//! This module handles loading and saving configuration from `~/.rulebot/`.

mod paths;
mod settings;

pub use paths::Paths;
pub use settings::{EngineConfig, GeneralConfig, Settings};
