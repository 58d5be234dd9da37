//! Path resolution for rulebot configuration and data files.
//!
//! All rulebot data is stored in `~/.rulebot/`:
//! - `config.yaml` - Main configuration file
//! - `rules/` - One numbered directory per rule
//! - `rulebot.log` - Log written by the logger action

use std::path::PathBuf;

use crate::error::RulebotError;

/// Paths to rulebot configuration and data directories.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root directory: `~/.rulebot/`
    pub root: PathBuf,
    /// Config file: `~/.rulebot/config.yaml`
    pub config_file: PathBuf,
    /// Rules directory: `~/.rulebot/rules/`
    pub rules: PathBuf,
    /// Log file: `~/.rulebot/rulebot.log`
    pub log_file: PathBuf,
}

impl Paths {
    /// Create paths based on the user's home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, RulebotError> {
        let home = std::env::var("HOME")
            .map_err(|_| RulebotError::Config("Could not determine home directory".to_string()))?;
        Ok(Self::with_root(PathBuf::from(home).join(".rulebot")))
    }

    /// Create paths with a custom root directory (useful for testing).
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            config_file: root.join("config.yaml"),
            rules: root.join("rules"),
            log_file: root.join("rulebot.log"),
            root,
        }
    }

    /// Ensure all directories exist, creating them if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn ensure_dirs(&self) -> Result<(), RulebotError> {
        for dir in [&self.root, &self.rules] {
            if !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|e| {
                    RulebotError::Config(format!(
                        "Failed to create directory {}: {e}",
                        dir.display()
                    ))
                })?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_with_root_layout() {
        let paths = Paths::with_root(PathBuf::from("/tmp/rb"));
        assert_eq!(paths.config_file, PathBuf::from("/tmp/rb/config.yaml"));
        assert_eq!(paths.rules, PathBuf::from("/tmp/rb/rules"));
        assert_eq!(paths.log_file, PathBuf::from("/tmp/rb/rulebot.log"));
    }

    #[test]
    fn test_ensure_dirs() {
        let temp = TempDir::new().expect("temp dir");
        let paths = Paths::with_root(temp.path().join("nested"));
        paths.ensure_dirs().expect("ensure");
        assert!(paths.rules.is_dir());
    }
}
