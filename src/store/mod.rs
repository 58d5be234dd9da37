//! Rule storage.
//!
//! The engine and the definition layer only ever see the [`RuleStore`]
//! trait: list, read, write, remove. The bundled implementation keeps
//! one numbered directory per rule with a single `rule.rule` file in
//! it, so a rule can be shipped or deleted as a unit.

use std::fs;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Paths;
use crate::error::RulebotError;

#[cfg(test)]
use mockall::automock;

/// Name of the document file inside each rule directory.
const RULE_FILE: &str = "rule.rule";

/// Rule ids are zero-padded directory names: `rule_00042`.
static RULE_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^rule_\d{5}$").unwrap_or_else(|e| panic!("Invalid rule id regex: {e}"))
});

/// Storage interface the engine and editors consume.
///
/// Implementations decide the medium; callers stay oblivious to it.
#[cfg_attr(test, automock)]
pub trait RuleStore {
    /// Ids of every stored rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be enumerated.
    fn list(&self) -> Result<Vec<String>, RulebotError>;

    /// Document text of one rule.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule does not exist or cannot be read.
    fn read(&self, id: &str) -> Result<String, RulebotError>;

    /// Write (create or replace) one rule's document text.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule cannot be persisted.
    fn write(&mut self, id: &str, text: &str) -> Result<(), RulebotError>;

    /// Remove a rule; returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails for an existing rule.
    fn remove(&mut self, id: &str) -> Result<bool, RulebotError>;
}

/// Filesystem-backed rule store.
pub struct FsRuleStore {
    root: PathBuf,
}

impl FsRuleStore {
    /// Create a store under the default rules directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new() -> Result<Self, RulebotError> {
        let paths = Paths::new()?;
        Self::open(paths.rules)
    }

    /// Create a store under a custom root, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(root: PathBuf) -> Result<Self, RulebotError> {
        if !root.exists() {
            fs::create_dir_all(&root).map_err(|e| {
                RulebotError::Store(format!("Failed to create rules directory: {e}"))
            })?;
        }
        Ok(Self { root })
    }

    /// Path of a rule's document file.
    #[must_use]
    pub fn rule_path(&self, id: &str) -> PathBuf {
        self.root.join(id).join(RULE_FILE)
    }

    /// First free id in the `rule_NNNNN` sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be enumerated.
    pub fn allocate_id(&self) -> Result<String, RulebotError> {
        let taken = self.list()?;
        let mut index = 0usize;
        loop {
            let id = format!("rule_{index:05}");
            if !taken.contains(&id) && !self.root.join(&id).exists() {
                return Ok(id);
            }
            index += 1;
        }
    }

    /// Store a new rule under a freshly allocated id.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule cannot be persisted.
    pub fn add(&mut self, text: &str) -> Result<String, RulebotError> {
        let id = self.allocate_id()?;
        self.write(&id, text)?;
        Ok(id)
    }

    fn check_id(id: &str) -> Result<(), RulebotError> {
        if RULE_ID.is_match(id) {
            Ok(())
        } else {
            Err(RulebotError::Store(format!("Invalid rule id: {id}")))
        }
    }
}

impl RuleStore for FsRuleStore {
    fn list(&self) -> Result<Vec<String>, RulebotError> {
        let entries = fs::read_dir(&self.root)
            .map_err(|e| RulebotError::Store(format!("Failed to read rules directory: {e}")))?;

        let mut ids = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| RulebotError::Store(format!("Failed to read entry: {e}")))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if RULE_ID.is_match(&name) && entry.path().join(RULE_FILE).is_file() {
                ids.push(name);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    fn read(&self, id: &str) -> Result<String, RulebotError> {
        Self::check_id(id)?;
        let path = self.rule_path(id);
        if !path.is_file() {
            return Err(RulebotError::NotFound(format!("Rule not found: {id}")));
        }
        fs::read_to_string(&path)
            .map_err(|e| RulebotError::Store(format!("Failed to read rule {id}: {e}")))
    }

    fn write(&mut self, id: &str, text: &str) -> Result<(), RulebotError> {
        Self::check_id(id)?;
        let dir = self.root.join(id);
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| {
                RulebotError::Store(format!("Failed to create rule directory {id}: {e}"))
            })?;
        }
        fs::write(dir.join(RULE_FILE), text)
            .map_err(|e| RulebotError::Store(format!("Failed to write rule {id}: {e}")))
    }

    fn remove(&mut self, id: &str) -> Result<bool, RulebotError> {
        Self::check_id(id)?;
        let path = self.rule_path(id);
        if !path.is_file() {
            return Ok(false);
        }
        fs::remove_file(&path)
            .map_err(|e| RulebotError::Store(format!("Failed to remove rule {id}: {e}")))?;

        // Drop the directory too if nothing else lives in it.
        let dir = self.root.join(id);
        let empty = fs::read_dir(&dir)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false);
        if empty {
            let _ = fs::remove_dir(&dir);
        }
        Ok(true)
    }
}
