//! Debug components: a manually tripped trigger and a logging action.

use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::PathBuf;

use crate::config::Paths;
use crate::engine::{Action, FireSignal, FiringContext, Trigger};
use crate::error::ActionError;

/// Trigger fired on demand, for tests and debugging sessions.
#[derive(Debug, Default)]
pub struct DebugTrigger {
    signal: Option<FireSignal>,
}

impl DebugTrigger {
    /// Create an unarmed trigger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the owning rule. Does nothing while unarmed.
    pub fn trip(&self) {
        if let Some(signal) = &self.signal {
            signal.fire();
        }
    }
}

impl Trigger for DebugTrigger {
    fn arm(&mut self, signal: FireSignal) {
        self.signal = Some(signal);
    }

    fn disarm(&mut self) {
        self.signal = None;
    }
}

/// Action that appends a record of the firing to the log file.
#[derive(Debug)]
pub struct LoggerAction {
    log_file: PathBuf,
}

impl LoggerAction {
    /// Create an action logging to the default log file.
    #[must_use]
    pub fn new() -> Self {
        let log_file = Paths::new()
            .map(|paths| paths.log_file)
            .unwrap_or_else(|_| PathBuf::from("rulebot.log"));
        Self { log_file }
    }

    /// Create an action logging to a specific file.
    #[must_use]
    pub const fn with_path(log_file: PathBuf) -> Self {
        Self { log_file }
    }
}

impl Default for LoggerAction {
    fn default() -> Self {
        Self::new()
    }
}

impl Action for LoggerAction {
    fn execute(&mut self, context: &FiringContext) -> Result<(), ActionError> {
        let mut log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)
            .map_err(|e| ActionError::new(format!("Failed to open log: {e}")))?;

        let record = format!(
            "Rule {{\n    name: \"{}\"\n    time: {}\n}}\n\n",
            context.rule_name,
            context.fired_at.format("%Y/%m/%d %H:%M:%S")
        );
        log.write_all(record.as_bytes())
            .map_err(|e| ActionError::new(format!("Failed to write log: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    #[test]
    fn test_trip_fires_armed_signal() {
        let (sender, receiver) = channel();
        let mut trigger = DebugTrigger::new();

        // Unarmed trips go nowhere.
        trigger.trip();

        trigger.arm(FireSignal::new("rule_00000".to_string(), 1, sender));
        trigger.trip();
        assert!(receiver.try_recv().is_ok());

        trigger.disarm();
        trigger.trip();
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_logger_appends_record() {
        let temp = tempfile::TempDir::new().expect("temp dir");
        let path = temp.path().join("rulebot.log");
        let mut action = LoggerAction::with_path(path.clone());

        let context = FiringContext::new("morning");
        action.execute(&context).expect("first write");
        action.execute(&context).expect("second write");

        let log = std::fs::read_to_string(&path).expect("read log");
        assert_eq!(log.matches("Rule {").count(), 2);
        assert!(log.contains("name: \"morning\""));
    }
}
