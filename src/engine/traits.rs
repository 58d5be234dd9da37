//! Capability contracts for runtime components.
//!
//! Concrete triggers, conditions and actions implement exactly one of
//! these traits and are instantiated by name through the registry. The
//! engine never knows concrete types.

use std::sync::mpsc::Sender;

use chrono::{DateTime, Local};

use crate::error::ActionError;

/// Evaluation-time view of the firing rule, passed to conditions and
/// actions.
#[derive(Debug, Clone)]
pub struct FiringContext {
    /// Name of the rule being fired.
    pub rule_name: String,
    /// When the firing started.
    pub fired_at: DateTime<Local>,
}

impl FiringContext {
    /// Create a context stamped with the current time.
    #[must_use]
    pub fn new(rule_name: impl Into<String>) -> Self {
        Self {
            rule_name: rule_name.into(),
            fired_at: Local::now(),
        }
    }

    /// Create a context with an explicit timestamp.
    #[must_use]
    pub fn at(rule_name: impl Into<String>, fired_at: DateTime<Local>) -> Self {
        Self {
            rule_name: rule_name.into(),
            fired_at,
        }
    }
}

/// Fire event queued by a trigger handle.
#[derive(Debug, Clone)]
pub(crate) struct FireEvent {
    pub rule_id: String,
    pub generation: u64,
}

/// Handle a trigger uses to fire its rule.
///
/// Signals are tagged with the engine generation they were armed in;
/// the engine discards events from stopped generations, so a stale
/// handle can never invoke a live rule.
#[derive(Debug, Clone)]
pub struct FireSignal {
    rule_id: String,
    generation: u64,
    sender: Sender<FireEvent>,
}

impl FireSignal {
    pub(crate) fn new(rule_id: String, generation: u64, sender: Sender<FireEvent>) -> Self {
        Self {
            rule_id,
            generation,
            sender,
        }
    }

    /// Id of the rule this signal fires.
    #[must_use]
    pub fn rule_id(&self) -> &str {
        &self.rule_id
    }

    /// Queue a fire event. Never fails; events for dead engines are
    /// silently dropped.
    pub fn fire(&self) {
        let _ = self.sender.send(FireEvent {
            rule_id: self.rule_id.clone(),
            generation: self.generation,
        });
    }
}

/// Source of fire notifications.
pub trait Trigger {
    /// Receive the signal handle for the owning rule.
    fn arm(&mut self, _signal: FireSignal) {}

    /// Drop any stored signal handle; the rule is going away.
    fn disarm(&mut self) {}

    /// Periodic heartbeat for time-driven triggers.
    fn tick(&mut self, _now: DateTime<Local>) {}
}

/// Gate evaluated when a trigger fires.
pub trait Condition {
    /// Whether the rule should run its actions.
    fn is_valid(&self, context: &FiringContext) -> bool;
}

/// Side effect run when a rule fires.
pub trait Action {
    /// Run the side effect. Failures are recorded and logged, never
    /// propagated, and never stop sibling actions.
    fn execute(&mut self, context: &FiringContext) -> Result<(), ActionError>;
}
