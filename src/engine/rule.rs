//! Live rule instances.
//!
//! A [`Rule`] is the runtime counterpart of one document: an
//! instantiated trigger, optional condition and ordered actions. Firing
//! follows the fire-and-continue contract: a failing action is recorded
//! and the remaining actions still run.

use std::collections::HashMap;

use chrono::{DateTime, Local};

use crate::document::{Document, Node, Value};
use crate::error::{ActionError, RulebotError};
use crate::mapper::{collect_mappers, decode_bag};
use crate::registry::{ComponentKind, Registry};

use super::traits::{Action, Condition, FireSignal, FiringContext, Trigger};

struct TriggerInstance {
    type_name: String,
    inner: Box<dyn Trigger>,
}

struct ConditionInstance {
    enabled: bool,
    inner: Box<dyn Condition>,
}

struct ActionInstance {
    type_name: String,
    enabled: bool,
    inner: Box<dyn Action>,
}

/// Outcome of one action during a firing.
#[derive(Debug)]
pub struct ActionOutcome {
    /// Component type name of the action.
    pub type_name: String,
    /// Whether the action succeeded.
    pub result: Result<(), ActionError>,
}

/// What happened during one firing of a rule.
#[derive(Debug)]
pub struct FireReport {
    /// Name of the fired rule.
    pub rule_name: String,
    /// Whether the condition gate passed and actions ran.
    pub fired: bool,
    /// Per-action outcomes, in declaration order, enabled actions only.
    pub actions: Vec<ActionOutcome>,
}

impl FireReport {
    /// Number of failed actions.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.actions
            .iter()
            .filter(|outcome| outcome.result.is_err())
            .count()
    }

    /// Number of successful actions.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.actions.len() - self.failed()
    }
}

/// A compiled, instantiated rule.
pub struct Rule {
    name: String,
    /// Disabled rules ignore trigger firings entirely.
    pub enabled: bool,
    trigger: Option<TriggerInstance>,
    condition: Option<ConditionInstance>,
    actions: Vec<ActionInstance>,
}

impl Rule {
    /// Instantiate a rule from a parsed document.
    ///
    /// Trigger, condition and action nodes are instantiated through the
    /// registry with mapper-decoded properties. Slots bound to values
    /// outside the object grammar stay empty and are caught by the
    /// validation gate.
    ///
    /// # Errors
    ///
    /// Fails for unknown component types and capability kind mismatches.
    pub fn from_document(document: &Document, registry: &Registry) -> Result<Self, RulebotError> {
        let root = &document.root;
        let mappers = collect_mappers(root);

        let name = root
            .property("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let enabled = root
            .property("enabled")
            .and_then(Value::as_bool)
            .unwrap_or(true);

        let trigger = match root.property("trigger").and_then(Value::as_object) {
            Some(node) => Some(build_trigger(node, registry, &mappers)?),
            None => None,
        };
        let condition = match root.property("condition").and_then(Value::as_object) {
            Some(node) => Some(build_condition(node, registry, &mappers)?),
            None => None,
        };

        let mut actions = Vec::new();
        if let Some(Value::List(items)) = root.property("actions") {
            for item in items {
                if let Value::Object(node) = item {
                    actions.push(build_action(node, registry, &mappers)?);
                }
            }
        }

        Ok(Self {
            name,
            enabled,
            trigger,
            condition,
            actions,
        })
    }

    /// Rule name from the document.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a trigger was instantiated.
    #[must_use]
    pub const fn has_trigger(&self) -> bool {
        self.trigger.is_some()
    }

    /// Number of instantiated actions.
    #[must_use]
    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    /// Type name of the trigger, for reports.
    #[must_use]
    pub fn trigger_type(&self) -> Option<&str> {
        self.trigger.as_ref().map(|t| t.type_name.as_str())
    }

    pub(crate) fn arm(&mut self, signal: FireSignal) {
        if let Some(trigger) = &mut self.trigger {
            trigger.inner.arm(signal);
        }
    }

    pub(crate) fn disarm(&mut self) {
        if let Some(trigger) = &mut self.trigger {
            trigger.inner.disarm();
        }
    }

    /// Forward a heartbeat to the trigger.
    pub fn tick(&mut self, now: DateTime<Local>) {
        if let Some(trigger) = &mut self.trigger {
            trigger.inner.tick(now);
        }
    }

    /// Fire the rule.
    ///
    /// Disabled rules do nothing. A present, enabled condition gates the
    /// firing; a disabled condition is bypassed. Enabled actions run in
    /// declared order; failures are recorded but never stop the rest.
    pub fn fire(&mut self, context: &FiringContext) -> FireReport {
        let mut report = FireReport {
            rule_name: self.name.clone(),
            fired: false,
            actions: Vec::new(),
        };
        if !self.enabled {
            return report;
        }

        let pass = match &self.condition {
            Some(condition) => !condition.enabled || condition.inner.is_valid(context),
            None => true,
        };
        if !pass {
            return report;
        }

        report.fired = true;
        for action in &mut self.actions {
            if !action.enabled {
                continue;
            }
            report.actions.push(ActionOutcome {
                type_name: action.type_name.clone(),
                result: action.inner.execute(context),
            });
        }
        report
    }

    #[cfg(test)]
    pub(crate) fn from_parts(
        name: &str,
        enabled: bool,
        condition: Option<(bool, Box<dyn Condition>)>,
        actions: Vec<(bool, Box<dyn Action>)>,
    ) -> Self {
        Self {
            name: name.to_string(),
            enabled,
            trigger: None,
            condition: condition.map(|(enabled, inner)| ConditionInstance { enabled, inner }),
            actions: actions
                .into_iter()
                .map(|(enabled, inner)| ActionInstance {
                    type_name: "TestAction".to_string(),
                    enabled,
                    inner,
                })
                .collect(),
        }
    }
}

fn component_enabled(node: &Node) -> bool {
    node.property("enabled")
        .and_then(Value::as_bool)
        .unwrap_or(true)
}

fn build_trigger(
    node: &Node,
    registry: &Registry,
    mappers: &HashMap<&str, &Node>,
) -> Result<TriggerInstance, RulebotError> {
    let spec = registry.spec(&node.type_name)?;
    let bag = decode_bag(node, &spec.properties, mappers);
    let inner = spec
        .make_trigger(&bag)
        .ok_or_else(|| RulebotError::KindMismatch {
            type_name: node.type_name.clone(),
            expected: ComponentKind::Trigger,
            actual: spec.kind,
        })?;
    Ok(TriggerInstance {
        type_name: node.type_name.clone(),
        inner,
    })
}

fn build_condition(
    node: &Node,
    registry: &Registry,
    mappers: &HashMap<&str, &Node>,
) -> Result<ConditionInstance, RulebotError> {
    let spec = registry.spec(&node.type_name)?;
    let bag = decode_bag(node, &spec.properties, mappers);
    let inner = spec
        .make_condition(&bag)
        .ok_or_else(|| RulebotError::KindMismatch {
            type_name: node.type_name.clone(),
            expected: ComponentKind::Condition,
            actual: spec.kind,
        })?;
    Ok(ConditionInstance {
        enabled: component_enabled(node),
        inner,
    })
}

fn build_action(
    node: &Node,
    registry: &Registry,
    mappers: &HashMap<&str, &Node>,
) -> Result<ActionInstance, RulebotError> {
    let spec = registry.spec(&node.type_name)?;
    let bag = decode_bag(node, &spec.properties, mappers);
    let inner = spec
        .make_action(&bag)
        .ok_or_else(|| RulebotError::KindMismatch {
            type_name: node.type_name.clone(),
            expected: ComponentKind::Action,
            actual: spec.kind,
        })?;
    Ok(ActionInstance {
        type_name: node.type_name.clone(),
        enabled: component_enabled(node),
        inner,
    })
}
