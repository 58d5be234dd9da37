//! Rule definitions: the staged editing model.
//!
//! A [`RuleDefinition`] holds the authoritative trigger/condition slots
//! and action list of one rule. Edits are staged into temporary
//! instances first; `commit` replaces the authoritative instance and
//! `discard` drops the staged one without touching it. Documents are
//! built from and populated into definitions through the mapper layer,
//! so compound values survive the text format.

mod component;

pub use component::{ComponentInstance, PropertyEntry};

use std::collections::{BTreeMap, HashMap};

use crate::document::{Document, Import, Node, Value};
use crate::error::{RulebotError, StructuralError};
use crate::mapper::{
    collect_mappers, decode_properties, encode_property, MapperSet, MAPPERS_PROPERTY,
};
use crate::registry::{base_import, ComponentKind, PropertyType, Registry};

/// A trigger or condition slot.
///
/// States: empty, authoritative only, or authoritative plus one staged
/// instance. Staging never touches the authoritative instance until
/// commit.
#[derive(Debug, Default)]
struct Slot {
    current: Option<ComponentInstance>,
    staged: Option<ComponentInstance>,
}

impl Slot {
    fn stage(&mut self, instance: ComponentInstance) {
        // A previously staged instance is superseded and dropped.
        self.staged = Some(instance);
    }

    /// Promote the staged instance. Reports a change only when the
    /// authoritative identity actually changed.
    fn commit(&mut self) -> bool {
        let Some(staged) = self.staged.take() else {
            return false;
        };
        let changed = self
            .current
            .as_ref()
            .map_or(true, |current| current.instance_id() != staged.instance_id());
        if changed {
            self.current = Some(staged);
        }
        changed
    }

    fn discard(&mut self) {
        self.staged = None;
    }
}

/// Which authoritative slots a commit changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommitOutcome {
    /// The trigger slot was replaced.
    pub trigger_changed: bool,
    /// The condition slot was replaced.
    pub condition_changed: bool,
}

/// The editable model of one rule.
#[derive(Debug, Default)]
pub struct RuleDefinition {
    name: String,
    trigger: Slot,
    condition: Slot,
    actions: Vec<ComponentInstance>,
    staged_actions: BTreeMap<usize, ComponentInstance>,
}

impl RuleDefinition {
    /// Create an empty definition.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rule name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the rule name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Authoritative trigger, if any.
    #[must_use]
    pub fn trigger(&self) -> Option<&ComponentInstance> {
        self.trigger.current.as_ref()
    }

    /// Authoritative condition, if any.
    #[must_use]
    pub fn condition(&self) -> Option<&ComponentInstance> {
        self.condition.current.as_ref()
    }

    /// Authoritative actions in order.
    #[must_use]
    pub fn actions(&self) -> &[ComponentInstance] {
        &self.actions
    }

    /// Staged trigger, for editing before commit.
    #[must_use]
    pub fn staged_trigger_mut(&mut self) -> Option<&mut ComponentInstance> {
        self.trigger.staged.as_mut()
    }

    /// Staged condition, for editing before commit.
    #[must_use]
    pub fn staged_condition_mut(&mut self) -> Option<&mut ComponentInstance> {
        self.condition.staged.as_mut()
    }

    /// Staged action at an index, for editing before commit.
    #[must_use]
    pub fn staged_action_mut(&mut self, index: usize) -> Option<&mut ComponentInstance> {
        self.staged_actions.get_mut(&index)
    }

    /// Stage a fresh trigger instance of the given type.
    ///
    /// # Errors
    ///
    /// Fails for unknown types and for types that are not triggers.
    pub fn stage_trigger(
        &mut self,
        registry: &Registry,
        type_name: &str,
    ) -> Result<&mut ComponentInstance, RulebotError> {
        let instance = make_instance(registry, type_name, ComponentKind::Trigger)?;
        self.trigger.stage(instance);
        Ok(self
            .trigger
            .staged
            .as_mut()
            .unwrap_or_else(|| unreachable!("slot was just staged")))
    }

    /// Stage a fresh condition instance of the given type.
    ///
    /// # Errors
    ///
    /// Fails for unknown types and for types that are not conditions.
    pub fn stage_condition(
        &mut self,
        registry: &Registry,
        type_name: &str,
    ) -> Result<&mut ComponentInstance, RulebotError> {
        let instance = make_instance(registry, type_name, ComponentKind::Condition)?;
        self.condition.stage(instance);
        Ok(self
            .condition
            .staged
            .as_mut()
            .unwrap_or_else(|| unreachable!("slot was just staged")))
    }

    /// Stage an editable copy of the authoritative trigger.
    #[must_use]
    pub fn stage_trigger_clone(&mut self) -> Option<&mut ComponentInstance> {
        let copy = self.trigger.current.as_ref().map(ComponentInstance::duplicate)?;
        self.trigger.stage(copy);
        self.trigger.staged.as_mut()
    }

    /// Stage an editable copy of the authoritative condition.
    #[must_use]
    pub fn stage_condition_clone(&mut self) -> Option<&mut ComponentInstance> {
        let copy = self
            .condition
            .current
            .as_ref()
            .map(ComponentInstance::duplicate)?;
        self.condition.stage(copy);
        self.condition.staged.as_mut()
    }

    /// Stage a fresh action instance at an index. The index may equal
    /// the current length to append on commit.
    ///
    /// # Errors
    ///
    /// Fails for unknown types, for non-action types, and for indices
    /// beyond the list.
    pub fn stage_action(
        &mut self,
        registry: &Registry,
        index: usize,
        type_name: &str,
    ) -> Result<&mut ComponentInstance, RulebotError> {
        if index > self.actions.len() {
            return Err(RulebotError::ActionIndex(index));
        }
        let instance = make_instance(registry, type_name, ComponentKind::Action)?;
        self.staged_actions.insert(index, instance);
        Ok(self
            .staged_actions
            .get_mut(&index)
            .unwrap_or_else(|| unreachable!("action was just staged")))
    }

    /// Stage an editable copy of the action at an index.
    #[must_use]
    pub fn stage_action_clone(&mut self, index: usize) -> Option<&mut ComponentInstance> {
        let copy = self.actions.get(index).map(ComponentInstance::duplicate)?;
        self.staged_actions.insert(index, copy);
        self.staged_actions.get_mut(&index)
    }

    /// Commit the staged trigger and condition slots.
    pub fn commit(&mut self) -> CommitOutcome {
        CommitOutcome {
            trigger_changed: self.trigger.commit(),
            condition_changed: self.condition.commit(),
        }
    }

    /// Commit the staged action at an index.
    ///
    /// # Errors
    ///
    /// Fails if the index no longer fits the list (actions were removed
    /// since staging).
    pub fn commit_action(&mut self, index: usize) -> Result<bool, RulebotError> {
        let Some(staged) = self.staged_actions.remove(&index) else {
            return Ok(false);
        };
        if index < self.actions.len() {
            let changed = self.actions[index].instance_id() != staged.instance_id();
            if changed {
                self.actions[index] = staged;
            }
            Ok(changed)
        } else if index == self.actions.len() {
            self.actions.push(staged);
            Ok(true)
        } else {
            Err(RulebotError::ActionIndex(index))
        }
    }

    /// Drop every staged instance; authoritative state is untouched.
    pub fn discard(&mut self) {
        self.trigger.discard();
        self.condition.discard();
        self.staged_actions.clear();
    }

    /// Remove the authoritative action at an index.
    ///
    /// # Errors
    ///
    /// Fails for indices outside the list.
    pub fn remove_action(&mut self, index: usize) -> Result<(), RulebotError> {
        if index >= self.actions.len() {
            return Err(RulebotError::ActionIndex(index));
        }
        self.actions.remove(index);
        Ok(())
    }

    /// Build a document from the authoritative state.
    #[must_use]
    pub fn to_document(&self, registry: &Registry) -> Document {
        let mut mappers = MapperSet::new();
        let mut imports = vec![base_import()];
        let mut root = Node::new("Rule");

        if !self.name.trim().is_empty() {
            root.set_property("name", Value::String(self.name.clone()));
        }

        if let Some(trigger) = &self.trigger.current {
            let node = convert_component(trigger, registry, &mut mappers, &mut imports);
            root.set_property("trigger", Value::Object(node));
        }
        if let Some(condition) = &self.condition.current {
            let node = convert_component(condition, registry, &mut mappers, &mut imports);
            root.set_property("condition", Value::Object(node));
        }

        if !self.actions.is_empty() {
            let actions = self
                .actions
                .iter()
                .map(|action| {
                    Value::Object(convert_component(action, registry, &mut mappers, &mut imports))
                })
                .collect();
            root.set_property("actions", Value::List(actions));
        }

        if !mappers.is_empty() {
            let nodes = mappers.into_nodes().into_iter().map(Value::Object).collect();
            root.set_property(MAPPERS_PROPERTY, Value::List(nodes));
        }

        Document::new(imports, root)
    }

    /// Populate a definition from a parsed document.
    ///
    /// The trigger and condition are each derived from their own
    /// sub-object. Properties that fail to resolve are left unset;
    /// unknown component types abort this document only.
    ///
    /// # Errors
    ///
    /// Fails for unknown component types, kind mismatches, and component
    /// properties bound to shapes the editing model cannot represent.
    pub fn from_document(
        document: &Document,
        registry: &Registry,
    ) -> Result<Self, RulebotError> {
        let root = &document.root;
        let mappers = collect_mappers(root);
        let mut definition = Self::new();

        if let Some(Value::String(name)) = root.property("name") {
            definition.name = name.clone();
        }

        definition.trigger.current = decode_slot(
            root.property("trigger"),
            "trigger",
            ComponentKind::Trigger,
            registry,
            &mappers,
        )?;
        definition.condition.current = decode_slot(
            root.property("condition"),
            "condition",
            ComponentKind::Condition,
            registry,
            &mappers,
        )?;

        match root.property("actions") {
            None => {}
            Some(Value::List(items)) => {
                for item in items {
                    // Entries that are not objects carry no component;
                    // they are skipped the way unresolved values are.
                    if let Value::Object(node) = item {
                        definition.actions.push(decode_component(
                            node,
                            ComponentKind::Action,
                            registry,
                            &mappers,
                        )?);
                    }
                }
            }
            Some(_) => {
                return Err(StructuralError::ComplexRule(
                    "actions is not a list".to_string(),
                )
                .into());
            }
        }

        Ok(definition)
    }
}

fn make_instance(
    registry: &Registry,
    type_name: &str,
    expected: ComponentKind,
) -> Result<ComponentInstance, RulebotError> {
    let spec = registry.spec(type_name)?;
    if spec.kind != expected {
        return Err(RulebotError::KindMismatch {
            type_name: type_name.to_string(),
            expected,
            actual: spec.kind,
        });
    }
    Ok(ComponentInstance::from_spec(spec))
}

fn convert_component(
    instance: &ComponentInstance,
    registry: &Registry,
    mappers: &mut MapperSet,
    imports: &mut Vec<Import>,
) -> Node {
    let mut node = Node::new(instance.type_name());
    if let Some(spec) = registry.get(instance.type_name()) {
        if !imports.contains(&spec.import) {
            imports.push(spec.import.clone());
        }
    }
    if !instance.enabled {
        node.set_property("enabled", Value::Bool(false));
    }
    for entry in instance.entries() {
        match &entry.value {
            Some(value) => {
                if let Some(encoded) = encode_property(value, mappers) {
                    node.set_property(entry.schema.name.clone(), encoded);
                }
            }
            // An unset bool still serializes, as false.
            None if entry.schema.property_type == PropertyType::Bool => {
                node.set_property(entry.schema.name.clone(), Value::Bool(false));
            }
            None => {}
        }
    }
    node
}

fn decode_slot(
    value: Option<&Value>,
    slot_name: &str,
    kind: ComponentKind,
    registry: &Registry,
    mappers: &HashMap<&str, &Node>,
) -> Result<Option<ComponentInstance>, RulebotError> {
    match value {
        None => Ok(None),
        Some(Value::Object(node)) => {
            Ok(Some(decode_component(node, kind, registry, mappers)?))
        }
        Some(_) => Err(StructuralError::ComplexRule(format!(
            "{slot_name} is not an object"
        ))
        .into()),
    }
}

fn decode_component(
    node: &Node,
    kind: ComponentKind,
    registry: &Registry,
    mappers: &HashMap<&str, &Node>,
) -> Result<ComponentInstance, RulebotError> {
    let spec = registry.spec(&node.type_name)?;
    if spec.kind != kind {
        return Err(RulebotError::KindMismatch {
            type_name: node.type_name.clone(),
            expected: kind,
            actual: spec.kind,
        });
    }
    let mut instance = ComponentInstance::from_spec(spec);
    for (name, value) in decode_properties(node, &spec.properties, mappers) {
        instance.set_decoded(&name, value);
    }
    instance.enabled = node
        .property("enabled")
        .and_then(Value::as_bool)
        .unwrap_or(true);
    Ok(instance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    use crate::document::{parse, write};
    use crate::engine::{Action as ActionTrait, Condition as ConditionTrait, FiringContext, Trigger as TriggerTrait};
    use crate::error::ActionError;
    use crate::registry::{ComponentSpec, PropertySchema, PropertyValue};

    struct NullTrigger;
    impl TriggerTrait for NullTrigger {}

    struct NullCondition;
    impl ConditionTrait for NullCondition {
        fn is_valid(&self, _context: &FiringContext) -> bool {
            true
        }
    }

    struct NullAction;
    impl ActionTrait for NullAction {
        fn execute(&mut self, _context: &FiringContext) -> Result<(), ActionError> {
            Ok(())
        }
    }

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register(
                ComponentSpec::trigger("TimeTrigger", |_| Box::new(NullTrigger))
                    .with_property(PropertySchema::time("time", "Time of day")),
            )
            .expect("register TimeTrigger");
        registry
            .register(
                ComponentSpec::condition("FlagCondition", |_| Box::new(NullCondition))
                    .with_property(PropertySchema::bool("flag", "Flag")),
            )
            .expect("register FlagCondition");
        registry
            .register(
                ComponentSpec::action("LoggerAction", |_| Box::new(NullAction))
                    .with_property(PropertySchema::string("message", "Message")),
            )
            .expect("register LoggerAction");
        registry
            .register(
                ComponentSpec::mapper("TimeMapper")
                    .with_property(PropertySchema::int("hour", "Hour"))
                    .with_property(PropertySchema::int("minute", "Minute")),
            )
            .expect("register TimeMapper");
        registry
    }

    fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).expect("valid test time")
    }

    #[test]
    fn test_stage_rejects_kind_mismatch() {
        let registry = registry();
        let mut definition = RuleDefinition::new();
        let err = definition
            .stage_trigger(&registry, "LoggerAction")
            .expect_err("action in trigger slot");
        assert!(matches!(
            err,
            RulebotError::KindMismatch {
                expected: ComponentKind::Trigger,
                actual: ComponentKind::Action,
                ..
            }
        ));

        let err = definition
            .stage_action(&registry, 0, "TimeTrigger")
            .expect_err("trigger in action slot");
        assert!(matches!(err, RulebotError::KindMismatch { .. }));
    }

    #[test]
    fn test_stage_commit_discard_cycle() {
        let registry = registry();
        let mut definition = RuleDefinition::new();

        definition
            .stage_trigger(&registry, "TimeTrigger")
            .expect("stage");
        // Staging alone does not publish.
        assert!(definition.trigger().is_none());

        let outcome = definition.commit();
        assert!(outcome.trigger_changed);
        assert!(!outcome.condition_changed);
        assert_eq!(
            definition.trigger().map(ComponentInstance::type_name),
            Some("TimeTrigger")
        );

        // Committing again with nothing staged reports no change.
        assert_eq!(definition.commit(), CommitOutcome::default());

        // Discard drops the staged instance, not the authoritative one.
        let before = definition.trigger().map(ComponentInstance::instance_id);
        definition
            .stage_trigger(&registry, "TimeTrigger")
            .expect("stage");
        definition.discard();
        assert_eq!(
            definition.trigger().map(ComponentInstance::instance_id),
            before
        );
    }

    #[test]
    fn test_clone_staging_changes_identity() {
        let registry = registry();
        let mut definition = RuleDefinition::new();
        definition
            .stage_trigger(&registry, "TimeTrigger")
            .expect("stage");
        definition.commit();

        let staged = definition.stage_trigger_clone().expect("clone current");
        staged
            .set_value("time", PropertyValue::from(time(9, 0)))
            .expect("edit clone");
        // The authoritative instance is untouched until commit.
        assert_eq!(
            definition.trigger().and_then(|t| t.value("time")),
            None
        );

        let outcome = definition.commit();
        assert!(outcome.trigger_changed);
        assert_eq!(
            definition.trigger().and_then(|t| t.value("time")),
            Some(&PropertyValue::from(time(9, 0)))
        );
    }

    #[test]
    fn test_action_staging_and_removal() {
        let registry = registry();
        let mut definition = RuleDefinition::new();

        definition
            .stage_action(&registry, 0, "LoggerAction")
            .expect("stage append");
        assert!(definition.actions().is_empty());
        assert!(definition.commit_action(0).expect("commit"));
        assert_eq!(definition.actions().len(), 1);

        // Replace in place.
        definition
            .stage_action(&registry, 0, "LoggerAction")
            .expect("stage replace");
        assert!(definition.commit_action(0).expect("commit"));
        assert_eq!(definition.actions().len(), 1);

        // Out-of-range staging is rejected.
        let err = definition
            .stage_action(&registry, 5, "LoggerAction")
            .expect_err("index beyond list");
        assert!(matches!(err, RulebotError::ActionIndex(5)));

        definition.remove_action(0).expect("remove");
        assert!(definition.actions().is_empty());
        assert!(matches!(
            definition.remove_action(0),
            Err(RulebotError::ActionIndex(0))
        ));
    }

    fn sample_definition(registry: &Registry) -> RuleDefinition {
        let mut definition = RuleDefinition::new();
        definition.set_name("morning");

        let trigger = definition
            .stage_trigger(registry, "TimeTrigger")
            .expect("stage trigger");
        trigger
            .set_value("time", PropertyValue::from(time(8, 30)))
            .expect("set time");

        let condition = definition
            .stage_condition(registry, "FlagCondition")
            .expect("stage condition");
        condition
            .set_value("flag", PropertyValue::from(true))
            .expect("set flag");

        definition.commit();

        let action = definition
            .stage_action(registry, 0, "LoggerAction")
            .expect("stage action");
        action
            .set_value("message", PropertyValue::from("hello"))
            .expect("set message");
        definition.commit_action(0).expect("commit action");

        definition
    }

    #[test]
    fn test_to_document_layout() {
        let registry = registry();
        let definition = sample_definition(&registry);
        let document = definition.to_document(&registry);

        let root = &document.root;
        assert_eq!(root.type_name, "Rule");
        assert_eq!(
            root.property("name"),
            Some(&Value::String("morning".to_string()))
        );

        let trigger = root.property("trigger").and_then(Value::as_object);
        let trigger = trigger.expect("trigger node");
        assert_eq!(trigger.type_name, "TimeTrigger");
        let time_ref = trigger.property("time").and_then(Value::as_reference);
        assert_eq!(
            time_ref.map(crate::document::PropertyRef::chain),
            Some("mapper0.value".to_string())
        );

        let mappers = root.property(MAPPERS_PROPERTY).and_then(Value::as_list);
        let mappers = mappers.expect("mappers list");
        assert_eq!(mappers.len(), 1);
        let mapper = mappers[0].as_object().expect("mapper node");
        assert_eq!(mapper.property("hour"), Some(&Value::Int(8)));
        assert_eq!(mapper.property("minute"), Some(&Value::Int(30)));

        assert_eq!(document.imports, vec![base_import()]);
    }

    #[test]
    fn test_unset_time_makes_no_mapper_or_property() {
        let registry = registry();
        let mut definition = RuleDefinition::new();
        let trigger = definition
            .stage_trigger(&registry, "TimeTrigger")
            .expect("stage");
        trigger
            .set_value("time", PropertyValue::Time(None))
            .expect("set sentinel");
        definition.commit();

        let document = definition.to_document(&registry);
        let trigger = document
            .root
            .property("trigger")
            .and_then(Value::as_object)
            .expect("trigger node");
        assert!(!trigger.has_property("time"));
        assert!(!document.root.has_property(MAPPERS_PROPERTY));
    }

    #[test]
    fn test_unset_bool_serializes_as_false() {
        let registry = registry();
        let mut definition = RuleDefinition::new();
        definition
            .stage_condition(&registry, "FlagCondition")
            .expect("stage");
        definition.commit();

        let document = definition.to_document(&registry);
        let condition = document
            .root
            .property("condition")
            .and_then(Value::as_object)
            .expect("condition node");
        assert_eq!(condition.property("flag"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_blank_name_is_omitted() {
        let registry = registry();
        let mut definition = RuleDefinition::new();
        definition.set_name("   ");
        let document = definition.to_document(&registry);
        assert!(!document.root.has_property("name"));
    }

    #[test]
    fn test_document_round_trip_through_text() {
        let registry = registry();
        let definition = sample_definition(&registry);

        let text = write(&definition.to_document(&registry));
        let document = parse(&text).expect("serialized definition must parse");
        let restored = RuleDefinition::from_document(&document, &registry).expect("decode");

        assert_eq!(restored.name(), "morning");
        let trigger = restored.trigger().expect("trigger");
        assert_eq!(trigger.type_name(), "TimeTrigger");
        assert_eq!(
            trigger.value("time"),
            Some(&PropertyValue::from(time(8, 30)))
        );
        let condition = restored.condition().expect("condition");
        assert_eq!(condition.type_name(), "FlagCondition");
        assert_eq!(condition.value("flag"), Some(&PropertyValue::from(true)));
        assert_eq!(restored.actions().len(), 1);
        assert_eq!(
            restored.actions()[0].value("message"),
            Some(&PropertyValue::from("hello"))
        );
    }

    #[test]
    fn test_trigger_and_condition_decode_independently() {
        let registry = registry();
        let source = "\
import org.rulebot.core 1.0

Rule {
    trigger: TimeTrigger {
    }
    condition: FlagCondition {
        flag: true
    }
    actions: [
        LoggerAction {
        }
    ]
}
";
        let document = parse(source).expect("must parse");
        let definition = RuleDefinition::from_document(&document, &registry).expect("decode");
        assert_eq!(
            definition.trigger().map(ComponentInstance::type_name),
            Some("TimeTrigger")
        );
        assert_eq!(
            definition.condition().map(ComponentInstance::type_name),
            Some("FlagCondition")
        );
    }

    #[test]
    fn test_unresolved_mapper_leaves_property_unset() {
        let registry = registry();
        let source = "\
Rule {
    trigger: TimeTrigger {
        time: mapper7.value
    }
    actions: [
        LoggerAction {
        }
    ]
}
";
        let document = parse(source).expect("must parse");
        let definition = RuleDefinition::from_document(&document, &registry).expect("decode");
        let trigger = definition.trigger().expect("trigger");
        assert_eq!(trigger.value("time"), None);
    }

    #[test]
    fn test_unknown_type_aborts_document() {
        let registry = registry();
        let document = parse("Rule { trigger: Mystery { } }").expect("must parse");
        let err = RuleDefinition::from_document(&document, &registry).expect_err("unknown type");
        assert!(matches!(err, RulebotError::UnknownType(name) if name == "Mystery"));
    }

    #[test]
    fn test_raw_trigger_is_complex() {
        let registry = registry();
        let document = parse("Rule { trigger: makeTrigger() }").expect("must parse");
        let err = RuleDefinition::from_document(&document, &registry).expect_err("raw trigger");
        assert!(matches!(
            err,
            RulebotError::Structural(StructuralError::ComplexRule(_))
        ));
    }

    #[test]
    fn test_disabled_component_round_trips() {
        let registry = registry();
        let mut definition = RuleDefinition::new();
        definition
            .stage_action(&registry, 0, "LoggerAction")
            .expect("stage");
        definition.commit_action(0).expect("commit");
        if let Some(action) = definition.actions.get_mut(0) {
            action.enabled = false;
        }

        let document = definition.to_document(&registry);
        let restored =
            RuleDefinition::from_document(&document, &registry).expect("decode");
        assert!(!restored.actions()[0].enabled);
    }
}
