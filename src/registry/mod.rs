//! Component registry.
//!
//! Maps document type names to capability-tagged factories and property
//! schemas. The registry is an explicit value built once at startup and
//! passed by handle into the parser consumers, the definition layer and
//! the engine; there is no ambient global state.

mod schema;

use std::collections::BTreeMap;
use std::fmt;

use crate::document::Import;
use crate::engine::{Action, Condition, Trigger};
use crate::error::RulebotError;

pub use schema::{PropertyBag, PropertySchema, PropertyType, PropertyValue};

/// Module uri that built-in components are imported from.
pub const BASE_MODULE: &str = "org.rulebot.core";
/// Version of the built-in module.
pub const BASE_VERSION: &str = "1.0";

/// Import statement for the built-in module.
#[must_use]
pub fn base_import() -> Import {
    Import::module(BASE_MODULE, BASE_VERSION)
}

/// What a registered type may be used as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ComponentKind {
    /// Fires rules.
    Trigger,
    /// Gates firings.
    Condition,
    /// Runs side effects.
    Action,
    /// Reconstructs compound values from literal sub-fields.
    Mapper,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Trigger => "trigger",
            Self::Condition => "condition",
            Self::Action => "action",
            Self::Mapper => "mapper",
        })
    }
}

/// Constructor for runtime component instances.
pub enum ComponentFactory {
    /// Builds a trigger.
    Trigger(Box<dyn Fn(&PropertyBag) -> Box<dyn Trigger>>),
    /// Builds a condition.
    Condition(Box<dyn Fn(&PropertyBag) -> Box<dyn Condition>>),
    /// Builds an action.
    Action(Box<dyn Fn(&PropertyBag) -> Box<dyn Action>>),
    /// Mappers are decoded by the translator, never instantiated.
    Mapper,
}

impl ComponentFactory {
    const fn kind(&self) -> ComponentKind {
        match self {
            Self::Trigger(_) => ComponentKind::Trigger,
            Self::Condition(_) => ComponentKind::Condition,
            Self::Action(_) => ComponentKind::Action,
            Self::Mapper => ComponentKind::Mapper,
        }
    }
}

/// A registered component type.
pub struct ComponentSpec {
    /// Type name as written in documents.
    pub type_name: String,
    /// Capability kind.
    pub kind: ComponentKind,
    /// Editable property schema.
    pub properties: Vec<PropertySchema>,
    /// Import statement documents using this type must carry.
    pub import: Import,
    factory: ComponentFactory,
}

impl ComponentSpec {
    /// Create a spec; the kind is derived from the factory.
    #[must_use]
    pub fn new(type_name: impl Into<String>, factory: ComponentFactory) -> Self {
        Self {
            type_name: type_name.into(),
            kind: factory.kind(),
            properties: Vec::new(),
            import: base_import(),
            factory,
        }
    }

    /// Create a trigger spec.
    #[must_use]
    pub fn trigger(
        type_name: impl Into<String>,
        factory: impl Fn(&PropertyBag) -> Box<dyn Trigger> + 'static,
    ) -> Self {
        Self::new(type_name, ComponentFactory::Trigger(Box::new(factory)))
    }

    /// Create a condition spec.
    #[must_use]
    pub fn condition(
        type_name: impl Into<String>,
        factory: impl Fn(&PropertyBag) -> Box<dyn Condition> + 'static,
    ) -> Self {
        Self::new(type_name, ComponentFactory::Condition(Box::new(factory)))
    }

    /// Create an action spec.
    #[must_use]
    pub fn action(
        type_name: impl Into<String>,
        factory: impl Fn(&PropertyBag) -> Box<dyn Action> + 'static,
    ) -> Self {
        Self::new(type_name, ComponentFactory::Action(Box::new(factory)))
    }

    /// Create a mapper spec.
    #[must_use]
    pub fn mapper(type_name: impl Into<String>) -> Self {
        Self::new(type_name, ComponentFactory::Mapper)
    }

    /// Add a property schema entry.
    #[must_use]
    pub fn with_property(mut self, schema: PropertySchema) -> Self {
        self.properties.push(schema);
        self
    }

    /// Override the originating import.
    #[must_use]
    pub fn with_import(mut self, import: Import) -> Self {
        self.import = import;
        self
    }

    /// Look up a property schema by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertySchema> {
        self.properties.iter().find(|schema| schema.name == name)
    }

    /// Instantiate a trigger from this spec.
    #[must_use]
    pub fn make_trigger(&self, bag: &PropertyBag) -> Option<Box<dyn Trigger>> {
        match &self.factory {
            ComponentFactory::Trigger(factory) => Some(factory(bag)),
            _ => None,
        }
    }

    /// Instantiate a condition from this spec.
    #[must_use]
    pub fn make_condition(&self, bag: &PropertyBag) -> Option<Box<dyn Condition>> {
        match &self.factory {
            ComponentFactory::Condition(factory) => Some(factory(bag)),
            _ => None,
        }
    }

    /// Instantiate an action from this spec.
    #[must_use]
    pub fn make_action(&self, bag: &PropertyBag) -> Option<Box<dyn Action>> {
        match &self.factory {
            ComponentFactory::Action(factory) => Some(factory(bag)),
            _ => None,
        }
    }
}

/// Registry of component types, keyed by type name.
#[derive(Default)]
pub struct Registry {
    specs: BTreeMap<String, ComponentSpec>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component type.
    ///
    /// # Errors
    ///
    /// Returns an error if the type name is already registered.
    pub fn register(&mut self, spec: ComponentSpec) -> Result<(), RulebotError> {
        if self.specs.contains_key(&spec.type_name) {
            return Err(RulebotError::DuplicateType(spec.type_name));
        }
        self.specs.insert(spec.type_name.clone(), spec);
        Ok(())
    }

    /// Whether a type name is registered.
    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.specs.contains_key(type_name)
    }

    /// Look up a spec by type name.
    #[must_use]
    pub fn get(&self, type_name: &str) -> Option<&ComponentSpec> {
        self.specs.get(type_name)
    }

    /// Look up a spec, reporting unknown names as errors.
    ///
    /// # Errors
    ///
    /// Returns [`RulebotError::UnknownType`] for unregistered names.
    pub fn spec(&self, type_name: &str) -> Result<&ComponentSpec, RulebotError> {
        self.specs
            .get(type_name)
            .ok_or_else(|| RulebotError::UnknownType(type_name.to_string()))
    }

    /// Capability kind of a registered type.
    #[must_use]
    pub fn kind_of(&self, type_name: &str) -> Option<ComponentKind> {
        self.specs.get(type_name).map(|spec| spec.kind)
    }

    /// All registered types of one kind, in name order. This is the
    /// choice list editors present per slot.
    #[must_use]
    pub fn of_kind(&self, kind: ComponentKind) -> Vec<&ComponentSpec> {
        self.specs
            .values()
            .filter(|spec| spec.kind == kind)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::FiringContext;
    use crate::error::ActionError;

    struct NullTrigger;
    impl Trigger for NullTrigger {}

    struct NullAction;
    impl Action for NullAction {
        fn execute(&mut self, _context: &FiringContext) -> Result<(), ActionError> {
            Ok(())
        }
    }

    fn sample_registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register(ComponentSpec::trigger("T", |_| Box::new(NullTrigger)))
            .expect("register T");
        registry
            .register(
                ComponentSpec::action("A", |_| Box::new(NullAction))
                    .with_property(PropertySchema::string("message", "Message to log")),
            )
            .expect("register A");
        registry
            .register(
                ComponentSpec::mapper("TimeMapper")
                    .with_property(PropertySchema::int("hour", "Hour"))
                    .with_property(PropertySchema::int("minute", "Minute")),
            )
            .expect("register TimeMapper");
        registry
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = sample_registry();
        assert!(registry.contains("T"));
        assert_eq!(registry.kind_of("T"), Some(ComponentKind::Trigger));
        assert_eq!(registry.kind_of("A"), Some(ComponentKind::Action));
        assert!(registry.get("Unknown").is_none());
        assert!(matches!(
            registry.spec("Unknown"),
            Err(RulebotError::UnknownType(_))
        ));
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = sample_registry();
        let err = registry
            .register(ComponentSpec::trigger("T", |_| Box::new(NullTrigger)))
            .expect_err("duplicate must fail");
        assert!(matches!(err, RulebotError::DuplicateType(name) if name == "T"));
    }

    #[test]
    fn test_choice_list_by_kind() {
        let registry = sample_registry();
        let actions = registry.of_kind(ComponentKind::Action);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].type_name, "A");
        assert!(registry.of_kind(ComponentKind::Condition).is_empty());
    }

    #[test]
    fn test_factory_kind_must_match() {
        let registry = sample_registry();
        let spec = registry.get("T").expect("spec");
        assert!(spec.make_trigger(&PropertyBag::new()).is_some());
        assert!(spec.make_action(&PropertyBag::new()).is_none());
    }
}
