//! Editable component instances.
//!
//! A [`ComponentInstance`] is the editing-time representation of one
//! trigger, condition or action: its type, its schema-ordered property
//! values, and an enabled flag. Instances carry a process-unique id so
//! commit logic can tell "replaced by a new instance" apart from "same
//! instance committed again".

use std::sync::atomic::{AtomicU64, Ordering};

use crate::registry::{
    ComponentKind, ComponentSpec, PropertyBag, PropertySchema, PropertyValue,
};
use crate::error::RulebotError;

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

/// One property of a component instance: its schema entry plus the
/// current value, `None` while unset.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyEntry {
    /// Schema entry this value belongs to.
    pub schema: PropertySchema,
    /// Current value, `None` while unset.
    pub value: Option<PropertyValue>,
}

/// An editable component instance owned by a rule definition.
#[derive(Debug)]
pub struct ComponentInstance {
    instance_id: u64,
    type_name: String,
    kind: ComponentKind,
    /// Whether the component participates in firing.
    pub enabled: bool,
    entries: Vec<PropertyEntry>,
}

impl ComponentInstance {
    /// Create an instance with every property unset.
    #[must_use]
    pub fn from_spec(spec: &ComponentSpec) -> Self {
        Self {
            instance_id: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
            type_name: spec.type_name.clone(),
            kind: spec.kind,
            enabled: true,
            entries: spec
                .properties
                .iter()
                .map(|schema| PropertyEntry {
                    schema: schema.clone(),
                    value: None,
                })
                .collect(),
        }
    }

    /// Identity of this instance, unique within the process.
    #[must_use]
    pub const fn instance_id(&self) -> u64 {
        self.instance_id
    }

    /// Component type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Capability kind.
    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// Properties in schema order.
    #[must_use]
    pub fn entries(&self) -> &[PropertyEntry] {
        &self.entries
    }

    /// Current value of a property.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&PropertyValue> {
        self.entries
            .iter()
            .find(|entry| entry.schema.name == name)
            .and_then(|entry| entry.value.as_ref())
    }

    /// Set a property value, validating it against the schema.
    ///
    /// # Errors
    ///
    /// Fails for names outside the schema and for values of the wrong
    /// type.
    pub fn set_value(&mut self, name: &str, value: PropertyValue) -> Result<(), RulebotError> {
        let Some(entry) = self
            .entries
            .iter_mut()
            .find(|entry| entry.schema.name == name)
        else {
            return Err(RulebotError::UnknownProperty {
                type_name: self.type_name.clone(),
                property: name.to_string(),
            });
        };
        if !entry.schema.is_compatible(&value) {
            return Err(RulebotError::IncompatibleValue {
                property: name.to_string(),
                expected: entry.schema.property_type,
            });
        }
        entry.value = Some(value);
        Ok(())
    }

    /// Unset a property.
    ///
    /// # Errors
    ///
    /// Fails for names outside the schema.
    pub fn clear_value(&mut self, name: &str) -> Result<(), RulebotError> {
        let Some(entry) = self
            .entries
            .iter_mut()
            .find(|entry| entry.schema.name == name)
        else {
            return Err(RulebotError::UnknownProperty {
                type_name: self.type_name.clone(),
                property: name.to_string(),
            });
        };
        entry.value = None;
        Ok(())
    }

    /// Set a value decoded from a document without re-validating; the
    /// decoder already matched it against the schema.
    pub(crate) fn set_decoded(&mut self, name: &str, value: Option<PropertyValue>) {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|entry| entry.schema.name == name)
        {
            entry.value = value;
        }
    }

    /// Copy of this instance with a fresh identity, for clone-then-edit
    /// staging.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self {
            instance_id: NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed),
            type_name: self.type_name.clone(),
            kind: self.kind,
            enabled: self.enabled,
            entries: self.entries.clone(),
        }
    }

    /// Collect the set values into the bag a factory receives.
    #[must_use]
    pub fn to_bag(&self) -> PropertyBag {
        let mut bag = PropertyBag::new();
        for entry in &self.entries {
            if let Some(value) = &entry.value {
                bag.insert(entry.schema.name.clone(), value.clone());
            }
        }
        bag
    }
}
