//! Built-in components.
//!
//! A small set of generally useful triggers, conditions and actions,
//! plus the `TimeMapper` schema. Platform integrations live in their
//! own crates and register through the same [`Registry`] interface.

mod debug;
mod time;

pub use debug::{DebugTrigger, LoggerAction};
pub use time::{TimeTrigger, WeekdayCondition};

use crate::mapper::TIME_MAPPER;
use crate::registry::{ComponentSpec, PropertySchema, Registry};
use crate::error::RulebotError;

/// Register every built-in component type.
///
/// # Errors
///
/// Fails if any built-in name is already registered.
pub fn register_builtins(registry: &mut Registry) -> Result<(), RulebotError> {
    registry.register(ComponentSpec::trigger("DebugTrigger", |_| {
        Box::new(DebugTrigger::new())
    }))?;

    registry.register(
        ComponentSpec::trigger("TimeTrigger", |bag| {
            Box::new(TimeTrigger::new(bag.time("time")))
        })
        .with_property(PropertySchema::time("time", "Time of day to fire at")),
    )?;

    registry.register(
        ComponentSpec::condition("WeekdayCondition", |bag| {
            Box::new(WeekdayCondition::from_bag(bag))
        })
        .with_property(PropertySchema::bool("onMonday", "Valid on Monday"))
        .with_property(PropertySchema::bool("onTuesday", "Valid on Tuesday"))
        .with_property(PropertySchema::bool("onWednesday", "Valid on Wednesday"))
        .with_property(PropertySchema::bool("onThursday", "Valid on Thursday"))
        .with_property(PropertySchema::bool("onFriday", "Valid on Friday"))
        .with_property(PropertySchema::bool("onSaturday", "Valid on Saturday"))
        .with_property(PropertySchema::bool("onSunday", "Valid on Sunday")),
    )?;

    registry.register(ComponentSpec::action("LoggerAction", |_| {
        Box::new(LoggerAction::new())
    }))?;

    registry.register(
        ComponentSpec::mapper(TIME_MAPPER)
            .with_property(PropertySchema::int("hour", "Hour, 0-23"))
            .with_property(PropertySchema::int("minute", "Minute, 0-59")),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ComponentKind;

    #[test]
    fn test_register_builtins() {
        let mut registry = Registry::new();
        register_builtins(&mut registry).expect("register");

        assert_eq!(
            registry.kind_of("DebugTrigger"),
            Some(ComponentKind::Trigger)
        );
        assert_eq!(registry.kind_of("TimeTrigger"), Some(ComponentKind::Trigger));
        assert_eq!(
            registry.kind_of("WeekdayCondition"),
            Some(ComponentKind::Condition)
        );
        assert_eq!(registry.kind_of("LoggerAction"), Some(ComponentKind::Action));
        assert_eq!(registry.kind_of(TIME_MAPPER), Some(ComponentKind::Mapper));

        assert_eq!(registry.of_kind(ComponentKind::Trigger).len(), 2);
    }

    #[test]
    fn test_register_twice_fails() {
        let mut registry = Registry::new();
        register_builtins(&mut registry).expect("first");
        assert!(register_builtins(&mut registry).is_err());
    }
}
