//! Compound-value indirection.
//!
//! The document value grammar only carries literals, references, lists
//! and nested objects, so compound values (currently times of day) are
//! routed through auxiliary mapper nodes: the owning property stores a
//! reference to the mapper's output field and the mapper node stores the
//! literal sub-fields. Encoding and decoding are lossless for valid
//! compound values; the invalid/unset sentinel is never encoded at all.

use std::collections::HashMap;

use chrono::{NaiveTime, Timelike};

use crate::document::{Node, PropertyRef, Value};
use crate::registry::{PropertyBag, PropertySchema, PropertyType, PropertyValue};

/// Type name of the time-of-day mapper.
pub const TIME_MAPPER: &str = "TimeMapper";
/// Output field every mapper reference points at.
pub const OUTPUT_FIELD: &str = "value";
/// Root property that declares a rule's mappers.
pub const MAPPERS_PROPERTY: &str = "mappers";

/// Mapper nodes generated during one document build.
///
/// Ids are `mapper0`, `mapper1`, ... in allocation order, unique within
/// the document.
#[derive(Debug, Default)]
pub struct MapperSet {
    nodes: Vec<Node>,
}

impl MapperSet {
    /// Create an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Whether any mappers were allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Consume the set, yielding the mapper nodes in allocation order.
    #[must_use]
    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }

    /// Allocate a `TimeMapper` for a valid time and return the reference
    /// to store in the owning property.
    fn encode_time(&mut self, time: NaiveTime) -> Value {
        let id = format!("mapper{}", self.nodes.len());
        let mut node = Node::new(TIME_MAPPER);
        node.id = Some(id.clone());
        node.set_property("hour", Value::Int(i64::from(time.hour())));
        node.set_property("minute", Value::Int(i64::from(time.minute())));
        self.nodes.push(node);
        Value::Reference(PropertyRef::new(id, vec![OUTPUT_FIELD.to_string()]))
    }
}

/// Encode a resolved property value into a document value.
///
/// Scalars encode directly. A valid time allocates a mapper and encodes
/// as a reference to it. The unset-time sentinel returns `None`: the
/// property is omitted and no mapper is created.
#[must_use]
pub fn encode_property(value: &PropertyValue, mappers: &mut MapperSet) -> Option<Value> {
    match value {
        PropertyValue::String(s) => Some(Value::String(s.clone())),
        PropertyValue::Int(n) => Some(Value::Int(*n)),
        PropertyValue::Double(d) => Some(Value::Double(*d)),
        PropertyValue::Bool(b) => Some(Value::Bool(*b)),
        PropertyValue::Time(Some(time)) => Some(mappers.encode_time(*time)),
        PropertyValue::Time(None) => None,
    }
}

/// Collect a rule's declared mapper nodes, keyed by id.
#[must_use]
pub fn collect_mappers(root: &Node) -> HashMap<&str, &Node> {
    let mut mappers = HashMap::new();
    let Some(Value::List(items)) = root.property(MAPPERS_PROPERTY) else {
        return mappers;
    };
    for item in items {
        if let Value::Object(node) = item {
            if let Some(id) = &node.id {
                mappers.insert(id.as_str(), node);
            }
        }
    }
    mappers
}

/// Decode a document value into a resolved property value.
///
/// Returns `None` when the value cannot be resolved against the expected
/// type — an unresolved or unrecognized mapper reference, a literal of
/// the wrong type, or a raw expression. The caller leaves the property
/// unset and continues; decoding is a soft operation.
#[must_use]
pub fn decode_property(
    value: &Value,
    expected: PropertyType,
    mappers: &HashMap<&str, &Node>,
) -> Option<PropertyValue> {
    match (expected, value) {
        (PropertyType::String, Value::String(s)) => Some(PropertyValue::String(s.clone())),
        (PropertyType::Int, Value::Int(n)) => Some(PropertyValue::Int(*n)),
        (PropertyType::Double, Value::Double(d)) => Some(PropertyValue::Double(*d)),
        #[allow(clippy::cast_precision_loss)]
        (PropertyType::Double, Value::Int(n)) => Some(PropertyValue::Double(*n as f64)),
        (PropertyType::Bool, Value::Bool(b)) => Some(PropertyValue::Bool(*b)),
        (PropertyType::Time, Value::Reference(reference)) => decode_time(reference, mappers),
        _ => None,
    }
}

fn decode_time(
    reference: &PropertyRef,
    mappers: &HashMap<&str, &Node>,
) -> Option<PropertyValue> {
    if reference.path.len() != 1 || reference.path[0] != OUTPUT_FIELD {
        return None;
    }
    let mapper = mappers.get(reference.identifier.as_str())?;
    if mapper.type_name != TIME_MAPPER {
        return None;
    }
    let hour = int_field(mapper, "hour");
    let minute = int_field(mapper, "minute");
    // Out-of-range fields decode to the unset sentinel, deterministically.
    match (u32::try_from(hour), u32::try_from(minute)) {
        (Ok(hour @ 0..=23), Ok(minute @ 0..=59)) => Some(PropertyValue::Time(
            NaiveTime::from_hms_opt(hour, minute, 0),
        )),
        _ => Some(PropertyValue::Time(None)),
    }
}

fn int_field(node: &Node, name: &str) -> i64 {
    node.property(name).and_then(Value::as_int).unwrap_or(-1)
}

/// Decode every schema property of a component node.
///
/// Properties absent from the node, or whose values fail to resolve,
/// come back as `None`.
#[must_use]
pub fn decode_properties(
    node: &Node,
    schema: &[PropertySchema],
    mappers: &HashMap<&str, &Node>,
) -> Vec<(String, Option<PropertyValue>)> {
    schema
        .iter()
        .map(|entry| {
            let value = node
                .property(&entry.name)
                .and_then(|value| decode_property(value, entry.property_type, mappers));
            (entry.name.clone(), value)
        })
        .collect()
}

/// Decode a component node into the bag its factory receives. Unset
/// properties are simply absent.
#[must_use]
pub fn decode_bag(
    node: &Node,
    schema: &[PropertySchema],
    mappers: &HashMap<&str, &Node>,
) -> PropertyBag {
    let mut bag = PropertyBag::new();
    for (name, value) in decode_properties(node, schema, mappers) {
        if let Some(value) = value {
            bag.insert(name, value);
        }
    }
    bag
}
