use std::collections::BTreeMap;
use std::fmt;

use super::Value;

/// An immutable bag of named attributes describing one occurrence in the
/// monitored stream.
///
/// Attribute names are dot-separated paths, so `"sensor.temperature"`
/// addresses the `temperature` attribute nested under `sensor`. Lookups
/// return `None` for absent attributes; there is no default value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Event {
    data: BTreeMap<String, EventValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
enum EventValue {
    Leaf(Value),
    Nested(BTreeMap<String, EventValue>),
}

/// A named attribute borrowed from an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute<'a> {
    name: &'a str,
    value: &'a Value,
}

impl<'a> Attribute<'a> {
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.name
    }

    #[must_use]
    pub fn value(&self) -> &'a Value {
        self.value
    }
}

impl Event {
    /// Create an event without attributes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an event carrying exactly one attribute.
    #[must_use]
    pub fn single(name: &str, value: impl Into<Value>) -> Self {
        Self::new().set(name, value)
    }

    /// Set a value at a dot-separated path. Creates intermediate nested maps as needed.
    #[must_use]
    pub fn set(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.insert(path, value.into());
        self
    }

    /// Insert a value at a dot-separated path (mutable reference version).
    pub fn insert(&mut self, path: &str, value: Value) {
        let segments: Vec<&str> = path.split('.').collect();
        Self::insert_recursive(&mut self.data, &segments, value);
    }

    /// Look up a value by dot-separated path.
    /// Returns `None` if the path does not exist or points to a nested map.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        let segments: Vec<&str> = path.split('.').collect();
        Self::get_recursive(&self.data, &segments)
    }

    /// Look up an attribute by dot-separated path.
    #[must_use]
    pub fn attribute<'a>(&'a self, path: &'a str) -> Option<Attribute<'a>> {
        self.get(path).map(|value| Attribute { name: path, value })
    }

    /// All leaf attributes as `(path, value)` pairs, sorted by path.
    #[must_use]
    pub fn attributes(&self) -> Vec<(String, &Value)> {
        let mut out = Vec::new();
        Self::flatten_recursive(&self.data, "", &mut out);
        out
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn insert_recursive(map: &mut BTreeMap<String, EventValue>, segments: &[&str], value: Value) {
        match segments {
            [] => {}
            [last] => {
                map.insert((*last).to_owned(), EventValue::Leaf(value));
            }
            [first, rest @ ..] => {
                let entry = map
                    .entry((*first).to_owned())
                    .or_insert_with(|| EventValue::Nested(BTreeMap::new()));
                match entry {
                    EventValue::Nested(nested) => {
                        Self::insert_recursive(nested, rest, value);
                    }
                    EventValue::Leaf(_) => {
                        let mut nested = BTreeMap::new();
                        Self::insert_recursive(&mut nested, rest, value);
                        *entry = EventValue::Nested(nested);
                    }
                }
            }
        }
    }

    fn get_recursive<'a>(
        map: &'a BTreeMap<String, EventValue>,
        segments: &[&str],
    ) -> Option<&'a Value> {
        match segments {
            [] => None,
            [last] => match map.get(*last)? {
                EventValue::Leaf(v) => Some(v),
                EventValue::Nested(_) => None,
            },
            [first, rest @ ..] => match map.get(*first)? {
                EventValue::Nested(nested) => Self::get_recursive(nested, rest),
                EventValue::Leaf(_) => None,
            },
        }
    }

    fn flatten_recursive<'a>(
        map: &'a BTreeMap<String, EventValue>,
        prefix: &str,
        out: &mut Vec<(String, &'a Value)>,
    ) {
        for (key, entry) in map {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            match entry {
                EventValue::Leaf(v) => out.push((path, v)),
                EventValue::Nested(nested) => Self::flatten_recursive(nested, &path, out),
            }
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (path, value)) in self.attributes().into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{path}={value}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;

    #[test]
    fn set_and_get_simple() {
        let event = Event::new().set("name", "alice");
        assert_eq!(event.get("name"), Some(&Value::String("alice".to_owned())));
    }

    #[test]
    fn set_and_get_nested() {
        let event = Event::new().set("sensor.reading.celsius", 25_i64);
        assert_eq!(event.get("sensor.reading.celsius"), Some(&Value::Int(25)));
    }

    #[test]
    fn get_missing_returns_none() {
        let event = Event::new().set("sensor.celsius", 25_i64);
        assert_eq!(event.get("sensor.humidity"), None);
        assert_eq!(event.get("nonexistent"), None);
    }

    #[test]
    fn get_intermediate_path_returns_none() {
        let event = Event::new().set("sensor.celsius", 25_i64);
        assert_eq!(event.get("sensor"), None);
    }

    #[test]
    fn overwrite_leaf_with_nested() {
        let event = Event::new()
            .set("sensor", "old_value")
            .set("sensor.celsius", 30_i64);
        assert_eq!(event.get("sensor.celsius"), Some(&Value::Int(30)));
        assert_eq!(event.get("sensor"), None);
    }

    #[test]
    fn overwrite_value() {
        let event = Event::new().set("score", 10_i64).set("score", 20_i64);
        assert_eq!(event.get("score"), Some(&Value::Int(20)));
    }

    #[test]
    fn single_attribute_event() {
        let event = Event::single("x", 8_i64);
        assert_eq!(event.attributes(), vec![("x".to_owned(), &Value::Int(8))]);
    }

    #[test]
    fn attribute_accessor() {
        let event = Event::new().set("station.id", "berlin-1");
        let attribute = event.attribute("station.id").unwrap();
        assert_eq!(attribute.name(), "station.id");
        assert_eq!(attribute.value(), &Value::String("berlin-1".into()));
        assert!(event.attribute("station").is_none());
    }

    #[test]
    fn attributes_are_flattened_and_sorted() {
        let event = Event::new()
            .set("z", 1_i64)
            .set("a.c", true)
            .set("a.b", "x");
        let paths: Vec<String> = event.attributes().into_iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["a.b", "a.c", "z"]);
    }

    #[test]
    fn display_renders_flattened_paths() {
        let event = Event::new().set("wind.speed", 12_i64).set("city", "Berlin");
        assert_eq!(event.to_string(), "{city=\"Berlin\", wind.speed=12}");
        assert_eq!(Event::new().to_string(), "{}");
    }

    #[test]
    fn equality_ignores_insertion_order() {
        let a = Event::new().set("x", 1_i64).set("y", 2_i64);
        let b = Event::new().set("y", 2_i64).set("x", 1_i64);
        assert_eq!(a, b);
    }

    #[test]
    fn empty_event_returns_none() {
        let event = Event::new();
        assert!(event.is_empty());
        assert_eq!(event.get("anything"), None);
    }
}
