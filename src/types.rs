//! Core types for spark-vdom.
//!
//! These types flow through every layer: descriptions carry them, the
//! reconciler compares them, hosts store them and the query facade matches
//! against them.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

// =============================================================================
// Key - Sibling identity
// =============================================================================

/// Identity of a description slot among its siblings.
///
/// Keyed siblings are matched by key, unkeyed siblings by position.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    Int(i64),
    Str(Rc<str>),
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(i) => write!(f, "{i}"),
            Key::Str(s) => write!(f, "{s:?}"),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(i) => write!(f, "{i}"),
            Key::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(Rc::from(value))
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Str(Rc::from(value))
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key::Int(value as i64)
    }
}

impl From<u32> for Key {
    fn from(value: u32) -> Self {
        Key::Int(value as i64)
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Key::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

// =============================================================================
// Events
// =============================================================================

/// The kind of a synthetic event and the property its handler lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Change,
    Submit,
}

impl EventKind {
    /// Name of the property holding the handler for this event.
    pub const fn handler_prop(self) -> &'static str {
        match self {
            EventKind::Click => "on_click",
            EventKind::Change => "on_change",
            EventKind::Submit => "on_submit",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Click => "click",
            EventKind::Change => "change",
            EventKind::Submit => "submit",
        };
        f.write_str(name)
    }
}

/// Payload delivered to an event handler.
///
/// `target` mirrors the state of the element after the interaction, e.g.
/// `checked` for a checkbox or `value` for a text input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Event {
    pub target: Props,
}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }

    /// Event for a checkbox whose new state is `checked`.
    pub fn checked(checked: bool) -> Self {
        Self {
            target: Props::new().with("checked", checked),
        }
    }

    /// Event for a text input whose new content is `value`.
    pub fn value(value: impl Into<String>) -> Self {
        Self {
            target: Props::new().with("value", value.into()),
        }
    }

    /// `target.checked`, false when absent.
    pub fn target_checked(&self) -> bool {
        self.target.get("checked").and_then(PropValue::as_bool).unwrap_or(false)
    }

    /// `target.value`, empty when absent.
    pub fn target_value(&self) -> &str {
        self.target.get("value").and_then(PropValue::as_str).unwrap_or("")
    }
}

/// Event handler stored in a property.
///
/// Handlers compare by pointer: a freshly created closure is always a
/// different property value.
pub type EventHandler = Rc<dyn Fn(&Event)>;

/// Wrap a closure as a handler property value.
pub fn handler(f: impl Fn(&Event) + 'static) -> PropValue {
    PropValue::Handler(Rc::new(f))
}

// =============================================================================
// Property values
// =============================================================================

/// A single property of an element instance.
#[derive(Clone)]
pub enum PropValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    /// Nested map, e.g. `style`.
    Map(Props),
    Handler(EventHandler),
}

impl PropValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Props> {
        match self {
            PropValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_handler(&self) -> Option<&EventHandler> {
        match self {
            PropValue::Handler(h) => Some(h),
            _ => None,
        }
    }

    /// Shallow match used by property queries: maps match when every key
    /// of `expected` is present with an equal value, everything else
    /// compares by equality.
    pub fn matches(&self, expected: &PropValue) -> bool {
        match (self, expected) {
            (PropValue::Map(actual), PropValue::Map(expected)) => expected
                .iter()
                .all(|(key, value)| actual.get(key) == Some(value)),
            _ => self == expected,
        }
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropValue::Bool(a), PropValue::Bool(b)) => a == b,
            (PropValue::Int(a), PropValue::Int(b)) => a == b,
            (PropValue::Float(a), PropValue::Float(b)) => a == b,
            (PropValue::Str(a), PropValue::Str(b)) => a == b,
            (PropValue::Map(a), PropValue::Map(b)) => a == b,
            (PropValue::Handler(a), PropValue::Handler(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Bool(b) => write!(f, "{b}"),
            PropValue::Int(i) => write!(f, "{i}"),
            PropValue::Float(x) => write!(f, "{x}"),
            PropValue::Str(s) => write!(f, "{s:?}"),
            PropValue::Map(m) => write!(f, "{m:?}"),
            PropValue::Handler(_) => f.write_str("<handler>"),
        }
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Int(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Int(value as i64)
    }
}

impl From<usize> for PropValue {
    fn from(value: usize) -> Self {
        PropValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Float(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(Rc::from(value))
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(Rc::from(value))
    }
}

impl From<Props> for PropValue {
    fn from(value: Props) -> Self {
        PropValue::Map(value)
    }
}

impl From<EventHandler> for PropValue {
    fn from(value: EventHandler) -> Self {
        PropValue::Handler(value)
    }
}

// =============================================================================
// Props - Ordered property map
// =============================================================================

/// Property set of an element instance.
///
/// Ordered so that debug output and terminal painting are deterministic.
#[derive(Clone, Default, PartialEq)]
pub struct Props(BTreeMap<String, PropValue>);

impl Props {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.0.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<PropValue> {
        self.0.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropValue)> {
        self.0.iter()
    }

    /// Copy every entry of `other` over this map (later wins).
    pub fn merge(&mut self, other: &Props) {
        for (name, value) in other.iter() {
            self.0.insert(name.clone(), value.clone());
        }
    }

    /// Partial match: every entry of `expected` must match the entry here.
    pub fn matches(&self, expected: &Props) -> bool {
        expected
            .iter()
            .all(|(name, value)| self.get(name).is_some_and(|actual| actual.matches(value)))
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

impl<K: Into<String>, V: Into<PropValue>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_equality_is_by_pointer() {
        let a: EventHandler = Rc::new(|_| {});
        let b: EventHandler = Rc::new(|_| {});

        assert_eq!(PropValue::Handler(a.clone()), PropValue::Handler(a.clone()));
        assert_ne!(PropValue::Handler(a), PropValue::Handler(b));
    }

    #[test]
    fn test_partial_match_ignores_extra_keys() {
        let props = Props::new()
            .with("type", "checkbox")
            .with("checked", true)
            .with("on_change", handler(|_| {}));

        assert!(props.matches(&Props::new().with("type", "checkbox")));
        assert!(props.matches(&Props::new().with("type", "checkbox").with("checked", true)));
        assert!(!props.matches(&Props::new().with("checked", false)));
        assert!(!props.matches(&Props::new().with("placeholder", "name")));
    }

    #[test]
    fn test_nested_map_matches_shallowly() {
        let style = Props::new().with("text_align", "right").with("font_weight", "bold");
        let props = Props::new().with("style", style);

        let expected = Props::new().with("style", Props::new().with("text_align", "right"));
        assert!(props.matches(&expected), "subset of style keys should match");

        let wrong = Props::new().with("style", Props::new().with("text_align", "left"));
        assert!(!props.matches(&wrong));
    }

    #[test]
    fn test_event_target_accessors() {
        assert!(Event::checked(true).target_checked());
        assert!(!Event::new().target_checked());
        assert_eq!(Event::value("AdamX").target_value(), "AdamX");
    }

    #[test]
    fn test_key_display() {
        assert_eq!(Key::from("1").to_string(), "1");
        assert_eq!(Key::from(42i64).to_string(), "42");
        assert_ne!(Key::from("1"), Key::from(1i64));
    }

    #[test]
    fn test_usize_conversion_saturates() {
        assert_eq!(Key::from(usize::MAX), Key::Int(i64::MAX));
        assert_eq!(PropValue::from(usize::MAX), PropValue::Int(i64::MAX));
        assert_eq!(Key::from(7usize), Key::Int(7));
    }
}
