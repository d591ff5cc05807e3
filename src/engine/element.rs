//! Element descriptions.
//!
//! An [`Element`] is a cheap, clonable description of what should be on
//! screen. Application code builds a fresh description on every render; the
//! reconciler diffs it against the committed fibers.
//!
//! ```ignore
//! let row = h("tr")
//!     .key("1")
//!     .prop("style", Props::new().with("text_align", "left"))
//!     .child(h("td").child("Adam"))
//!     .child(h("td").child(h("button").on_click(|_| edit()).child("Edit Adam")));
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::rc::Rc;

use crate::error::RenderError;
use crate::types::{Event, EventHandler, Key, PropValue, Props};

use super::hooks::Cx;

// =============================================================================
// Component
// =============================================================================

/// A reusable piece of UI with its own hooks.
///
/// The component value itself is its props. Two consecutive descriptions
/// whose values compare equal let the reconciler skip the component and
/// reuse its committed subtree, unless the component has a pending update of
/// its own.
pub trait Component: PartialEq + 'static {
    fn render(&self, cx: &mut Cx<'_>) -> Result<Element, RenderError>;

    /// Name used in logs and telemetry.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Object-safe view of a [`Component`].
pub(crate) trait AnyComponent {
    fn as_any(&self) -> &dyn Any;
    fn props_eq(&self, other: &dyn AnyComponent) -> bool;
    fn render(&self, cx: &mut Cx<'_>) -> Result<Element, RenderError>;
    fn name(&self) -> &'static str;
}

impl<C: Component> AnyComponent for C {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn props_eq(&self, other: &dyn AnyComponent) -> bool {
        other
            .as_any()
            .downcast_ref::<C>()
            .is_some_and(|other| other == self)
    }

    fn render(&self, cx: &mut Cx<'_>) -> Result<Element, RenderError> {
        Component::render(self, cx)
    }

    fn name(&self) -> &'static str {
        Component::name(self)
    }
}

// =============================================================================
// Element
// =============================================================================

/// A node of a description tree.
#[derive(Clone, Default)]
pub enum Element {
    /// Renders nothing and occupies no slot.
    #[default]
    Empty,
    Text(Rc<str>),
    Host(HostElement),
    Component(ComponentElement),
    Fragment(Fragment),
}

impl Element {
    pub fn text(text: impl Into<Rc<str>>) -> Self {
        Element::Text(text.into())
    }

    /// Description of a component instance.
    pub fn component<C: Component>(component: C) -> Self {
        Element::Component(ComponentElement {
            key: None,
            component: Rc::new(component),
        })
    }

    /// Description of a component instance with an explicit key.
    pub fn keyed_component<C: Component>(key: impl Into<Key>, component: C) -> Self {
        Element::Component(ComponentElement {
            key: Some(key.into()),
            component: Rc::new(component),
        })
    }

    /// Sequence of siblings without a wrapping host node.
    pub fn fragment<I, E>(children: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Element>,
    {
        Element::Fragment(Fragment {
            key: None,
            children: children.into_iter().map(Into::into).collect(),
        })
    }

    /// Keyed sequence of siblings.
    pub fn keyed_fragment<I, E>(key: impl Into<Key>, children: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Element>,
    {
        Element::Fragment(Fragment {
            key: Some(key.into()),
            children: children.into_iter().map(Into::into).collect(),
        })
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Element::Empty)
    }

    pub(crate) fn key(&self) -> Option<&Key> {
        match self {
            Element::Host(host) => host.key.as_ref(),
            Element::Component(component) => component.key.as_ref(),
            Element::Fragment(fragment) => fragment.key.as_ref(),
            Element::Empty | Element::Text(_) => None,
        }
    }

    pub(crate) fn element_type(&self) -> Option<ElementType> {
        match self {
            Element::Empty => None,
            Element::Text(_) => Some(ElementType::Text),
            Element::Host(host) => Some(ElementType::Host(host.kind.clone())),
            Element::Component(component) => {
                Some(ElementType::Component(component.component.as_any().type_id()))
            }
            Element::Fragment(_) => Some(ElementType::Fragment),
        }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Empty => f.write_str("Empty"),
            Element::Text(text) => write!(f, "{text:?}"),
            Element::Host(host) => f
                .debug_struct(&host.kind)
                .field("key", &host.key)
                .field("props", &host.props)
                .field("children", &host.children)
                .finish(),
            Element::Component(component) => f
                .debug_struct(component.component.name())
                .field("key", &component.key)
                .finish(),
            Element::Fragment(fragment) => f
                .debug_struct("Fragment")
                .field("key", &fragment.key)
                .field("children", &fragment.children)
                .finish(),
        }
    }
}

impl From<&str> for Element {
    fn from(value: &str) -> Self {
        Element::Text(Rc::from(value))
    }
}

impl From<String> for Element {
    fn from(value: String) -> Self {
        Element::Text(Rc::from(value))
    }
}

impl From<HostElement> for Element {
    fn from(value: HostElement) -> Self {
        Element::Host(value)
    }
}

impl<E: Into<Element>> From<Option<E>> for Element {
    fn from(value: Option<E>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// Identity used to decide whether a fiber can be updated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ElementType {
    Text,
    Host(Rc<str>),
    Component(TypeId),
    Fragment,
}

// =============================================================================
// Host elements
// =============================================================================

/// Start describing a host element of `kind`.
pub fn h(kind: &str) -> HostElement {
    HostElement::new(kind)
}

/// Description of a host element instance.
#[derive(Clone)]
pub struct HostElement {
    pub(crate) kind: Rc<str>,
    pub(crate) key: Option<Key>,
    pub(crate) props: Props,
    pub(crate) children: Vec<Element>,
}

impl HostElement {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: Rc::from(kind),
            key: None,
            props: Props::new(),
            children: Vec::new(),
        }
    }

    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn prop(mut self, name: &str, value: impl Into<PropValue>) -> Self {
        self.props.insert(name, value);
        self
    }

    /// Merge a whole property map (later entries win).
    pub fn props(mut self, props: &Props) -> Self {
        self.props.merge(props);
        self
    }

    pub fn style(self, style: Props) -> Self {
        self.prop("style", style)
    }

    pub fn on(mut self, name: &str, handler: EventHandler) -> Self {
        self.props.insert(name, PropValue::Handler(handler));
        self
    }

    pub fn on_click(self, f: impl Fn(&Event) + 'static) -> Self {
        self.on("on_click", Rc::new(f))
    }

    pub fn on_change(self, f: impl Fn(&Event) + 'static) -> Self {
        self.on("on_change", Rc::new(f))
    }

    pub fn on_submit(self, f: impl Fn(&Event) + 'static) -> Self {
        self.on("on_submit", Rc::new(f))
    }

    pub fn child(mut self, child: impl Into<Element>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<I, E>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Element>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }
}

/// A component instance plus its key.
#[derive(Clone)]
pub struct ComponentElement {
    pub(crate) key: Option<Key>,
    pub(crate) component: Rc<dyn AnyComponent>,
}

/// Siblings without a host node of their own.
#[derive(Clone)]
pub struct Fragment {
    pub(crate) key: Option<Key>,
    pub(crate) children: Vec<Element>,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(PartialEq)]
    struct Label(&'static str);

    impl Component for Label {
        fn render(&self, _cx: &mut Cx<'_>) -> Result<Element, RenderError> {
            Ok(self.0.into())
        }
    }

    #[derive(PartialEq)]
    struct Other;

    impl Component for Other {
        fn render(&self, _cx: &mut Cx<'_>) -> Result<Element, RenderError> {
            Ok(Element::Empty)
        }
    }

    #[test]
    fn test_builder_collects_props_and_children() {
        let element = h("td")
            .key("a")
            .prop("col_span", 3)
            .style(Props::new().with("text_align", "right"))
            .child("text")
            .children(vec!["x", "y"]);

        let Element::Host(host) = element.into() else {
            panic!("expected host element");
        };
        assert_eq!(host.kind(), "td");
        assert_eq!(host.key, Some(Key::from("a")));
        assert_eq!(host.props.get("col_span"), Some(&PropValue::Int(3)));
        assert_eq!(host.children.len(), 3);
    }

    #[test]
    fn test_component_identity() {
        let a = Element::component(Label("a"));
        let b = Element::component(Label("b"));
        let other = Element::component(Other);

        assert_eq!(a.element_type(), b.element_type());
        assert_ne!(a.element_type(), other.element_type());
    }

    #[test]
    fn test_component_props_eq() {
        let a: Rc<dyn AnyComponent> = Rc::new(Label("a"));
        let a2: Rc<dyn AnyComponent> = Rc::new(Label("a"));
        let b: Rc<dyn AnyComponent> = Rc::new(Label("b"));
        let other: Rc<dyn AnyComponent> = Rc::new(Other);

        assert!(a.props_eq(a2.as_ref()));
        assert!(!a.props_eq(b.as_ref()));
        assert!(!a.props_eq(other.as_ref()));
    }

    #[test]
    fn test_option_into_element() {
        let none: Option<&str> = None;
        assert!(Element::from(none).is_empty());
        assert!(!Element::from(Some("x")).is_empty());
    }
}
