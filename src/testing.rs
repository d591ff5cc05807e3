//! Tree queries and event simulation over an in-memory host.
//!
//! [`TestRenderer`] renders into a [`MemoryHost`], finds nodes with
//! [`Predicate`]s and fires the handlers bound to their properties. Every
//! interaction runs inside [`Root::act`], so all resulting updates are
//! committed before the call returns.
//!
//! ```ignore
//! let mut renderer = TestRenderer::create(Element::component(People::new(store)))?;
//! let edit = renderer.get_by_text("Edit Adam")?;
//! renderer.click(&edit)?;
//! let checked = renderer.find_all_by_properties(Props::new().with("checked", true));
//! ```

use std::fmt;

use crate::engine::{CommitReport, Element, Priority, Root};
use crate::error::{QueryError, Result};
use crate::host::{MemoryHost, MemoryNode, NodeId};
use crate::types::{Event, EventKind, PropValue, Props};

// =============================================================================
// Predicates
// =============================================================================

type Test = Box<dyn Fn(&MemoryHost, &MemoryNode) -> bool>;

/// A node test plus a human readable description for error messages.
pub struct Predicate {
    description: String,
    test: Test,
}

impl Predicate {
    pub fn new(description: impl Into<String>, test: impl Fn(&MemoryHost, &MemoryNode) -> bool + 'static) -> Self {
        Self {
            description: description.into(),
            test: Box::new(test),
        }
    }

    /// Element instances of `kind`.
    pub fn by_kind(kind: impl Into<String>) -> Self {
        let kind = kind.into();
        Self::new(format!("kind {kind:?}"), move |_, node| {
            matches!(node, MemoryNode::Instance { kind: k, .. } if *k == kind)
        })
    }

    /// Element instances whose first child is a text leaf reading exactly `text`.
    pub fn by_text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(format!("text {text:?}"), move |host, node| {
            let MemoryNode::Instance { children, .. } = node else { return false };
            matches!(
                children.first().and_then(|&child| host.node(child)),
                Some(MemoryNode::Text { text: t }) if *t == text
            )
        })
    }

    /// Element instances carrying every property of `expected`.
    pub fn by_properties(expected: Props) -> Self {
        Self::new(format!("properties {expected:?}"), move |_, node| {
            matches!(node, MemoryNode::Instance { props, .. } if props.matches(&expected))
        })
    }

    /// Both predicates.
    pub fn and(self, other: Predicate) -> Self {
        let (a, b) = (self.test, other.test);
        Self {
            description: format!("{} and {}", self.description, other.description),
            test: Box::new(move |host, node| a(host, node) && b(host, node)),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    fn test(&self, host: &MemoryHost, node: &MemoryNode) -> bool {
        (self.test)(host, node)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.description).finish()
    }
}

// =============================================================================
// Node snapshots
// =============================================================================

/// Snapshot of a matched element instance.
///
/// Holds no borrow of the renderer; events fired through it look the node
/// up again, so they see the handlers of the latest commit.
#[derive(Debug, Clone)]
pub struct NodeRef {
    id: NodeId,
    kind: String,
    props: Props,
    text: Option<String>,
    children: Vec<NodeId>,
}

impl NodeRef {
    fn capture(host: &MemoryHost, id: NodeId) -> Option<Self> {
        let MemoryNode::Instance { kind, props, children } = host.node(id)? else {
            return None;
        };
        let text = children.first().and_then(|&child| match host.node(child) {
            Some(MemoryNode::Text { text }) => Some(text.clone()),
            _ => None,
        });
        Some(Self {
            id,
            kind: kind.clone(),
            props: props.clone(),
            text,
            children: children.clone(),
        })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn prop(&self, name: &str) -> Option<&PropValue> {
        self.props.get(name)
    }

    /// Text of the first child, if it is a text leaf.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

// =============================================================================
// TestRenderer
// =============================================================================

/// A [`Root`] over a [`MemoryHost`] with query and event helpers.
pub struct TestRenderer {
    root: Root<MemoryHost>,
}

impl TestRenderer {
    /// Render `element` into a fresh in-memory container.
    pub fn create(element: impl Into<Element>) -> Result<Self> {
        Self::with_root(Root::new(MemoryHost::new()), element)
    }

    /// Render `element` into a preconfigured root.
    pub fn with_root(mut root: Root<MemoryHost>, element: impl Into<Element>) -> Result<Self> {
        root.render(element)?;
        Ok(Self { root })
    }

    /// Replace the rendered description.
    pub fn update(&mut self, element: impl Into<Element>) -> Result<()> {
        self.root.render(element)
    }

    pub fn unmount(&mut self) -> Result<()> {
        self.root.unmount()
    }

    /// Run an external completion (e.g. resolving a deferred load) and
    /// commit what it caused.
    pub fn resolve<T>(&mut self, f: impl FnOnce() -> T) -> Result<T> {
        self.root.act(f)
    }

    pub fn root(&self) -> &Root<MemoryHost> {
        &self.root
    }

    pub fn host(&self) -> &MemoryHost {
        self.root.host()
    }

    pub fn last_commit(&self) -> Option<CommitReport> {
        self.root.last_commit()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// First match in depth-first pre-order.
    pub fn find(&self, predicate: &Predicate) -> Option<NodeRef> {
        let host = self.host();
        self.walk()
            .into_iter()
            .find(|&id| host.node(id).is_some_and(|node| predicate.test(host, node)))
            .and_then(|id| NodeRef::capture(host, id))
    }

    /// Every match in depth-first pre-order.
    pub fn find_all(&self, predicate: &Predicate) -> Vec<NodeRef> {
        let host = self.host();
        self.walk()
            .into_iter()
            .filter(|&id| host.node(id).is_some_and(|node| predicate.test(host, node)))
            .filter_map(|id| NodeRef::capture(host, id))
            .collect()
    }

    pub fn get(&self, predicate: &Predicate) -> Result<NodeRef, QueryError> {
        self.find(predicate).ok_or_else(|| QueryError::NotFound {
            predicate: predicate.description().to_string(),
        })
    }

    pub fn find_by_kind(&self, kind: &str) -> Option<NodeRef> {
        self.find(&Predicate::by_kind(kind))
    }

    pub fn find_by_text(&self, text: &str) -> Option<NodeRef> {
        self.find(&Predicate::by_text(text))
    }

    pub fn find_by_properties(&self, expected: Props) -> Option<NodeRef> {
        self.find(&Predicate::by_properties(expected))
    }

    pub fn find_all_by_kind(&self, kind: &str) -> Vec<NodeRef> {
        self.find_all(&Predicate::by_kind(kind))
    }

    pub fn find_all_by_text(&self, text: &str) -> Vec<NodeRef> {
        self.find_all(&Predicate::by_text(text))
    }

    pub fn find_all_by_properties(&self, expected: Props) -> Vec<NodeRef> {
        self.find_all(&Predicate::by_properties(expected))
    }

    pub fn get_by_kind(&self, kind: &str) -> Result<NodeRef, QueryError> {
        self.get(&Predicate::by_kind(kind))
    }

    pub fn get_by_text(&self, text: &str) -> Result<NodeRef, QueryError> {
        self.get(&Predicate::by_text(text))
    }

    pub fn get_by_properties(&self, expected: Props) -> Result<NodeRef, QueryError> {
        self.get(&Predicate::by_properties(expected))
    }

    /// Node ids in depth-first pre-order, starting at the container.
    fn walk(&self) -> Vec<NodeId> {
        let host = self.host();
        let mut order = Vec::new();
        let mut stack: Vec<NodeId> = host.container().iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(host.children(id).iter().rev().copied());
        }
        order
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Call the `kind` handler of `node` with `event` and commit the result
    /// at interaction priority.
    pub fn fire(&mut self, node: &NodeRef, kind: EventKind, event: Event) -> Result<(), QueryError> {
        let handler = match self.host().node(node.id) {
            None => return Err(QueryError::StaleNode(node.id)),
            Some(MemoryNode::Text { .. }) => None,
            Some(MemoryNode::Instance { props, .. }) => props
                .get(kind.handler_prop())
                .and_then(PropValue::as_handler)
                .cloned(),
        };
        let Some(handler) = handler else {
            return Err(QueryError::MissingHandler {
                event: kind,
                kind: node.kind.clone(),
            });
        };

        log::trace!("fire {kind} on <{}>", node.kind);
        self.root
            .act_with_priority(Priority::UserInteraction, || handler(&event))?;
        Ok(())
    }

    pub fn click(&mut self, node: &NodeRef) -> Result<(), QueryError> {
        self.fire(node, EventKind::Click, Event::new())
    }

    pub fn change(&mut self, node: &NodeRef, event: Event) -> Result<(), QueryError> {
        self.fire(node, EventKind::Change, event)
    }

    pub fn submit(&mut self, node: &NodeRef) -> Result<(), QueryError> {
        self.fire(node, EventKind::Submit, Event::new())
    }
}

impl fmt::Debug for TestRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestRenderer")
            .field("host", self.host())
            .field("last_commit", &self.last_commit())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{h, Component, Cx};
    use crate::error::RenderError;

    #[derive(PartialEq)]
    struct Toggle;

    impl Component for Toggle {
        fn render(&self, cx: &mut Cx<'_>) -> std::result::Result<Element, RenderError> {
            let (on, set_on) = cx.use_state(|| false);
            Ok(h("div")
                .child(
                    h("input")
                        .prop("type", "checkbox")
                        .prop("checked", on)
                        .on_change(move |event| set_on.set(event.target_checked())),
                )
                .child(h("span").child(if on { "on" } else { "off" }))
                .into())
        }
    }

    #[test]
    fn test_queries_walk_pre_order() {
        let renderer = TestRenderer::create(
            h("ul")
                .child(h("li").child("a").child(h("b").child("nested")))
                .child(h("li").child("c")),
        )
        .unwrap();

        let items = renderer.find_all_by_kind("li");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].text(), Some("a"));
        assert_eq!(items[1].text(), Some("c"));

        let kinds: Vec<_> = renderer
            .find_all(&Predicate::new("any", |_, node| matches!(node, MemoryNode::Instance { .. })))
            .iter()
            .map(|node| node.kind().to_string())
            .collect();
        assert_eq!(kinds, vec!["ul", "li", "b", "li"], "depth-first pre-order");
    }

    #[test]
    fn test_by_text_matches_first_child_exactly() {
        let renderer = TestRenderer::create(h("p").child("Edit Adam")).unwrap();

        assert!(renderer.find_by_text("Edit Adam").is_some());
        assert!(renderer.find_by_text("Edit").is_none(), "no substring match");
    }

    #[test]
    fn test_get_reports_predicate() {
        let renderer = TestRenderer::create(h("div")).unwrap();

        let error = renderer
            .get(&Predicate::by_kind("table").and(Predicate::by_text("x")))
            .unwrap_err();
        assert_eq!(
            error,
            QueryError::NotFound {
                predicate: "kind \"table\" and text \"x\"".to_string()
            }
        );
    }

    #[test]
    fn test_change_commits_before_returning() {
        let mut renderer = TestRenderer::create(Element::component(Toggle)).unwrap();
        let checkbox = renderer.get_by_properties(Props::new().with("type", "checkbox")).unwrap();

        renderer.change(&checkbox, Event::checked(true)).unwrap();

        assert!(renderer.find_by_text("on").is_some());
        assert_eq!(renderer.find_all_by_properties(Props::new().with("checked", true)).len(), 1);
        assert_eq!(
            renderer.last_commit().map(|commit| commit.priority),
            Some(Priority::UserInteraction)
        );
    }

    #[test]
    fn test_missing_handler() {
        let mut renderer = TestRenderer::create(h("button").child("Plain")).unwrap();
        let button = renderer.get_by_text("Plain").unwrap();

        assert_eq!(
            renderer.click(&button),
            Err(QueryError::MissingHandler {
                event: EventKind::Click,
                kind: "button".to_string()
            })
        );
    }

    #[test]
    fn test_stale_node() {
        let mut renderer = TestRenderer::create(h("button").on_click(|_| {}).child("Gone")).unwrap();
        let button = renderer.get_by_text("Gone").unwrap();

        renderer.update(h("div")).unwrap();

        assert_eq!(renderer.click(&button), Err(QueryError::StaleNode(button.id())));
    }
}
