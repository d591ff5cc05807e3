//! Render phase.
//!
//! Walks the fiber tree from the root, re-rendering dirty components and
//! diffing their output against the committed fibers. Nothing touches the
//! host here: the pass produces a [`Mutation`] list that the root applies in
//! one commit.
//!
//! # Matching
//!
//! Siblings are matched by [`Slot`] (key, or position when unkeyed) plus
//! element type. A matched fiber is updated in place, an unmatched element
//! gets a new fiber, and every leftover old fiber is deleted.
//!
//! # Child order
//!
//! Whenever a pass changes the structure below a host parent, the parent is
//! queued for a child sync. The sync flattens the new host children (looking
//! through components and fragments), removes nodes that are gone, keeps the
//! longest increasing run of surviving old positions in place and inserts
//! everything else right-to-left before its next sibling.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::error::RenderError;

use super::element::{Element, ElementType};
use super::fiber::{Fiber, FiberArena, FiberId, FiberKind, Slot};
use super::hooks::{Cx, Hooks};
use super::scheduler::Scheduler;

/// A host operation expressed over fibers. Nodes are resolved at apply time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mutation {
    ClearContainer,
    CreateInstance(FiberId),
    CreateText(FiberId),
    UpdateProps(FiberId),
    UpdateText(FiberId),
    Remove {
        parent: FiberId,
        child: FiberId,
    },
    /// Append when `before` is `None`. `moved` marks an already attached child.
    Insert {
        parent: FiberId,
        child: FiberId,
        before: Option<FiberId>,
        moved: bool,
    },
}

/// Result of a successful render pass.
#[derive(Debug, Default)]
pub(crate) struct RenderOutput {
    pub mutations: Vec<Mutation>,
    /// Tops of deleted subtrees, released after the commit lands.
    pub deletions: Vec<FiberId>,
    pub components_rendered: usize,
}

pub(crate) struct RenderPass<'a, N> {
    arena: &'a mut FiberArena<N>,
    scheduler: &'a Rc<Scheduler>,
    output: RenderOutput,
    sync: Vec<FiberId>,
    sync_seen: HashSet<FiberId>,
}

impl<'a, N> RenderPass<'a, N> {
    pub fn new(arena: &'a mut FiberArena<N>, scheduler: &'a Rc<Scheduler>) -> Self {
        Self {
            arena,
            scheduler,
            output: RenderOutput::default(),
            sync: Vec::new(),
            sync_seen: HashSet::new(),
        }
    }

    /// Run the pass from `root`. `element` is the current root description.
    pub fn run(mut self, root: FiberId, element: &Element) -> Result<RenderOutput, RenderError> {
        let root_dirty = self.arena.get(root).is_some_and(|fiber| fiber.dirty);
        if root_dirty {
            if let Some(fiber) = self.arena.get_mut(root) {
                fiber.dirty = false;
                fiber.subtree_dirty = false;
            }
            self.reconcile_children(root, vec![element.clone()])?;
        } else {
            self.visit(root)?;
        }
        self.sync_children();
        Ok(self.output)
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Visit a fiber whose description did not change.
    fn visit(&mut self, id: FiberId) -> Result<(), RenderError> {
        let Some(fiber) = self.arena.get(id) else {
            return Ok(());
        };
        if fiber.dirty && matches!(fiber.kind, FiberKind::Component { .. }) {
            return self.render_component(id);
        }
        self.visit_children(id)
    }

    fn visit_children(&mut self, id: FiberId) -> Result<(), RenderError> {
        let Some(fiber) = self.arena.get_mut(id) else {
            return Ok(());
        };
        if !fiber.subtree_dirty {
            return Ok(());
        }
        fiber.subtree_dirty = false;
        let children = fiber.children.clone();
        for child in children {
            self.visit(child)?;
        }
        Ok(())
    }

    fn render_component(&mut self, id: FiberId) -> Result<(), RenderError> {
        let Some(fiber) = self.arena.get_mut(id) else {
            return Ok(());
        };
        let FiberKind::Component { component, hooks } = &mut fiber.kind else {
            return Ok(());
        };
        let component = component.clone();
        let mut taken = std::mem::take(hooks);
        fiber.dirty = false;
        fiber.subtree_dirty = false;

        let result = {
            let mut cx = Cx::new(id, component.name(), &mut taken, self.scheduler);
            component.render(&mut cx)
        };

        if let Some(Fiber {
            kind: FiberKind::Component { hooks, .. },
            ..
        }) = self.arena.get_mut(id)
        {
            *hooks = taken;
        }

        let element = result?;
        self.output.components_rendered += 1;
        self.reconcile_children(id, vec![element])
    }

    // =========================================================================
    // Children
    // =========================================================================

    fn reconcile_children(&mut self, parent: FiberId, elements: Vec<Element>) -> Result<(), RenderError> {
        let old_children = self
            .arena
            .get(parent)
            .map(|fiber| fiber.children.clone())
            .unwrap_or_default();
        let mut old_by_slot: HashMap<Slot, FiberId> = old_children
            .iter()
            .filter_map(|&child| self.arena.get(child).map(|fiber| (fiber.slot.clone(), child)))
            .collect();

        let mut seen = HashSet::with_capacity(elements.len());
        let mut new_children = Vec::with_capacity(elements.len());
        let mut structure_changed = false;

        for (position, element) in elements.into_iter().enumerate() {
            let Some(element_type) = element.element_type() else {
                continue;
            };
            let slot = match element.key() {
                Some(key) => Slot::Keyed(key.clone()),
                None => Slot::Index(position),
            };
            if !seen.insert(slot.clone()) {
                log::warn!(
                    "duplicate sibling key {slot:?} under <{}>; skipping element",
                    self.name_of(parent)
                );
                continue;
            }

            let matched = old_by_slot
                .get(&slot)
                .copied()
                .filter(|&old| self.type_of(old).as_ref() == Some(&element_type));
            let id = match matched {
                Some(old) => {
                    old_by_slot.remove(&slot);
                    self.update(old, element)?;
                    old
                }
                None => {
                    structure_changed = true;
                    self.create(element, slot, parent)?
                }
            };
            new_children.push(id);
        }

        for stale in old_by_slot.into_values() {
            structure_changed = true;
            self.delete(stale);
        }
        if new_children != old_children {
            structure_changed = true;
        }

        if let Some(fiber) = self.arena.get_mut(parent) {
            fiber.children = new_children;
        }
        if structure_changed {
            self.queue_sync(parent);
        }
        Ok(())
    }

    /// Update a matched fiber with its new description.
    fn update(&mut self, id: FiberId, element: Element) -> Result<(), RenderError> {
        match element {
            Element::Text(text) => {
                if let Some(fiber) = self.arena.get_mut(id) {
                    if let FiberKind::Text { text: current, .. } = &mut fiber.kind {
                        if *current != text {
                            *current = text;
                            self.output.mutations.push(Mutation::UpdateText(id));
                        }
                    }
                }
                Ok(())
            }
            Element::Host(host) => {
                if let Some(fiber) = self.arena.get_mut(id) {
                    fiber.subtree_dirty = false;
                    if let FiberKind::Host { props, .. } = &mut fiber.kind {
                        if *props != host.props {
                            *props = host.props;
                            self.output.mutations.push(Mutation::UpdateProps(id));
                        }
                    }
                }
                self.reconcile_children(id, host.children)
            }
            Element::Fragment(fragment) => {
                if let Some(fiber) = self.arena.get_mut(id) {
                    fiber.subtree_dirty = false;
                }
                self.reconcile_children(id, fragment.children)
            }
            Element::Component(next) => {
                let Some(fiber) = self.arena.get_mut(id) else {
                    return Ok(());
                };
                let FiberKind::Component { component, .. } = &mut fiber.kind else {
                    return Ok(());
                };
                let same_props = component.props_eq(next.component.as_ref());
                if !same_props {
                    *component = next.component;
                }
                if fiber.dirty || !same_props {
                    self.render_component(id)
                } else {
                    self.visit_children(id)
                }
            }
            Element::Empty => Ok(()),
        }
    }

    /// Build a fresh fiber (and its subtree) for an unmatched element.
    fn create(&mut self, element: Element, slot: Slot, parent: FiberId) -> Result<FiberId, RenderError> {
        match element {
            Element::Text(text) => {
                let id = self
                    .arena
                    .allocate(Fiber::new(FiberKind::Text { text, node: None }, slot, Some(parent)));
                self.output.mutations.push(Mutation::CreateText(id));
                Ok(id)
            }
            Element::Host(host) => {
                let kind = FiberKind::Host {
                    kind: host.kind,
                    props: host.props,
                    node: None,
                };
                let id = self.arena.allocate(Fiber::new(kind, slot, Some(parent)));
                self.output.mutations.push(Mutation::CreateInstance(id));
                self.reconcile_children(id, host.children)?;
                Ok(id)
            }
            Element::Fragment(fragment) => {
                let id = self
                    .arena
                    .allocate(Fiber::new(FiberKind::Fragment, slot, Some(parent)));
                self.reconcile_children(id, fragment.children)?;
                Ok(id)
            }
            Element::Component(component) => {
                let kind = FiberKind::Component {
                    component: component.component,
                    hooks: Hooks::default(),
                };
                let id = self.arena.allocate(Fiber::new(kind, slot, Some(parent)));
                self.render_component(id)?;
                Ok(id)
            }
            Element::Empty => Ok(self
                .arena
                .allocate(Fiber::new(FiberKind::Fragment, slot, Some(parent)))),
        }
    }

    /// Mark a subtree deleted. It stays resolvable until released after
    /// commit, so its host nodes can still be removed.
    fn delete(&mut self, id: FiberId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(fiber) = self.arena.get_mut(current) {
                fiber.deleted = true;
                stack.extend(fiber.children.iter().copied());
            }
        }
        self.output.deletions.push(id);
    }

    fn type_of(&self, id: FiberId) -> Option<ElementType> {
        match &self.arena.get(id)?.kind {
            FiberKind::Text { .. } => Some(ElementType::Text),
            FiberKind::Host { kind, .. } => Some(ElementType::Host(kind.clone())),
            FiberKind::Component { component, .. } => {
                Some(ElementType::Component(component.as_any().type_id()))
            }
            FiberKind::Fragment => Some(ElementType::Fragment),
            FiberKind::Root => None,
        }
    }

    fn name_of(&self, id: FiberId) -> String {
        self.arena
            .get(id)
            .map(|fiber| fiber.name().to_string())
            .unwrap_or_default()
    }

    // =========================================================================
    // Child sync
    // =========================================================================

    /// Queue the host parent owning `id`'s host children.
    fn queue_sync(&mut self, id: FiberId) {
        let mut current = Some(id);
        while let Some(candidate) = current {
            let Some(fiber) = self.arena.get(candidate) else {
                return;
            };
            if matches!(fiber.kind, FiberKind::Host { .. } | FiberKind::Root) {
                if self.sync_seen.insert(candidate) {
                    self.sync.push(candidate);
                }
                return;
            }
            current = fiber.parent;
        }
    }

    fn sync_children(&mut self) {
        let parents = std::mem::take(&mut self.sync);
        for parent in parents {
            if !self.arena.is_alive(parent) {
                continue;
            }
            let mut next = Vec::new();
            self.flatten_host_children(parent, &mut next);
            let previous = self
                .arena
                .get(parent)
                .map(|fiber| fiber.host_children.clone())
                .unwrap_or_default();

            self.diff_host_children(parent, &previous, &next);

            if let Some(fiber) = self.arena.get_mut(parent) {
                fiber.host_children = next;
            }
        }
    }

    fn flatten_host_children(&self, id: FiberId, out: &mut Vec<FiberId>) {
        let Some(fiber) = self.arena.get(id) else {
            return;
        };
        for &child in &fiber.children {
            match self.arena.get(child) {
                Some(child_fiber) if child_fiber.is_host() => out.push(child),
                Some(_) => self.flatten_host_children(child, out),
                None => {}
            }
        }
    }

    fn diff_host_children(&mut self, parent: FiberId, previous: &[FiberId], next: &[FiberId]) {
        let next_set: HashSet<FiberId> = next.iter().copied().collect();
        for &child in previous {
            if !next_set.contains(&child) {
                self.output.mutations.push(Mutation::Remove { parent, child });
            }
        }

        let old_position: HashMap<FiberId, usize> = previous
            .iter()
            .enumerate()
            .map(|(position, &child)| (child, position))
            .collect();
        let sources: Vec<Option<usize>> = next
            .iter()
            .map(|child| old_position.get(child).copied())
            .collect();
        let stable = longest_increasing_run(&sources);

        for index in (0..next.len()).rev() {
            if stable[index] {
                continue;
            }
            self.output.mutations.push(Mutation::Insert {
                parent,
                child: next[index],
                before: next.get(index + 1).copied(),
                moved: sources[index].is_some(),
            });
        }
    }
}

/// Mark the entries of `sources` that form a longest strictly increasing
/// subsequence (ignoring `None`). Those nodes keep their place.
fn longest_increasing_run(sources: &[Option<usize>]) -> Vec<bool> {
    // tails[k]: index into `sources` of the smallest tail of a run of length k+1
    let mut tails: Vec<usize> = Vec::new();
    let mut predecessor: Vec<Option<usize>> = vec![None; sources.len()];

    for (index, source) in sources.iter().enumerate() {
        let Some(value) = *source else { continue };
        let length = tails.partition_point(|&tail| sources[tail] < Some(value));
        predecessor[index] = length.checked_sub(1).map(|k| tails[k]);
        if length == tails.len() {
            tails.push(index);
        } else {
            tails[length] = index;
        }
    }

    let mut stable = vec![false; sources.len()];
    let mut cursor = tails.last().copied();
    while let Some(index) = cursor {
        stable[index] = true;
        cursor = predecessor[index];
    }
    stable
}

// =============================================================================
// Tests
// =============================================================================
