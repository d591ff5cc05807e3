//! Fiber Arena - Committed tree bookkeeping.
//!
//! One fiber per description slot. Fibers live in a slot arena:
//! - Freed slots go to a free pool for O(1) reuse
//! - Every reuse bumps the slot generation, so a [`FiberId`] held by a
//!   setter or subscription of an unmounted component stops resolving

use std::rc::Rc;

use crate::types::{Key, Props};

use super::element::AnyComponent;
use super::hooks::Hooks;

/// Handle to a fiber. Copyable, never dangling: a freed fiber's id simply
/// stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FiberId {
    index: u32,
    generation: u32,
}

/// Position identity among siblings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Slot {
    Keyed(Key),
    Index(usize),
}

pub(crate) enum FiberKind<N> {
    Root,
    Host {
        kind: Rc<str>,
        props: Props,
        node: Option<N>,
    },
    Text {
        text: Rc<str>,
        node: Option<N>,
    },
    Component {
        component: Rc<dyn AnyComponent>,
        hooks: Hooks,
    },
    Fragment,
}

pub(crate) struct Fiber<N> {
    pub kind: FiberKind<N>,
    pub slot: Slot,
    pub parent: Option<FiberId>,
    pub children: Vec<FiberId>,
    /// Host children as of the last commit (host parents and the root only).
    pub host_children: Vec<FiberId>,
    /// Own pending update.
    pub dirty: bool,
    /// Some descendant has a pending update.
    pub subtree_dirty: bool,
    /// Scheduled for release once the current commit lands.
    pub deleted: bool,
}

impl<N> Fiber<N> {
    pub fn new(kind: FiberKind<N>, slot: Slot, parent: Option<FiberId>) -> Self {
        Self {
            kind,
            slot,
            parent,
            children: Vec::new(),
            host_children: Vec::new(),
            dirty: false,
            subtree_dirty: false,
            deleted: false,
        }
    }

    /// Host fibers own a host node and are flattened into their parent's
    /// host children list.
    pub fn is_host(&self) -> bool {
        matches!(self.kind, FiberKind::Host { .. } | FiberKind::Text { .. })
    }

    pub fn node(&self) -> Option<&N> {
        match &self.kind {
            FiberKind::Host { node, .. } | FiberKind::Text { node, .. } => node.as_ref(),
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        match &self.kind {
            FiberKind::Root => "root",
            FiberKind::Host { kind, .. } => kind,
            FiberKind::Text { .. } => "#text",
            FiberKind::Component { component, .. } => component.name(),
            FiberKind::Fragment => "fragment",
        }
    }
}

// =============================================================================
// Arena
// =============================================================================

struct Entry<N> {
    generation: u32,
    fiber: Option<Fiber<N>>,
}

pub(crate) struct FiberArena<N> {
    entries: Vec<Entry<N>>,
    free: Vec<u32>,
}

impl<N> FiberArena<N> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            free: Vec::new(),
        }
    }

    pub fn allocate(&mut self, fiber: Fiber<N>) -> FiberId {
        if let Some(index) = self.free.pop() {
            let entry = &mut self.entries[index as usize];
            entry.fiber = Some(fiber);
            FiberId {
                index,
                generation: entry.generation,
            }
        } else {
            let index = self.entries.len() as u32;
            self.entries.push(Entry {
                generation: 0,
                fiber: Some(fiber),
            });
            FiberId {
                index,
                generation: 0,
            }
        }
    }

    /// Release a single fiber, returning it so the caller can dispose hooks.
    pub fn release(&mut self, id: FiberId) -> Option<Fiber<N>> {
        let entry = self.entries.get_mut(id.index as usize)?;
        if entry.generation != id.generation {
            return None;
        }
        let fiber = entry.fiber.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(fiber)
    }

    pub fn get(&self, id: FiberId) -> Option<&Fiber<N>> {
        self.entries
            .get(id.index as usize)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.fiber.as_ref())
    }

    pub fn get_mut(&mut self, id: FiberId) -> Option<&mut Fiber<N>> {
        self.entries
            .get_mut(id.index as usize)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.fiber.as_mut())
    }

    pub fn is_alive(&self, id: FiberId) -> bool {
        self.get(id).is_some_and(|fiber| !fiber.deleted)
    }

    pub fn live_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.fiber.is_some()).count()
    }
}

// =============================================================================
// Tests
// =============================================================================
