//! Render root.
//!
//! A [`Root`] owns one host container and the fiber tree rendered into it.
//! Updates from anywhere (setters, selector subscriptions, new root
//! descriptions) land in the scheduler; [`Root::flush`] drains them into one
//! render pass and one commit.

use std::fmt;
use std::rc::Rc;

use crate::error::{ReconcileError, Result};
use crate::host::{HostConfig, HostOps, ParentRef};

use super::element::Element;
use super::fiber::{Fiber, FiberArena, FiberId, FiberKind, Slot};
use super::reconciler::{Mutation, RenderOutput, RenderPass};
use super::scheduler::{Priority, Scheduler};

/// Default bound on flush passes inside one [`Root::act`].
pub const DEFAULT_MAX_PASSES: usize = 64;

/// Telemetry of one commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommitReport {
    /// 1-based commit number of this root.
    pub sequence: u64,
    pub priority: Priority,
    pub components_rendered: usize,
    pub created: usize,
    pub removed: usize,
    pub moved: usize,
    pub props_updated: usize,
    pub text_updated: usize,
}

impl CommitReport {
    /// Total host operations issued, not counting the initial clear.
    pub fn host_operations(&self) -> usize {
        self.created + self.removed + self.moved + self.props_updated + self.text_updated
    }
}

impl fmt::Display for CommitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "commit #{} ({}): {} rendered, +{} -{} ~{} moved, {} props, {} text",
            self.sequence,
            self.priority,
            self.components_rendered,
            self.created,
            self.removed,
            self.moved,
            self.props_updated,
            self.text_updated
        )
    }
}

/// A render root over host `H`.
pub struct Root<H: HostConfig> {
    host: H,
    arena: FiberArena<H::Node>,
    scheduler: Rc<Scheduler>,
    root: FiberId,
    element: Element,
    validated: bool,
    cleared: bool,
    halted: bool,
    sequence: u64,
    last_commit: Option<CommitReport>,
    max_passes: usize,
}

impl<H: HostConfig> Root<H> {
    pub fn new(host: H) -> Self {
        let mut arena = FiberArena::new();
        let root = arena.allocate(Fiber::new(FiberKind::Root, Slot::Index(0), None));
        Self {
            host,
            arena,
            scheduler: Rc::new(Scheduler::new()),
            root,
            element: Element::Empty,
            validated: false,
            cleared: false,
            halted: false,
            sequence: 0,
            last_commit: None,
            max_passes: DEFAULT_MAX_PASSES,
        }
    }

    /// Override the update-loop guard of [`Root::act`].
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes.max(1);
        self
    }

    // =========================================================================
    // Observation
    // =========================================================================

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn last_commit(&self) -> Option<CommitReport> {
        self.last_commit
    }

    pub fn commit_count(&self) -> u64 {
        self.sequence
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Number of live fibers, including the root itself.
    pub fn fiber_count(&self) -> usize {
        self.arena.live_count()
    }

    // =========================================================================
    // Updates
    // =========================================================================

    /// Replace the root description and flush until quiescent.
    pub fn render(&mut self, element: impl Into<Element>) -> Result<()> {
        self.schedule(element);
        self.act(|| ())
    }

    /// Queue a new root description without flushing.
    pub fn schedule(&mut self, element: impl Into<Element>) {
        self.element = element.into();
        self.scheduler.schedule(self.root);
    }

    /// Run `f`, then flush until no update is pending.
    ///
    /// Everything `f` changes synchronously commits together, after `f`
    /// returns.
    pub fn act<R>(&mut self, f: impl FnOnce() -> R) -> Result<R> {
        self.act_with_priority(Priority::Default, f)
    }

    /// [`Root::act`] with updates queued by `f` tagged `priority`.
    pub fn act_with_priority<R>(&mut self, priority: Priority, f: impl FnOnce() -> R) -> Result<R> {
        let result = self.scheduler.with_priority(priority, f);
        self.settle()?;
        Ok(result)
    }

    fn settle(&mut self) -> Result<()> {
        for _ in 0..self.max_passes {
            if self.flush()?.is_none() && !self.scheduler.has_pending() {
                return Ok(());
            }
        }
        if self.scheduler.has_pending() {
            self.halted = true;
            log::error!("updates still pending after {} passes", self.max_passes);
            return Err(ReconcileError::UpdateLoop(self.max_passes));
        }
        Ok(())
    }

    /// Drain queued updates into one render pass and one commit.
    ///
    /// Returns `None` when nothing was pending (or every pending update
    /// targeted an unmounted component).
    pub fn flush(&mut self) -> Result<Option<CommitReport>> {
        spark_signals::flush_sync();
        if self.halted {
            return Err(ReconcileError::Halted);
        }
        self.validate_host()?;

        let updates = self.scheduler.drain();
        if updates.is_empty() {
            return Ok(None);
        }
        let priority = updates
            .iter()
            .map(|update| update.priority)
            .max()
            .unwrap_or_default();

        let mut any_dirty = false;
        for update in &updates {
            any_dirty |= self.mark_dirty(update.fiber);
        }
        if !any_dirty {
            log::trace!("dropped {} update(s) for unmounted components", updates.len());
            return Ok(None);
        }

        let pass = RenderPass::new(&mut self.arena, &self.scheduler);
        let mut output = match pass.run(self.root, &self.element) {
            Ok(output) => output,
            Err(error) => {
                self.halted = true;
                log::error!("render failed, halting root: {error}");
                return Err(error.into());
            }
        };
        if !self.cleared {
            output.mutations.insert(0, Mutation::ClearContainer);
        }

        let report = match self.commit(&output, priority) {
            Ok(report) => report,
            Err(error) => {
                self.halted = true;
                log::error!("commit failed, halting root: {error}");
                return Err(error);
            }
        };
        self.cleared = true;
        for deleted in output.deletions {
            self.release_subtree(deleted);
        }

        log::debug!("{report}");
        self.last_commit = Some(report);
        Ok(Some(report))
    }

    /// Tear the tree down: dispose every hook and empty the container.
    pub fn unmount(&mut self) -> Result<()> {
        let children = self
            .arena
            .get_mut(self.root)
            .map(|fiber| {
                fiber.host_children.clear();
                std::mem::take(&mut fiber.children)
            })
            .unwrap_or_default();
        for child in children {
            self.release_subtree(child);
        }
        self.element = Element::Empty;
        self.scheduler.drain();
        if self.validated && !self.halted {
            self.host.clear_container()?;
        }
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn validate_host(&mut self) -> Result<()> {
        if self.validated {
            return Ok(());
        }
        let missing = HostOps::REQUIRED.difference(self.host.supported_ops());
        if !missing.is_empty() {
            self.halted = true;
            return Err(ReconcileError::MissingHostOperations(missing));
        }
        self.validated = true;
        Ok(())
    }

    /// Flag `fiber` dirty and its ancestors as having dirty descendants.
    /// Updates for fibers that no longer exist are dropped here.
    fn mark_dirty(&mut self, fiber: FiberId) -> bool {
        if !self.arena.is_alive(fiber) {
            return false;
        }
        let mut parent = match self.arena.get_mut(fiber) {
            Some(target) => {
                target.dirty = true;
                target.parent
            }
            None => return false,
        };
        while let Some(id) = parent {
            match self.arena.get_mut(id) {
                Some(ancestor) if !ancestor.subtree_dirty => {
                    ancestor.subtree_dirty = true;
                    parent = ancestor.parent;
                }
                _ => break,
            }
        }
        true
    }

    fn commit(&mut self, output: &RenderOutput, priority: Priority) -> Result<CommitReport> {
        self.sequence += 1;
        let mut report = CommitReport {
            sequence: self.sequence,
            priority,
            components_rendered: output.components_rendered,
            ..CommitReport::default()
        };

        for mutation in &output.mutations {
            log::trace!("apply {mutation:?}");
            match *mutation {
                Mutation::ClearContainer => self.host.clear_container()?,
                Mutation::CreateInstance(id) => {
                    if let Some(Fiber {
                        kind: FiberKind::Host { kind, props, node },
                        ..
                    }) = self.arena.get_mut(id)
                    {
                        *node = Some(self.host.create_instance(kind, props)?);
                        report.created += 1;
                    }
                }
                Mutation::CreateText(id) => {
                    if let Some(Fiber {
                        kind: FiberKind::Text { text, node },
                        ..
                    }) = self.arena.get_mut(id)
                    {
                        *node = Some(self.host.create_text_leaf(text)?);
                        report.created += 1;
                    }
                }
                Mutation::UpdateProps(id) => {
                    if let Some(Fiber {
                        kind: FiberKind::Host { props, node: Some(node), .. },
                        ..
                    }) = self.arena.get(id)
                    {
                        self.host.update_instance_properties(node, props)?;
                        report.props_updated += 1;
                    }
                }
                Mutation::UpdateText(id) => {
                    if let Some(Fiber {
                        kind: FiberKind::Text { text, node: Some(node) },
                        ..
                    }) = self.arena.get(id)
                    {
                        self.host.update_text_leaf(node, text)?;
                        report.text_updated += 1;
                    }
                }
                Mutation::Remove { parent, child } => {
                    let Some(child_node) = self.node_of(child) else { continue };
                    let parent_node = self.node_of(parent);
                    let parent_ref = match &parent_node {
                        Some(node) => ParentRef::Node(node),
                        None => ParentRef::Container,
                    };
                    self.host.remove_child(parent_ref, &child_node)?;
                    report.removed += 1;
                }
                Mutation::Insert {
                    parent,
                    child,
                    before,
                    moved,
                } => {
                    let Some(child_node) = self.node_of(child) else { continue };
                    let parent_node = self.node_of(parent);
                    let parent_ref = match &parent_node {
                        Some(node) => ParentRef::Node(node),
                        None => ParentRef::Container,
                    };
                    match before.and_then(|sibling| self.node_of(sibling)) {
                        Some(sibling) => self.host.insert_before(parent_ref, &child_node, &sibling)?,
                        None => self.host.append_child(parent_ref, &child_node)?,
                    }
                    if moved {
                        report.moved += 1;
                    }
                }
            }
        }
        Ok(report)
    }

    /// Host node of a host fiber; `None` for the root (the container).
    fn node_of(&self, id: FiberId) -> Option<H::Node> {
        self.arena.get(id).and_then(|fiber| fiber.node().cloned())
    }

    fn release_subtree(&mut self, id: FiberId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(mut fiber) = self.arena.release(current) else {
                continue;
            };
            if let FiberKind::Component { hooks, .. } = &mut fiber.kind {
                hooks.dispose();
            }
            stack.extend(fiber.children);
        }
    }
}

impl<H: HostConfig> Drop for Root<H> {
    fn drop(&mut self) {
        // Stop subscriptions; the host is dropped with us.
        let children = self
            .arena
            .get_mut(self.root)
            .map(|fiber| std::mem::take(&mut fiber.children))
            .unwrap_or_default();
        for child in children {
            self.release_subtree(child);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
