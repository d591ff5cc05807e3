//! Update queue.
//!
//! Setters, selector subscriptions and the root all enqueue here. The queue
//! is drained in FIFO order by the next flush; priority only tags the commit
//! that carries the update.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;

use super::fiber::FiberId;

/// Priority of an update. Commits carry the highest priority of their batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    #[default]
    Default,
    /// Updates caused by a (simulated) user event.
    UserInteraction,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Default => f.write_str("default"),
            Priority::UserInteraction => f.write_str("user-interaction"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Update {
    pub fiber: FiberId,
    pub priority: Priority,
}

#[derive(Debug, Default)]
pub(crate) struct Scheduler {
    queue: RefCell<VecDeque<Update>>,
    priority: Cell<Priority>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an update for `fiber` at the current priority.
    pub fn schedule(&self, fiber: FiberId) {
        let priority = self.priority.get();
        log::trace!("schedule {fiber:?} at {priority}");
        self.queue.borrow_mut().push_back(Update { fiber, priority });
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.borrow().is_empty()
    }

    /// Take every queued update, oldest first.
    pub fn drain(&self) -> Vec<Update> {
        self.queue.borrow_mut().drain(..).collect()
    }

    pub fn current_priority(&self) -> Priority {
        self.priority.get()
    }

    /// Run `f` with updates tagged `priority`; nests correctly.
    pub fn with_priority<R>(&self, priority: Priority, f: impl FnOnce() -> R) -> R {
        let previous = self.priority.replace(priority);
        let result = f();
        self.priority.set(previous);
        result
    }
}

// =============================================================================
// Tests
// =============================================================================
