//! Component hooks.
//!
//! Hooks are identified by call order inside a component's render, like the
//! per-index arrays of the component registry are identified by index:
//!
//! - [`Cx::use_state`] - local state, schedules the owner on change
//! - [`Cx::use_selector`] - reads external signals through a subscription
//! - [`Cx::use_memo`] - caches a value until its dependencies change
//!
//! A component must call the same hooks in the same order on every render.
//! A mismatch is logged and the slot is reinitialized.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use spark_signals::effect;

use super::fiber::FiberId;
use super::scheduler::Scheduler;

// =============================================================================
// Hook storage
// =============================================================================

pub(crate) trait HookSlot {
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Release subscriptions. Called on unmount or slot replacement.
    fn dispose(&mut self) {}
}

/// Hook slots of one component, in call order.
#[derive(Default)]
pub(crate) struct Hooks {
    slots: Vec<Box<dyn HookSlot>>,
}

impl Hooks {
    pub fn dispose(&mut self) {
        for slot in &mut self.slots {
            slot.dispose();
        }
        self.slots.clear();
    }
}

/// Render context handed to [`Component::render`](super::Component::render).
pub struct Cx<'a> {
    fiber: FiberId,
    name: &'a str,
    hooks: &'a mut Hooks,
    cursor: usize,
    scheduler: &'a Rc<Scheduler>,
}

impl<'a> Cx<'a> {
    pub(crate) fn new(
        fiber: FiberId,
        name: &'a str,
        hooks: &'a mut Hooks,
        scheduler: &'a Rc<Scheduler>,
    ) -> Self {
        Self {
            fiber,
            name,
            hooks,
            cursor: 0,
            scheduler,
        }
    }

    /// Id of the component being rendered.
    pub fn fiber(&self) -> FiberId {
        self.fiber
    }

    fn hook<H: HookSlot + 'static>(&mut self, init: impl FnOnce() -> H) -> &mut H {
        let index = self.cursor;
        self.cursor += 1;

        let slots = &mut self.hooks.slots;
        if index >= slots.len() {
            slots.push(Box::new(init()));
        } else if !slots[index].as_any_mut().is::<H>() {
            log::warn!(
                "{}: hook #{index} changed type between renders; reinitializing",
                self.name
            );
            slots[index].dispose();
            slots[index] = Box::new(init());
        }

        match slots[index].as_any_mut().downcast_mut::<H>() {
            Some(hook) => hook,
            None => unreachable!("hook slot {index} was just initialized"),
        }
    }

    // =========================================================================
    // use_state
    // =========================================================================

    /// Local state. The setter compares by value and schedules this
    /// component only when the value actually changes.
    pub fn use_state<T>(&mut self, init: impl FnOnce() -> T) -> (T, StateSetter<T>)
    where
        T: Clone + PartialEq + 'static,
    {
        let fiber = self.fiber;
        let scheduler = Rc::downgrade(self.scheduler);
        let hook = self.hook(|| StateHook {
            cell: Rc::new(RefCell::new(init())),
        });
        let value = hook.cell.borrow().clone();
        let setter = StateSetter {
            cell: hook.cell.clone(),
            fiber,
            scheduler,
        };
        (value, setter)
    }

    // =========================================================================
    // use_selector
    // =========================================================================

    /// Read external reactive data.
    ///
    /// `selector` runs on every render. It also runs inside an effect, so a
    /// change to any signal it reads re-evaluates it and schedules this
    /// component if the result differs from the last one.
    pub fn use_selector<T>(&mut self, selector: impl Fn() -> T + 'static) -> T
    where
        T: Clone + PartialEq + 'static,
    {
        let fiber = self.fiber;
        let scheduler = Rc::downgrade(self.scheduler);
        let value = selector();

        let hook = self.hook(|| SelectorHook::<T> {
            cached: Rc::new(RefCell::new(None)),
            stop: None,
        });
        *hook.cached.borrow_mut() = Some(value.clone());

        // Resubscribe with the new closure: its dependencies may differ.
        if let Some(stop) = hook.stop.take() {
            stop();
        }
        let cached = hook.cached.clone();
        let stop = effect(move || {
            let next = selector();
            let changed = cached.borrow().as_ref() != Some(&next);
            if changed {
                *cached.borrow_mut() = Some(next);
                if let Some(scheduler) = scheduler.upgrade() {
                    scheduler.schedule(fiber);
                }
            }
        });
        hook.stop = Some(Box::new(stop));

        value
    }

    // =========================================================================
    // use_memo
    // =========================================================================

    /// Cached computation, recomputed only when `deps` change.
    pub fn use_memo<D, T>(&mut self, deps: D, compute: impl FnOnce(&D) -> T) -> T
    where
        D: PartialEq + 'static,
        T: Clone + 'static,
    {
        let hook = self.hook(|| MemoHook::<D, T> { entry: None });
        if let Some((cached_deps, value)) = &hook.entry {
            if *cached_deps == deps {
                return value.clone();
            }
        }
        let value = compute(&deps);
        hook.entry = Some((deps, value.clone()));
        value
    }
}

// =============================================================================
// Hook kinds
// =============================================================================

struct StateHook<T> {
    cell: Rc<RefCell<T>>,
}

impl<T: 'static> HookSlot for StateHook<T> {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct SelectorHook<T> {
    cached: Rc<RefCell<Option<T>>>,
    stop: Option<Box<dyn FnOnce()>>,
}

impl<T: 'static> HookSlot for SelectorHook<T> {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn dispose(&mut self) {
        if let Some(stop) = self.stop.take() {
            stop();
        }
    }
}

struct MemoHook<D, T> {
    entry: Option<(D, T)>,
}

impl<D: 'static, T: 'static> HookSlot for MemoHook<D, T> {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// =============================================================================
// StateSetter
// =============================================================================

/// Setter returned by [`Cx::use_state`].
///
/// Outlives its component safely: once the component is unmounted the
/// scheduled update is dropped.
pub struct StateSetter<T> {
    cell: Rc<RefCell<T>>,
    fiber: FiberId,
    scheduler: Weak<Scheduler>,
}

impl<T: Clone + PartialEq> StateSetter<T> {
    /// Current value, including changes not yet rendered.
    pub fn get(&self) -> T {
        self.cell.borrow().clone()
    }

    pub fn set(&self, value: T) {
        if *self.cell.borrow() == value {
            return;
        }
        *self.cell.borrow_mut() = value;
        if let Some(scheduler) = self.scheduler.upgrade() {
            scheduler.schedule(self.fiber);
        }
    }

    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        let next = f(&self.cell.borrow());
        self.set(next);
    }
}

impl<T> Clone for StateSetter<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            fiber: self.fiber,
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for StateSetter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateSetter")
            .field("value", &self.cell.borrow())
            .field("fiber", &self.fiber)
            .finish()
    }
}

/// Setters compare by the state cell they write to.
impl<T> PartialEq for StateSetter<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }
}

// =============================================================================
// Tests
// =============================================================================
