//! Control Flow Primitives - Suspension on pending data.
//!
//! This module provides control flow primitives for asynchronous UI:
//! - [`deferred`] - a one-shot value settled later by an external completion
//! - [`when`] - pending/then/catch rendering of a [`Deferred`]
//! - [`lazy`] - fallback until a lazily loaded UI module arrives
//!
//! # Pattern: Signal-backed settlement
//!
//! A [`Deferred`] is a spark-signals `Signal<AsyncState<T, E>>`. The
//! component rendered by [`when`] reads it through
//! [`Cx::use_selector`](crate::engine::Cx::use_selector), so settling the
//! deferred schedules exactly that component:
//!
//! ```ignore
//! let (people, resolver) = deferred::<Rc<[Person]>, String>();
//!
//! root.render(when(
//!     people.clone(),
//!     WhenOptions::new(|rows| people_table(rows)).pending(|| "Loading...".into()),
//! ))?;
//!
//! // Later, from the completion of the load:
//! root.act(|| resolver.resolve(loaded))?;
//! ```
//!
//! # Lifecycle
//!
//! - Pending: `pending` renders (or nothing)
//! - Resolved: `then_fn(value)` replaces the fallback in one commit
//! - Rejected: `catch_fn(error)` renders in place; without a catch branch the
//!   error is logged and nothing renders. Siblings are unaffected
//! - Unmounted before settlement: the subscription is stopped, a late
//!   settlement schedules nothing

use std::fmt;
use std::rc::Rc;

use spark_signals::{signal, Signal};

use crate::engine::{Component, Cx, Element};
use crate::error::RenderError;

// =============================================================================
// AsyncState
// =============================================================================

/// Async state for when() rendering.
#[derive(Clone, Debug, PartialEq)]
pub enum AsyncState<T, E> {
    /// Loading state - async operation in progress.
    Pending,
    /// Success state - operation completed with value.
    Resolved(T),
    /// Error state - operation failed with error.
    Rejected(E),
}

impl<T, E> AsyncState<T, E> {
    pub fn is_pending(&self) -> bool {
        matches!(self, AsyncState::Pending)
    }
}

// =============================================================================
// Deferred
// =============================================================================

/// Read side of a one-shot asynchronous value.
pub struct Deferred<T, E> {
    state: Signal<AsyncState<T, E>>,
    identity: Rc<()>,
}

/// Write side of a [`Deferred`]. Only the first settlement counts.
pub struct Resolver<T, E> {
    state: Signal<AsyncState<T, E>>,
}

/// Create a pending deferred value and its resolver.
pub fn deferred<T, E>() -> (Deferred<T, E>, Resolver<T, E>)
where
    T: Clone + PartialEq + 'static,
    E: Clone + PartialEq + 'static,
{
    let state = signal(AsyncState::Pending);
    let resolver = Resolver {
        state: state.clone(),
    };
    (
        Deferred {
            state,
            identity: Rc::new(()),
        },
        resolver,
    )
}

impl<T, E> Deferred<T, E>
where
    T: Clone + PartialEq + 'static,
    E: Clone + PartialEq + 'static,
{
    /// An already resolved value.
    pub fn resolved(value: T) -> Self {
        let (deferred, resolver) = deferred();
        resolver.resolve(value);
        deferred
    }

    /// Current state. Tracked when read inside an effect or selector.
    pub fn state(&self) -> AsyncState<T, E> {
        self.state.get()
    }

    pub fn is_pending(&self) -> bool {
        self.state().is_pending()
    }
}

impl<T: Clone + PartialEq + 'static, E: Clone + PartialEq + 'static> Resolver<T, E> {
    pub fn resolve(&self, value: T) {
        self.settle(AsyncState::Resolved(value));
    }

    pub fn reject(&self, error: E) {
        self.settle(AsyncState::Rejected(error));
    }

    fn settle(&self, next: AsyncState<T, E>) {
        if !self.state.get().is_pending() {
            log::warn!("deferred value settled twice; keeping the first result");
            return;
        }
        self.state.set(next);
    }
}

impl<T: Clone, E: Clone> Clone for Deferred<T, E> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            identity: self.identity.clone(),
        }
    }
}

/// Two handles are equal when they observe the same deferred value.
impl<T, E> PartialEq for Deferred<T, E> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.identity, &other.identity)
    }
}

impl<T, E> fmt::Debug for Deferred<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred").finish_non_exhaustive()
    }
}

// =============================================================================
// when() - Async state rendering
// =============================================================================

/// Render branches for [`when`].
///
/// Construct with struct literal syntax or the builder methods:
/// ```ignore
/// WhenOptions::new(|data| data.to_string().into())
///     .pending(|| "Loading...".into())
///     .catch(|err| format!("Error: {err}").into())
/// ```
pub struct WhenOptions<T, E> {
    /// Rendered while pending. If None, nothing is rendered.
    pub pending: Option<Rc<dyn Fn() -> Element>>,
    /// Rendered with the resolved value.
    pub then_fn: Rc<dyn Fn(T) -> Element>,
    /// Rendered with the rejection. If None, errors are logged but nothing
    /// rendered.
    pub catch_fn: Option<Rc<dyn Fn(E) -> Element>>,
}

impl<T, E> WhenOptions<T, E> {
    pub fn new(then_fn: impl Fn(T) -> Element + 'static) -> Self {
        Self {
            pending: None,
            then_fn: Rc::new(then_fn),
            catch_fn: None,
        }
    }

    pub fn pending(mut self, pending: impl Fn() -> Element + 'static) -> Self {
        self.pending = Some(Rc::new(pending));
        self
    }

    pub fn catch(mut self, catch_fn: impl Fn(E) -> Element + 'static) -> Self {
        self.catch_fn = Some(Rc::new(catch_fn));
        self
    }
}

impl<T, E> Clone for WhenOptions<T, E> {
    fn clone(&self) -> Self {
        Self {
            pending: self.pending.clone(),
            then_fn: self.then_fn.clone(),
            catch_fn: self.catch_fn.clone(),
        }
    }
}

impl<T, E> PartialEq for WhenOptions<T, E> {
    fn eq(&self, other: &Self) -> bool {
        fn same<F: ?Sized>(a: &Option<Rc<F>>, b: &Option<Rc<F>>) -> bool {
            match (a, b) {
                (Some(a), Some(b)) => Rc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            }
        }
        Rc::ptr_eq(&self.then_fn, &other.then_fn)
            && same(&self.pending, &other.pending)
            && same(&self.catch_fn, &other.catch_fn)
    }
}

struct When<T, E> {
    deferred: Deferred<T, E>,
    options: WhenOptions<T, E>,
}

impl<T, E> PartialEq for When<T, E> {
    fn eq(&self, other: &Self) -> bool {
        self.deferred == other.deferred && self.options == other.options
    }
}

impl<T, E> Component for When<T, E>
where
    T: Clone + PartialEq + 'static,
    E: Clone + PartialEq + fmt::Display + 'static,
{
    fn render(&self, cx: &mut Cx<'_>) -> Result<Element, RenderError> {
        let deferred = self.deferred.clone();
        let state = cx.use_selector(move || deferred.state());

        Ok(match state {
            AsyncState::Pending => self
                .options
                .pending
                .as_ref()
                .map(|pending| pending())
                .unwrap_or_default(),
            AsyncState::Resolved(value) => (self.options.then_fn)(value),
            AsyncState::Rejected(error) => match &self.options.catch_fn {
                Some(catch_fn) => catch_fn(error),
                None => {
                    log::error!("[when] Unhandled rejection: {error}");
                    Element::Empty
                }
            },
        })
    }

    fn name(&self) -> &'static str {
        "When"
    }
}

/// Render based on the state of a deferred value.
pub fn when<T, E>(deferred: Deferred<T, E>, options: WhenOptions<T, E>) -> Element
where
    T: Clone + PartialEq + 'static,
    E: Clone + PartialEq + fmt::Display + 'static,
{
    Element::component(When { deferred, options })
}

// =============================================================================
// lazy() - Deferred UI modules
// =============================================================================

/// A lazily loaded piece of UI.
#[derive(Clone)]
pub struct UiModule(Rc<dyn Fn() -> Element>);

impl UiModule {
    pub fn new(render: impl Fn() -> Element + 'static) -> Self {
        Self(Rc::new(render))
    }

    pub fn render(&self) -> Element {
        (self.0)()
    }
}

impl PartialEq for UiModule {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for UiModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UiModule")
    }
}

/// Render `fallback` until `module` loads, then the module. A failed load
/// is logged and renders nothing.
pub fn lazy(module: Deferred<UiModule, String>, fallback: impl Into<Element>) -> Element {
    let fallback = fallback.into();
    when(
        module,
        WhenOptions::new(|module: UiModule| module.render()).pending(move || fallback.clone()),
    )
}

// =============================================================================
// Tests
// =============================================================================
