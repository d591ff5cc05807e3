//! Reconciliation Engine - Descriptions in, host mutations out.
//!
//! The engine keeps a fiber per description slot and, on every flush,
//! converges the host tree to the newest description:
//! - Element: immutable description trees built by components
//! - Fiber: generational arena holding the committed tree and hook state
//! - Scheduler: FIFO update queue with per-update priority
//! - Hooks: `use_state`, `use_selector`, `use_memo`
//! - Reconciler: render phase, produces a mutation list
//! - Root: commit phase, applies the list through the host contract
//!
//! # Architecture
//!
//! ```text
//! setter / signal change ─▶ Scheduler ─▶ Root::flush
//!                                           │
//!                         RenderPass (fibers only, no host access)
//!                                           │
//!                               Vec<Mutation> ─▶ HostConfig (one commit)
//! ```
//!
//! A render error aborts the pass before any host call and halts the root.

mod element;
mod fiber;
mod hooks;
mod reconciler;
mod root;
mod scheduler;

pub use element::{h, Component, ComponentElement, Element, Fragment, HostElement};
pub use fiber::FiberId;
pub use hooks::{Cx, StateSetter};
pub use root::{CommitReport, Root, DEFAULT_MAX_PASSES};
pub use scheduler::Priority;
