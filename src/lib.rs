//! # spark-vdom
//!
//! Incremental tree reconciler and row-granular table for Rust.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for
//! fine-grained reactivity.
//!
//! ## Architecture
//!
//! Components describe UI as [`Element`] trees. The engine keeps one fiber
//! per description slot, diffs each new description against the committed
//! fibers and applies the difference to a host through eight primitive
//! operations:
//!
//! ```text
//! Component::render → Element → RenderPass → Vec<Mutation> → HostConfig
//! ```
//!
//! External data reaches components through `use_selector`: a selector runs
//! inside a spark-signals effect, and only the components whose selected
//! value changed render again. The [`table`] module builds on this so that a
//! change to one row reconciles only that row.
//!
//! ## Modules
//!
//! - [`types`] - Properties, keys, events
//! - [`host`] - Host operation contract, in-memory and terminal hosts
//! - [`engine`] - Elements, fibers, hooks, reconciler, roots
//! - [`primitives`] - Suspension (`when`, `lazy`) and selector memoization
//! - [`table`] - Row-granular table component
//! - [`testing`] - Tree queries and event simulation
//! - [`error`] - Error types

pub mod engine;
pub mod error;
pub mod host;
pub mod primitives;
pub mod table;
pub mod testing;
pub mod types;

// Re-export commonly used items
pub use types::{handler, Event, EventHandler, EventKind, Key, PropValue, Props};

pub use error::{HostError, QueryError, ReconcileError, RenderError};

pub use engine::{h, CommitReport, Component, Cx, Element, HostElement, Priority, Root, StateSetter};

pub use host::{HostConfig, HostOps, MemoryHost, MemoryNode, NodeId, ParentRef, TerminalHost};

pub use primitives::{
    cache_result_of, deferred, lazy, when, AsyncState, CachedResult, Deferred, Resolver, UiModule,
    WhenOptions,
};

pub use table::{
    CellValue, ColumnType, RenderCounter, RowId, RowSource, SelectAllMode, SortDirection, SortOrder,
    SummaryValue, Table, TableColumn, TableRowOptions,
};

pub use testing::{NodeRef, Predicate, TestRenderer};
