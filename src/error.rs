//! Error taxonomy.
//!
//! - [`HostError`] - a backend rejected or does not support an operation
//! - [`RenderError`] - a component cannot produce a description
//! - [`ReconcileError`] - a flush failed; always fatal for the root
//! - [`QueryError`] - an assertion of the query/event facade failed

use thiserror::Error;

use crate::host::{HostOps, NodeId};
use crate::types::EventKind;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    #[error("host operation {0:?} is not implemented by this backend")]
    Unsupported(HostOps),

    #[error("unknown host node {0:?}")]
    UnknownNode(NodeId),

    #[error("node {child:?} is not a child of the given parent")]
    NotAChild { child: NodeId },

    #[error("node {0:?} is a text leaf and cannot hold children")]
    NotAnInstance(NodeId),

    #[error("node {0:?} is an element instance, not a text leaf")]
    NotATextLeaf(NodeId),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("row {row} entered edit mode but the table has no editor configured")]
    MissingEditor { row: String },

    #[error("{0}")]
    Failed(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReconcileError {
    #[error("host backend is missing required operations {0:?}")]
    MissingHostOperations(HostOps),

    #[error("host error: {0}")]
    Host(#[from] HostError),

    #[error("render failed: {0}")]
    Render(#[from] RenderError),

    #[error("root halted after an earlier fatal error")]
    Halted,

    #[error("updates did not settle after {0} passes")]
    UpdateLoop(usize),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("no node matches {predicate}")]
    NotFound { predicate: String },

    #[error("<{kind}> has no callable {event} handler")]
    MissingHandler { event: EventKind, kind: String },

    #[error("node {0:?} is no longer part of the tree")]
    StaleNode(NodeId),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

pub type Result<T, E = ReconcileError> = std::result::Result<T, E>;
