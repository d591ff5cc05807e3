//! Host Operation Contract - The only surface a rendering backend implements.
//!
//! The reconciler never touches a tree directly. Every structural change is
//! expressed as one of eight primitive operations:
//!
//! | Operation | Effect |
//! |-----------|--------|
//! | `create_instance` | new detached element instance |
//! | `create_text_leaf` | new detached text leaf |
//! | `append_child` | attach (or move) a child to the end of a parent |
//! | `insert_before` | attach (or move) a child before a sibling |
//! | `remove_child` | detach and release a child subtree |
//! | `update_instance_properties` | replace the whole property set |
//! | `update_text_leaf` | replace text content |
//! | `clear_container` | empty the container before the first commit |
//!
//! Each method has a default body reporting [`HostError::Unsupported`], so a
//! backend that forgets an operation fails loudly the first time the engine
//! needs it instead of silently dropping mutations. Backends additionally
//! declare what they implement through [`HostConfig::supported_ops`], which
//! the root validates before its first commit.
//!
//! Backends:
//! - [`memory::MemoryHost`] - in-memory tree, used by the query facade
//! - [`terminal::TerminalHost`] - paints the committed tree to a terminal

pub mod memory;
pub mod terminal;

use crate::error::HostError;
use crate::types::Props;

pub use memory::{MemoryHost, MemoryNode};
pub use terminal::TerminalHost;

bitflags::bitflags! {
    /// Set of host operations, one bit per contract method.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct HostOps: u8 {
        const CREATE_INSTANCE = 1 << 0;
        const CREATE_TEXT_LEAF = 1 << 1;
        const APPEND_CHILD = 1 << 2;
        const INSERT_BEFORE = 1 << 3;
        const REMOVE_CHILD = 1 << 4;
        const UPDATE_INSTANCE_PROPERTIES = 1 << 5;
        const UPDATE_TEXT_LEAF = 1 << 6;
        const CLEAR_CONTAINER = 1 << 7;
    }
}

impl HostOps {
    /// Every operation the reconciler may emit.
    pub const REQUIRED: HostOps = HostOps::all();
}

/// Handle of a node inside [`MemoryHost`].
///
/// Ids are recycled through a free pool; the generation tells a recycled
/// slot apart from the node a stale handle pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

/// Parent of an attach/detach operation.
#[derive(Debug, Clone, Copy)]
pub enum ParentRef<'a, N> {
    Container,
    Node(&'a N),
}

/// A rendering backend.
pub trait HostConfig {
    /// Handle to an instance or text leaf owned by the backend.
    type Node: Clone;

    /// Operations this backend implements.
    fn supported_ops(&self) -> HostOps {
        HostOps::REQUIRED
    }

    fn create_instance(&mut self, kind: &str, props: &Props) -> Result<Self::Node, HostError> {
        let _ = (kind, props);
        Err(HostError::Unsupported(HostOps::CREATE_INSTANCE))
    }

    fn create_text_leaf(&mut self, text: &str) -> Result<Self::Node, HostError> {
        let _ = text;
        Err(HostError::Unsupported(HostOps::CREATE_TEXT_LEAF))
    }

    /// Attach `child` as last child. A child already attached to `parent`
    /// is moved.
    fn append_child(
        &mut self,
        parent: ParentRef<'_, Self::Node>,
        child: &Self::Node,
    ) -> Result<(), HostError> {
        let _ = (parent, child);
        Err(HostError::Unsupported(HostOps::APPEND_CHILD))
    }

    /// Attach `child` right before `before`. A child already attached to
    /// `parent` is moved.
    fn insert_before(
        &mut self,
        parent: ParentRef<'_, Self::Node>,
        child: &Self::Node,
        before: &Self::Node,
    ) -> Result<(), HostError> {
        let _ = (parent, child, before);
        Err(HostError::Unsupported(HostOps::INSERT_BEFORE))
    }

    /// Detach `child`; the backend may release the whole subtree.
    fn remove_child(
        &mut self,
        parent: ParentRef<'_, Self::Node>,
        child: &Self::Node,
    ) -> Result<(), HostError> {
        let _ = (parent, child);
        Err(HostError::Unsupported(HostOps::REMOVE_CHILD))
    }

    fn update_instance_properties(
        &mut self,
        node: &Self::Node,
        props: &Props,
    ) -> Result<(), HostError> {
        let _ = (node, props);
        Err(HostError::Unsupported(HostOps::UPDATE_INSTANCE_PROPERTIES))
    }

    fn update_text_leaf(&mut self, node: &Self::Node, text: &str) -> Result<(), HostError> {
        let _ = (node, text);
        Err(HostError::Unsupported(HostOps::UPDATE_TEXT_LEAF))
    }

    fn clear_container(&mut self) -> Result<(), HostError> {
        Err(HostError::Unsupported(HostOps::CLEAR_CONTAINER))
    }
}
