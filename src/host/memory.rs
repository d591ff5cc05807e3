//! In-memory host tree.
//!
//! Nodes live in a slot arena; freed slots go back to a pool for reuse the
//! same way the component registry recycles indices. Instances own their
//! children list, there are no parent back-pointers.

use crate::error::HostError;
use crate::types::Props;

use super::{HostConfig, HostOps, NodeId, ParentRef};

/// A node of the in-memory tree.
#[derive(Debug, Clone, PartialEq)]
pub enum MemoryNode {
    Instance {
        kind: String,
        props: Props,
        children: Vec<NodeId>,
    },
    Text {
        text: String,
    },
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<MemoryNode>,
}

/// Arena-backed tree implementing the full host contract.
#[derive(Debug)]
pub struct MemoryHost {
    slots: Vec<Slot>,
    free: Vec<u32>,
    container: Vec<NodeId>,
    supported: HostOps,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::with_supported_ops(HostOps::REQUIRED)
    }

    /// A host that only claims `ops`; used to exercise incomplete backends.
    pub fn with_supported_ops(ops: HostOps) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            container: Vec::new(),
            supported: ops,
        }
    }

    /// Top-level children of the container.
    pub fn container(&self) -> &[NodeId] {
        &self.container
    }

    pub fn node(&self, id: NodeId) -> Option<&MemoryNode> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.node(id) {
            Some(MemoryNode::Instance { children, .. }) => children,
            _ => &[],
        }
    }

    /// Number of live nodes, attached or not.
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.node.is_some()).count()
    }

    // =========================================================================
    // Arena
    // =========================================================================

    fn allocate(&mut self, node: MemoryNode) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId {
                index,
                generation: 0,
            }
        }
    }

    /// Free `id` and everything below it.
    fn release(&mut self, id: NodeId) {
        let Some(slot) = self.slots.get_mut(id.index as usize) else { return };
        if slot.generation != id.generation {
            return;
        }
        let Some(node) = slot.node.take() else { return };
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);

        if let MemoryNode::Instance { children, .. } = node {
            for child in children {
                self.release(child);
            }
        }
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut MemoryNode, HostError> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(HostError::UnknownNode(id))
    }

    fn children_mut(&mut self, parent: ParentRef<'_, NodeId>) -> Result<&mut Vec<NodeId>, HostError> {
        match parent {
            ParentRef::Container => Ok(&mut self.container),
            ParentRef::Node(&id) => match self.node_mut(id)? {
                MemoryNode::Instance { children, .. } => Ok(children),
                MemoryNode::Text { .. } => Err(HostError::NotAnInstance(id)),
            },
        }
    }

    fn ensure_live(&self, id: NodeId) -> Result<(), HostError> {
        self.node(id).map(|_| ()).ok_or(HostError::UnknownNode(id))
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostConfig for MemoryHost {
    type Node = NodeId;

    fn supported_ops(&self) -> HostOps {
        self.supported
    }

    fn create_instance(&mut self, kind: &str, props: &Props) -> Result<NodeId, HostError> {
        Ok(self.allocate(MemoryNode::Instance {
            kind: kind.to_string(),
            props: props.clone(),
            children: Vec::new(),
        }))
    }

    fn create_text_leaf(&mut self, text: &str) -> Result<NodeId, HostError> {
        Ok(self.allocate(MemoryNode::Text {
            text: text.to_string(),
        }))
    }

    fn append_child(&mut self, parent: ParentRef<'_, NodeId>, child: &NodeId) -> Result<(), HostError> {
        self.ensure_live(*child)?;
        let children = self.children_mut(parent)?;
        children.retain(|c| c != child);
        children.push(*child);
        Ok(())
    }

    fn insert_before(
        &mut self,
        parent: ParentRef<'_, NodeId>,
        child: &NodeId,
        before: &NodeId,
    ) -> Result<(), HostError> {
        self.ensure_live(*child)?;
        let children = self.children_mut(parent)?;
        children.retain(|c| c != child);
        let position = children
            .iter()
            .position(|c| c == before)
            .ok_or(HostError::NotAChild { child: *before })?;
        children.insert(position, *child);
        Ok(())
    }

    fn remove_child(&mut self, parent: ParentRef<'_, NodeId>, child: &NodeId) -> Result<(), HostError> {
        let children = self.children_mut(parent)?;
        let position = children
            .iter()
            .position(|c| c == child)
            .ok_or(HostError::NotAChild { child: *child })?;
        children.remove(position);
        self.release(*child);
        Ok(())
    }

    fn update_instance_properties(&mut self, node: &NodeId, new_props: &Props) -> Result<(), HostError> {
        match self.node_mut(*node)? {
            MemoryNode::Instance { props, .. } => {
                *props = new_props.clone();
                Ok(())
            }
            MemoryNode::Text { .. } => Err(HostError::NotAnInstance(*node)),
        }
    }

    fn update_text_leaf(&mut self, node: &NodeId, new_text: &str) -> Result<(), HostError> {
        match self.node_mut(*node)? {
            MemoryNode::Text { text } => {
                *text = new_text.to_string();
                Ok(())
            }
            MemoryNode::Instance { .. } => Err(HostError::NotATextLeaf(*node)),
        }
    }

    fn clear_container(&mut self) -> Result<(), HostError> {
        for child in std::mem::take(&mut self.container) {
            self.release(child);
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
