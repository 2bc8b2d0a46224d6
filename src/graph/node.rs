//! Node identity and allocation.
//!
//! A node carries no data of its own; it is entirely described by its id.
//! Ids come from a [`NodeIdAllocator`] owned by the graph model and are
//! never handed out twice, so a removed node can never be confused with a
//! later one.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

/// Stable node identifier.
///
/// Wraps a u32 for efficient storage and WebAssembly interop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// Monotonic id source.
///
/// Unlike a process-wide counter, each graph owns its allocator, so two
/// graphs in the same process hand out independent id sequences.
#[derive(Debug, Clone, Default)]
pub struct NodeIdAllocator {
    next: u32,
}

impl NodeIdAllocator {
    /// Create an allocator starting at id 0.
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Hand out the next unused id.
    ///
    /// Fails once the id space is used up rather than wrapping around to
    /// ids that were already issued.
    pub fn allocate(&mut self) -> Result<NodeId> {
        let id = NodeId(self.next);
        self.next = self
            .next
            .checked_add(1)
            .ok_or(GraphError::NodeIdsExhausted)?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_display() {
        assert_eq!(format!("{}", NodeId(42)), "Node(42)");
    }

    #[test]
    fn test_node_id_conversion() {
        let id: NodeId = 123.into();
        let raw: u32 = id.into();
        assert_eq!(raw, 123);
    }

    #[test]
    fn test_allocator_never_repeats() {
        let mut alloc = NodeIdAllocator::new();
        let a = alloc.allocate().unwrap();
        let b = alloc.allocate().unwrap();
        let c = alloc.allocate().unwrap();

        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_eq!(c, NodeId(2));
    }

    #[test]
    fn test_independent_allocators() {
        let mut first = NodeIdAllocator::new();
        let mut second = NodeIdAllocator::new();
        first.allocate().unwrap();
        first.allocate().unwrap();

        assert_eq!(second.allocate().unwrap(), NodeId(0));
    }

    #[test]
    fn test_allocator_refuses_to_wrap() {
        let mut alloc = NodeIdAllocator { next: u32::MAX - 1 };
        assert_eq!(alloc.allocate().unwrap(), NodeId(u32::MAX - 1));

        assert!(matches!(alloc.allocate(), Err(GraphError::NodeIdsExhausted)));
        assert!(matches!(alloc.allocate(), Err(GraphError::NodeIdsExhausted)));
    }
}
