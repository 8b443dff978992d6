//! Node identity for the annotated-AST output contract (spec.md §6,
//! "each node is replaced by a node whose annotation is `Some(...)`").
//!
//! Rather than duplicating the tree, every checkable node carries a
//! `NodeId`; the checker records annotations in a side table keyed by
//! this id (see `sail-checker::annotation`).

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

/// Process-wide monotonic node-id source. Parsing assigns ids once when
/// building the input AST; the checker never mints new nodes, only reads
/// and annotates existing ids (spec.md §5, "process-wide counters").
#[derive(Debug, Default)]
pub struct NodeIdGen {
    next: AtomicU32,
}

impl NodeIdGen {
    pub fn new() -> Self {
        NodeIdGen {
            next: AtomicU32::new(0),
        }
    }

    pub fn next(&self) -> NodeId {
        NodeId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_ids_are_unique_and_increasing() {
        let gen = NodeIdGen::new();
        let a = gen.next();
        let b = gen.next();
        assert_ne!(a, b);
        assert!(a.as_u32() < b.as_u32());
    }
}
