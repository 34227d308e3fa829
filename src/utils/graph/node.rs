//! Node identifier for arena based graphs.
//!
//! [`NodeId`] is a strongly-typed index into a node arena such as the one backing
//! [`crate::analysis::Cfg`]. The newtype prevents confusing node indices with offsets,
//! temporary ids, or other integers flowing through the decompiler.

use std::fmt;

/// A strongly-typed identifier for nodes within a graph arena.
///
/// `NodeId` wraps a `usize` index. Ids are assigned sequentially from 0 as nodes are
/// allocated and remain stable for the lifetime of the arena: rewriting a graph allocates
/// new nodes but never renumbers existing ones.
///
/// # Examples
///
/// ```rust
/// use avm1_decompiler::utils::graph::NodeId;
///
/// let node = NodeId::new(3);
/// assert_eq!(node.index(), 3);
/// assert_eq!(node.to_string(), "n3");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Creates a new `NodeId` from a raw index value.
    ///
    /// Graph builders allocate ids themselves; constructing one by hand is mostly useful
    /// in tests.
    ///
    /// # Arguments
    ///
    /// * `index` - The raw node index (0-based)
    #[must_use]
    #[inline]
    pub const fn new(index: usize) -> Self {
        NodeId(index)
    }

    /// Returns the raw index value of this node identifier.
    ///
    /// The index addresses per-node side tables such as dataflow states.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl From<usize> for NodeId {
    #[inline]
    fn from(index: usize) -> Self {
        NodeId(index)
    }
}

impl From<NodeId> for usize {
    #[inline]
    fn from(node: NodeId) -> Self {
        node.0
    }
}
