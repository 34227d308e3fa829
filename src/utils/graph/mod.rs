//! Minimal graph infrastructure shared by the CFG and its analyses.
//!
//! Graphs in this crate are arenas addressed by [`NodeId`]. Algorithms only need to know
//! how many node slots exist and how to enumerate the successors of a node, which is what
//! the [`Successors`] trait captures.

pub mod algorithms;
mod node;

pub use node::NodeId;

/// Read access to the outgoing adjacency of a graph.
///
/// Successor order is significant: traversal algorithms visit successors in the order this
/// trait yields them, which is what makes their output deterministic.
pub trait Successors {
    /// Returns the number of node slots in the arena, reachable or not.
    fn node_count(&self) -> usize;

    /// Returns the successors of `node` in their defined order.
    fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_;
}
