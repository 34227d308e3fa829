//! Depth-first traversal orders.
//!
//! # Algorithms
//!
//! - [`preorder`] - Lazy stack based preorder
//! - [`postorder`] - Depth-first postorder
//! - [`reverse_postorder`] - Reverse postorder (forward data flow visitation order)
//!
//! The preorder iterator follows the explicit stack discipline used by the chain reduction:
//! successors are pushed in their defined order, so the *last* successor is explored first.
//! For a conditional node, whose successors are `[true, false]`, the false arm is walked before
//! the true arm. Postorder instead explores successors in their defined order, which puts the
//! true arm first in reverse postorder.

use crate::utils::graph::{NodeId, Successors};

/// Lazy preorder iterator over the nodes reachable from a start node.
///
/// Nodes are marked when pushed, so a node reachable along several paths is reported once, at
/// the position of the first path that discovered it.
pub struct PreorderIter<'g, G: Successors> {
    graph: &'g G,
    stack: Vec<NodeId>,
    visited: Vec<bool>,
}

impl<'g, G: Successors> PreorderIter<'g, G> {
    fn new(graph: &'g G, start: NodeId) -> Self {
        let node_count = graph.node_count();
        if start.index() >= node_count {
            return PreorderIter {
                graph,
                stack: Vec::new(),
                visited: Vec::new(),
            };
        }

        let mut visited = vec![false; node_count];
        visited[start.index()] = true;

        PreorderIter {
            graph,
            stack: vec![start],
            visited,
        }
    }
}

impl<G: Successors> Iterator for PreorderIter<'_, G> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;

        for succ in self.graph.successors(node) {
            if let Some(seen) = self.visited.get_mut(succ.index()) {
                if !*seen {
                    *seen = true;
                    self.stack.push(succ);
                }
            }
        }

        Some(node)
    }
}

/// Returns a preorder iterator starting from `start`.
///
/// An out-of-range start yields nothing.
///
/// # Examples
///
/// ```rust,ignore
/// use avm1_decompiler::utils::graph::algorithms::preorder;
///
/// let reachable: Vec<_> = preorder(&cfg, cfg.source()).collect();
/// assert_eq!(reachable[0], cfg.source());
/// ```
pub fn preorder<G: Successors>(graph: &G, start: NodeId) -> PreorderIter<'_, G> {
    PreorderIter::new(graph, start)
}

/// Computes the postorder of the nodes reachable from `start`.
///
/// A node is emitted after every node reachable through its first unvisited successor, then its
/// second, and so on.
///
/// # Complexity
///
/// - Time: O(V + E)
/// - Space: O(V)
#[allow(clippy::items_after_statements)]
pub fn postorder<G: Successors>(graph: &G, start: NodeId) -> Vec<NodeId> {
    let node_count = graph.node_count();
    if start.index() >= node_count {
        return Vec::new();
    }

    let mut visited = vec![false; node_count];
    let mut result = Vec::with_capacity(node_count);

    #[derive(Clone, Copy)]
    enum State {
        Enter,
        Exit,
    }

    let mut stack = vec![(start, State::Enter)];

    while let Some((node, state)) = stack.pop() {
        match state {
            State::Enter => {
                if visited[node.index()] {
                    continue;
                }
                visited[node.index()] = true;
                stack.push((node, State::Exit));

                // Reversed so the first successor is entered first
                let successors: Vec<NodeId> = graph.successors(node).collect();
                for &succ in successors.iter().rev() {
                    if succ.index() < node_count && !visited[succ.index()] {
                        stack.push((succ, State::Enter));
                    }
                }
            }
            State::Exit => result.push(node),
        }
    }

    result
}

/// Computes the reverse postorder of the nodes reachable from `start`.
///
/// Every node appears before its successors except along back edges, which makes this the
/// order in which forward data flow converges fastest.
pub fn reverse_postorder<G: Successors>(graph: &G, start: NodeId) -> Vec<NodeId> {
    let mut order = postorder(graph, start);
    order.reverse();
    order
}
