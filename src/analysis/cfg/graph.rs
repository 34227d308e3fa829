//! Control Flow Graph implementation.
//!
//! This module provides the [`Cfg`] arena together with its cached predecessor index and the
//! mutation API used by the reduction passes.

use std::collections::BTreeSet;

use crate::{
    analysis::cfg::{BoundEdge, Edge, Link},
    utils::graph::{algorithms, NodeId, Successors},
    Error, Result,
};

/// A CFG node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A slot without out-edge: under construction, or vacated by a replacement.
    Pending,
    /// Single successor.
    Simple {
        /// The out-edge
        out: Link,
    },
    /// Two successors, chosen by the value on top of the operand stack.
    If {
        /// Arm taken when the test holds
        out_true: Link,
        /// Arm taken otherwise
        out_false: Link,
    },
    /// Terminal node.
    End,
}

impl Node {
    /// Returns the out-links of this node, the true arm first for `If` nodes.
    pub fn links(&self) -> impl Iterator<Item = &Link> + '_ {
        let (first, second) = match self {
            Node::Simple { out } => (Some(out), None),
            Node::If {
                out_true,
                out_false,
            } => (Some(out_true), Some(out_false)),
            Node::Pending | Node::End => (None, None),
        };
        first.into_iter().chain(second)
    }

    /// Returns the out-link of a `Simple` node.
    #[must_use]
    pub const fn simple_out(&self) -> Option<&Link> {
        match self {
            Node::Simple { out } => Some(out),
            _ => None,
        }
    }
}

/// Node visitation orders supported by [`Cfg::iter_nodes`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TraversalOrder {
    /// Stack based depth-first preorder
    Preorder,
    /// Depth-first postorder
    Postorder,
    /// Reverse postorder, the forward dataflow order
    #[default]
    ReversePostorder,
}

/// A control flow graph over AVM1 actions.
///
/// Nodes live in an arena addressed by [`NodeId`]. The graph keeps the predecessor set of
/// every reachable node, which makes in-degree queries O(1). All mutations keep this index
/// consistent with the out-links.
///
/// Nodes are never removed from the arena. Nodes dropped by a replacement become
/// [`Node::Pending`] and unreachable.
///
/// # Examples
///
/// ```rust
/// use avm1_decompiler::analysis::{build_linear, Edge};
///
/// let cfg = build_linear(vec![Edge::Simple, Edge::Simple]);
/// assert_eq!(cfg.iter_nodes(Default::default()).len(), 3);
/// assert_eq!(cfg.end_nodes().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Cfg {
    nodes: Vec<Node>,
    source: NodeId,
    predecessors: Vec<BTreeSet<NodeId>>,
}

impl Cfg {
    /// Creates a CFG from a node arena and its source node.
    ///
    /// Computes the predecessor index with one traversal from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] if `source` or a reachable link points outside the
    /// arena, and [`Error::InvariantViolation`] if a reachable node is still
    /// [`Node::Pending`].
    pub fn new(nodes: Vec<Node>, source: NodeId) -> Result<Self> {
        if source.index() >= nodes.len() {
            return Err(Error::NodeNotFound(source.index()));
        }

        let mut visited = vec![false; nodes.len()];
        let mut stack = vec![source];
        visited[source.index()] = true;
        while let Some(node) = stack.pop() {
            if matches!(nodes[node.index()], Node::Pending) {
                return Err(invariant_error!("Node {} is reachable but incomplete", node));
            }
            for link in nodes[node.index()].links() {
                let Some(seen) = visited.get_mut(link.to.index()) else {
                    return Err(Error::NodeNotFound(link.to.index()));
                };
                if !*seen {
                    *seen = true;
                    stack.push(link.to);
                }
            }
        }

        Ok(Self::with_index(nodes, source))
    }

    /// Builds the predecessor index for an arena whose links are known to be valid.
    pub(crate) fn with_index(nodes: Vec<Node>, source: NodeId) -> Self {
        let mut cfg = Cfg {
            predecessors: vec![BTreeSet::new(); nodes.len()],
            nodes,
            source,
        };
        for node in algorithms::preorder(&cfg, source).collect::<Vec<_>>() {
            let targets: Vec<NodeId> = cfg.nodes[node.index()].links().map(|l| l.to).collect();
            for to in targets {
                cfg.predecessors[to.index()].insert(node);
            }
        }
        cfg
    }

    /// Returns the entry node.
    #[must_use]
    pub const fn source(&self) -> NodeId {
        self.source
    }

    /// Returns the node with the given id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Returns the number of arena slots, including unreachable ones.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the out-edges of `node`, the true arm first for `If` nodes.
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = BoundEdge<'_>> + '_ {
        self.nodes
            .get(node.index())
            .into_iter()
            .flat_map(Node::links)
            .map(move |link| BoundEdge {
                from: node,
                to: link.to,
                edge: &link.edge,
            })
    }

    /// Returns the in-edges of `node`, ordered by source node id.
    pub fn in_edges(&self, node: NodeId) -> impl Iterator<Item = BoundEdge<'_>> + '_ {
        self.predecessors
            .get(node.index())
            .into_iter()
            .flatten()
            .flat_map(move |&from| self.out_edges(from).filter(move |e| e.to == node))
    }

    /// Returns the number of distinct predecessors of `node`.
    #[must_use]
    pub fn in_degree(&self, node: NodeId) -> usize {
        self.predecessors.get(node.index()).map_or(0, BTreeSet::len)
    }

    /// Returns the nodes reachable from the source in the requested order.
    #[must_use]
    pub fn iter_nodes(&self, order: TraversalOrder) -> Vec<NodeId> {
        match order {
            TraversalOrder::Preorder => algorithms::preorder(self, self.source).collect(),
            TraversalOrder::Postorder => algorithms::postorder(self, self.source),
            TraversalOrder::ReversePostorder => algorithms::reverse_postorder(self, self.source),
        }
    }

    /// Returns every reachable edge, grouped by source node in reverse postorder.
    #[must_use]
    pub fn iter_edges(&self) -> Vec<BoundEdge<'_>> {
        self.iter_nodes(TraversalOrder::ReversePostorder)
            .into_iter()
            .flat_map(|node| self.out_edges(node))
            .collect()
    }

    /// Returns the reachable [`Node::End`] nodes.
    #[must_use]
    pub fn end_nodes(&self) -> Vec<NodeId> {
        self.iter_nodes(TraversalOrder::ReversePostorder)
            .into_iter()
            .filter(|&node| matches!(self.nodes[node.index()], Node::End))
            .collect()
    }

    /// Replaces the out-edge of a `Simple` node with a chain of edges ending at the same
    /// destination.
    ///
    /// An empty `edges` list reinserts a single [`Edge::Simple`]. Longer lists allocate
    /// intermediate `Simple` nodes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] for an id outside the arena and
    /// [`Error::InvariantViolation`] if the node is not `Simple`.
    pub fn replace_out_edge(&mut self, node: NodeId, edges: Vec<Edge>) -> Result<()> {
        let to = self.simple_target(node)?;
        self.unlink(node, to);
        self.add_edges(node, to, edges);
        Ok(())
    }

    /// Replaces a chain of `Simple` nodes with a chain of edges.
    ///
    /// The result starts at the first node of `chain` and ends at the destination of its
    /// last node. Interior nodes are vacated. Validation happens before any mutation.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyChain`] if `chain` is empty
    /// - [`Error::InvalidChain`] if a node is not `Simple`, or a node after the first is the
    ///   source, has an in-degree other than 1, or is not the destination of its predecessor
    ///   in the chain
    pub fn replace_chain(&mut self, chain: &[NodeId], edges: Vec<Edge>) -> Result<()> {
        let Some((&first, rest)) = chain.split_first() else {
            return Err(Error::EmptyChain);
        };

        let mut prev = self.simple_target(first).map_err(|_| Error::InvalidChain)?;
        for &node in rest {
            if node == self.source || self.in_degree(node) != 1 || prev != node {
                return Err(Error::InvalidChain);
            }
            prev = self.simple_target(node).map_err(|_| Error::InvalidChain)?;
        }
        let dest = prev;

        let mut from = first;
        for &node in rest {
            self.unlink(from, node);
            from = node;
        }
        self.unlink(from, dest);
        for &node in rest {
            self.nodes[node.index()] = Node::Pending;
        }

        self.add_edges(first, dest, edges);
        Ok(())
    }

    /// Replaces every edge reachable from `src` without passing through `dest` by a chain of
    /// edges from `src` to `dest`.
    ///
    /// Used to collapse a branch-and-merge region. Nodes strictly inside the region are
    /// vacated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] for ids outside the arena and
    /// [`Error::InvariantViolation`] if `dest` is not reachable from `src`.
    pub fn replace_interval(&mut self, src: NodeId, dest: NodeId, edges: Vec<Edge>) -> Result<()> {
        for id in [src, dest] {
            if id.index() >= self.nodes.len() {
                return Err(Error::NodeNotFound(id.index()));
            }
        }

        let mut interval = vec![src];
        let mut visited = BTreeSet::from([src]);
        let mut stack = vec![src];
        let mut reaches_dest = false;
        while let Some(node) = stack.pop() {
            for link in self.nodes[node.index()].links() {
                if link.to == dest {
                    reaches_dest = true;
                } else if visited.insert(link.to) {
                    interval.push(link.to);
                    stack.push(link.to);
                }
            }
        }
        if !reaches_dest {
            return Err(invariant_error!(
                "Interval from {} does not reach {}",
                src,
                dest
            ));
        }

        for &node in &interval {
            let targets: Vec<NodeId> = self.nodes[node.index()].links().map(|l| l.to).collect();
            for to in targets {
                self.unlink(node, to);
            }
        }
        for &node in &interval[1..] {
            self.nodes[node.index()] = Node::Pending;
        }

        self.add_edges(src, dest, edges);
        Ok(())
    }

    fn simple_target(&self, node: NodeId) -> Result<NodeId> {
        match self.nodes.get(node.index()) {
            Some(Node::Simple { out }) => Ok(out.to),
            Some(other) => Err(invariant_error!(
                "Node {} is not a Simple node: {:?}",
                node,
                other
            )),
            None => Err(Error::NodeNotFound(node.index())),
        }
    }

    fn unlink(&mut self, from: NodeId, to: NodeId) {
        if let Some(preds) = self.predecessors.get_mut(to.index()) {
            preds.remove(&from);
        }
    }

    fn link(&mut self, from: NodeId, edge: Edge, to: NodeId) {
        self.nodes[from.index()] = Node::Simple {
            out: Link::new(edge, to),
        };
        self.predecessors[to.index()].insert(from);
    }

    fn alloc(&mut self) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node::Pending);
        self.predecessors.push(BTreeSet::new());
        id
    }

    fn add_edges(&mut self, src: NodeId, dest: NodeId, edges: Vec<Edge>) {
        let mut edges = edges.into_iter();
        let Some(first) = edges.next() else {
            self.link(src, Edge::Simple, dest);
            return;
        };

        let mut next = dest;
        for edge in edges.rev() {
            let node = self.alloc();
            self.link(node, edge, next);
            next = node;
        }
        self.link(src, first, next);
    }
}

impl Successors for Cfg {
    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .get(node.index())
            .into_iter()
            .flat_map(Node::links)
            .map(|link| link.to)
    }
}

/// Builds the linear graph `source -e0-> n1 -e1-> ... -> End`.
///
/// An empty list yields a source connected to `End` through an [`Edge::Simple`].
#[must_use]
pub fn build_linear(edges: Vec<Edge>) -> Cfg {
    let mut edges = edges;
    if edges.is_empty() {
        edges.push(Edge::Simple);
    }

    let mut nodes: Vec<Node> = edges
        .into_iter()
        .enumerate()
        .map(|(i, edge)| Node::Simple {
            out: Link::new(edge, NodeId::new(i + 1)),
        })
        .collect();
    nodes.push(Node::End);

    Cfg::with_index(nodes, NodeId::new(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;

    fn simple(edge: Edge, to: usize) -> Node {
        Node::Simple {
            out: Link::new(edge, NodeId::new(to)),
        }
    }

    /// 0 -IfTest-> 1 (If) -> [true 2, false 3]; 2 -> 4; 3 -> 4; 4 -> 5 (End)
    fn diamond() -> Cfg {
        let nodes = vec![
            simple(Edge::IfTest, 1),
            Node::If {
                out_true: Link::new(Edge::IfTrue, NodeId::new(2)),
                out_false: Link::new(Edge::IfFalse, NodeId::new(3)),
            },
            simple(Edge::Action(Action::Play), 4),
            simple(Edge::Action(Action::Stop), 4),
            simple(Edge::Simple, 5),
            Node::End,
        ];
        Cfg::new(nodes, NodeId::new(0)).unwrap()
    }

    fn ids(raw: &[usize]) -> Vec<NodeId> {
        raw.iter().copied().map(NodeId::new).collect()
    }

    #[test]
    fn test_cfg_rejects_reachable_pending() {
        let nodes = vec![simple(Edge::Simple, 1), Node::Pending];
        assert!(matches!(
            Cfg::new(nodes, NodeId::new(0)),
            Err(Error::InvariantViolation { .. })
        ));
    }

    #[test]
    fn test_cfg_accepts_unreachable_pending() {
        let nodes = vec![simple(Edge::Simple, 2), Node::Pending, Node::End];
        let cfg = Cfg::new(nodes, NodeId::new(0)).unwrap();
        assert_eq!(cfg.iter_nodes(TraversalOrder::Preorder), ids(&[0, 2]));
    }

    #[test]
    fn test_cfg_rejects_dangling_link() {
        let nodes = vec![simple(Edge::Simple, 9)];
        assert_eq!(
            Cfg::new(nodes, NodeId::new(0)),
            Err(Error::NodeNotFound(9))
        );
    }

    #[test]
    fn test_cfg_diamond_index() {
        let cfg = diamond();
        assert_eq!(cfg.in_degree(NodeId::new(0)), 0);
        assert_eq!(cfg.in_degree(NodeId::new(4)), 2);

        let from: Vec<NodeId> = cfg.in_edges(NodeId::new(4)).map(|e| e.from).collect();
        assert_eq!(from, ids(&[2, 3]));

        let arms: Vec<&Edge> = cfg.out_edges(NodeId::new(1)).map(|e| e.edge).collect();
        assert_eq!(arms, vec![&Edge::IfTrue, &Edge::IfFalse]);
        assert_eq!(cfg.end_nodes(), ids(&[5]));
    }

    #[test]
    fn test_cfg_traversal_orders() {
        let cfg = diamond();
        assert_eq!(
            cfg.iter_nodes(TraversalOrder::Preorder),
            ids(&[0, 1, 3, 4, 5, 2])
        );
        assert_eq!(
            cfg.iter_nodes(TraversalOrder::Postorder),
            ids(&[5, 4, 2, 3, 1, 0])
        );
        assert_eq!(
            cfg.iter_nodes(TraversalOrder::default()),
            ids(&[0, 1, 3, 2, 4, 5])
        );
    }

    #[test]
    fn test_replace_out_edge_materializes_nodes() {
        let mut cfg = build_linear(vec![Edge::Action(Action::Play)]);
        cfg.replace_out_edge(
            NodeId::new(0),
            vec![Edge::Action(Action::Stop), Edge::Action(Action::Play)],
        )
        .unwrap();

        let edges: Vec<&Edge> = cfg.iter_edges().into_iter().map(|e| e.edge).collect();
        assert_eq!(
            edges,
            vec![&Edge::Action(Action::Stop), &Edge::Action(Action::Play)]
        );
        assert_eq!(cfg.in_degree(NodeId::new(1)), 1);
    }

    #[test]
    fn test_replace_out_edge_with_nothing_inserts_simple() {
        let mut cfg = build_linear(vec![Edge::Action(Action::Play)]);
        cfg.replace_out_edge(NodeId::new(0), Vec::new()).unwrap();
        assert_eq!(
            cfg.node(NodeId::new(0)),
            Some(&simple(Edge::Simple, 1))
        );
    }

    #[test]
    fn test_replace_out_edge_rejects_if_node() {
        let mut cfg = diamond();
        assert!(matches!(
            cfg.replace_out_edge(NodeId::new(1), Vec::new()),
            Err(Error::InvariantViolation { .. })
        ));
    }

    #[test]
    fn test_replace_chain() {
        let mut cfg = build_linear(vec![
            Edge::Action(Action::Play),
            Edge::Action(Action::Stop),
            Edge::Simple,
        ]);
        cfg.replace_chain(&ids(&[0, 1, 2]), vec![Edge::Action(Action::Trace)])
            .unwrap();

        assert_eq!(cfg.node(NodeId::new(0)), Some(&simple(Edge::Action(Action::Trace), 3)));
        assert_eq!(cfg.node(NodeId::new(1)), Some(&Node::Pending));
        assert_eq!(cfg.in_edges(NodeId::new(3)).count(), 1);
        assert_eq!(cfg.in_degree(NodeId::new(2)), 0);
        assert_eq!(cfg.iter_nodes(TraversalOrder::default()), ids(&[0, 3]));
    }

    #[test]
    fn test_replace_chain_errors() {
        let mut cfg = diamond();
        assert_eq!(cfg.replace_chain(&[], Vec::new()), Err(Error::EmptyChain));
        // 4 has two predecessors
        assert_eq!(
            cfg.replace_chain(&ids(&[2, 4]), Vec::new()),
            Err(Error::InvalidChain)
        );
        // 3 does not follow 2
        assert_eq!(
            cfg.replace_chain(&ids(&[2, 3]), Vec::new()),
            Err(Error::InvalidChain)
        );
        // The If node cannot be part of a chain
        assert_eq!(
            cfg.replace_chain(&ids(&[0, 1]), Vec::new()),
            Err(Error::InvalidChain)
        );
        assert_eq!(
            cfg.replace_chain(&ids(&[1]), Vec::new()),
            Err(Error::InvalidChain)
        );
        assert_eq!(cfg, diamond());
    }

    #[test]
    fn test_replace_single_node_chain() {
        let mut cfg = build_linear(vec![Edge::Action(Action::Play)]);
        cfg.replace_chain(&ids(&[0]), vec![Edge::Action(Action::Stop)])
            .unwrap();
        assert_eq!(cfg.node(NodeId::new(0)), Some(&simple(Edge::Action(Action::Stop), 1)));
        assert_eq!(cfg.in_degree(NodeId::new(1)), 1);
    }

    #[test]
    fn test_replace_chain_rejects_source() {
        let nodes = vec![simple(Edge::Simple, 1), simple(Edge::Simple, 0)];
        let mut cfg = Cfg::new(nodes, NodeId::new(0)).unwrap();
        assert_eq!(
            cfg.replace_chain(&ids(&[1, 0]), Vec::new()),
            Err(Error::InvalidChain)
        );
    }

    #[test]
    fn test_replace_interval_collapses_diamond() {
        let mut cfg = diamond();
        cfg.replace_interval(NodeId::new(0), NodeId::new(4), vec![Edge::Sub])
            .unwrap();

        assert_eq!(cfg.iter_nodes(TraversalOrder::default()), ids(&[0, 4, 5]));
        assert_eq!(cfg.in_degree(NodeId::new(4)), 1);
        assert_eq!(cfg.node(NodeId::new(2)), Some(&Node::Pending));
        assert_eq!(cfg.node(NodeId::new(0)), Some(&simple(Edge::Sub, 4)));
    }

    #[test]
    fn test_replace_interval_requires_reachable_dest() {
        let mut cfg = diamond();
        assert!(matches!(
            cfg.replace_interval(NodeId::new(2), NodeId::new(3), Vec::new()),
            Err(Error::InvariantViolation { .. })
        ));
    }

    #[test]
    fn test_build_linear() {
        let cfg = build_linear(vec![Edge::IfTrue, Edge::IfFalse]);
        assert_eq!(cfg.node_count(), 3);
        assert_eq!(cfg.node(NodeId::new(2)), Some(&Node::End));
        assert_eq!(build_linear(Vec::new()).node_count(), 2);
    }
}
