//! CFG construction from an offset addressed action stream.

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use crate::{
    action::{Action, ActionReader},
    analysis::cfg::{Cfg, Edge, Link, Node},
    utils::graph::NodeId,
    Result,
};

/// Builds a [`Cfg`] by simulating the control transfers of an action stream.
///
/// Every discovered offset gets its own node. The walk keeps a stack of offsets still to
/// decode and a map from offset to node, so branches to an already discovered offset link to
/// the existing node instead of duplicating it. This is what produces joins and loops.
///
/// - `If` links the current node through [`Edge::IfTest`] to a new `If` node. Its arms
///   ([`Edge::IfTrue`], [`Edge::IfFalse`]) lead to fresh nodes placed at the branch target and
///   at the fallthrough offset.
/// - `Jump` links the current node to the node at its target with [`Edge::Simple`].
/// - Any other action becomes an [`Edge::Action`] to the node at the fallthrough offset.
///
/// Offsets where no action can be read end the path. After the walk, every node without an
/// out-edge is closed with an [`Edge::Simple`] to a fresh `End` node.
///
/// # Examples
///
/// ```rust
/// use avm1_decompiler::action::{Action, ActionList};
/// use avm1_decompiler::analysis::CfgBuilder;
///
/// let actions = ActionList::new(vec![Action::Play, Action::Stop]);
/// let cfg = CfgBuilder::build(&actions)?;
/// assert_eq!(cfg.iter_edges().len(), 3);
/// # Ok::<(), avm1_decompiler::Error>(())
/// ```
pub struct CfgBuilder {
    nodes: Vec<Node>,
    offsets: BTreeMap<usize, NodeId>,
    open: Vec<usize>,
    incomplete: BTreeSet<NodeId>,
}

impl CfgBuilder {
    /// Builds the CFG of the action stream starting at offset 0.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvariantViolation`] if a reachable node was left without
    /// out-edge, which indicates a bug in the builder.
    pub fn build<R: ActionReader>(reader: &R) -> Result<Cfg> {
        let mut builder = CfgBuilder {
            nodes: Vec::new(),
            offsets: BTreeMap::new(),
            open: vec![0],
            incomplete: BTreeSet::new(),
        };
        let source = builder.alloc();
        builder.offsets.insert(0, source);
        builder.incomplete.insert(source);

        while let Some(offset) = builder.open.pop() {
            let Some(&current) = builder.offsets.get(&offset) else {
                continue;
            };
            let Some((action, next)) = reader.read_at(offset) else {
                continue;
            };
            builder.step(current, offset, action, next);
        }

        for node in std::mem::take(&mut builder.incomplete) {
            let end = builder.alloc();
            builder.nodes[end.index()] = Node::End;
            builder.set(node, Edge::Simple, end);
        }

        Cfg::new(builder.nodes, source)
    }

    fn step(&mut self, current: NodeId, offset: usize, action: Action, next: usize) {
        match action {
            Action::If { offset: displacement } => {
                let if_node = self.alloc();
                let true_arm = self.alloc();
                let false_arm = self.alloc();
                self.set(current, Edge::IfTest, if_node);
                self.nodes[if_node.index()] = Node::If {
                    out_true: Link::new(Edge::IfTrue, true_arm),
                    out_false: Link::new(Edge::IfFalse, false_arm),
                };

                self.resolve(false_arm, Some(next));
                self.resolve(true_arm, branch_target(offset, next, displacement));
            }
            Action::Jump { offset: displacement } => {
                if let Some(target) = branch_target(offset, next, displacement) {
                    let to = self.node_at(target);
                    self.set(current, Edge::Simple, to);
                }
            }
            action => {
                let to = self.alloc();
                self.set(current, Edge::Action(action), to);
                self.resolve(to, Some(next));
            }
        }
    }

    /// Places `node` at `target`, or links it to the node already discovered there.
    ///
    /// A missing target leaves the node incomplete.
    fn resolve(&mut self, node: NodeId, target: Option<usize>) {
        let Some(target) = target else {
            self.incomplete.insert(node);
            return;
        };
        match self.offsets.get(&target) {
            Some(&existing) => self.set(node, Edge::Simple, existing),
            None => {
                self.offsets.insert(target, node);
                self.incomplete.insert(node);
                self.open.push(target);
            }
        }
    }

    /// Returns the node at `target`, discovering it if needed.
    fn node_at(&mut self, target: usize) -> NodeId {
        if let Some(&existing) = self.offsets.get(&target) {
            return existing;
        }
        let node = self.alloc();
        self.offsets.insert(target, node);
        self.incomplete.insert(node);
        self.open.push(target);
        node
    }

    fn alloc(&mut self) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node::Pending);
        id
    }

    fn set(&mut self, from: NodeId, edge: Edge, to: NodeId) {
        self.nodes[from.index()] = Node::Simple {
            out: Link::new(edge, to),
        };
        self.incomplete.remove(&from);
    }
}

fn branch_target(offset: usize, next: usize, displacement: i16) -> Option<usize> {
    let target = next.checked_add_signed(isize::from(displacement));
    if target.is_none() {
        warn!(
            offset,
            displacement, "branch target outside the addressable range, path ends"
        );
    }
    target
}
