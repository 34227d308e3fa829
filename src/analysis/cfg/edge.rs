//! Control flow edge types for the CFG.
//!
//! Edges are immutable values. Changing what a transition means replaces the edge on its
//! node, it never mutates the edge in place.

use strum::IntoStaticStr;

use crate::{
    action::Action,
    analysis::cfg::{Cfg, PartialExpr},
    utils::graph::NodeId,
};

/// A semantic annotation carried by a [`Edge::Marker`] edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    /// A variable is defined at this point.
    VariableDefinition {
        /// Name of the defined variable
        name: String,
    },
}

/// The transition between two CFG nodes.
#[derive(Debug, Clone, PartialEq, IntoStaticStr)]
pub enum Edge {
    /// Fallthrough without effect.
    Simple,
    /// A raw action, not yet converted.
    Action(Action),
    /// A partially applied expression.
    Expression(PartialExpr),
    /// The arm of an `If` node taken when the test holds.
    IfTrue,
    /// The arm of an `If` node taken otherwise.
    IfFalse,
    /// The transition from the node producing the test to its `If` node.
    IfTest,
    /// A recovered `if/else`, consuming the test from the operand stack.
    ///
    /// Both arms are linear sub-graphs.
    Conditional {
        /// Arm executed when the test holds
        if_true: Cfg,
        /// Arm executed otherwise
        if_false: Cfg,
    },
    /// An annotation without data movement.
    Marker(Marker),
    /// Placeholder for a nested sub-routine.
    Sub,
}

impl Edge {
    /// Returns the variant tag of this edge.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// Returns `true` if traversing this edge has no effect on the program state.
    #[must_use]
    pub const fn is_transparent(&self) -> bool {
        matches!(
            self,
            Edge::Simple | Edge::IfTrue | Edge::IfFalse | Edge::IfTest | Edge::Marker(_)
        )
    }
}

/// An outgoing edge stored on a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    /// The transition
    pub edge: Edge,
    /// Destination node
    pub to: NodeId,
}

impl Link {
    /// Creates a new link.
    #[must_use]
    pub const fn new(edge: Edge, to: NodeId) -> Self {
        Link { edge, to }
    }
}

/// An edge together with both of its endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundEdge<'a> {
    /// Source node
    pub from: NodeId,
    /// Destination node
    pub to: NodeId,
    /// The transition
    pub edge: &'a Edge,
}
