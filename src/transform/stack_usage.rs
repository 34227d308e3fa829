//! Operand stack tracking over a decompiled script.
//!
//! The decompiler emits explicit `OpPush` statements and `OpPop` expressions wherever it
//! could not fold stack traffic into expressions. This analysis follows the stack through the
//! script in evaluation order and pairs every pop with the push it consumes, when that push is
//! visible.

use std::rc::Rc;

use crate::{
    transform::analyzer::{AnalysisMap, InputOutputAnalyzer, TransferRule},
    tree::{NodeKind, Tree},
    utils::graph::NodeId,
    Result,
};

/// The operand stack at a program point, as a persistent list of frames.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StackState {
    /// Start of the analyzed region
    #[default]
    Bottom,
    /// A value pushed by the `OpPush` node on top of the rest
    Push(NodeId, Rc<StackState>),
    /// A value consumed by the `OpPop` node that no visible push produced
    Pop(NodeId, Rc<StackState>),
    /// A node with an unknown stack effect. Pops after it never match pushes below it.
    StackCall(NodeId, Rc<StackState>),
}

impl StackState {
    /// Returns the state below the top frame, or `None` at the bottom.
    #[must_use]
    pub fn rest(&self) -> Option<&StackState> {
        match self {
            StackState::Bottom => None,
            StackState::Push(_, rest) | StackState::Pop(_, rest) | StackState::StackCall(_, rest) => {
                Some(rest)
            }
        }
    }

    /// Returns the push on top of the stack, if the top frame is a push.
    #[must_use]
    pub fn top_push(&self) -> Option<NodeId> {
        match self {
            StackState::Push(node, _) => Some(*node),
            _ => None,
        }
    }

    /// Returns every push still present anywhere in this state, top first.
    #[must_use]
    pub fn pushes(&self) -> Vec<NodeId> {
        let mut pushes = Vec::new();
        let mut current = Some(self);
        while let Some(state) = current {
            if let Some(push) = state.top_push() {
                pushes.push(push);
            }
            current = state.rest();
        }
        pushes
    }
}

/// Transfer rule tracking the operand stack.
///
/// - `OpPush` evaluates its value, then pushes a frame.
/// - `OpPop` consumes a push frame on top, or records an unmatched pop.
/// - `OpStackCall`, `OpInitArray` and `OpInitObject` consume a dynamic number of values and
///   leave a [`StackState::StackCall`] barrier.
/// - `IfStatement` evaluates its test, then runs both arms from a barrier. The state after
///   the statement is that barrier, so values pushed inside an arm are never paired with
///   pops after the statement.
pub struct StackUsage;

impl TransferRule<StackState> for StackUsage {
    fn transfer(
        analyzer: &mut InputOutputAnalyzer<'_, StackState, Self>,
        node: NodeId,
        input: StackState,
    ) -> Result<StackState> {
        let tree = analyzer.tree();
        match tree.kind(node)? {
            NodeKind::OpPush => {
                let below = analyzer.pass_through(node, input)?;
                Ok(StackState::Push(node, Rc::new(below)))
            }
            NodeKind::OpPop => Ok(match input {
                StackState::Push(_, rest) => Rc::unwrap_or_clone(rest),
                other => StackState::Pop(node, Rc::new(other)),
            }),
            NodeKind::OpStackCall | NodeKind::OpInitArray | NodeKind::OpInitObject => {
                let consumed = analyzer.pass_through(node, input)?;
                Ok(StackState::StackCall(node, Rc::new(consumed)))
            }
            NodeKind::IfStatement => {
                let children = tree.children(node)?;
                let Some((&test, arms)) = children.split_first() else {
                    return Err(invariant_error!("If statement {} has no test", node));
                };
                let tested = analyzer.transfer(test, input)?;
                let barrier = StackState::StackCall(node, Rc::new(tested));
                for &arm in arms {
                    analyzer.transfer(arm, barrier.clone())?;
                }
                Ok(barrier)
            }
            _ => analyzer.pass_through(node, input),
        }
    }
}

/// Computes the stack state before and after every node of the script.
///
/// # Errors
///
/// Returns [`crate::Error::Unsupported`] for node kinds the analysis has no rule for.
pub fn analyze_stack_usage(tree: &Tree) -> Result<AnalysisMap<StackState>> {
    InputOutputAnalyzer::<StackState, StackUsage>::analyze(tree, tree.root(), StackState::Bottom)
}
