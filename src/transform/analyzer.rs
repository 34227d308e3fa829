//! Single-pass input/output analysis over a [`Tree`].
//!
//! Unlike the CFG [`DataFlowSolver`](crate::analysis::dataflow::DataFlowSolver), this walks the
//! tree once in evaluation order: every node receives the state produced by the node evaluated
//! before it and hands its own output to the next one. The result records, for each visited
//! node, the state before and after its evaluation.

use std::{collections::BTreeMap, marker::PhantomData};

use crate::{
    tree::{NodeKind, Tree},
    utils::graph::NodeId,
    Error, Result,
};

/// States before and after the evaluation of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputOutput<T> {
    /// State before the node is evaluated
    pub input: T,
    /// State after the node is evaluated
    pub output: T,
}

/// Per-node results of an [`InputOutputAnalyzer`] run.
pub type AnalysisMap<T> = BTreeMap<NodeId, InputOutput<T>>;

/// Transfer function of an input/output analysis.
///
/// Implementations handle the node kinds they care about and delegate everything else to
/// [`InputOutputAnalyzer::pass_through`].
pub trait TransferRule<T>: Sized {
    /// Computes the output state of `node` from its input state.
    ///
    /// Children are evaluated through [`InputOutputAnalyzer::transfer`] so their states are
    /// recorded as well.
    ///
    /// # Errors
    ///
    /// Returns an error if `node` cannot be analyzed.
    fn transfer(
        analyzer: &mut InputOutputAnalyzer<'_, T, Self>,
        node: NodeId,
        input: T,
    ) -> Result<T>;
}

/// Drives a [`TransferRule`] over a tree and records the state of every node.
pub struct InputOutputAnalyzer<'t, T, R> {
    tree: &'t Tree,
    analysis: AnalysisMap<T>,
    rule: PhantomData<R>,
}

impl<'t, T: Clone, R: TransferRule<T>> InputOutputAnalyzer<'t, T, R> {
    /// Analyzes the subtree rooted at `start`, starting from `input`.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the transfer rule.
    pub fn analyze(tree: &'t Tree, start: NodeId, input: T) -> Result<AnalysisMap<T>> {
        let mut analyzer = InputOutputAnalyzer::<T, R> {
            tree,
            analysis: BTreeMap::new(),
            rule: PhantomData,
        };
        analyzer.transfer(start, input)?;
        Ok(analyzer.analysis)
    }

    /// Returns the analyzed tree.
    #[must_use]
    pub const fn tree(&self) -> &'t Tree {
        self.tree
    }

    /// Evaluates `node` with the transfer rule and records its states.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by the transfer rule.
    pub fn transfer(&mut self, node: NodeId, input: T) -> Result<T> {
        let output = R::transfer(self, node, input.clone())?;
        self.analysis.insert(
            node,
            InputOutput {
                input,
                output: output.clone(),
            },
        );
        Ok(output)
    }

    /// Evaluates the children of `node` in order, threading the state through them.
    ///
    /// Every node kind is listed explicitly. Leaves return their input unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] for branching nodes, whose children do not run in
    /// sequence and need a dedicated rule.
    pub fn pass_through(&mut self, node: NodeId, input: T) -> Result<T> {
        let tree = self.tree;
        let kind = tree.kind(node)?;
        match kind {
            NodeKind::Script
            | NodeKind::BlockStatement
            | NodeKind::ExpressionStatement
            | NodeKind::ReturnStatement
            | NodeKind::ThrowStatement
            | NodeKind::SetVariable
            | NodeKind::OpDeclareVariable
            | NodeKind::OpPush
            | NodeKind::OpTrace
            | NodeKind::OpStackCall
            | NodeKind::UnaryExpression { .. }
            | NodeKind::BinaryExpression { .. }
            | NodeKind::AssignmentExpression { .. }
            | NodeKind::MemberExpression
            | NodeKind::CallExpression
            | NodeKind::SequenceExpression
            | NodeKind::OpVariable
            | NodeKind::OpPropertyName
            | NodeKind::OpInitArray
            | NodeKind::OpInitObject
            | NodeKind::MemberPattern => {
                let mut state = input;
                for &child in tree.children(node)? {
                    state = self.transfer(child, state)?;
                }
                Ok(state)
            }
            NodeKind::EmptyStatement
            | NodeKind::OpConstantPool { .. }
            | NodeKind::Identifier { .. }
            | NodeKind::BooleanLiteral { .. }
            | NodeKind::NumberLiteral { .. }
            | NodeKind::StringLiteral { .. }
            | NodeKind::NullLiteral
            | NodeKind::OpConstant { .. }
            | NodeKind::OpRegister { .. }
            | NodeKind::OpTemporary { .. }
            | NodeKind::OpGlobal
            | NodeKind::OpPop
            | NodeKind::OpUndefined
            | NodeKind::Input { .. }
            | NodeKind::IdentifierPattern { .. }
            | NodeKind::OpRegisterPattern { .. }
            | NodeKind::OpTemporaryPattern { .. } => Ok(input),
            NodeKind::IfStatement
            | NodeKind::LogicalExpression { .. }
            | NodeKind::ConditionalExpression => Err(Error::Unsupported { kind: kind.name() }),
        }
    }
}
