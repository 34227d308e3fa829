//! Data flow analysis framework trait and results.
//!
//! Any specific analysis implements the [`DataFlowAnalysis`] trait to work with the
//! [`DataFlowSolver`](crate::analysis::dataflow::DataFlowSolver).

use crate::{
    analysis::{
        cfg::{Cfg, Edge},
        dataflow::lattice::JoinSemiLattice,
    },
    utils::graph::NodeId,
};

/// A forward data flow analysis over a [`Cfg`].
///
/// The state of a node describes the program right before its out-edges execute. It is
/// computed from the states of its predecessors: each in-edge transforms the state of its
/// source node with [`transfer`](Self::transfer), and the results are combined with
/// [`join`](Self::join).
///
/// # Example
///
/// ```rust,ignore
/// use avm1_decompiler::analysis::{cfg::{Cfg, Edge}, dataflow::DataFlowAnalysis};
///
/// struct Reached;
///
/// impl DataFlowAnalysis for Reached {
///     type Lattice = MyFlag;
///
///     fn initialize(&self, _cfg: &Cfg, _node: NodeId) -> MyFlag {
///         MyFlag::No
///     }
///
///     fn boundary(&self) -> MyFlag {
///         MyFlag::Yes
///     }
///
///     fn transfer(&self, _edge: &Edge, input: &MyFlag) -> MyFlag {
///         input.clone()
///     }
/// }
/// ```
pub trait DataFlowAnalysis {
    /// The abstract state at each node.
    type Lattice: JoinSemiLattice;

    /// Returns the state of `node` before the first pass.
    fn initialize(&self, cfg: &Cfg, node: NodeId) -> Self::Lattice;

    /// Returns the state of nodes without in-edges, such as the CFG source.
    fn boundary(&self) -> Self::Lattice;

    /// Computes the state after `edge` given the state before it.
    fn transfer(&self, edge: &Edge, input: &Self::Lattice) -> Self::Lattice;

    /// Combines the states flowing into a node.
    ///
    /// The default implementation returns the [`boundary`](Self::boundary) for an empty
    /// list and folds the lattice join otherwise.
    fn join(&self, states: &[Self::Lattice]) -> Self::Lattice {
        match states.split_first() {
            None => self.boundary(),
            Some((first, rest)) => rest
                .iter()
                .fold(first.clone(), |acc, state| acc.join(state)),
        }
    }

    /// Compares two states for the fixpoint test.
    fn equals(&self, left: &Self::Lattice, right: &Self::Lattice) -> bool {
        left == right
    }
}

/// Results of a data flow analysis.
///
/// Provides the state computed for every node reachable from the CFG source.
#[derive(Debug, Clone)]
pub struct AnalysisResults<L> {
    states: Vec<Option<L>>,
    passes: usize,
}

impl<L> AnalysisResults<L> {
    /// Creates results from per-node states indexed by [`NodeId`].
    #[must_use]
    pub fn new(states: Vec<Option<L>>, passes: usize) -> Self {
        Self { states, passes }
    }

    /// Returns the state of `node`, or `None` if it was not reachable.
    #[must_use]
    pub fn state(&self, node: NodeId) -> Option<&L> {
        self.states.get(node.index()).and_then(Option::as_ref)
    }

    /// Returns the number of full passes the solver needed, including the final pass that
    /// observed no change.
    #[must_use]
    pub const fn passes(&self) -> usize {
        self.passes
    }
}
