//! Iterative data flow solver.
//!
//! # Algorithm
//!
//! 1. Initialize every reachable node with [`DataFlowAnalysis::initialize`]
//! 2. Visit all nodes in reverse postorder. For each node, transfer the state of every
//!    predecessor across its in-edge and join the results
//! 3. Store the joined state if it differs from the previous one
//! 4. Repeat full passes until a pass makes no change
//!
//! The solver runs full passes rather than a worklist, so the result only depends on the
//! analysis functions and the node order, never on scheduling.

use tracing::trace;

use crate::analysis::{
    cfg::{Cfg, TraversalOrder},
    dataflow::framework::{AnalysisResults, DataFlowAnalysis},
};

/// Fixpoint solver for forward data flow analyses.
///
/// # Usage
///
/// ```rust
/// use avm1_decompiler::action::{Action, ActionList};
/// use avm1_decompiler::analysis::{dataflow::{ConstantPoolAnalysis, CpState, DataFlowSolver}, CfgBuilder};
///
/// let actions = ActionList::new(vec![Action::ConstantPool { pool: vec!["x".into()] }, Action::Trace]);
/// let cfg = CfgBuilder::build(&actions)?;
///
/// let results = DataFlowSolver::new(ConstantPoolAnalysis::new(false)).solve(&cfg);
/// assert_eq!(results.state(cfg.source()), Some(&CpState::Any));
/// # Ok::<(), avm1_decompiler::Error>(())
/// ```
pub struct DataFlowSolver<A: DataFlowAnalysis> {
    analysis: A,
}

impl<A: DataFlowAnalysis> DataFlowSolver<A> {
    /// Creates a new solver for the given analysis.
    #[must_use]
    pub fn new(analysis: A) -> Self {
        Self { analysis }
    }

    /// Solves the analysis to a fixpoint.
    pub fn solve(self, cfg: &Cfg) -> AnalysisResults<A::Lattice> {
        let order = cfg.iter_nodes(TraversalOrder::ReversePostorder);

        let mut states: Vec<Option<A::Lattice>> = vec![None; cfg.node_count()];
        for &node in &order {
            states[node.index()] = Some(self.analysis.initialize(cfg, node));
        }

        let mut passes = 0;
        let mut changed = true;
        while changed {
            changed = false;
            passes += 1;

            for &node in &order {
                let inputs: Vec<A::Lattice> = cfg
                    .in_edges(node)
                    .filter_map(|edge| {
                        states[edge.from.index()]
                            .as_ref()
                            .map(|state| self.analysis.transfer(edge.edge, state))
                    })
                    .collect();
                let joined = self.analysis.join(&inputs);

                let unchanged = states[node.index()]
                    .as_ref()
                    .is_some_and(|old| self.analysis.equals(&joined, old));
                if !unchanged {
                    states[node.index()] = Some(joined);
                    changed = true;
                }
            }

            trace!(pass = passes, changed, "data flow pass");
        }

        AnalysisResults::new(states, passes)
    }
}
