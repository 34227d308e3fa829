//! Constant pool tracking.
//!
//! `Push` actions reference strings through indices into the constant pool defined by the
//! last `ConstantPool` action executed. This analysis computes which pools can be active at
//! each node, and [`reduce_constant_pool`] inlines the strings wherever exactly one pool is
//! possible.

use std::collections::BTreeSet;

use crate::{
    action::{Action, Value},
    analysis::{
        cfg::{Cfg, Edge, Node},
        dataflow::{DataFlowAnalysis, DataFlowSolver, JoinSemiLattice},
    },
    utils::graph::NodeId,
    Result,
};

/// The constant pools that can be active at a program point.
///
/// Ordered as `Uninitialized ⊑ Set ⊑ Any`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CpState {
    /// Any pool, including none. Nothing is known.
    Any,
    /// Not reached yet.
    Uninitialized,
    /// One of these pools, depending on the path taken.
    Set(BTreeSet<Vec<String>>),
}

impl CpState {
    /// Creates the state where exactly `pool` is active.
    #[must_use]
    pub fn singleton(pool: Vec<String>) -> Self {
        CpState::Set(BTreeSet::from([pool]))
    }

    /// Returns the active pool if it is known exactly.
    #[must_use]
    pub fn single_pool(&self) -> Option<&[String]> {
        match self {
            CpState::Set(pools) if pools.len() == 1 => pools.first().map(Vec::as_slice),
            _ => None,
        }
    }
}

impl JoinSemiLattice for CpState {
    fn join(&self, other: &Self) -> Self {
        match (self, other) {
            (CpState::Any, _) | (_, CpState::Any) => CpState::Any,
            (CpState::Uninitialized, state) | (state, CpState::Uninitialized) => state.clone(),
            (CpState::Set(left), CpState::Set(right)) => {
                CpState::Set(left.union(right).cloned().collect())
            }
        }
    }

    fn is_top(&self) -> bool {
        matches!(self, CpState::Any)
    }
}

/// Forward analysis computing the [`CpState`] of every node.
///
/// A `ConstantPool` action sets the state to its pool. Conditional plumbing edges pass the
/// state through. In strict mode any other action is assumed to clobber the pool; otherwise
/// actions other than `ConstantPool` pass the state through. All remaining edge kinds reset
/// the state to [`CpState::Any`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantPoolAnalysis {
    strict: bool,
}

impl ConstantPoolAnalysis {
    /// Creates the analysis.
    #[must_use]
    pub const fn new(strict: bool) -> Self {
        ConstantPoolAnalysis { strict }
    }
}

impl DataFlowAnalysis for ConstantPoolAnalysis {
    type Lattice = CpState;

    fn initialize(&self, _cfg: &Cfg, _node: NodeId) -> CpState {
        CpState::Uninitialized
    }

    fn boundary(&self) -> CpState {
        CpState::Any
    }

    fn transfer(&self, edge: &Edge, input: &CpState) -> CpState {
        match edge {
            Edge::Action(Action::ConstantPool { pool }) => CpState::singleton(pool.clone()),
            Edge::Action(_) if self.strict => CpState::Any,
            Edge::Action(_) | Edge::Simple | Edge::IfTrue | Edge::IfFalse | Edge::IfTest => {
                input.clone()
            }
            _ => CpState::Any,
        }
    }
}

/// Inlines constant pool references where the active pool is known.
///
/// For every `Simple` node whose state is a single pool, `Push` values referencing the pool
/// are replaced by the string they name, or by `undefined` for indices past the end of the
/// pool. The rewritten edge keeps its destination.
///
/// Returns `true` if an edge was replaced.
///
/// # Errors
///
/// Propagates failures of [`Cfg::replace_out_edge`], which indicate a broken graph.
pub fn reduce_constant_pool(cfg: &mut Cfg, strict: bool) -> Result<bool> {
    let results = DataFlowSolver::new(ConstantPoolAnalysis::new(strict)).solve(cfg);

    let mut replacements = Vec::new();
    for node in cfg.iter_nodes(Default::default()) {
        let Some(Node::Simple { out }) = cfg.node(node) else {
            continue;
        };
        let Some(pool) = results.state(node).and_then(CpState::single_pool) else {
            continue;
        };
        if let Some(action) = inline_pool(&out.edge, pool) {
            replacements.push((node, Edge::Action(action)));
        }
    }

    let changed = !replacements.is_empty();
    for (node, edge) in replacements {
        cfg.replace_out_edge(node, vec![edge])?;
    }
    Ok(changed)
}

fn inline_pool(edge: &Edge, pool: &[String]) -> Option<Action> {
    let Edge::Action(Action::Push { values }) = edge else {
        return None;
    };
    if !values.iter().any(|value| matches!(value, Value::Constant(_))) {
        return None;
    }

    let values = values
        .iter()
        .map(|value| match value {
            Value::Constant(index) => pool
                .get(usize::from(*index))
                .map_or(Value::Undefined, |s| Value::String(s.clone())),
            other => other.clone(),
        })
        .collect();
    Some(Action::Push { values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        action::ActionList,
        analysis::cfg::{build_linear, CfgBuilder, TraversalOrder},
    };

    fn pool(entries: &[&str]) -> Vec<String> {
        entries.iter().map(ToString::to_string).collect()
    }

    fn push_constants(indices: &[u16]) -> Action {
        Action::Push {
            values: indices.iter().copied().map(Value::Constant).collect(),
        }
    }

    fn pushed_values(cfg: &Cfg) -> Vec<Vec<Value>> {
        cfg.iter_edges()
            .into_iter()
            .filter_map(|e| match e.edge {
                Edge::Action(Action::Push { values }) => Some(values.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_join() {
        let a = CpState::singleton(pool(&["a"]));
        let b = CpState::singleton(pool(&["b"]));

        assert_eq!(CpState::Uninitialized.join(&CpState::Uninitialized), CpState::Uninitialized);
        assert_eq!(a.join(&CpState::Uninitialized), a);
        assert_eq!(a.join(&a), a);
        assert_eq!(b.join(&CpState::Any), CpState::Any);

        let both = a.join(&b);
        assert_eq!(both, b.join(&a));
        assert!(matches!(&both, CpState::Set(pools) if pools.len() == 2));
        assert_eq!(both.single_pool(), None);
    }

    #[test]
    fn test_join_of_nothing_is_any() {
        let analysis = ConstantPoolAnalysis::new(false);
        assert_eq!(analysis.join(&[]), CpState::Any);
        assert_eq!(
            analysis.join(&[CpState::Uninitialized]),
            CpState::Uninitialized
        );
    }

    #[test]
    fn test_transfer() {
        let lenient = ConstantPoolAnalysis::new(false);
        let strict = ConstantPoolAnalysis::new(true);
        let state = CpState::singleton(pool(&["a"]));
        let define = Edge::Action(Action::ConstantPool { pool: pool(&["b"]) });

        assert_eq!(lenient.transfer(&define, &CpState::Any), CpState::singleton(pool(&["b"])));
        assert_eq!(lenient.transfer(&Edge::Action(Action::Trace), &state), state);
        assert_eq!(strict.transfer(&Edge::Action(Action::Trace), &state), CpState::Any);
        assert_eq!(strict.transfer(&Edge::IfTest, &state), state);
        assert_eq!(lenient.transfer(&Edge::Sub, &state), CpState::Any);
    }

    #[test]
    fn test_reduce_linear() {
        let mut cfg = build_linear(vec![
            Edge::Action(Action::ConstantPool {
                pool: pool(&["x", "y"]),
            }),
            Edge::Action(push_constants(&[1, 0, 7])),
            Edge::Action(Action::Trace),
        ]);

        assert!(reduce_constant_pool(&mut cfg, false).unwrap());
        assert_eq!(
            pushed_values(&cfg),
            vec![vec![
                Value::String("y".into()),
                Value::String("x".into()),
                Value::Undefined,
            ]]
        );
        assert!(!reduce_constant_pool(&mut cfg, false).unwrap());
    }

    #[test]
    fn test_reduce_strict_blocks_after_unknown_action() {
        let edges = vec![
            Edge::Action(Action::ConstantPool { pool: pool(&["x"]) }),
            Edge::Action(Action::Play),
            Edge::Action(push_constants(&[0])),
        ];

        let mut strict = build_linear(edges.clone());
        assert!(!reduce_constant_pool(&mut strict, true).unwrap());

        let mut lenient = build_linear(edges);
        assert!(reduce_constant_pool(&mut lenient, false).unwrap());
        assert_eq!(pushed_values(&lenient), vec![vec![Value::String("x".into())]]);
    }

    #[test]
    fn test_reduce_without_pool_is_noop() {
        let mut cfg = build_linear(vec![Edge::Action(push_constants(&[0]))]);
        assert!(!reduce_constant_pool(&mut cfg, false).unwrap());
    }

    #[test]
    fn test_conflicting_pools_at_join() {
        // push true; if L1; pool [a]; jump L2; L1: pool [b]; L2: push c0
        let mut actions = ActionList::new(vec![
            Action::Push {
                values: vec![Value::Boolean(true)],
            },
            Action::If { offset: 0 },
            Action::ConstantPool { pool: pool(&["a"]) },
            Action::Jump { offset: 0 },
            Action::ConstantPool { pool: pool(&["b"]) },
            push_constants(&[0]),
        ]);
        actions.link_branch(1, 4).unwrap();
        actions.link_branch(3, 5).unwrap();
        let mut cfg = CfgBuilder::build(&actions).unwrap();

        let results = DataFlowSolver::new(ConstantPoolAnalysis::new(false)).solve(&cfg);
        let join = cfg
            .iter_nodes(TraversalOrder::default())
            .into_iter()
            .find(|&n| cfg.in_degree(n) == 2)
            .unwrap();
        assert!(matches!(results.state(join), Some(CpState::Set(pools)) if pools.len() == 2));
        assert!(results.passes() >= 2);

        assert!(!reduce_constant_pool(&mut cfg, false).unwrap());
    }
}
