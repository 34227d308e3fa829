//! Merging of expressions along straight-line code.

use crate::{
    analysis::{Cfg, Edge, Node},
    passes::CfgPass,
    utils::graph::NodeId,
    Result,
};

/// Merges adjacent edges of exclusively owned chains of `Simple` nodes.
///
/// A chain starts at any `Simple` node and extends while the next node is `Simple`, has a
/// single predecessor, is not the source and was not seen before. Within a chain:
///
/// - [`Edge::Simple`] collapses into its neighbour,
/// - two [`Edge::Expression`] edges merge through [`PartialExpr::merge`] when the first one
///   produces the value consumed by the second.
///
/// Merged results are retried against the previous output edge, so
/// `push 1; push 2; add; trace` folds to a single `trace(1 + 2)` in one run.
///
/// [`PartialExpr::merge`]: crate::analysis::PartialExpr::merge
#[derive(Debug, Clone, Copy, Default)]
pub struct ReduceChainsPass;

impl ReduceChainsPass {
    /// Creates the pass.
    #[must_use]
    pub const fn new() -> Self {
        ReduceChainsPass
    }
}

impl CfgPass for ReduceChainsPass {
    fn name(&self) -> &'static str {
        "reduce-chains"
    }

    fn run(&self, cfg: &mut Cfg) -> Result<bool> {
        let mut replacements = Vec::new();
        for chain in iter_chains(cfg) {
            let edges = chain
                .iter()
                .filter_map(|&node| cfg.node(node).and_then(Node::simple_out))
                .map(|link| &link.edge);
            if let Some(reduced) = reduce_chain(edges) {
                replacements.push((chain, reduced));
            }
        }

        let changed = !replacements.is_empty();
        for (chain, edges) in replacements {
            cfg.replace_chain(&chain, edges)?;
        }
        Ok(changed)
    }

    fn description(&self) -> &'static str {
        "Merges partial expressions along chains of single-predecessor nodes"
    }
}

/// Returns the maximal chains of `Simple` nodes in depth-first order.
///
/// Every reachable node belongs to at most one chain. Chains are disjoint, so they can be
/// replaced one after the other.
pub(crate) fn iter_chains(cfg: &Cfg) -> Vec<Vec<NodeId>> {
    let mut chains = Vec::new();
    let mut visited = vec![false; cfg.node_count()];
    let mut stack = vec![cfg.source()];

    while let Some(start) = stack.pop() {
        if std::mem::replace(&mut visited[start.index()], true) {
            continue;
        }

        let mut last = start;
        if let Some(mut out) = cfg.node(start).and_then(Node::simple_out) {
            let mut chain = vec![start];
            loop {
                let next = out.to;
                if next == cfg.source() || cfg.in_degree(next) != 1 || visited[next.index()] {
                    break;
                }
                let Some(next_out) = cfg.node(next).and_then(Node::simple_out) else {
                    break;
                };
                visited[next.index()] = true;
                chain.push(next);
                last = next;
                out = next_out;
            }
            chains.push(chain);
        }

        for link in cfg.node(last).into_iter().flat_map(Node::links) {
            if !visited[link.to.index()] {
                stack.push(link.to);
            }
        }
    }
    chains
}

/// Returns the reduced edges of a chain, or `None` if nothing could be merged.
fn reduce_chain<'a>(edges: impl IntoIterator<Item = &'a Edge>) -> Option<Vec<Edge>> {
    let mut reduced: Vec<Edge> = Vec::new();
    let mut changed = false;

    for edge in edges {
        let mut current = edge.clone();
        while let Some(merged) = reduced.last().and_then(|prev| merge_edges(prev, &current)) {
            reduced.pop();
            current = merged;
            changed = true;
        }
        reduced.push(current);
    }

    changed.then_some(reduced)
}

fn merge_edges(first: &Edge, second: &Edge) -> Option<Edge> {
    match (first, second) {
        (Edge::Simple, other) | (other, Edge::Simple) => Some(other.clone()),
        (Edge::Expression(first), Edge::Expression(second)) => {
            first.merge(second).map(Edge::Expression)
        }
        _ => None,
    }
}
