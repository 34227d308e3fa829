//! Recovery of `if/else` diamonds.

use crate::{
    analysis::{build_linear, Cfg, Edge, Node, TraversalOrder},
    passes::CfgPass,
    utils::graph::NodeId,
    Result,
};

/// Collapses `IfTest → If → {true arm, false arm} → join` regions into a single
/// [`Edge::Conditional`].
///
/// Both arms are followed through exclusively owned `Simple` nodes until they meet. Regions
/// whose arms go through a shared node or never meet are left as unstructured `If` nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReduceConditionalsPass;

impl ReduceConditionalsPass {
    /// Creates the pass.
    #[must_use]
    pub const fn new() -> Self {
        ReduceConditionalsPass
    }
}

impl CfgPass for ReduceConditionalsPass {
    fn name(&self) -> &'static str {
        "reduce-conditionals"
    }

    fn run(&self, cfg: &mut Cfg) -> Result<bool> {
        let conditionals = find_conditionals(cfg)?;
        let changed = !conditionals.is_empty();
        for conditional in conditionals {
            cfg.replace_interval(conditional.src, conditional.dest, vec![conditional.edge])?;
        }
        Ok(changed)
    }

    fn description(&self) -> &'static str {
        "Recovers if/else statements from branch-and-merge regions"
    }
}

struct Conditional {
    src: NodeId,
    dest: NodeId,
    edge: Edge,
}

enum Check {
    NoMatch,
    ResumeAt(usize),
    Found(Conditional),
}

#[derive(Clone, Copy)]
enum Arm {
    True,
    False,
}

fn find_conditionals(cfg: &Cfg) -> Result<Vec<Conditional>> {
    let nodes = cfg.iter_nodes(TraversalOrder::ReversePostorder);
    let mut found = Vec::new();
    let mut i = 0;
    while i < nodes.len() {
        i = match check_conditional(cfg, &nodes, i)? {
            Check::NoMatch => i + 1,
            Check::ResumeAt(next) => next,
            Check::Found(conditional) => {
                let dest = nodes
                    .iter()
                    .position(|&n| n == conditional.dest)
                    .unwrap_or(nodes.len());
                found.push(conditional);
                dest.max(i + 1)
            }
        };
    }
    Ok(found)
}

fn check_conditional(cfg: &Cfg, nodes: &[NodeId], start: usize) -> Result<Check> {
    let src = nodes[start];
    let if_node = match cfg.node(src).and_then(Node::simple_out) {
        Some(out) if matches!(out.edge, Edge::IfTest) => out.to,
        _ => return Ok(Check::NoMatch),
    };

    let Some(Node::If {
        out_true,
        out_false,
    }) = cfg.node(if_node)
    else {
        return Err(invariant_error!("IfTest edge from {} not followed by an If node", src));
    };
    if cfg.in_degree(if_node) != 1 {
        return Err(invariant_error!(
            "If node {} has in-degree {}",
            if_node,
            cfg.in_degree(if_node)
        ));
    }
    if nodes.get(start + 1) != Some(&if_node) {
        return Ok(Check::ResumeAt(start + 1));
    }

    let mut true_chain = Vec::new();
    let mut false_chain = Vec::new();
    let mut true_head = if_node;
    let mut false_head = if_node;

    for (j, &node) in nodes.iter().enumerate().skip(start + 2) {
        for edge in cfg.in_edges(node) {
            let arm = if edge.from == if_node {
                if edge.to == out_false.to {
                    Arm::False
                } else if edge.to == out_true.to {
                    Arm::True
                } else {
                    return Ok(Check::ResumeAt(j));
                }
            } else if !matches!(cfg.node(edge.from), Some(Node::Simple { .. })) {
                return Ok(Check::ResumeAt(j));
            } else if edge.from == false_head {
                Arm::False
            } else if edge.from == true_head {
                Arm::True
            } else {
                return Ok(Check::ResumeAt(j));
            };

            let (head, chain) = match arm {
                Arm::True => (&mut true_head, &mut true_chain),
                Arm::False => (&mut false_head, &mut false_chain),
            };
            if cfg.in_degree(*head) != 1 {
                return Ok(Check::ResumeAt(j));
            }
            chain.push(edge.edge.clone());
            *head = edge.to;

            if true_head == false_head {
                return Ok(Check::Found(Conditional {
                    src,
                    dest: true_head,
                    edge: Edge::Conditional {
                        if_true: build_linear(true_chain),
                        if_false: build_linear(false_chain),
                    },
                }));
            }
        }
    }
    Ok(Check::ResumeAt(nodes.len()))
}
