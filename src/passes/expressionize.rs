//! Conversion of pure actions to partial expressions.

use crate::{
    action::Action,
    analysis::{Cfg, Edge, Node, PartialExpr, TraversalOrder},
    ast::{BinaryOperator, Expression, UnaryOperator},
    passes::CfgPass,
    Result,
};

/// Replaces actions that have a pure expression equivalent by [`Edge::Expression`] edges.
///
/// | Action            | Expression                      | Inputs | Void |
/// |-------------------|---------------------------------|--------|------|
/// | `Not`             | `!Input0`                       | 1      | no   |
/// | `Push v0..vn`     | one edge per value              | 0      | no   |
/// | `Trace`           | `trace(Input0)`                 | 1      | yes  |
/// | binary operators  | `Input0 op Input1`              | 2      | no   |
///
/// Other actions are left untouched for the action decompiler.
#[derive(Debug, Clone)]
pub struct ExpressionizePass {
    trace_name: String,
}

impl ExpressionizePass {
    /// Creates the pass, naming the print builtin `trace_name`.
    pub fn new(trace_name: impl Into<String>) -> Self {
        ExpressionizePass {
            trace_name: trace_name.into(),
        }
    }

    fn expressionize(&self, action: &Action) -> Option<Vec<Edge>> {
        let partial = match action {
            Action::Not => PartialExpr::new(
                1,
                Expression::unary(UnaryOperator::LogicalNot, Expression::input(0)),
                false,
            ),
            Action::Push { values } => {
                return Some(
                    values
                        .iter()
                        .map(|value| Edge::Expression(PartialExpr::value(Expression::from_value(value))))
                        .collect(),
                );
            }
            Action::Trace => PartialExpr::new(
                1,
                Expression::call(
                    Expression::identifier(self.trace_name.as_str()),
                    vec![Expression::input(0)],
                ),
                true,
            ),
            other => {
                let operator = BinaryOperator::from_action(other)?;
                PartialExpr::new(
                    2,
                    Expression::binary(operator, Expression::input(0), Expression::input(1)),
                    false,
                )
            }
        };
        Some(vec![Edge::Expression(partial)])
    }
}

impl Default for ExpressionizePass {
    fn default() -> Self {
        ExpressionizePass::new("trace")
    }
}

impl CfgPass for ExpressionizePass {
    fn name(&self) -> &'static str {
        "expressionize"
    }

    fn run(&self, cfg: &mut Cfg) -> Result<bool> {
        let mut replacements = Vec::new();
        for node in cfg.iter_nodes(TraversalOrder::ReversePostorder) {
            let Some(Node::Simple { out }) = cfg.node(node) else {
                continue;
            };
            if let Edge::Action(action) = &out.edge {
                if let Some(edges) = self.expressionize(action) {
                    replacements.push((node, edges));
                }
            }
        }

        let changed = !replacements.is_empty();
        for (node, edges) in replacements {
            cfg.replace_out_edge(node, edges)?;
        }
        Ok(changed)
    }

    fn description(&self) -> &'static str {
        "Converts logical not, push, trace and binary operator actions to partial expressions"
    }
}
