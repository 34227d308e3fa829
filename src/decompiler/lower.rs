//! Lowering of a reduced CFG to statements.

use crate::{
    analysis::{Cfg, Edge, Node, PartialExpr},
    ast::{Expression, Script, Statement},
    decompiler::{action::decompile_action, OpAs2Emitter, ScopeContext},
    Error, Result,
};

/// Lowers a reduced CFG to a script, walking `Simple` nodes from the source.
///
/// - `Action` edges go through the action recipes.
/// - `Expression` edges pop one temporary per input, top of stack first, and substitute them
///   for the `Input` placeholders. Void expressions become expression statements, others are
///   pushed.
/// - `Conditional` edges pop the test and become an `if` statement whose arms are lowered
///   recursively with the same scope.
/// - Remaining edges have no effect.
///
/// # Errors
///
/// Returns [`Error::Unsupported`] when an `If` node was not reduced, when the walk meets a
/// node twice (a loop), or when an action has no recipe.
pub fn lower_cfg(cfg: &Cfg, scope: &mut ScopeContext) -> Result<Script> {
    let mut body = Vec::new();
    lower_into(cfg, scope, &mut body)?;
    Ok(Script::new(body))
}

fn lower_into(cfg: &Cfg, scope: &mut ScopeContext, body: &mut Vec<Statement>) -> Result<()> {
    let mut visited = vec![false; cfg.node_count()];
    let mut current = cfg.source();

    loop {
        if std::mem::replace(&mut visited[current.index()], true) {
            return Err(Error::Unsupported { kind: "Loop" });
        }
        let out = match cfg.node(current) {
            Some(Node::Simple { out }) => out,
            Some(Node::End) => return Ok(()),
            Some(Node::If { .. }) => return Err(Error::Unsupported { kind: "If" }),
            Some(Node::Pending) => {
                return Err(invariant_error!("Reached incomplete node {}", current));
            }
            None => return Err(Error::NodeNotFound(current.index())),
        };

        let mut cx = OpAs2Emitter::new(scope, body);
        match &out.edge {
            Edge::Action(action) => decompile_action(&mut cx, action)?,
            Edge::Expression(partial) => lower_expression(&mut cx, partial),
            Edge::Conditional { if_true, if_false } => {
                let test = cx.write_pop_temp();
                let mut truthy = Vec::new();
                lower_into(if_true, scope, &mut truthy)?;
                let mut falsy = Vec::new();
                lower_into(if_false, scope, &mut falsy)?;

                body.push(Statement::If {
                    loc: Default::default(),
                    test: Expression::temporary(test),
                    truthy: Box::new(Statement::block(truthy)),
                    falsy: (!falsy.is_empty()).then(|| Box::new(Statement::block(falsy))),
                });
            }
            Edge::Simple
            | Edge::IfTrue
            | Edge::IfFalse
            | Edge::IfTest
            | Edge::Marker(_)
            | Edge::Sub => {}
        }
        current = out.to;
    }
}

fn lower_expression(cx: &mut OpAs2Emitter<'_>, partial: &PartialExpr) {
    let temporaries: Vec<u32> = (0..partial.inputs).map(|_| cx.write_pop_temp()).collect();

    let mut expr = partial.expr.clone();
    expr.substitute_inputs(&mut |index| {
        let position = partial.inputs.checked_sub(index + 1)?;
        temporaries
            .get(position as usize)
            .map(|&id| Expression::temporary(id))
    });

    if partial.void {
        cx.write_expr(expr);
    } else {
        cx.write_push(expr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        action::Action,
        analysis::build_linear,
        ast::{BinaryOperator, Pattern},
    };

    fn pop_into(id: u32) -> Statement {
        Statement::expression(Expression::assign(Pattern::temporary(id), Expression::pop()))
    }

    #[test]
    fn test_lower_expression_pops_top_first() {
        let cfg = build_linear(vec![Edge::Expression(PartialExpr::new(
            2,
            Expression::binary(
                BinaryOperator::Subtract,
                Expression::input(0),
                Expression::input(1),
            ),
            false,
        ))]);

        let script = lower_cfg(&cfg, &mut ScopeContext::new()).unwrap();
        assert_eq!(
            script.body,
            vec![
                pop_into(0),
                pop_into(1),
                Statement::push(Expression::binary(
                    BinaryOperator::Subtract,
                    Expression::temporary(1),
                    Expression::temporary(0),
                )),
            ]
        );
    }

    #[test]
    fn test_lower_void_expression() {
        let call = Expression::call(Expression::identifier("trace"), vec![Expression::number(1.0)]);
        let cfg = build_linear(vec![
            Edge::Simple,
            Edge::Expression(PartialExpr::new(0, call.clone(), true)),
        ]);
        let script = lower_cfg(&cfg, &mut ScopeContext::new()).unwrap();
        assert_eq!(script.body, vec![Statement::expression(call)]);
    }

    #[test]
    fn test_lower_conditional() {
        let cfg = build_linear(vec![Edge::Conditional {
            if_true: build_linear(vec![Edge::IfTrue, Edge::Action(Action::Pop)]),
            if_false: build_linear(vec![Edge::IfFalse]),
        }]);
        let script = lower_cfg(&cfg, &mut ScopeContext::new()).unwrap();
        assert_eq!(
            script.body,
            vec![
                pop_into(0),
                Statement::If {
                    loc: Default::default(),
                    test: Expression::temporary(0),
                    truthy: Box::new(Statement::block(vec![Statement::expression(
                        Expression::pop()
                    )])),
                    falsy: None,
                },
            ]
        );
    }

    #[test]
    fn test_unreduced_branch_is_unsupported() {
        use crate::{
            action::{ActionList, Value},
            analysis::CfgBuilder,
        };

        let actions = ActionList::new(vec![
            Action::Push {
                values: vec![Value::Boolean(true)],
            },
            Action::If { offset: 0 },
        ]);
        let cfg = CfgBuilder::build(&actions).unwrap();
        assert_eq!(
            lower_cfg(&cfg, &mut ScopeContext::new()),
            Err(Error::Unsupported { kind: "If" })
        );
    }
}
