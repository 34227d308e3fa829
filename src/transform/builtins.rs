//! Lowering of builtin operations to plain identifiers and calls.

use crate::{
    ast::{Expression, Statement},
    decompiler::BuiltinsConfig,
    tree::{Field, NodeKind, OnEnter, Tree, VisitorAction},
    utils::graph::NodeId,
    Result,
};

/// Replaces `OpGlobal` by the configured global identifier and `OpTrace(value)` statements by
/// calls to the configured trace function.
///
/// Returns `true` if a node was rewritten.
///
/// # Errors
///
/// Returns an error if the tree is inconsistent or a traversal is running.
pub fn lower_builtins(tree: &mut Tree, builtins: &BuiltinsConfig) -> Result<bool> {
    let (globals, traces) = tree.traverse(
        tree.root(),
        &mut OnEnter(
            |tree: &Tree, node: NodeId, found: &mut (Vec<NodeId>, Vec<NodeId>)| {
                match tree.kind(node) {
                    Ok(NodeKind::OpGlobal) => found.0.push(node),
                    Ok(NodeKind::OpTrace) => found.1.push(node),
                    _ => {}
                }
                VisitorAction::Advance
            },
        ),
        (Vec::new(), Vec::new()),
    )?;
    let changed = !globals.is_empty() || !traces.is_empty();

    for node in globals {
        tree.replace_expression(node, Expression::identifier(builtins.global.as_str()))?;
    }
    for node in traces {
        let value = tree
            .child(node, Field::Value)
            .ok_or_else(|| invariant_error!("Trace {} has no value", node))?;
        let value = tree.expression(value)?;
        let call = Expression::call(Expression::identifier(builtins.trace.as_str()), vec![value]);
        tree.replace_statement(node, Statement::expression(call))?;
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Loc, Script};

    #[test]
    fn test_lower_global_inside_trace() {
        let mut tree = Tree::new(Script::new(vec![Statement::OpTrace {
            loc: Loc::default(),
            value: Expression::member(
                Expression::OpGlobal { loc: Loc::default() },
                Expression::string("x"),
            ),
        }]));

        assert!(lower_builtins(&mut tree, &BuiltinsConfig::default()).unwrap());
        assert_eq!(
            tree.into_script().unwrap().body,
            vec![Statement::expression(Expression::call(
                Expression::identifier("trace"),
                vec![Expression::member(
                    Expression::identifier("_global"),
                    Expression::string("x"),
                )],
            ))]
        );
    }

    #[test]
    fn test_custom_names_and_noop() {
        let builtins = BuiltinsConfig::default().with_trace("console.log");
        let mut tree = Tree::new(Script::new(vec![Statement::OpTrace {
            loc: Loc::default(),
            value: Expression::number(1.0),
        }]));
        assert!(lower_builtins(&mut tree, &builtins).unwrap());
        assert!(!lower_builtins(&mut tree, &builtins).unwrap());

        let body = tree.into_script().unwrap().body;
        assert_eq!(
            body,
            vec![Statement::expression(Expression::call(
                Expression::identifier("console.log"),
                vec![Expression::number(1.0)],
            ))]
        );
    }
}
