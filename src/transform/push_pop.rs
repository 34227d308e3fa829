//! Replacement of matched push/pop pairs by temporaries.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    ast::{Expression, Pattern, Statement},
    transform::{
        analyzer::AnalysisMap,
        stack_usage::{analyze_stack_usage, StackState},
    },
    tree::{Field, NodeKind, OnEnter, Tree, VisitorAction},
    utils::graph::NodeId,
    Result,
};

/// Rewrites every fully matched push/pop pair into a temporary binding.
///
/// A push is eligible when it is not left on the stack at the end of the script or at the end
/// of an `if` arm: such values may be consumed by code outside the analyzed region. For each
/// eligible push, a fresh temporary `tN` of the enclosing scope is allocated, the push becomes
/// `tN = value;` and each pop it feeds becomes a reference to `tN`.
///
/// Returns `true` if a pair was rewritten.
///
/// # Errors
///
/// Returns [`crate::Error::Unsupported`] if the script contains nodes the stack analysis has
/// no rule for.
///
/// # Examples
///
/// ```rust
/// use avm1_decompiler::ast::{Expression, Pattern, Script, Statement};
/// use avm1_decompiler::transform::eliminate_push_pop;
/// use avm1_decompiler::tree::Tree;
///
/// let mut tree = Tree::new(Script::new(vec![
///     Statement::push(Expression::number(1.0)),
///     Statement::OpTrace { loc: Default::default(), value: Expression::pop() },
/// ]));
/// assert!(eliminate_push_pop(&mut tree)?);
/// assert_eq!(
///     tree.into_script()?.body[0],
///     Statement::expression(Expression::assign(Pattern::temporary(0), Expression::number(1.0))),
/// );
/// # Ok::<(), avm1_decompiler::Error>(())
/// ```
pub fn eliminate_push_pop(tree: &mut Tree) -> Result<bool> {
    let usage = analyze_stack_usage(tree)?;
    let dangling = dangling_pushes(tree, &usage)?;
    let pairs = find_push_pops(tree, &usage, &dangling)?;
    if pairs.is_empty() {
        return Ok(false);
    }

    let mut bindings = Vec::with_capacity(pairs.len());
    for (push, pops) in pairs {
        let temporary = tree.scope(push)?.alloc_temporary();
        bindings.push((push, temporary));
        for pop in pops {
            tree.replace_expression(pop, Expression::temporary(temporary))?;
        }
    }

    // Pops are rewritten first, so values extracted below already reference temporaries
    for (push, temporary) in bindings {
        let value = tree
            .child(push, Field::Value)
            .ok_or_else(|| invariant_error!("Push {} has no value", push))?;
        let value = tree.expression(value)?;
        tree.replace_statement(
            push,
            Statement::expression(Expression::assign(Pattern::temporary(temporary), value)),
        )?;
    }
    Ok(true)
}

/// Pushes still on the stack at the end of the script or of an `if` arm.
fn dangling_pushes(tree: &Tree, usage: &AnalysisMap<StackState>) -> Result<BTreeSet<NodeId>> {
    let mut dangling: BTreeSet<NodeId> = usage
        .get(&tree.root())
        .map(|root| root.output.pushes().into_iter().collect())
        .unwrap_or_default();

    let arms = tree.traverse(
        tree.root(),
        &mut OnEnter(|tree: &Tree, node: NodeId, arms: &mut Vec<NodeId>| {
            if let Ok(NodeKind::IfStatement) = tree.kind(node) {
                if let Ok(children) = tree.children(node) {
                    arms.extend(children.iter().skip(1).copied());
                }
            }
            VisitorAction::Advance
        }),
        Vec::new(),
    )?;
    for arm in arms {
        if let Some(states) = usage.get(&arm) {
            dangling.extend(states.output.pushes());
        }
    }
    Ok(dangling)
}

/// Groups the pops fed by each eligible push.
fn find_push_pops(
    tree: &Tree,
    usage: &AnalysisMap<StackState>,
    dangling: &BTreeSet<NodeId>,
) -> Result<BTreeMap<NodeId, Vec<NodeId>>> {
    tree.traverse(
        tree.root(),
        &mut OnEnter(
            |tree: &Tree, node: NodeId, pairs: &mut BTreeMap<NodeId, Vec<NodeId>>| {
                if !matches!(tree.kind(node), Ok(NodeKind::OpPop)) {
                    return VisitorAction::Advance;
                }
                let push = usage.get(&node).and_then(|states| states.input.top_push());
                if let Some(push) = push.filter(|push| !dangling.contains(push)) {
                    pairs.entry(push).or_default().push(node);
                }
                VisitorAction::Advance
            },
        ),
        BTreeMap::new(),
    )
}
