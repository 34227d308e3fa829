//! Removal of statements left without effect by the other transforms.

use crate::{
    ast::Statement,
    tree::{Field, NodeKind, OnEnter, Tree, VisitorAction},
    utils::graph::NodeId,
    Result,
};

/// Removes `OpConstantPool` statements once no `OpConstant` references a pool anymore.
///
/// Returns `true` if a statement was removed.
///
/// # Errors
///
/// Returns an error if the tree is inconsistent or a traversal is running.
pub fn remove_unused_constant_pools(tree: &mut Tree) -> Result<bool> {
    let (pools, referenced) = tree.traverse(
        tree.root(),
        &mut OnEnter(|tree: &Tree, node: NodeId, found: &mut (Vec<NodeId>, bool)| {
            match tree.kind(node) {
                Ok(NodeKind::OpConstantPool { .. }) => found.0.push(node),
                Ok(NodeKind::OpConstant { .. }) => found.1 = true,
                _ => {}
            }
            VisitorAction::Advance
        }),
        (Vec::new(), false),
    )?;
    if referenced || pools.is_empty() {
        return Ok(false);
    }

    for node in pools.into_iter().rev() {
        drop_statement(tree, node)?;
    }
    Ok(true)
}

/// Removes empty statements from statement lists.
///
/// Empty statements used as the branch of an `if` are kept.
///
/// Returns `true` if a statement was removed.
///
/// # Errors
///
/// Returns an error if the tree is inconsistent or a traversal is running.
pub fn remove_empty_statements(tree: &mut Tree) -> Result<bool> {
    let empties = tree.traverse(
        tree.root(),
        &mut OnEnter(|tree: &Tree, node: NodeId, found: &mut Vec<NodeId>| {
            let in_list = tree.parent(node).is_some_and(|link| link.field == Field::Body);
            if in_list && matches!(tree.kind(node), Ok(NodeKind::EmptyStatement)) {
                found.push(node);
            }
            VisitorAction::Advance
        }),
        Vec::new(),
    )?;

    let changed = !empties.is_empty();
    for node in empties.into_iter().rev() {
        tree.remove_statement(node)?;
    }
    Ok(changed)
}

fn drop_statement(tree: &mut Tree, node: NodeId) -> Result<()> {
    match tree.parent(node) {
        Some(link) if link.field == Field::Body => tree.remove_statement(node),
        _ => tree.replace_statement(node, Statement::empty()),
    }
}
