//! Temporary allocation scopes of a tree.

use crate::{
    decompiler::ScopeContext,
    tree::{NodeKind, OnEnter, Tree, VisitorAction},
    utils::graph::NodeId,
    Result,
};

impl Tree {
    /// Returns the temporary allocator of the scope enclosing `node`.
    ///
    /// The scope is anchored at the nearest enclosing `Script`. It is created on first use and
    /// starts above every temporary id already present in its subtree, so ids it hands out
    /// never collide with existing ones. Later calls return the same allocator.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NodeNotFound`] if `node` is not a live node.
    pub fn scope(&mut self, node: NodeId) -> Result<&mut ScopeContext> {
        let anchor = self.scope_anchor(node)?;
        if !self.scopes.contains_key(&anchor) {
            let next = self.max_temporary(anchor)?.map_or(0, |id| id + 1);
            self.scopes.insert(anchor, ScopeContext::starting_at(next));
        }
        self.scopes
            .get_mut(&anchor)
            .ok_or_else(|| invariant_error!("Scope of {} vanished", anchor))
    }

    fn scope_anchor(&self, node: NodeId) -> Result<NodeId> {
        let mut current = node;
        loop {
            if matches!(self.kind(current)?, NodeKind::Script) {
                return Ok(current);
            }
            match self.parent(current) {
                Some(link) => current = link.parent,
                None => return Ok(current),
            }
        }
    }

    fn max_temporary(&self, anchor: NodeId) -> Result<Option<u32>> {
        self.traverse(
            anchor,
            &mut OnEnter(|tree: &Tree, node: NodeId, max: &mut Option<u32>| {
                if let Ok(NodeKind::OpTemporary { id } | NodeKind::OpTemporaryPattern { id }) =
                    tree.kind(node)
                {
                    *max = (*max).max(Some(*id));
                }
                VisitorAction::Advance
            }),
            None,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expression, Pattern, Script, Statement};

    #[test]
    fn test_scope_starts_above_existing_temporaries() {
        let mut tree = Tree::new(Script::new(vec![
            Statement::expression(Expression::assign(
                Pattern::temporary(4),
                Expression::pop(),
            )),
            Statement::push(Expression::temporary(2)),
        ]));

        let deep = NodeId::new(5);
        assert_eq!(tree.scope(deep).unwrap().alloc_temporary(), 5);
        assert_eq!(tree.scope(tree.root()).unwrap().alloc_temporary(), 6);
        assert_eq!(tree.scope(deep).unwrap().next_temporary(), 7);
    }

    #[test]
    fn test_scope_of_fresh_tree_starts_at_zero() {
        let mut tree = Tree::new(Script::new(vec![Statement::push(Expression::number(1.0))]));
        let scope = tree.scope(NodeId::new(2)).unwrap();
        assert_eq!(scope.alloc_temporary(), 0);
        assert_eq!(scope.alloc_temporary(), 1);
        assert!(tree.scope(NodeId::new(9)).is_err());
    }

    #[test]
    fn test_scope_sees_temporaries_in_nested_branches() {
        let mut tree = Tree::new(Script::new(vec![Statement::If {
            loc: Default::default(),
            test: Expression::temporary(1),
            truthy: Box::new(Statement::block(vec![Statement::push(
                Expression::temporary(3),
            )])),
            falsy: Some(Box::new(Statement::expression(Expression::assign(
                Pattern::temporary(9),
                Expression::pop(),
            )))),
        }]));

        assert_eq!(tree.scope(tree.root()).unwrap().alloc_temporary(), 10);
        assert!(!tree.is_traversing());
        assert_eq!(tree.replace_statement(NodeId::new(1), Statement::empty()), Ok(()));
    }
}
