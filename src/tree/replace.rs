//! In-place subtree replacement.

use crate::{
    ast::{Expression, Pattern, Statement},
    tree::{Category, Field, Slot, Tree},
    utils::graph::NodeId,
    Error, Result,
};

impl Tree {
    /// Replaces the statement at `node` with `statement`.
    ///
    /// `node` keeps its id and position; its previous descendants are removed from the tree.
    ///
    /// # Errors
    ///
    /// - [`Error::TraversalActive`] while a cursor is outstanding
    /// - [`Error::NodeNotFound`] if `node` is not a live node
    /// - [`Error::InvariantViolation`] if `node` is not a statement
    pub fn replace_statement(&mut self, node: NodeId, statement: Statement) -> Result<()> {
        self.prepare_replace(node, Category::Statement)?;
        self.write_statement(node, statement);
        Ok(())
    }

    /// Replaces the expression at `node` with `expression`.
    ///
    /// # Errors
    ///
    /// Same as [`Tree::replace_statement`], for expression nodes.
    pub fn replace_expression(&mut self, node: NodeId, expression: Expression) -> Result<()> {
        self.prepare_replace(node, Category::Expression)?;
        self.write_expression(node, expression);
        Ok(())
    }

    /// Replaces the pattern at `node` with `pattern`.
    ///
    /// # Errors
    ///
    /// Same as [`Tree::replace_statement`], for pattern nodes.
    pub fn replace_pattern(&mut self, node: NodeId, pattern: Pattern) -> Result<()> {
        self.prepare_replace(node, Category::Pattern)?;
        self.write_pattern(node, pattern);
        Ok(())
    }

    /// Removes a statement from the statement list holding it.
    ///
    /// Following siblings move up one position.
    ///
    /// # Errors
    ///
    /// - [`Error::TraversalActive`] while a cursor is outstanding
    /// - [`Error::NodeNotFound`] if `node` is not a live node
    /// - [`Error::InvariantViolation`] if `node` is not stored in a statement list
    pub fn remove_statement(&mut self, node: NodeId) -> Result<()> {
        self.ensure_idle()?;
        self.slot(node)?;
        let link = self
            .parent(node)
            .filter(|link| link.field == Field::Body)
            .ok_or_else(|| invariant_error!("Node {} is not in a statement list", node))?;

        let siblings = &mut self.slot_mut(link.parent)?.children;
        if siblings.get(link.index) != Some(&node) {
            return Err(invariant_error!(
                "Node {} is not child {} of {}",
                node,
                link.index,
                link.parent
            ));
        }
        siblings.remove(link.index);
        let shifted = siblings[link.index..].to_vec();

        for sibling in shifted {
            if let Some(Some(sibling_link)) = self.parents.get_mut(sibling.index()) {
                sibling_link.index -= 1;
            }
        }
        self.vacate(node);
        Ok(())
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.is_traversing() {
            return Err(Error::TraversalActive);
        }
        Ok(())
    }

    fn prepare_replace(&mut self, node: NodeId, category: Category) -> Result<()> {
        self.ensure_idle()?;
        let kind = self.kind(node)?;
        if kind.category() != category {
            return Err(invariant_error!(
                "Cannot replace {} {} with a {:?} node",
                kind.name(),
                node,
                category
            ));
        }

        let children = std::mem::take(&mut self.slot_mut(node)?.children);
        for child in children {
            self.vacate(child);
        }
        Ok(())
    }

    fn slot_mut(&mut self, node: NodeId) -> Result<&mut Slot> {
        self.slots
            .get_mut(node.index())
            .and_then(Option::as_mut)
            .ok_or(Error::NodeNotFound(node.index()))
    }

    /// Frees `node` and all of its descendants.
    fn vacate(&mut self, node: NodeId) {
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if let Some(slot) = self.slots.get_mut(current.index()).and_then(Option::take) {
                stack.extend(slot.children);
            }
            if let Some(parent) = self.parents.get_mut(current.index()) {
                *parent = None;
            }
            self.scopes.remove(&current);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::{BinaryOperator, Script},
        tree::{NodeKind, VisitorAction},
    };

    fn sample() -> Tree {
        // push 1 + 2; push 3; push 4
        Tree::new(Script::new(vec![
            Statement::push(Expression::binary(
                BinaryOperator::Add,
                Expression::number(1.0),
                Expression::number(2.0),
            )),
            Statement::push(Expression::number(3.0)),
            Statement::push(Expression::number(4.0)),
        ]))
    }

    #[test]
    fn test_replace_expression_keeps_id() {
        let mut tree = sample();
        let sum = NodeId::new(2);
        tree.replace_expression(sum, Expression::identifier("x"))
            .unwrap();

        assert_eq!(
            tree.kind(sum).unwrap(),
            &NodeKind::Identifier { name: "x".into() }
        );
        assert!(tree.children(sum).unwrap().is_empty());
        assert_eq!(tree.kind(NodeId::new(3)), Err(Error::NodeNotFound(3)));
        assert_eq!(tree.parent(NodeId::new(3)), None);
        assert_eq!(tree.parent(sum).map(|l| l.parent), Some(NodeId::new(1)));

        let body = tree.into_script().unwrap().body;
        assert_eq!(body[0], Statement::push(Expression::identifier("x")));
    }

    #[test]
    fn test_replace_statement_allocates_new_children() {
        let mut tree = sample();
        let before = tree.len();
        let push = NodeId::new(5);
        tree.replace_statement(
            push,
            Statement::expression(Expression::call(
                Expression::identifier("f"),
                vec![Expression::number(3.0)],
            )),
        )
        .unwrap();

        assert_eq!(tree.len(), before + 2);
        let call = tree.child(push, Field::Expression).unwrap();
        assert!(call.index() > 8);
        assert_eq!(tree.path(call).unwrap().len(), 2);
    }

    #[test]
    fn test_replace_rejects_wrong_category() {
        let mut tree = sample();
        assert!(matches!(
            tree.replace_statement(NodeId::new(2), Statement::empty()),
            Err(Error::InvariantViolation { .. })
        ));
        assert!(matches!(
            tree.replace_expression(tree.root(), Expression::null()),
            Err(Error::InvariantViolation { .. })
        ));
        assert_eq!(
            tree.replace_pattern(NodeId::new(77), Pattern::temporary(0)),
            Err(Error::NodeNotFound(77))
        );
    }

    #[test]
    fn test_replace_during_traversal_fails() {
        let mut tree = sample();
        let cursor = tree.cursor(tree.root()).unwrap();
        assert_eq!(
            tree.replace_statement(NodeId::new(1), Statement::empty()),
            Err(Error::TraversalActive)
        );
        assert_eq!(tree.remove_statement(NodeId::new(1)), Err(Error::TraversalActive));
        tree.finish(cursor);
        assert_eq!(tree.replace_statement(NodeId::new(1), Statement::empty()), Ok(()));
    }

    #[test]
    fn test_dropped_cursor_releases_tree() {
        fn first_push(tree: &Tree) -> Result<Option<NodeId>> {
            let mut cursor = tree.cursor(tree.root())?;
            while let Some(step) = cursor.advance(tree, VisitorAction::Advance)? {
                if tree.kind(step.node())? == &NodeKind::OpPush {
                    return Ok(Some(step.node()));
                }
            }
            Ok(None)
        }

        let mut tree = sample();
        {
            let _cursor = tree.cursor(tree.root()).unwrap();
            let _nested = tree.cursor(NodeId::new(1)).unwrap();
            assert!(tree.is_traversing());
        }
        assert!(!tree.is_traversing());

        let push = first_push(&tree).unwrap().unwrap();
        assert_eq!(push, NodeId::new(1));
        assert!(!tree.is_traversing());
        assert_eq!(tree.replace_statement(push, Statement::empty()), Ok(()));

        let copy = {
            let _cursor = tree.cursor(tree.root()).unwrap();
            tree.clone()
        };
        assert!(!copy.is_traversing());
    }

    #[test]
    fn test_remove_statement_reindexes_siblings() {
        let mut tree = sample();
        tree.remove_statement(NodeId::new(1)).unwrap();

        let root = tree.root();
        assert_eq!(tree.children(root).unwrap(), &[NodeId::new(5), NodeId::new(7)]);
        assert_eq!(tree.parent(NodeId::new(7)).map(|l| l.index), Some(1));
        assert_eq!(tree.next_sibling(NodeId::new(5)), Some(NodeId::new(7)));
        assert_eq!(tree.kind(NodeId::new(2)), Err(Error::NodeNotFound(2)));

        assert!(matches!(
            tree.remove_statement(NodeId::new(6)),
            Err(Error::InvariantViolation { .. })
        ));
        assert_eq!(
            tree.into_script().unwrap().body,
            vec![
                Statement::push(Expression::number(3.0)),
                Statement::push(Expression::number(4.0)),
            ]
        );
    }
}
