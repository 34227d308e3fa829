//! Cursor driven depth-first traversal.

use std::{cell::Cell, rc::Rc};

use crate::{tree::Tree, utils::graph::NodeId, Result};

/// A position of a traversal: entering or leaving a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The node is visited before its children
    Enter(NodeId),
    /// The node is visited after its children
    Exit(NodeId),
}

impl Step {
    /// Returns the node at this step.
    #[must_use]
    pub const fn node(&self) -> NodeId {
        match self {
            Step::Enter(node) | Step::Exit(node) => *node,
        }
    }
}

/// How a traversal continues after a visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisitorAction {
    /// Continue with the next step
    #[default]
    Advance,
    /// Do not descend into the children of the entered node
    Skip,
    /// End the traversal
    Stop,
}

/// Callbacks invoked by [`Tree::traverse`].
///
/// `S` is caller state threaded through the whole walk.
pub trait Visitor<S> {
    /// Called when entering `node`.
    ///
    /// # Errors
    ///
    /// An error aborts the traversal and is returned by [`Tree::traverse`].
    fn enter(&mut self, tree: &Tree, node: NodeId, state: &mut S) -> Result<VisitorAction> {
        let _ = (tree, node, state);
        Ok(VisitorAction::Advance)
    }

    /// Called when leaving `node`, after its children.
    ///
    /// # Errors
    ///
    /// An error aborts the traversal and is returned by [`Tree::traverse`].
    fn exit(&mut self, tree: &Tree, node: NodeId, state: &mut S) -> Result<VisitorAction> {
        let _ = (tree, node, state);
        Ok(VisitorAction::Advance)
    }
}

/// Adapts a closure into a [`Visitor`] that only observes node entry.
///
/// ```rust
/// use avm1_decompiler::ast::{Expression, Script, Statement};
/// use avm1_decompiler::tree::{OnEnter, Tree, VisitorAction};
/// use avm1_decompiler::utils::graph::NodeId;
///
/// let tree = Tree::new(Script::new(vec![Statement::push(Expression::number(1.0))]));
/// let names = tree.traverse(
///     tree.root(),
///     &mut OnEnter(|tree: &Tree, node: NodeId, names: &mut Vec<&'static str>| {
///         names.push(tree.kind(node).map_or("?", |kind| kind.name()));
///         VisitorAction::Advance
///     }),
///     Vec::new(),
/// )?;
/// assert_eq!(names, ["Script", "OpPush", "NumberLiteral"]);
/// # Ok::<(), avm1_decompiler::Error>(())
/// ```
pub struct OnEnter<F>(pub F);

impl<S, F> Visitor<S> for OnEnter<F>
where
    F: FnMut(&Tree, NodeId, &mut S) -> VisitorAction,
{
    fn enter(&mut self, tree: &Tree, node: NodeId, state: &mut S) -> Result<VisitorAction> {
        Ok((self.0)(tree, node, state))
    }
}

/// Traversal state machine over a subtree.
///
/// A cursor starts at `Enter(root)` and ends after `Exit(root)`. Cursors are obtained from
/// [`Tree::cursor`]. The tree rejects replacements until the cursor is dropped or handed to
/// [`Tree::finish`].
#[derive(Debug)]
pub struct Cursor {
    root: NodeId,
    current: Option<Step>,
    _guard: TraversalGuard,
}

/// Registration of one outstanding cursor, released on drop.
#[derive(Debug)]
struct TraversalGuard(Rc<Cell<usize>>);

impl TraversalGuard {
    fn acquire(traversals: &Rc<Cell<usize>>) -> Self {
        traversals.set(traversals.get() + 1);
        TraversalGuard(Rc::clone(traversals))
    }
}

impl Drop for TraversalGuard {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

impl Cursor {
    /// Returns the current step, or `None` once the traversal is complete.
    #[must_use]
    pub const fn current(&self) -> Option<Step> {
        self.current
    }

    /// Moves to the next step according to `action` and returns it.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree no longer contains the nodes being walked.
    pub fn advance(&mut self, tree: &Tree, action: VisitorAction) -> Result<Option<Step>> {
        let Some(step) = self.current else {
            return Ok(None);
        };

        self.current = match (step, action) {
            (_, VisitorAction::Stop) => None,
            (Step::Enter(node), VisitorAction::Skip) => Some(Step::Exit(node)),
            (Step::Enter(node), VisitorAction::Advance) => Some(
                tree.children(node)?
                    .first()
                    .map_or(Step::Exit(node), |&child| Step::Enter(child)),
            ),
            (Step::Exit(node), _) if node == self.root => None,
            (Step::Exit(node), _) => {
                let link = tree.parent(node).ok_or_else(|| {
                    invariant_error!("Node {} left the subtree of {}", node, self.root)
                })?;
                Some(
                    tree.next_sibling(node)
                        .map_or(Step::Exit(link.parent), Step::Enter),
                )
            }
        };
        Ok(self.current)
    }
}

impl Tree {
    /// Returns the first child of `node`.
    #[must_use]
    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node).ok()?.first().copied()
    }

    /// Returns the child following `node` in its parent.
    #[must_use]
    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let link = self.parent(node)?;
        self.children(link.parent).ok()?.get(link.index + 1).copied()
    }

    /// Starts a traversal of the subtree rooted at `start`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NodeNotFound`] if `start` is not a live node.
    pub fn cursor(&self, start: NodeId) -> Result<Cursor> {
        self.slot(start)?;
        Ok(Cursor {
            root: start,
            current: Some(Step::Enter(start)),
            _guard: TraversalGuard::acquire(&self.traversals),
        })
    }

    /// Ends the traversal of `cursor`. Dropping the cursor has the same effect.
    pub fn finish(&self, cursor: Cursor) {
        drop(cursor);
    }

    /// Returns `true` while a cursor is outstanding.
    #[must_use]
    pub fn is_traversing(&self) -> bool {
        self.traversals.get() > 0
    }

    /// Walks the subtree rooted at `start` depth first, calling `visitor` on entry and exit
    /// of every node, and returns the final state.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NodeNotFound`] if `start` is not a live node, or the first
    /// error returned by the visitor.
    pub fn traverse<S, V>(&self, start: NodeId, visitor: &mut V, mut state: S) -> Result<S>
    where
        V: Visitor<S> + ?Sized,
    {
        let mut cursor = self.cursor(start)?;
        self.drive(&mut cursor, visitor, &mut state)?;
        Ok(state)
    }

    fn drive<S, V>(&self, cursor: &mut Cursor, visitor: &mut V, state: &mut S) -> Result<()>
    where
        V: Visitor<S> + ?Sized,
    {
        while let Some(step) = cursor.current() {
            let action = match step {
                Step::Enter(node) => visitor.enter(self, node, state)?,
                Step::Exit(node) => visitor.exit(self, node, state)?,
            };
            cursor.advance(self, action)?;
        }
        Ok(())
    }
}
