//! Mutable, indexed view of an AS2 [`Script`].
//!
//! A [`Tree`] flattens a script into an arena of [`Slot`]s addressed by [`NodeId`], with a
//! parallel parent index. This gives every node a stable identity that analyses can key
//! their results on, and makes subtree replacement an O(subtree) operation.
//!
//! # Key Components
//!
//! - [`Tree`] - The arena, with conversion from and back to the owned AST
//! - [`NodeKind`] / [`Field`] - Node variants and the fields children are stored in
//! - [`Cursor`] / [`Visitor`] - The traversal state machine
//!
//! # Traversal and mutation
//!
//! While a traversal is running, every replacement is rejected with
//! [`Error::TraversalActive`](crate::Error::TraversalActive). Transforms therefore collect
//! the nodes to rewrite first and apply the rewrites afterwards.
//!
//! # Examples
//!
//! ```rust
//! use avm1_decompiler::ast::{Expression, Script, Statement};
//! use avm1_decompiler::tree::{NodeKind, Tree};
//!
//! let script = Script::new(vec![Statement::push(Expression::number(1.0))]);
//! let mut tree = Tree::new(script);
//!
//! let push = tree.first_child(tree.root()).unwrap();
//! assert_eq!(tree.kind(push)?, &NodeKind::OpPush);
//!
//! tree.replace_statement(push, Statement::empty())?;
//! assert_eq!(tree.into_script()?.body, vec![Statement::empty()]);
//! # Ok::<(), avm1_decompiler::Error>(())
//! ```

mod node;
mod replace;
mod scope;
mod traverse;

pub use node::{Category, Field, NodeKind, ParentLink, Slot};
pub use traverse::{Cursor, OnEnter, Step, Visitor, VisitorAction};

use std::{cell::Cell, collections::BTreeMap, rc::Rc};

use crate::{
    ast::{Expression, Loc, Pattern, Script, Statement},
    decompiler::ScopeContext,
    utils::graph::NodeId,
    Error, Result,
};

/// An arena backed AS2 syntax tree.
///
/// Node ids are assigned in preorder when the tree is built. A replaced node keeps its id;
/// its former descendants are dropped and the new ones get fresh ids.
#[derive(Debug)]
pub struct Tree {
    slots: Vec<Option<Slot>>,
    parents: Vec<Option<ParentLink>>,
    root: NodeId,
    scopes: BTreeMap<NodeId, ScopeContext>,
    traversals: Rc<Cell<usize>>,
}

impl Clone for Tree {
    /// Clones the nodes and scopes. Cursors of `self` do not lock the clone.
    fn clone(&self) -> Self {
        Tree {
            slots: self.slots.clone(),
            parents: self.parents.clone(),
            root: self.root,
            scopes: self.scopes.clone(),
            traversals: Rc::default(),
        }
    }
}

impl Tree {
    /// Flattens `script` into a new tree.
    #[must_use]
    pub fn new(script: Script) -> Self {
        let mut tree = Tree {
            slots: Vec::new(),
            parents: Vec::new(),
            root: NodeId::new(0),
            scopes: BTreeMap::new(),
            traversals: Rc::default(),
        };
        let root = tree.alloc(None);
        let mut children = Children::new(root);
        for statement in script.body {
            children.statement(&mut tree, Field::Body, statement);
        }
        tree.fill(root, NodeKind::Script, script.loc, children);
        tree.root = root;
        tree
    }

    /// Returns the root `Script` node.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Returns `true` if the script has no statement.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first_child(self.root).is_none()
    }

    /// Returns the slot of `node`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] if `node` is not a live node of this tree.
    pub fn slot(&self, node: NodeId) -> Result<&Slot> {
        self.slots
            .get(node.index())
            .and_then(Option::as_ref)
            .ok_or(Error::NodeNotFound(node.index()))
    }

    /// Returns the variant of `node`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] if `node` is not a live node of this tree.
    pub fn kind(&self, node: NodeId) -> Result<&NodeKind> {
        self.slot(node).map(|slot| &slot.kind)
    }

    /// Returns the children of `node` in field order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] if `node` is not a live node of this tree.
    pub fn children(&self, node: NodeId) -> Result<&[NodeId]> {
        self.slot(node).map(|slot| slot.children.as_slice())
    }

    /// Returns the first child of `node` stored in `field`.
    #[must_use]
    pub fn child(&self, node: NodeId, field: Field) -> Option<NodeId> {
        self.children(node)
            .ok()?
            .iter()
            .copied()
            .find(|&child| self.parent(child).is_some_and(|link| link.field == field))
    }

    /// Returns the position of `node` in its parent, or `None` for the root.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<ParentLink> {
        self.parents.get(node.index()).copied().flatten()
    }

    /// Returns the links from the root down to `node`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] if `node` is not a live node of this tree.
    pub fn path(&self, node: NodeId) -> Result<Vec<ParentLink>> {
        self.slot(node)?;
        let mut path = Vec::new();
        let mut current = node;
        while let Some(link) = self.parent(current) {
            path.push(link);
            current = link.parent;
        }
        path.reverse();
        Ok(path)
    }

    /// Rebuilds the statement rooted at `node`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] for unknown nodes and [`Error::InvariantViolation`]
    /// if `node` is not a statement.
    pub fn statement(&self, node: NodeId) -> Result<Statement> {
        let slot = self.slot(node)?;
        let loc = slot.loc;
        let f = Fields::new(self, node, &slot.children);

        Ok(match &slot.kind {
            NodeKind::BlockStatement => Statement::Block {
                loc,
                body: f.statements(0)?,
            },
            NodeKind::EmptyStatement => Statement::Empty { loc },
            NodeKind::ExpressionStatement => Statement::Expression {
                loc,
                expression: f.expression(0)?,
            },
            NodeKind::IfStatement => Statement::If {
                loc,
                test: f.expression(0)?,
                truthy: Box::new(f.statement(1)?),
                falsy: f.optional_statement(2)?.map(Box::new),
            },
            NodeKind::ReturnStatement => Statement::Return {
                loc,
                argument: f.optional_expression(0)?,
            },
            NodeKind::ThrowStatement => Statement::Throw {
                loc,
                argument: f.expression(0)?,
            },
            NodeKind::SetVariable => Statement::SetVariable {
                loc,
                name: f.expression(0)?,
                value: f.expression(1)?,
            },
            NodeKind::OpConstantPool { pool } => Statement::OpConstantPool {
                loc,
                pool: pool.clone(),
            },
            NodeKind::OpDeclareVariable => Statement::OpDeclareVariable {
                loc,
                name: f.expression(0)?,
                value: f.optional_expression(1)?,
            },
            NodeKind::OpPush => Statement::OpPush {
                loc,
                value: f.expression(0)?,
            },
            NodeKind::OpTrace => Statement::OpTrace {
                loc,
                value: f.expression(0)?,
            },
            NodeKind::OpStackCall => Statement::OpStackCall {
                loc,
                callee: f.expression(0)?,
                arg_count: f.expression(1)?,
                target: f.optional_pattern(2)?,
            },
            other => return Err(unexpected(node, other, "statement")),
        })
    }

    /// Rebuilds the expression rooted at `node`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] for unknown nodes and [`Error::InvariantViolation`]
    /// if `node` is not an expression.
    pub fn expression(&self, node: NodeId) -> Result<Expression> {
        let slot = self.slot(node)?;
        let loc = slot.loc;
        let f = Fields::new(self, node, &slot.children);

        Ok(match &slot.kind {
            NodeKind::Identifier { name } => Expression::Identifier {
                loc,
                name: name.clone(),
            },
            NodeKind::BooleanLiteral { value } => Expression::BooleanLiteral { loc, value: *value },
            NodeKind::NumberLiteral { value } => Expression::NumberLiteral { loc, value: *value },
            NodeKind::StringLiteral { value } => Expression::StringLiteral {
                loc,
                value: value.clone(),
            },
            NodeKind::NullLiteral => Expression::NullLiteral { loc },
            NodeKind::UnaryExpression { operator } => Expression::Unary {
                loc,
                operator: *operator,
                argument: f.boxed_expression(0)?,
            },
            NodeKind::BinaryExpression { operator } => Expression::Binary {
                loc,
                operator: *operator,
                left: f.boxed_expression(0)?,
                right: f.boxed_expression(1)?,
            },
            NodeKind::LogicalExpression { operator } => Expression::Logical {
                loc,
                operator: *operator,
                left: f.boxed_expression(0)?,
                right: f.boxed_expression(1)?,
            },
            NodeKind::AssignmentExpression { operator } => Expression::Assignment {
                loc,
                operator: *operator,
                target: Box::new(f.pattern(0)?),
                value: f.boxed_expression(1)?,
            },
            NodeKind::MemberExpression => Expression::Member {
                loc,
                base: f.boxed_expression(0)?,
                key: f.boxed_expression(1)?,
            },
            NodeKind::CallExpression => Expression::Call {
                loc,
                callee: f.boxed_expression(0)?,
                arguments: f.expressions(1)?,
            },
            NodeKind::SequenceExpression => Expression::Sequence {
                loc,
                expressions: f.expressions(0)?,
            },
            NodeKind::ConditionalExpression => Expression::Conditional {
                loc,
                test: f.boxed_expression(0)?,
                truthy: f.boxed_expression(1)?,
                falsy: f.boxed_expression(2)?,
            },
            NodeKind::OpConstant { index } => Expression::OpConstant { loc, index: *index },
            NodeKind::OpRegister { register } => Expression::OpRegister {
                loc,
                register: *register,
            },
            NodeKind::OpTemporary { id } => Expression::OpTemporary { loc, id: *id },
            NodeKind::OpGlobal => Expression::OpGlobal { loc },
            NodeKind::OpPop => Expression::OpPop { loc },
            NodeKind::OpVariable => Expression::OpVariable {
                loc,
                name: f.boxed_expression(0)?,
            },
            NodeKind::OpPropertyName => Expression::OpPropertyName {
                loc,
                index: f.boxed_expression(0)?,
            },
            NodeKind::OpUndefined => Expression::OpUndefined { loc },
            NodeKind::OpInitArray => Expression::OpInitArray {
                loc,
                item_count: f.boxed_expression(0)?,
            },
            NodeKind::OpInitObject => Expression::OpInitObject {
                loc,
                item_count: f.boxed_expression(0)?,
            },
            NodeKind::Input { index } => Expression::Input { index: *index },
            other => return Err(unexpected(node, other, "expression")),
        })
    }

    /// Rebuilds the pattern rooted at `node`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeNotFound`] for unknown nodes and [`Error::InvariantViolation`]
    /// if `node` is not a pattern.
    pub fn pattern(&self, node: NodeId) -> Result<Pattern> {
        let slot = self.slot(node)?;
        let loc = slot.loc;
        let f = Fields::new(self, node, &slot.children);

        Ok(match &slot.kind {
            NodeKind::IdentifierPattern { name } => Pattern::Identifier {
                loc,
                name: name.clone(),
            },
            NodeKind::MemberPattern => Pattern::Member {
                loc,
                base: f.expression(0)?,
                key: f.expression(1)?,
            },
            NodeKind::OpRegisterPattern { register } => Pattern::OpRegister {
                loc,
                register: *register,
            },
            NodeKind::OpTemporaryPattern { id } => Pattern::OpTemporary { loc, id: *id },
            other => return Err(unexpected(node, other, "pattern")),
        })
    }

    /// Rebuilds the owned script.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvariantViolation`] if the arena is inconsistent.
    pub fn into_script(self) -> Result<Script> {
        let slot = self.slot(self.root)?;
        let f = Fields::new(&self, self.root, &slot.children);
        Ok(Script {
            loc: slot.loc,
            body: f.statements(0)?,
        })
    }

    fn alloc(&mut self, parent: Option<ParentLink>) -> NodeId {
        let id = NodeId::new(self.slots.len());
        self.slots.push(None);
        self.parents.push(parent);
        id
    }

    fn fill(&mut self, node: NodeId, kind: NodeKind, loc: Loc, children: Children) {
        self.slots[node.index()] = Some(Slot {
            kind,
            loc,
            children: children.ids,
        });
    }

    fn write_statement(&mut self, node: NodeId, statement: Statement) {
        let mut c = Children::new(node);
        let (kind, loc) = match statement {
            Statement::Block { loc, body } => {
                for statement in body {
                    c.statement(self, Field::Body, statement);
                }
                (NodeKind::BlockStatement, loc)
            }
            Statement::Empty { loc } => (NodeKind::EmptyStatement, loc),
            Statement::Expression { loc, expression } => {
                c.expression(self, Field::Expression, expression);
                (NodeKind::ExpressionStatement, loc)
            }
            Statement::If {
                loc,
                test,
                truthy,
                falsy,
            } => {
                c.expression(self, Field::Test, test);
                c.statement(self, Field::Truthy, *truthy);
                if let Some(falsy) = falsy {
                    c.statement(self, Field::Falsy, *falsy);
                }
                (NodeKind::IfStatement, loc)
            }
            Statement::Return { loc, argument } => {
                if let Some(argument) = argument {
                    c.expression(self, Field::Argument, argument);
                }
                (NodeKind::ReturnStatement, loc)
            }
            Statement::Throw { loc, argument } => {
                c.expression(self, Field::Argument, argument);
                (NodeKind::ThrowStatement, loc)
            }
            Statement::SetVariable { loc, name, value } => {
                c.expression(self, Field::Name, name);
                c.expression(self, Field::Value, value);
                (NodeKind::SetVariable, loc)
            }
            Statement::OpConstantPool { loc, pool } => (NodeKind::OpConstantPool { pool }, loc),
            Statement::OpDeclareVariable { loc, name, value } => {
                c.expression(self, Field::Name, name);
                if let Some(value) = value {
                    c.expression(self, Field::Value, value);
                }
                (NodeKind::OpDeclareVariable, loc)
            }
            Statement::OpPush { loc, value } => {
                c.expression(self, Field::Value, value);
                (NodeKind::OpPush, loc)
            }
            Statement::OpTrace { loc, value } => {
                c.expression(self, Field::Value, value);
                (NodeKind::OpTrace, loc)
            }
            Statement::OpStackCall {
                loc,
                target,
                callee,
                arg_count,
            } => {
                c.expression(self, Field::Callee, callee);
                c.expression(self, Field::ArgCount, arg_count);
                if let Some(target) = target {
                    c.pattern(self, Field::Target, target);
                }
                (NodeKind::OpStackCall, loc)
            }
        };
        self.fill(node, kind, loc, c);
    }

    fn write_expression(&mut self, node: NodeId, expression: Expression) {
        let mut c = Children::new(node);
        let (kind, loc) = match expression {
            Expression::Identifier { loc, name } => (NodeKind::Identifier { name }, loc),
            Expression::BooleanLiteral { loc, value } => (NodeKind::BooleanLiteral { value }, loc),
            Expression::NumberLiteral { loc, value } => (NodeKind::NumberLiteral { value }, loc),
            Expression::StringLiteral { loc, value } => (NodeKind::StringLiteral { value }, loc),
            Expression::NullLiteral { loc } => (NodeKind::NullLiteral, loc),
            Expression::Unary {
                loc,
                operator,
                argument,
            } => {
                c.expression(self, Field::Argument, *argument);
                (NodeKind::UnaryExpression { operator }, loc)
            }
            Expression::Binary {
                loc,
                operator,
                left,
                right,
            } => {
                c.expression(self, Field::Left, *left);
                c.expression(self, Field::Right, *right);
                (NodeKind::BinaryExpression { operator }, loc)
            }
            Expression::Logical {
                loc,
                operator,
                left,
                right,
            } => {
                c.expression(self, Field::Left, *left);
                c.expression(self, Field::Right, *right);
                (NodeKind::LogicalExpression { operator }, loc)
            }
            Expression::Assignment {
                loc,
                operator,
                target,
                value,
            } => {
                c.pattern(self, Field::Target, *target);
                c.expression(self, Field::Value, *value);
                (NodeKind::AssignmentExpression { operator }, loc)
            }
            Expression::Member { loc, base, key } => {
                c.expression(self, Field::Base, *base);
                c.expression(self, Field::Key, *key);
                (NodeKind::MemberExpression, loc)
            }
            Expression::Call {
                loc,
                callee,
                arguments,
            } => {
                c.expression(self, Field::Callee, *callee);
                for argument in arguments {
                    c.expression(self, Field::Arguments, argument);
                }
                (NodeKind::CallExpression, loc)
            }
            Expression::Sequence { loc, expressions } => {
                for expression in expressions {
                    c.expression(self, Field::Expressions, expression);
                }
                (NodeKind::SequenceExpression, loc)
            }
            Expression::Conditional {
                loc,
                test,
                truthy,
                falsy,
            } => {
                c.expression(self, Field::Test, *test);
                c.expression(self, Field::Truthy, *truthy);
                c.expression(self, Field::Falsy, *falsy);
                (NodeKind::ConditionalExpression, loc)
            }
            Expression::OpConstant { loc, index } => (NodeKind::OpConstant { index }, loc),
            Expression::OpRegister { loc, register } => (NodeKind::OpRegister { register }, loc),
            Expression::OpTemporary { loc, id } => (NodeKind::OpTemporary { id }, loc),
            Expression::OpGlobal { loc } => (NodeKind::OpGlobal, loc),
            Expression::OpPop { loc } => (NodeKind::OpPop, loc),
            Expression::OpVariable { loc, name } => {
                c.expression(self, Field::Name, *name);
                (NodeKind::OpVariable, loc)
            }
            Expression::OpPropertyName { loc, index } => {
                c.expression(self, Field::Index, *index);
                (NodeKind::OpPropertyName, loc)
            }
            Expression::OpUndefined { loc } => (NodeKind::OpUndefined, loc),
            Expression::OpInitArray { loc, item_count } => {
                c.expression(self, Field::ItemCount, *item_count);
                (NodeKind::OpInitArray, loc)
            }
            Expression::OpInitObject { loc, item_count } => {
                c.expression(self, Field::ItemCount, *item_count);
                (NodeKind::OpInitObject, loc)
            }
            Expression::Input { index } => (NodeKind::Input { index }, Loc::default()),
        };
        self.fill(node, kind, loc, c);
    }

    fn write_pattern(&mut self, node: NodeId, pattern: Pattern) {
        let mut c = Children::new(node);
        let (kind, loc) = match pattern {
            Pattern::Identifier { loc, name } => (NodeKind::IdentifierPattern { name }, loc),
            Pattern::Member { loc, base, key } => {
                c.expression(self, Field::Base, base);
                c.expression(self, Field::Key, key);
                (NodeKind::MemberPattern, loc)
            }
            Pattern::OpRegister { loc, register } => {
                (NodeKind::OpRegisterPattern { register }, loc)
            }
            Pattern::OpTemporary { loc, id } => (NodeKind::OpTemporaryPattern { id }, loc),
        };
        self.fill(node, kind, loc, c);
    }
}

fn unexpected(node: NodeId, kind: &NodeKind, expected: &str) -> Error {
    invariant_error!("Node {} is a {}, not a {}", node, kind.name(), expected)
}

/// Children collected while writing a node.
struct Children {
    parent: NodeId,
    ids: Vec<NodeId>,
}

impl Children {
    fn new(parent: NodeId) -> Self {
        Children {
            parent,
            ids: Vec::new(),
        }
    }

    fn link(&self, field: Field) -> ParentLink {
        ParentLink {
            parent: self.parent,
            field,
            index: self.ids.len(),
        }
    }

    fn statement(&mut self, tree: &mut Tree, field: Field, statement: Statement) {
        let id = tree.alloc(Some(self.link(field)));
        self.ids.push(id);
        tree.write_statement(id, statement);
    }

    fn expression(&mut self, tree: &mut Tree, field: Field, expression: Expression) {
        let id = tree.alloc(Some(self.link(field)));
        self.ids.push(id);
        tree.write_expression(id, expression);
    }

    fn pattern(&mut self, tree: &mut Tree, field: Field, pattern: Pattern) {
        let id = tree.alloc(Some(self.link(field)));
        self.ids.push(id);
        tree.write_pattern(id, pattern);
    }
}

/// Positional access to the children of a slot being rebuilt.
struct Fields<'t> {
    tree: &'t Tree,
    node: NodeId,
    children: &'t [NodeId],
}

impl<'t> Fields<'t> {
    fn new(tree: &'t Tree, node: NodeId, children: &'t [NodeId]) -> Self {
        Fields {
            tree,
            node,
            children,
        }
    }

    fn required(&self, position: usize) -> Result<NodeId> {
        self.children.get(position).copied().ok_or_else(|| {
            invariant_error!("Node {} has no child at position {}", self.node, position)
        })
    }

    fn statement(&self, position: usize) -> Result<Statement> {
        self.tree.statement(self.required(position)?)
    }

    fn expression(&self, position: usize) -> Result<Expression> {
        self.tree.expression(self.required(position)?)
    }

    fn boxed_expression(&self, position: usize) -> Result<Box<Expression>> {
        self.expression(position).map(Box::new)
    }

    fn pattern(&self, position: usize) -> Result<Pattern> {
        self.tree.pattern(self.required(position)?)
    }

    fn optional_statement(&self, position: usize) -> Result<Option<Statement>> {
        self.children
            .get(position)
            .map(|&child| self.tree.statement(child))
            .transpose()
    }

    fn optional_expression(&self, position: usize) -> Result<Option<Expression>> {
        self.children
            .get(position)
            .map(|&child| self.tree.expression(child))
            .transpose()
    }

    fn optional_pattern(&self, position: usize) -> Result<Option<Pattern>> {
        self.children
            .get(position)
            .map(|&child| self.tree.pattern(child))
            .transpose()
    }

    fn statements(&self, from: usize) -> Result<Vec<Statement>> {
        self.children
            .iter()
            .skip(from)
            .map(|&child| self.tree.statement(child))
            .collect()
    }

    fn expressions(&self, from: usize) -> Result<Vec<Expression>> {
        self.children
            .iter()
            .skip(from)
            .map(|&child| self.tree.expression(child))
            .collect()
    }
}
