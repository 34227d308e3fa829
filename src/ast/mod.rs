//! The AS2 syntax tree.
//!
//! Owned recursive enums describing decompiled code: a [`Script`] holds [`Statement`]s, which
//! hold [`Expression`]s and assignment [`Pattern`]s. Every node carries a [`Loc`] annotation
//! that the core pipeline never inspects.
//!
//! Alongside source level constructs the tree has `Op*` nodes for VM concepts (the operand
//! stack, registers, the constant pool, temporaries). Decompilation produces them and the
//! passes in [`crate::transform`] resolve as many as they can.
//!
//! # Examples
//!
//! ```rust
//! use avm1_decompiler::ast::{BinaryOperator, Expression, Script, Statement};
//!
//! let script = Script::new(vec![Statement::expression(Expression::call(
//!     Expression::identifier("trace"),
//!     vec![Expression::binary(
//!         BinaryOperator::Add,
//!         Expression::number(1.0),
//!         Expression::number(2.0),
//!     )],
//! ))]);
//! assert_eq!(script.body.len(), 1);
//! ```

mod expression;
mod operator;
mod pattern;
mod statement;

pub use expression::Expression;
pub use operator::{AssignmentOperator, BinaryOperator, LogicalOperator, UnaryOperator};
pub use pattern::Pattern;
pub use statement::Statement;

/// Opaque source location annotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Loc {
    /// Byte offset of the originating action, when known
    pub offset: Option<usize>,
}

/// Root of a decompiled unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    /// Source location
    pub loc: Loc,
    /// Top-level statements
    pub body: Vec<Statement>,
}

impl Script {
    /// Creates a script from its top-level statements.
    #[must_use]
    pub fn new(body: Vec<Statement>) -> Self {
        Script {
            loc: Loc::default(),
            body,
        }
    }
}
