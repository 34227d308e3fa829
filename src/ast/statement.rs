//! Statement nodes.

use strum::IntoStaticStr;

use crate::ast::{Expression, Loc, Pattern};

/// An AS2 statement.
///
/// The `Op*` statements are VM level effects that later transforms either lower to source
/// level statements or leave for the emitter.
#[derive(Debug, Clone, PartialEq, IntoStaticStr)]
pub enum Statement {
    /// `{ ... }`
    Block {
        /// Source location
        loc: Loc,
        /// Statements in order
        body: Vec<Statement>,
    },
    /// `;`
    Empty {
        /// Source location
        loc: Loc,
    },
    /// Expression evaluated for its effects
    Expression {
        /// Source location
        loc: Loc,
        /// The evaluated expression
        expression: Expression,
    },
    /// `if (test) truthy else falsy`
    If {
        /// Source location
        loc: Loc,
        /// Condition
        test: Expression,
        /// Branch taken when the condition holds
        truthy: Box<Statement>,
        /// Optional `else` branch
        falsy: Option<Box<Statement>>,
    },
    /// `return argument;`
    Return {
        /// Source location
        loc: Loc,
        /// Returned value
        argument: Option<Expression>,
    },
    /// `throw argument;`
    Throw {
        /// Source location
        loc: Loc,
        /// Thrown value
        argument: Expression,
    },
    /// Variable write by computed name
    SetVariable {
        /// Source location
        loc: Loc,
        /// Variable name
        name: Expression,
        /// Assigned value
        value: Expression,
    },
    /// Constant pool definition
    OpConstantPool {
        /// Source location
        loc: Loc,
        /// Pool entries
        pool: Vec<String>,
    },
    /// Local variable declaration by computed name
    OpDeclareVariable {
        /// Source location
        loc: Loc,
        /// Variable name
        name: Expression,
        /// Initial value
        value: Option<Expression>,
    },
    /// Push onto the operand stack
    OpPush {
        /// Source location
        loc: Loc,
        /// Pushed value
        value: Expression,
    },
    /// `trace(value)`
    OpTrace {
        /// Source location
        loc: Loc,
        /// Printed value
        value: Expression,
    },
    /// Call whose arguments are taken from the operand stack
    OpStackCall {
        /// Source location
        loc: Loc,
        /// Where the result is stored, if anywhere
        target: Option<Pattern>,
        /// Called function
        callee: Expression,
        /// Number of stack arguments
        arg_count: Expression,
    },
}

impl Statement {
    /// Returns the variant tag of this statement.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// Creates a [`Statement::Expression`].
    #[must_use]
    pub fn expression(expression: Expression) -> Self {
        Statement::Expression {
            loc: Loc::default(),
            expression,
        }
    }

    /// Creates a [`Statement::Block`].
    #[must_use]
    pub fn block(body: Vec<Statement>) -> Self {
        Statement::Block {
            loc: Loc::default(),
            body,
        }
    }

    /// Creates a [`Statement::Empty`].
    #[must_use]
    pub fn empty() -> Self {
        Statement::Empty {
            loc: Loc::default(),
        }
    }

    /// Creates a [`Statement::OpPush`].
    #[must_use]
    pub fn push(value: Expression) -> Self {
        Statement::OpPush {
            loc: Loc::default(),
            value,
        }
    }

    /// Returns `true` for [`Statement::Empty`].
    #[must_use]
    pub const fn is_empty_statement(&self) -> bool {
        matches!(self, Statement::Empty { .. })
    }
}
