//! Expression nodes.

use strum::IntoStaticStr;

use crate::{
    action::Value,
    ast::{
        AssignmentOperator, BinaryOperator, Loc, LogicalOperator, Pattern, UnaryOperator,
    },
};

/// An AS2 expression.
///
/// Besides the source level expressions, the tree carries `Op*` nodes for VM concepts that
/// have not been resolved to structured code yet, and the [`Expression::Input`] placeholder
/// used by partially applied CFG expressions.
#[derive(Debug, Clone, PartialEq, IntoStaticStr)]
pub enum Expression {
    /// Reference to a named binding
    Identifier {
        /// Source location
        loc: Loc,
        /// Binding name
        name: String,
    },
    /// `true` or `false`
    BooleanLiteral {
        /// Source location
        loc: Loc,
        /// Literal value
        value: bool,
    },
    /// Numeric literal
    NumberLiteral {
        /// Source location
        loc: Loc,
        /// Literal value
        value: f64,
    },
    /// String literal
    StringLiteral {
        /// Source location
        loc: Loc,
        /// Literal value
        value: String,
    },
    /// `null`
    NullLiteral {
        /// Source location
        loc: Loc,
    },
    /// Prefix operator application
    Unary {
        /// Source location
        loc: Loc,
        /// Operator
        operator: UnaryOperator,
        /// Operand
        argument: Box<Expression>,
    },
    /// Binary operator application
    Binary {
        /// Source location
        loc: Loc,
        /// Operator
        operator: BinaryOperator,
        /// Left operand
        left: Box<Expression>,
        /// Right operand
        right: Box<Expression>,
    },
    /// Short-circuiting operator application
    Logical {
        /// Source location
        loc: Loc,
        /// Operator
        operator: LogicalOperator,
        /// Left operand
        left: Box<Expression>,
        /// Right operand
        right: Box<Expression>,
    },
    /// Assignment, evaluating to the assigned value
    Assignment {
        /// Source location
        loc: Loc,
        /// Operator
        operator: AssignmentOperator,
        /// Assigned location
        target: Box<Pattern>,
        /// Assigned value
        value: Box<Expression>,
    },
    /// `base[key]`
    Member {
        /// Source location
        loc: Loc,
        /// Object
        base: Box<Expression>,
        /// Computed key
        key: Box<Expression>,
    },
    /// `callee(arguments)`
    Call {
        /// Source location
        loc: Loc,
        /// Called function
        callee: Box<Expression>,
        /// Arguments in source order
        arguments: Vec<Expression>,
    },
    /// Comma separated expressions
    Sequence {
        /// Source location
        loc: Loc,
        /// Expressions in evaluation order
        expressions: Vec<Expression>,
    },
    /// `test ? truthy : falsy`
    Conditional {
        /// Source location
        loc: Loc,
        /// Condition
        test: Box<Expression>,
        /// Value when the condition holds
        truthy: Box<Expression>,
        /// Value otherwise
        falsy: Box<Expression>,
    },
    /// Constant pool slot, not yet resolved to a string
    OpConstant {
        /// Source location
        loc: Loc,
        /// Pool index
        index: u16,
    },
    /// Register read
    OpRegister {
        /// Source location
        loc: Loc,
        /// Register number
        register: u8,
    },
    /// Compiler introduced temporary
    OpTemporary {
        /// Source location
        loc: Loc,
        /// Temporary id, unique within its scope
        id: u32,
    },
    /// The `_global` object
    OpGlobal {
        /// Source location
        loc: Loc,
    },
    /// Value popped from the operand stack
    OpPop {
        /// Source location
        loc: Loc,
    },
    /// Variable read by computed name
    OpVariable {
        /// Source location
        loc: Loc,
        /// Variable name
        name: Box<Expression>,
    },
    /// Movie clip property name by computed index
    OpPropertyName {
        /// Source location
        loc: Loc,
        /// Property index
        index: Box<Expression>,
    },
    /// `undefined`
    OpUndefined {
        /// Source location
        loc: Loc,
    },
    /// Array built from stack items
    OpInitArray {
        /// Source location
        loc: Loc,
        /// Number of items
        item_count: Box<Expression>,
    },
    /// Object built from stack items
    OpInitObject {
        /// Source location
        loc: Loc,
        /// Number of key/value pairs
        item_count: Box<Expression>,
    },
    /// Operand slot of a partially applied expression
    ///
    /// `Input { index: n - 1 }` of an `n` input expression is the top of the stack.
    Input {
        /// Slot index
        index: u32,
    },
}

impl Expression {
    /// Returns the variant tag of this expression.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// Creates an [`Expression::Identifier`].
    pub fn identifier(name: impl Into<String>) -> Self {
        Expression::Identifier {
            loc: Loc::default(),
            name: name.into(),
        }
    }

    /// Creates an [`Expression::BooleanLiteral`].
    #[must_use]
    pub fn boolean(value: bool) -> Self {
        Expression::BooleanLiteral {
            loc: Loc::default(),
            value,
        }
    }

    /// Creates an [`Expression::NumberLiteral`].
    #[must_use]
    pub fn number(value: f64) -> Self {
        Expression::NumberLiteral {
            loc: Loc::default(),
            value,
        }
    }

    /// Creates an [`Expression::StringLiteral`].
    pub fn string(value: impl Into<String>) -> Self {
        Expression::StringLiteral {
            loc: Loc::default(),
            value: value.into(),
        }
    }

    /// Creates an [`Expression::NullLiteral`].
    #[must_use]
    pub fn null() -> Self {
        Expression::NullLiteral {
            loc: Loc::default(),
        }
    }

    /// Creates an [`Expression::Unary`].
    #[must_use]
    pub fn unary(operator: UnaryOperator, argument: Expression) -> Self {
        Expression::Unary {
            loc: Loc::default(),
            operator,
            argument: Box::new(argument),
        }
    }

    /// Creates an [`Expression::Binary`].
    #[must_use]
    pub fn binary(operator: BinaryOperator, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            loc: Loc::default(),
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Creates a simple [`Expression::Assignment`].
    #[must_use]
    pub fn assign(target: Pattern, value: Expression) -> Self {
        Expression::Assignment {
            loc: Loc::default(),
            operator: AssignmentOperator::Simple,
            target: Box::new(target),
            value: Box::new(value),
        }
    }

    /// Creates an [`Expression::Member`].
    #[must_use]
    pub fn member(base: Expression, key: Expression) -> Self {
        Expression::Member {
            loc: Loc::default(),
            base: Box::new(base),
            key: Box::new(key),
        }
    }

    /// Creates an [`Expression::Call`].
    #[must_use]
    pub fn call(callee: Expression, arguments: Vec<Expression>) -> Self {
        Expression::Call {
            loc: Loc::default(),
            callee: Box::new(callee),
            arguments,
        }
    }

    /// Creates an [`Expression::OpTemporary`].
    #[must_use]
    pub fn temporary(id: u32) -> Self {
        Expression::OpTemporary {
            loc: Loc::default(),
            id,
        }
    }

    /// Creates an [`Expression::OpPop`].
    #[must_use]
    pub fn pop() -> Self {
        Expression::OpPop {
            loc: Loc::default(),
        }
    }

    /// Creates an [`Expression::OpUndefined`].
    #[must_use]
    pub fn undefined() -> Self {
        Expression::OpUndefined {
            loc: Loc::default(),
        }
    }

    /// Creates an [`Expression::Input`] placeholder.
    #[must_use]
    pub const fn input(index: u32) -> Self {
        Expression::Input { index }
    }

    /// Converts a pushed value to the expression producing it.
    ///
    /// Constant pool references and registers stay symbolic.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let loc = Loc::default();
        match value {
            Value::Boolean(value) => Expression::BooleanLiteral { loc, value: *value },
            Value::Constant(index) => Expression::OpConstant { loc, index: *index },
            Value::Float32(value) => Expression::number(f64::from(*value)),
            Value::Float64(value) => Expression::number(*value),
            Value::Null => Expression::NullLiteral { loc },
            Value::Register(register) => Expression::OpRegister {
                loc,
                register: *register,
            },
            Value::Sint32(value) => Expression::number(f64::from(*value)),
            Value::String(value) => Expression::string(value.as_str()),
            Value::Undefined => Expression::OpUndefined { loc },
        }
    }

    /// Calls `f` on every direct child expression, including the expressions nested in an
    /// assignment target.
    pub fn for_each_child_mut(&mut self, f: &mut dyn FnMut(&mut Expression)) {
        match self {
            Expression::Identifier { .. }
            | Expression::BooleanLiteral { .. }
            | Expression::NumberLiteral { .. }
            | Expression::StringLiteral { .. }
            | Expression::NullLiteral { .. }
            | Expression::OpConstant { .. }
            | Expression::OpRegister { .. }
            | Expression::OpTemporary { .. }
            | Expression::OpGlobal { .. }
            | Expression::OpPop { .. }
            | Expression::OpUndefined { .. }
            | Expression::Input { .. } => {}
            Expression::Unary { argument, .. } => f(argument),
            Expression::Binary { left, right, .. } | Expression::Logical { left, right, .. } => {
                f(left);
                f(right);
            }
            Expression::Assignment { target, value, .. } => {
                if let Pattern::Member { base, key, .. } = target.as_mut() {
                    f(base);
                    f(key);
                }
                f(value);
            }
            Expression::Member { base, key, .. } => {
                f(base);
                f(key);
            }
            Expression::Call {
                callee, arguments, ..
            } => {
                f(callee);
                for argument in arguments {
                    f(argument);
                }
            }
            Expression::Sequence { expressions, .. } => {
                for expression in expressions {
                    f(expression);
                }
            }
            Expression::Conditional {
                test,
                truthy,
                falsy,
                ..
            } => {
                f(test);
                f(truthy);
                f(falsy);
            }
            Expression::OpVariable { name: inner, .. }
            | Expression::OpPropertyName { index: inner, .. }
            | Expression::OpInitArray {
                item_count: inner, ..
            }
            | Expression::OpInitObject {
                item_count: inner, ..
            } => f(inner),
        }
    }

    /// Replaces every [`Expression::Input`] placeholder for which `resolve` returns a value.
    ///
    /// Substituted expressions are not visited again.
    pub fn substitute_inputs(&mut self, resolve: &mut dyn FnMut(u32) -> Option<Expression>) {
        if let Expression::Input { index } = self {
            if let Some(replacement) = resolve(*index) {
                *self = replacement;
            }
            return;
        }
        self.for_each_child_mut(&mut |child| child.substitute_inputs(resolve));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(Expression::pop().kind(), "OpPop");
        assert_eq!(Expression::number(1.0).kind(), "NumberLiteral");
    }

    #[test]
    fn test_from_value() {
        assert_eq!(Expression::from_value(&Value::Sint32(-3)), Expression::number(-3.0));
        assert_eq!(
            Expression::from_value(&Value::String("x".into())),
            Expression::string("x")
        );
        assert_eq!(
            Expression::from_value(&Value::Constant(4)),
            Expression::OpConstant {
                loc: Loc::default(),
                index: 4
            }
        );
        assert_eq!(Expression::from_value(&Value::Undefined), Expression::undefined());
    }

    #[test]
    fn test_substitute_inputs_reaches_nested_slots() {
        let mut expr = Expression::call(
            Expression::identifier("f"),
            vec![
                Expression::input(0),
                Expression::unary(UnaryOperator::LogicalNot, Expression::input(1)),
            ],
        );
        expr.substitute_inputs(&mut |index| Some(Expression::number(f64::from(index) + 10.0)));

        assert_eq!(
            expr,
            Expression::call(
                Expression::identifier("f"),
                vec![
                    Expression::number(10.0),
                    Expression::unary(UnaryOperator::LogicalNot, Expression::number(11.0)),
                ],
            )
        );
    }

    #[test]
    fn test_substitute_inputs_does_not_revisit_replacements() {
        let mut expr = Expression::input(0);
        expr.substitute_inputs(&mut |index| Some(Expression::input(index + 1)));
        assert_eq!(expr, Expression::input(1));
    }

    #[test]
    fn test_substitute_inputs_in_member_target() {
        let mut expr = Expression::assign(
            Pattern::member(Expression::input(0), Expression::input(1)),
            Expression::input(2),
        );
        expr.substitute_inputs(&mut |index| Some(Expression::temporary(index)));
        assert_eq!(
            expr,
            Expression::assign(
                Pattern::member(Expression::temporary(0), Expression::temporary(1)),
                Expression::temporary(2),
            )
        );
    }
}
