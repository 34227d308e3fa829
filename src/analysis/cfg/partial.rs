//! Partially applied expressions.

use crate::ast::Expression;

/// An expression template missing its leading operands.
///
/// The missing operands are the `inputs` topmost values of the operand stack, referenced by
/// [`Expression::Input`] placeholders: `Input { index: inputs - 1 }` is the top of the stack
/// and `Input { index: 0 }` the deepest consumed value. A `void` expression discards its
/// result; otherwise the result is pushed.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialExpr {
    /// Number of consumed stack values
    pub inputs: u32,
    /// Template, referencing the consumed values through `Input` placeholders
    pub expr: Expression,
    /// Whether the result is discarded
    pub void: bool,
}

impl PartialExpr {
    /// Creates a partial expression.
    #[must_use]
    pub const fn new(inputs: u32, expr: Expression, void: bool) -> Self {
        PartialExpr { inputs, expr, void }
    }

    /// Creates a closed expression whose result is pushed.
    #[must_use]
    pub const fn value(expr: Expression) -> Self {
        PartialExpr::new(0, expr, false)
    }

    /// Composes `self` followed by `next` into a single partial expression.
    ///
    /// The value produced by `self` becomes the top of stack input of `next`. Inputs of
    /// `self` are renumbered above the remaining inputs of `next`, so the stack layout seen
    /// by the merged expression is the same as executing both in sequence.
    ///
    /// Returns `None` when `self` is void or `next` takes no input.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use avm1_decompiler::analysis::PartialExpr;
    /// use avm1_decompiler::ast::{Expression, UnaryOperator};
    ///
    /// let push = PartialExpr::value(Expression::number(1.0));
    /// let not = PartialExpr::new(
    ///     1,
    ///     Expression::unary(UnaryOperator::LogicalNot, Expression::input(0)),
    ///     false,
    /// );
    ///
    /// let merged = push.merge(&not).unwrap();
    /// assert_eq!(merged.inputs, 0);
    /// ```
    #[must_use]
    pub fn merge(&self, next: &PartialExpr) -> Option<PartialExpr> {
        if self.void || next.inputs == 0 {
            return None;
        }

        let shift = next.inputs - 1;
        let mut produced = self.expr.clone();
        if shift > 0 {
            produced.substitute_inputs(&mut |index| Some(Expression::input(index + shift)));
        }

        let mut expr = next.expr.clone();
        expr.substitute_inputs(&mut |index| (index == shift).then(|| produced.clone()));

        Some(PartialExpr {
            inputs: self.inputs + shift,
            expr,
            void: next.void,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOperator, UnaryOperator};

    fn push(value: f64) -> PartialExpr {
        PartialExpr::value(Expression::number(value))
    }

    fn add() -> PartialExpr {
        PartialExpr::new(
            2,
            Expression::binary(BinaryOperator::Add, Expression::input(0), Expression::input(1)),
            false,
        )
    }

    fn not() -> PartialExpr {
        PartialExpr::new(
            1,
            Expression::unary(UnaryOperator::LogicalNot, Expression::input(0)),
            false,
        )
    }

    #[test]
    fn test_merge_fills_top_of_stack() {
        let merged = push(2.0).merge(&add()).unwrap();
        assert_eq!(merged.inputs, 1);
        assert_eq!(
            merged.expr,
            Expression::binary(
                BinaryOperator::Add,
                Expression::input(0),
                Expression::number(2.0)
            )
        );

        let merged = push(1.0).merge(&merged).unwrap();
        assert_eq!(merged.inputs, 0);
        assert_eq!(
            merged.expr,
            Expression::binary(
                BinaryOperator::Add,
                Expression::number(1.0),
                Expression::number(2.0)
            )
        );
    }

    #[test]
    fn test_merge_renumbers_inputs_of_the_producer() {
        // not consumes the top, add then takes it and one value below
        let merged = not().merge(&add()).unwrap();
        assert_eq!(merged.inputs, 2);
        assert_eq!(
            merged.expr,
            Expression::binary(
                BinaryOperator::Add,
                Expression::input(0),
                Expression::unary(UnaryOperator::LogicalNot, Expression::input(1)),
            )
        );
    }

    #[test]
    fn test_merge_is_associative() {
        let left = push(1.0).merge(&not()).unwrap().merge(&add()).unwrap();
        let right = push(1.0).merge(&not().merge(&add()).unwrap()).unwrap();
        assert_eq!(left, right);
        assert_eq!(left.inputs, 1);
        assert_eq!(
            left.expr,
            Expression::binary(
                BinaryOperator::Add,
                Expression::input(0),
                Expression::unary(UnaryOperator::LogicalNot, Expression::number(1.0)),
            )
        );
    }

    #[test]
    fn test_merge_keeps_voidness_of_consumer() {
        let trace = PartialExpr::new(
            1,
            Expression::call(Expression::identifier("trace"), vec![Expression::input(0)]),
            true,
        );
        let merged = push(1.0).merge(&trace).unwrap();
        assert!(merged.void);
        assert_eq!(merged.inputs, 0);
    }

    #[test]
    fn test_merge_rejects_void_producer_and_closed_consumer() {
        let void = PartialExpr::new(0, Expression::number(1.0), true);
        assert!(void.merge(&not()).is_none());
        assert!(push(1.0).merge(&push(2.0)).is_none());
    }
}
