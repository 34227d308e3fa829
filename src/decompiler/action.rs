//! Action to AST recipes.
//!
//! Every supported action is expressed as a fixed sequence of stack operations: operands are
//! popped into fresh temporaries (`tN = @pop()`) and results are pushed back (`@push(expr)`).
//! Later transforms remove the push/pop pairs that match.

use crate::{
    action::Action,
    ast::{BinaryOperator, Expression, Loc, Pattern, Statement, UnaryOperator},
    decompiler::ScopeContext,
    Error, Result,
};

/// Statement sink bound to a scope, used by the action recipes.
pub struct OpAs2Emitter<'a> {
    scope: &'a mut ScopeContext,
    stream: &'a mut Vec<Statement>,
}

impl<'a> OpAs2Emitter<'a> {
    /// Creates an emitter appending to `stream` and allocating temporaries from `scope`.
    pub fn new(scope: &'a mut ScopeContext, stream: &'a mut Vec<Statement>) -> Self {
        OpAs2Emitter { scope, stream }
    }

    /// Allocates a fresh temporary id.
    pub fn alloc_temp(&mut self) -> u32 {
        self.scope.alloc_temporary()
    }

    /// Appends a statement.
    pub fn write(&mut self, statement: Statement) {
        self.stream.push(statement);
    }

    /// Appends an expression statement.
    pub fn write_expr(&mut self, expression: Expression) {
        self.write(Statement::expression(expression));
    }

    /// Appends `@push(value)`.
    pub fn write_push(&mut self, value: Expression) {
        self.write(Statement::push(value));
    }

    /// Appends `tN = @pop()` for a fresh temporary and returns `N`.
    pub fn write_pop_temp(&mut self) -> u32 {
        let id = self.alloc_temp();
        self.write_expr(Expression::assign(Pattern::temporary(id), Expression::pop()));
        id
    }
}

/// Decompiles a single action into `cx`.
///
/// # Errors
///
/// Returns [`Error::Unsupported`] for actions without a recipe. Nothing is written in that
/// case.
pub fn decompile_action(cx: &mut OpAs2Emitter<'_>, action: &Action) -> Result<()> {
    if let Some(operator) = BinaryOperator::from_action(action) {
        decompile_binary_operation(cx, operator);
        return Ok(());
    }

    match action {
        Action::CallFunction => decompile_call_function(cx),
        Action::ConstantPool { pool } => cx.write(Statement::OpConstantPool {
            loc: Loc::default(),
            pool: pool.clone(),
        }),
        Action::Decrement => decompile_step(cx, BinaryOperator::Subtract),
        Action::DefineLocal => {
            let name = cx.write_pop_temp();
            cx.write(Statement::OpDeclareVariable {
                loc: Loc::default(),
                name: Expression::temporary(name),
                value: None,
            });
        }
        Action::DefineLocal2 => {
            let value = cx.write_pop_temp();
            let name = cx.write_pop_temp();
            cx.write(Statement::OpDeclareVariable {
                loc: Loc::default(),
                name: Expression::temporary(name),
                value: Some(Expression::temporary(value)),
            });
        }
        Action::GetMember => {
            let key = cx.write_pop_temp();
            let base = cx.write_pop_temp();
            cx.write_push(Expression::member(
                Expression::temporary(base),
                Expression::temporary(key),
            ));
        }
        Action::GetProperty => {
            let index = cx.write_pop_temp();
            let base = cx.write_pop_temp();
            cx.write_push(Expression::member(
                Expression::temporary(base),
                property_name(index),
            ));
        }
        Action::GetVariable => {
            let name = cx.write_pop_temp();
            cx.write_push(Expression::OpVariable {
                loc: Loc::default(),
                name: Box::new(Expression::temporary(name)),
            });
        }
        Action::Increment => decompile_step(cx, BinaryOperator::Add),
        Action::InitArray => {
            let count = cx.write_pop_temp();
            cx.write_push(Expression::OpInitArray {
                loc: Loc::default(),
                item_count: Box::new(Expression::temporary(count)),
            });
        }
        Action::InitObject => {
            let count = cx.write_pop_temp();
            cx.write_push(Expression::OpInitObject {
                loc: Loc::default(),
                item_count: Box::new(Expression::temporary(count)),
            });
        }
        Action::Not => decompile_unary_operation(cx, UnaryOperator::LogicalNot),
        Action::Pop => cx.write_expr(Expression::pop()),
        Action::Push { values } => {
            for value in values {
                cx.write_push(Expression::from_value(value));
            }
        }
        Action::PushDuplicate => {
            let value = cx.write_pop_temp();
            cx.write_push(Expression::temporary(value));
            cx.write_push(Expression::temporary(value));
        }
        Action::Return => {
            let value = cx.write_pop_temp();
            cx.write(Statement::Return {
                loc: Loc::default(),
                argument: Some(Expression::temporary(value)),
            });
        }
        Action::SetMember => {
            let value = cx.write_pop_temp();
            let key = cx.write_pop_temp();
            let base = cx.write_pop_temp();
            cx.write_expr(Expression::assign(
                Pattern::member(Expression::temporary(base), Expression::temporary(key)),
                Expression::temporary(value),
            ));
        }
        Action::SetProperty => {
            let value = cx.write_pop_temp();
            let index = cx.write_pop_temp();
            let base = cx.write_pop_temp();
            cx.write_expr(Expression::assign(
                Pattern::member(Expression::temporary(base), property_name(index)),
                Expression::temporary(value),
            ));
        }
        Action::SetVariable => {
            let value = cx.write_pop_temp();
            let name = cx.write_pop_temp();
            cx.write(Statement::SetVariable {
                loc: Loc::default(),
                name: Expression::temporary(name),
                value: Expression::temporary(value),
            });
        }
        Action::StackSwap => {
            let right = cx.write_pop_temp();
            let left = cx.write_pop_temp();
            cx.write_push(Expression::temporary(right));
            cx.write_push(Expression::temporary(left));
        }
        Action::StoreRegister { register } => {
            let value = cx.write_pop_temp();
            cx.write_expr(Expression::assign(
                Pattern::register(*register),
                Expression::temporary(value),
            ));
            cx.write_push(Expression::OpRegister {
                loc: Loc::default(),
                register: *register,
            });
        }
        Action::Throw => {
            let value = cx.write_pop_temp();
            cx.write(Statement::Throw {
                loc: Loc::default(),
                argument: Expression::temporary(value),
            });
        }
        Action::Trace => {
            let value = cx.write_pop_temp();
            cx.write(Statement::OpTrace {
                loc: Loc::default(),
                value: Expression::temporary(value),
            });
        }
        Action::TypeOf => decompile_unary_operation(cx, UnaryOperator::TypeOf),
        other => {
            return Err(Error::Unsupported { kind: other.kind() });
        }
    }
    Ok(())
}

/// Decompiles a straight-line action sequence.
///
/// # Errors
///
/// Returns [`Error::Unsupported`] for the first action without a recipe.
pub fn decompile_actions(scope: &mut ScopeContext, actions: &[Action]) -> Result<Vec<Statement>> {
    let mut body = Vec::new();
    let mut cx = OpAs2Emitter::new(scope, &mut body);
    for action in actions {
        decompile_action(&mut cx, action)?;
    }
    Ok(body)
}

fn decompile_binary_operation(cx: &mut OpAs2Emitter<'_>, operator: BinaryOperator) {
    let right = cx.write_pop_temp();
    let left = cx.write_pop_temp();
    cx.write_push(Expression::binary(
        operator,
        Expression::temporary(left),
        Expression::temporary(right),
    ));
}

fn decompile_unary_operation(cx: &mut OpAs2Emitter<'_>, operator: UnaryOperator) {
    let argument = cx.write_pop_temp();
    cx.write_push(Expression::unary(operator, Expression::temporary(argument)));
}

fn decompile_step(cx: &mut OpAs2Emitter<'_>, operator: BinaryOperator) {
    let argument = cx.write_pop_temp();
    cx.write_push(Expression::binary(
        operator,
        Expression::temporary(argument),
        Expression::number(1.0),
    ));
}

// name, arg count and arguments are popped; the result is pushed
fn decompile_call_function(cx: &mut OpAs2Emitter<'_>) {
    let name = cx.write_pop_temp();
    let count = cx.write_pop_temp();
    let result = cx.alloc_temp();
    cx.write(Statement::OpStackCall {
        loc: Loc::default(),
        target: Some(Pattern::temporary(result)),
        callee: Expression::OpVariable {
            loc: Loc::default(),
            name: Box::new(Expression::temporary(name)),
        },
        arg_count: Expression::temporary(count),
    });
    cx.write_push(Expression::temporary(result));
}

fn property_name(index: u32) -> Expression {
    Expression::OpPropertyName {
        loc: Loc::default(),
        index: Box::new(Expression::temporary(index)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Value;

    fn pop_into(id: u32) -> Statement {
        Statement::expression(Expression::assign(Pattern::temporary(id), Expression::pop()))
    }

    fn decompile(actions: &[Action]) -> Result<Vec<Statement>> {
        decompile_actions(&mut ScopeContext::new(), actions)
    }

    #[test]
    fn test_binary_operation_pops_right_first() {
        let body = decompile(&[Action::Subtract]).unwrap();
        assert_eq!(
            body,
            vec![
                pop_into(0),
                pop_into(1),
                Statement::push(Expression::binary(
                    BinaryOperator::Subtract,
                    Expression::temporary(1),
                    Expression::temporary(0),
                )),
            ]
        );
    }

    #[test]
    fn test_set_variable() {
        let body = decompile(&[Action::SetVariable]).unwrap();
        assert_eq!(
            body[2],
            Statement::SetVariable {
                loc: Loc::default(),
                name: Expression::temporary(1),
                value: Expression::temporary(0),
            }
        );
        assert_eq!(body.len(), 3);
    }

    #[test]
    fn test_store_register_keeps_value_on_stack() {
        let body = decompile(&[Action::StoreRegister { register: 2 }]).unwrap();
        assert_eq!(
            body,
            vec![
                pop_into(0),
                Statement::expression(Expression::assign(
                    Pattern::register(2),
                    Expression::temporary(0)
                )),
                Statement::push(Expression::from_value(&Value::Register(2))),
            ]
        );
    }

    #[test]
    fn test_increment() {
        let body = decompile(&[Action::Increment]).unwrap();
        assert_eq!(
            body[1],
            Statement::push(Expression::binary(
                BinaryOperator::Add,
                Expression::temporary(0),
                Expression::number(1.0)
            ))
        );
    }

    #[test]
    fn test_set_member_pops_value_key_base() {
        let body = decompile(&[Action::SetMember]).unwrap();
        assert_eq!(
            body[3],
            Statement::expression(Expression::assign(
                Pattern::member(Expression::temporary(2), Expression::temporary(1)),
                Expression::temporary(0),
            ))
        );
    }

    #[test]
    fn test_push_emits_one_statement_per_value() {
        let body = decompile(&[Action::Push {
            values: vec![Value::Null, Value::Boolean(false)],
        }])
        .unwrap();
        assert_eq!(
            body,
            vec![
                Statement::push(Expression::null()),
                Statement::push(Expression::boolean(false)),
            ]
        );
    }

    #[test]
    fn test_call_function_goes_through_the_stack() {
        let body = decompile(&[Action::CallFunction]).unwrap();
        assert_eq!(body.len(), 4);
        assert!(matches!(
            &body[2],
            Statement::OpStackCall { target: Some(Pattern::OpTemporary { id: 2, .. }), .. }
        ));
        assert_eq!(body[3], Statement::push(Expression::temporary(2)));
    }

    #[test]
    fn test_unsupported_action() {
        let mut scope = ScopeContext::new();
        let result = decompile_actions(&mut scope, &[Action::Play]);
        assert_eq!(result, Err(Error::Unsupported { kind: "Play" }));
        assert_eq!(scope.next_temporary(), 0);
    }
}
