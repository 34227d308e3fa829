//! End to end decompilation tests.
//!
//! These tests run the whole pipeline through the public API: CFG construction, reduction
//! passes, lowering to AS2 and the tree transforms.

use avm1_decompiler::{
    action::{Action, ActionList, Value},
    ast::{BinaryOperator, Expression, Pattern, Script, Statement},
    decompiler::{decompile_actions, BuiltinsConfig, ScopeContext},
    transform::eliminate_push_pop,
    tree::{NodeKind, OnEnter, Tree, VisitorAction},
    utils::graph::NodeId,
    Decompiler, DecompilerConfig, Error, Result,
};
use proptest::prelude::*;

fn push(value: Value) -> Action {
    Action::Push {
        values: vec![value],
    }
}

fn trace(argument: Expression) -> Statement {
    Statement::expression(Expression::call(Expression::identifier("trace"), vec![argument]))
}

fn assign(id: u32, value: Expression) -> Statement {
    Statement::expression(Expression::assign(Pattern::temporary(id), value))
}

fn pop_into(id: u32) -> Statement {
    assign(id, Expression::pop())
}

/// Collects the ids of every temporary in the tree, in preorder.
fn temporaries(tree: &Tree) -> Result<Vec<u32>> {
    tree.traverse(
        tree.root(),
        &mut OnEnter(|tree: &Tree, node: NodeId, ids: &mut Vec<u32>| {
            match tree.kind(node) {
                Ok(NodeKind::OpTemporary { id } | NodeKind::OpTemporaryPattern { id }) => {
                    ids.push(*id);
                }
                _ => {}
            }
            VisitorAction::Advance
        }),
        Vec::new(),
    )
}

#[test]
fn test_constant_pool_trace() -> Result<()> {
    let actions = ActionList::new(vec![
        Action::ConstantPool {
            pool: vec!["x".into()],
        },
        push(Value::Constant(0)),
        Action::Trace,
    ]);

    let script = Decompiler::default().decompile(&actions)?;
    assert_eq!(script, Script::new(vec![trace(Expression::string("x"))]));
    Ok(())
}

#[test]
fn test_if_else() -> Result<()> {
    // push c; if L1; push "a"; trace; jump L2; L1: push "b"; trace; L2: push "done"; trace
    let mut actions = ActionList::new(vec![
        push(Value::String("c".into())),
        Action::If { offset: 0 },
        push(Value::String("a".into())),
        Action::Trace,
        Action::Jump { offset: 0 },
        push(Value::String("b".into())),
        Action::Trace,
        push(Value::String("done".into())),
        Action::Trace,
    ]);
    actions.link_branch(1, 5)?;
    actions.link_branch(4, 7)?;

    let script = Decompiler::default().decompile(&actions)?;
    assert_eq!(
        script.body,
        vec![
            assign(1, Expression::string("c")),
            assign(0, Expression::temporary(1)),
            Statement::If {
                loc: Default::default(),
                test: Expression::temporary(0),
                truthy: Box::new(Statement::block(vec![trace(Expression::string("b"))])),
                falsy: Some(Box::new(Statement::block(vec![trace(Expression::string(
                    "a"
                ))]))),
            },
            trace(Expression::string("done")),
        ]
    );
    Ok(())
}

#[test]
fn test_unfolded_stack_traffic_becomes_temporaries() -> Result<()> {
    // Register stores are not folded by the graph passes
    let actions = ActionList::new(vec![
        push(Value::Register(1)),
        Action::StoreRegister { register: 2 },
        Action::Pop,
    ]);
    let register = |register| Expression::OpRegister {
        loc: Default::default(),
        register,
    };

    let script = Decompiler::default().decompile(&actions)?;
    assert_eq!(
        script.body,
        vec![
            assign(1, register(1)),
            assign(0, Expression::temporary(1)),
            Statement::expression(Expression::assign(
                Pattern::register(2),
                Expression::temporary(0),
            )),
            assign(2, register(2)),
            Statement::expression(Expression::temporary(2)),
        ]
    );
    Ok(())
}

#[test]
fn test_push_pop_round_trip() -> Result<()> {
    let mut tree = Tree::new(Script::new(vec![
        Statement::push(Expression::identifier("x")),
        Statement::expression(Expression::call(
            Expression::identifier("f"),
            vec![Expression::pop()],
        )),
    ]));

    assert!(eliminate_push_pop(&mut tree)?);
    assert_eq!(
        tree.into_script()?.body,
        vec![
            assign(0, Expression::identifier("x")),
            Statement::expression(Expression::call(
                Expression::identifier("f"),
                vec![Expression::temporary(0)],
            )),
        ]
    );
    Ok(())
}

#[test]
fn test_scope_allocations_are_monotonic() -> Result<()> {
    let mut tree = Tree::new(Script::new(vec![
        pop_into(3),
        Statement::push(Expression::temporary(3)),
        pop_into(7),
        Statement::push(Expression::temporary(7)),
        pop_into(1),
    ]));
    let max_existing = temporaries(&tree)?.into_iter().max().unwrap_or(0);

    let root = tree.root();
    let mut allocated = Vec::new();
    for _ in 0..4 {
        allocated.push(tree.scope(root)?.alloc_temporary());
    }
    assert!(allocated.windows(2).all(|w| w[0] < w[1]));
    assert!(allocated.iter().all(|&id| id > max_existing));

    // Rewrites draw from the same allocator
    assert!(eliminate_push_pop(&mut tree)?);
    assert_eq!(
        tree.into_script()?.body,
        vec![
            pop_into(3),
            assign(12, Expression::temporary(3)),
            assign(7, Expression::temporary(12)),
            assign(13, Expression::temporary(7)),
            assign(1, Expression::temporary(13)),
        ]
    );
    Ok(())
}

#[test]
fn test_builtin_names_are_configurable() -> Result<()> {
    let config = DecompilerConfig::default()
        .with_builtins(BuiltinsConfig::default().with_trace("log"))
        .with_fixpoint(true);
    let actions = ActionList::new(vec![push(Value::Sint32(3)), Action::Trace]);

    let script = Decompiler::new(config).decompile(&actions)?;
    assert_eq!(
        script.body,
        vec![Statement::expression(Expression::call(
            Expression::identifier("log"),
            vec![Expression::number(3.0)],
        ))]
    );
    Ok(())
}

#[test]
fn test_unsupported_actions_fail_explicitly() {
    for action in [Action::Enumerate, Action::CallMethod, Action::Play] {
        let kind = action.kind();
        let actions = ActionList::new(vec![action]);
        assert_eq!(
            Decompiler::default().decompile(&actions),
            Err(Error::Unsupported { kind })
        );
    }
}

#[test]
fn test_batch_matches_sequential() {
    let units: Vec<ActionList> = (0..8)
        .map(|i| ActionList::new(vec![push(Value::Sint32(i)), Action::Trace]))
        .collect();
    let decompiler = Decompiler::default();

    let batch = decompiler.decompile_batch(&units);
    let sequential: Vec<Result<Script>> = units.iter().map(|u| decompiler.decompile(u)).collect();
    assert_eq!(batch, sequential);
}

fn binary_actions() -> Vec<Action> {
    vec![
        Action::Add,
        Action::Add2,
        Action::BitAnd,
        Action::BitLShift,
        Action::BitOr,
        Action::BitRShift,
        Action::BitURShift,
        Action::BitXor,
        Action::Divide,
        Action::Equals2,
        Action::Greater,
        Action::InstanceOf,
        Action::Less2,
        Action::Modulo,
        Action::Multiply,
        Action::StrictEquals,
        Action::Subtract,
    ]
}

proptest! {
    #[test]
    fn binary_operators_pop_right_then_left(index in 0usize..17) {
        let action = binary_actions()[index].clone();
        let operator = BinaryOperator::from_action(&action).expect("binary operator");

        let body = decompile_actions(&mut ScopeContext::new(), &[action]).unwrap();
        prop_assert_eq!(
            body,
            vec![
                pop_into(0),
                pop_into(1),
                Statement::push(Expression::binary(
                    operator,
                    Expression::temporary(1),
                    Expression::temporary(0),
                )),
            ]
        );
    }

    #[test]
    fn folded_binary_keeps_operand_order(index in 0usize..17, left in any::<i32>(), right in any::<i32>()) {
        let action = binary_actions()[index].clone();
        let operator = BinaryOperator::from_action(&action).expect("binary operator");
        let actions = ActionList::new(vec![
            push(Value::Sint32(left)),
            push(Value::Sint32(right)),
            action,
            Action::Trace,
        ]);

        let script = Decompiler::default().decompile(&actions).unwrap();
        prop_assert_eq!(
            script.body,
            vec![trace(Expression::binary(
                operator,
                Expression::number(f64::from(left)),
                Expression::number(f64::from(right)),
            ))]
        );
    }
}
