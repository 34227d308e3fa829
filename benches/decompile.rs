//! Benchmarks for the decompilation pipeline.
//!
//! - CFG construction from a long straight-line stream
//! - The reduction passes on a chain of nested conditionals
//! - Full decompilation, sequential and batched

extern crate avm1_decompiler;

use avm1_decompiler::{
    action::{Action, ActionList, Value},
    analysis::CfgBuilder,
    passes::PassScheduler,
    Decompiler,
};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

/// `count` repetitions of `push i; push 1; add2; trace`.
fn straight_line(count: i32) -> ActionList {
    let mut actions = vec![Action::ConstantPool {
        pool: vec!["label".into()],
    }];
    for i in 0..count {
        actions.push(Action::Push {
            values: vec![Value::Sint32(i), Value::Constant(0)],
        });
        actions.push(Action::Add2);
        actions.push(Action::Trace);
    }
    ActionList::new(actions)
}

/// `count` consecutive `if (x) trace(i)` blocks.
fn conditionals(count: usize) -> ActionList {
    let mut actions = Vec::new();
    let mut branches = Vec::new();
    for i in 0..count {
        actions.push(Action::Push {
            values: vec![Value::Boolean(i % 2 == 0)],
        });
        branches.push(actions.len());
        actions.push(Action::If { offset: 0 });
        actions.push(Action::Push {
            values: vec![Value::String(format!("branch {i}"))],
        });
        actions.push(Action::Trace);
    }
    let mut list = ActionList::new(actions);
    for branch in branches {
        list.link_branch(branch, branch + 3).unwrap();
    }
    list
}

/// Benchmark CFG construction.
fn bench_build_cfg(c: &mut Criterion) {
    let actions = straight_line(500);

    c.bench_function("build_cfg_straight_line_500", |b| {
        b.iter(|| {
            let cfg = CfgBuilder::build(black_box(&actions)).unwrap();
            black_box(cfg)
        });
    });
}

/// Benchmark the default pass pipeline on a fresh CFG per iteration.
fn bench_passes(c: &mut Criterion) {
    let actions = conditionals(100);
    let cfg = CfgBuilder::build(&actions).unwrap();
    let scheduler = PassScheduler::default();

    c.bench_function("passes_conditionals_100", |b| {
        b.iter(|| {
            let mut cfg = cfg.clone();
            scheduler.run(black_box(&mut cfg)).unwrap();
            black_box(cfg)
        });
    });
}

/// Benchmark full decompilation.
fn bench_decompile(c: &mut Criterion) {
    let decompiler = Decompiler::default();
    let actions = straight_line(200);

    c.bench_function("decompile_straight_line_200", |b| {
        b.iter(|| {
            let script = decompiler.decompile(black_box(&actions)).unwrap();
            black_box(script)
        });
    });
}

/// Benchmark batch decompilation of independent units.
fn bench_decompile_batch(c: &mut Criterion) {
    let decompiler = Decompiler::default();
    let units: Vec<ActionList> = (0..32).map(|_| conditionals(20)).collect();

    c.bench_function("decompile_batch_32x20", |b| {
        b.iter(|| {
            let scripts = decompiler.decompile_batch(black_box(&units));
            black_box(scripts)
        });
    });
}

criterion_group!(
    benches,
    bench_build_cfg,
    bench_passes,
    bench_decompile,
    bench_decompile_batch
);
criterion_main!(benches);
