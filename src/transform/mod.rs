//! Rewrites applied to the decompiled script.
//!
//! The decompiler first produces a script that still contains explicit stack operations and
//! builtin placeholders. The transforms in this module run on a [`Tree`](crate::tree::Tree) in
//! this order:
//!
//! 1. [`eliminate_push_pop`] binds matched push/pop pairs to temporaries, driven by the
//!    [`analyze_stack_usage`] analysis
//! 2. [`lower_builtins`] replaces `OpGlobal` and `OpTrace` by configurable identifiers
//! 3. [`remove_unused_constant_pools`] and [`remove_empty_statements`] drop leftovers
//!
//! Analyses are built on the [`InputOutputAnalyzer`], which walks the tree once in evaluation
//! order with a [`TransferRule`].

pub mod analyzer;
mod builtins;
mod cleanup;
mod push_pop;
pub mod stack_usage;

pub use analyzer::{AnalysisMap, InputOutput, InputOutputAnalyzer, TransferRule};
pub use builtins::lower_builtins;
pub use cleanup::{remove_empty_statements, remove_unused_constant_pools};
pub use push_pop::eliminate_push_pop;
pub use stack_usage::{analyze_stack_usage, StackState, StackUsage};
