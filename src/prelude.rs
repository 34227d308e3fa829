//! # avm1-decompiler Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! of the decompiler. Import it to get quick access to the action model, the control flow
//! graph, the reduction passes and the syntax tree.
//!
//! ```rust
//! use avm1_decompiler::prelude::*;
//!
//! let script = Decompiler::default().decompile(&ActionList::new(vec![Action::Play]));
//! assert!(matches!(script, Err(Error::Unsupported { kind: "Play" })));
//! ```

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all decompiler operations
pub use crate::Error;

/// The result type used throughout the decompiler
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Decompiler facade and its configuration
pub use crate::decompiler::{BuiltinsConfig, Decompiler, DecompilerConfig};

// ================================================================================================
// Input Model
// ================================================================================================

/// Decoded actions and their operands
pub use crate::action::{Action, ActionList, ActionReader, Value};

// ================================================================================================
// Control Flow Analysis
// ================================================================================================

/// Control flow graph, its builder and edge payloads
pub use crate::analysis::{Cfg, CfgBuilder, Edge, Node, PartialExpr, TraversalOrder};

/// Forward dataflow framework and the constant pool analysis
pub use crate::analysis::dataflow::{
    ConstantPoolAnalysis, CpState, DataFlowAnalysis, DataFlowSolver, JoinSemiLattice,
};

/// Graph node identifiers
pub use crate::utils::graph::NodeId;

// ================================================================================================
// Reduction Passes
// ================================================================================================

/// Pass trait, the built-in passes and their scheduler
pub use crate::passes::{
    CfgPass, ConstantPoolPass, ExpressionizePass, PassScheduler, ReduceChainsPass,
    ReduceConditionalsPass,
};

// ================================================================================================
// Syntax Tree
// ================================================================================================

/// Owned AS2 syntax
pub use crate::ast::{
    AssignmentOperator, BinaryOperator, Expression, LogicalOperator, Pattern, Script, Statement,
    UnaryOperator,
};

/// Arena tree and traversal
pub use crate::tree::{NodeKind, OnEnter, Tree, Visitor, VisitorAction};

/// Tree transforms
pub use crate::transform::{
    analyze_stack_usage, eliminate_push_pop, lower_builtins, remove_empty_statements,
    remove_unused_constant_pools, StackState,
};
