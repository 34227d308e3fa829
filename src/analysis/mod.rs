//! Program analysis infrastructure for AVM1 bytecode.
//!
//! This module builds control flow graphs from action streams and computes properties that
//! propagate along them. It builds upon the generic graph infrastructure in
//! [`crate::utils::graph`].
//!
//! - [`cfg`] - Control flow graph construction and mutation
//! - [`dataflow`] - Forward fixed-point analyses, including constant pool tracking
//!
//! # Usage
//!
//! ```rust
//! use avm1_decompiler::action::{Action, ActionList};
//! use avm1_decompiler::analysis::CfgBuilder;
//!
//! let cfg = CfgBuilder::build(&ActionList::new(vec![Action::Trace]))?;
//! assert_eq!(cfg.in_degree(cfg.source()), 0);
//! # Ok::<(), avm1_decompiler::Error>(())
//! ```

pub mod cfg;
pub mod dataflow;

pub use cfg::{
    build_linear, BoundEdge, Cfg, CfgBuilder, Edge, Link, Marker, Node, PartialExpr,
    TraversalOrder,
};
