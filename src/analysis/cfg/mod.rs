//! Control flow graphs over AVM1 actions.
//!
//! # Key Components
//!
//! - [`Cfg`] - Node arena with a cached predecessor index and the mutation API used by the
//!   reduction passes
//! - [`CfgBuilder`] - Construction from an offset addressed action stream
//! - [`Edge`] - Transitions: raw actions, partial expressions, branch markers and recovered
//!   conditionals
//! - [`PartialExpr`] - Expression templates over the operand stack
//!
//! # Shape
//!
//! A node is `Simple` (one successor), `If` (two successors) or `End`. Branches are encoded
//! in two steps: the node computing the test has an [`Edge::IfTest`] to the `If` node, whose
//! arms carry [`Edge::IfTrue`] and [`Edge::IfFalse`]. Reduction collapses such diamonds into
//! a single [`Edge::Conditional`] holding both arms as linear sub-graphs.
//!
//! ```text
//!   n0 ──IfTest──▶ If ──IfTrue──▶ n2 ──▶ ┐
//!                     └─IfFalse─▶ n3 ──▶ n4 ──▶ End
//! ```
//!
//! # Examples
//!
//! ```rust
//! use avm1_decompiler::action::{Action, ActionList};
//! use avm1_decompiler::analysis::{CfgBuilder, TraversalOrder};
//!
//! let cfg = CfgBuilder::build(&ActionList::new(vec![Action::Play]))?;
//! for node in cfg.iter_nodes(TraversalOrder::ReversePostorder) {
//!     for edge in cfg.out_edges(node) {
//!         println!("{} -{}-> {}", edge.from, edge.edge.kind(), edge.to);
//!     }
//! }
//! # Ok::<(), avm1_decompiler::Error>(())
//! ```

mod builder;
mod edge;
mod graph;
mod partial;

pub use builder::CfgBuilder;
pub use edge::{BoundEdge, Edge, Link, Marker};
pub use graph::{build_linear, Cfg, Node, TraversalOrder};
pub use partial::PartialExpr;
