//! Graph algorithms for program analysis.
//!
//! # Available Algorithms
//!
//! - [`preorder`] - Stack based depth-first preorder
//! - [`postorder`] - Depth-first postorder
//! - [`reverse_postorder`] - Reverse postorder, the visitation order for forward data flow
//!
//! # Examples
//!
//! ```rust,ignore
//! use avm1_decompiler::utils::graph::algorithms;
//!
//! let order = algorithms::reverse_postorder(&cfg, cfg.source());
//! assert_eq!(order[0], cfg.source());
//! ```

mod traversal;

pub use traversal::{postorder, preorder, reverse_postorder};
