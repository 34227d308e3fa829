//! Forward data flow analysis over the CFG.
//!
//! # Architecture
//!
//! The framework is built around three core abstractions:
//!
//! - **Lattice**: The domain of abstract values with a join operation
//! - **Analysis**: Transfer function across edges and boundary conditions
//! - **Solver**: Iterates full passes in reverse postorder until nothing changes
//!
//! # Analyses Provided
//!
//! - [`ConstantPoolAnalysis`]: Which constant pools can be active at each node
//!
//! # Example
//!
//! ```rust
//! use avm1_decompiler::action::{Action, ActionList, Value};
//! use avm1_decompiler::analysis::{dataflow::reduce_constant_pool, CfgBuilder};
//!
//! let actions = ActionList::new(vec![
//!     Action::ConstantPool { pool: vec!["x".into()] },
//!     Action::Push { values: vec![Value::Constant(0)] },
//! ]);
//! let mut cfg = CfgBuilder::build(&actions)?;
//! assert!(reduce_constant_pool(&mut cfg, false)?);
//! # Ok::<(), avm1_decompiler::Error>(())
//! ```

mod constant_pool;
mod framework;
mod lattice;
mod solver;

pub use constant_pool::{reduce_constant_pool, ConstantPoolAnalysis, CpState};
pub use framework::{AnalysisResults, DataFlowAnalysis};
pub use lattice::JoinSemiLattice;
pub use solver::DataFlowSolver;
