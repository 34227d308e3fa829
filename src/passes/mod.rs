//! CFG reduction passes.
//!
//! Passes rewrite a [`Cfg`](crate::analysis::Cfg) in place towards a structured form: pure
//! actions become expressions, expressions along straight-line code are merged, and
//! branch-and-merge regions become conditional edges. The [`PassScheduler`] drives them in
//! the standard order.
//!
//! # Usage
//!
//! ```rust
//! use avm1_decompiler::action::{Action, ActionList, Value};
//! use avm1_decompiler::analysis::CfgBuilder;
//! use avm1_decompiler::passes::PassScheduler;
//!
//! let actions = ActionList::new(vec![
//!     Action::Push { values: vec![Value::Sint32(1)] },
//!     Action::Trace,
//! ]);
//! let mut cfg = CfgBuilder::build(&actions)?;
//! assert!(PassScheduler::default().run(&mut cfg)?);
//! assert_eq!(cfg.iter_edges().len(), 1);
//! # Ok::<(), avm1_decompiler::Error>(())
//! ```

mod chains;
mod conditionals;
mod constant_pool;
mod expressionize;
mod pass;
mod scheduler;

pub use chains::ReduceChainsPass;
pub use conditionals::ReduceConditionalsPass;
pub use constant_pool::ConstantPoolPass;
pub use expressionize::ExpressionizePass;
pub use pass::CfgPass;
pub use scheduler::PassScheduler;
