//! AVM1 to AS2 decompilation.
//!
//! The [`Decompiler`] drives the whole pipeline for one unit of bytecode:
//!
//! 1. Build the CFG from an [`ActionReader`]
//! 2. Reduce it with the [`PassScheduler`]
//! 3. Lower the reduced CFG to a [`Script`] of VM level statements
//! 4. Rewrite the script as a [`Tree`]: eliminate matched push/pop pairs, lower builtins and
//!    remove leftovers
//!
//! # Examples
//!
//! ```rust
//! use avm1_decompiler::action::{Action, ActionList, Value};
//! use avm1_decompiler::ast::{Expression, Statement};
//! use avm1_decompiler::Decompiler;
//!
//! let actions = ActionList::new(vec![
//!     Action::Push { values: vec![Value::String("hello".into())] },
//!     Action::Trace,
//! ]);
//! let script = Decompiler::default().decompile(&actions)?;
//! assert_eq!(
//!     script.body,
//!     vec![Statement::expression(Expression::call(
//!         Expression::identifier("trace"),
//!         vec![Expression::string("hello")],
//!     ))]
//! );
//! # Ok::<(), avm1_decompiler::Error>(())
//! ```

pub(crate) mod action;
mod config;
mod lower;
mod scope;

pub use action::{decompile_action, decompile_actions, OpAs2Emitter};
pub use config::{BuiltinsConfig, DecompilerConfig};
pub use lower::lower_cfg;
pub use scope::ScopeContext;

use rayon::prelude::*;
use tracing::debug;

use crate::{
    action::ActionReader,
    analysis::{Cfg, CfgBuilder},
    ast::Script,
    passes::PassScheduler,
    transform::{
        eliminate_push_pop, lower_builtins, remove_empty_statements,
        remove_unused_constant_pools,
    },
    tree::Tree,
    Result,
};

/// Decompiles AVM1 action streams to AS2 scripts.
///
/// A `Decompiler` holds no per-unit state and can be shared between threads.
pub struct Decompiler {
    config: DecompilerConfig,
    scheduler: PassScheduler,
}

impl Default for Decompiler {
    fn default() -> Self {
        Self::new(DecompilerConfig::default())
    }
}

impl Decompiler {
    /// Creates a decompiler with the standard reduction pipeline.
    #[must_use]
    pub fn new(config: DecompilerConfig) -> Self {
        let scheduler = PassScheduler::standard(
            &config.builtins.trace,
            config.strict,
            config.fixpoint,
            config.max_iterations,
        );
        Decompiler { config, scheduler }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &DecompilerConfig {
        &self.config
    }

    /// Builds and reduces the CFG of an action stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the CFG cannot be built or a pass fails.
    pub fn build_cfg<R: ActionReader>(&self, reader: &R) -> Result<Cfg> {
        let mut cfg = CfgBuilder::build(reader)?;
        self.scheduler.run(&mut cfg)?;
        Ok(cfg)
    }

    /// Decompiles an action stream.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Unsupported`] if the stream contains an action without a
    /// recipe or a branch that could not be structured.
    pub fn decompile<R: ActionReader>(&self, reader: &R) -> Result<Script> {
        let cfg = self.build_cfg(reader)?;
        self.decompile_cfg(&cfg)
    }

    /// Lowers an already reduced CFG and cleans up the result.
    ///
    /// # Errors
    ///
    /// See [`Decompiler::decompile`].
    pub fn decompile_cfg(&self, cfg: &Cfg) -> Result<Script> {
        let mut scope = ScopeContext::new();
        let script = lower_cfg(cfg, &mut scope)?;

        let mut tree = Tree::new(script);
        if eliminate_push_pop(&mut tree)? {
            debug!("eliminated matched push/pop pairs");
        }
        lower_builtins(&mut tree, &self.config.builtins)?;
        remove_unused_constant_pools(&mut tree)?;
        remove_empty_statements(&mut tree)?;
        tree.into_script()
    }

    /// Decompiles independent units in parallel.
    ///
    /// Results are returned in input order.
    pub fn decompile_batch<R: ActionReader + Sync>(&self, units: &[R]) -> Vec<Result<Script>> {
        units.par_iter().map(|unit| self.decompile(unit)).collect()
    }
}
