//! Pass trait for the CFG reduction pipeline.

use crate::{analysis::Cfg, Result};

/// A rewrite of a [`Cfg`].
///
/// Passes are stateless between runs and must be thread-safe so that independent units can
/// be reduced in parallel with the same pass instances.
///
/// # Pipeline Integration
///
/// Passes don't declare their own priority. The [`PassScheduler`](crate::passes::PassScheduler)
/// runs them in the order they were registered, which for the default pipeline is:
///
/// 1. **Constant pool**: inline pool references where the pool is known
/// 2. **Expressionize**: convert pure actions to partial expressions
/// 3. **Reduce chains**: merge expressions along straight-line code
/// 4. **Reduce conditionals**: recover `if/else` diamonds
pub trait CfgPass: Send + Sync {
    /// Unique name for logging and debugging.
    fn name(&self) -> &'static str;

    /// Runs the pass.
    ///
    /// Returns `true` if the graph was changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the graph violates an invariant the pass relies on.
    fn run(&self, cfg: &mut Cfg) -> Result<bool>;

    /// Get a description of what this pass does.
    fn description(&self) -> &'static str {
        "No description available"
    }
}
