//! Pass scheduler for the CFG reduction pipeline.
//!
//! The `PassScheduler` runs the registered passes in order. By default the pipeline runs
//! once; with fixpoint iteration enabled it is repeated until no pass changes the graph.

use tracing::debug;

use crate::{
    analysis::Cfg,
    passes::{
        CfgPass, ConstantPoolPass, ExpressionizePass, ReduceChainsPass, ReduceConditionalsPass,
    },
    Result,
};

/// Orchestrates CFG pass execution.
///
/// The standard pipeline is:
///
/// 1. **Constant pool**: [`ConstantPoolPass`]
/// 2. **Expressionize**: [`ExpressionizePass`]
/// 3. **Reduce chains**: [`ReduceChainsPass`]
/// 4. **Reduce conditionals**: [`ReduceConditionalsPass`]
///
/// Running the pipeline once keeps patterns that only become reducible after a later pass
/// (e.g. nested conditionals) unreduced. Enable fixpoint iteration to reduce them too.
pub struct PassScheduler {
    /// Maximum iterations of the whole pipeline in fixpoint mode.
    max_iterations: usize,
    /// Whether the pipeline is repeated until stable.
    fixpoint: bool,
    /// Registered passes, in execution order.
    passes: Vec<Box<dyn CfgPass>>,
}

impl Default for PassScheduler {
    fn default() -> Self {
        Self::standard("trace", false, false, 16)
    }
}

impl PassScheduler {
    /// Creates a scheduler without passes.
    ///
    /// # Arguments
    ///
    /// * `max_iterations` - Maximum iterations of the pipeline in fixpoint mode.
    /// * `fixpoint` - Repeat the pipeline until no pass changes the graph.
    #[must_use]
    pub fn new(max_iterations: usize, fixpoint: bool) -> Self {
        Self {
            max_iterations,
            fixpoint,
            passes: Vec::new(),
        }
    }

    /// Creates a scheduler with the standard pipeline.
    ///
    /// # Arguments
    ///
    /// * `trace_name` - Name of the print builtin produced by expressionize.
    /// * `strict` - Whether unknown actions clobber the constant pool.
    /// * `fixpoint` - Repeat the pipeline until no pass changes the graph.
    /// * `max_iterations` - Maximum iterations of the pipeline in fixpoint mode.
    #[must_use]
    pub fn standard(
        trace_name: &str,
        strict: bool,
        fixpoint: bool,
        max_iterations: usize,
    ) -> Self {
        let mut scheduler = Self::new(max_iterations, fixpoint);
        scheduler.add(ConstantPoolPass::new(strict));
        scheduler.add(ExpressionizePass::new(trace_name));
        scheduler.add(ReduceChainsPass::new());
        scheduler.add(ReduceConditionalsPass::new());
        scheduler
    }

    /// Appends a pass to the pipeline.
    pub fn add(&mut self, pass: impl CfgPass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Appends a pass and returns the scheduler, for chained construction.
    #[must_use]
    pub fn with_pass(mut self, pass: impl CfgPass + 'static) -> Self {
        self.add(pass);
        self
    }

    /// Returns the names of the registered passes, in execution order.
    pub fn pass_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.passes.iter().map(|pass| pass.name())
    }

    /// Runs the pipeline on `cfg`.
    ///
    /// Returns `true` if any pass changed the graph.
    ///
    /// # Errors
    ///
    /// Propagates the first pass failure. The graph may be partially reduced in that case.
    pub fn run(&self, cfg: &mut Cfg) -> Result<bool> {
        if !self.fixpoint {
            return self.run_passes_once(cfg);
        }

        let mut any_changed = false;
        for iteration in 0..self.max_iterations {
            if !self.run_passes_once(cfg)? {
                debug!(iteration, "reduction pipeline reached fixpoint");
                break;
            }
            any_changed = true;
        }
        Ok(any_changed)
    }

    /// Runs all passes once, in order.
    fn run_passes_once(&self, cfg: &mut Cfg) -> Result<bool> {
        let mut any_changed = false;
        for pass in &self.passes {
            if pass.run(cfg)? {
                debug!(pass = pass.name(), "pass changed the graph");
                any_changed = true;
            }
        }
        Ok(any_changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        action::{Action, ActionList, Value},
        analysis::{CfgBuilder, Edge},
    };

    struct Countdown(std::sync::atomic::AtomicUsize);

    impl CfgPass for Countdown {
        fn name(&self) -> &'static str {
            "countdown"
        }

        fn run(&self, _cfg: &mut Cfg) -> Result<bool> {
            use std::sync::atomic::Ordering;
            let left = self.0.load(Ordering::Relaxed);
            if left == 0 {
                return Ok(false);
            }
            self.0.store(left - 1, Ordering::Relaxed);
            Ok(true)
        }
    }

    #[test]
    fn test_standard_pipeline_order() {
        let names: Vec<_> = PassScheduler::default().pass_names().collect();
        assert_eq!(
            names,
            vec!["constant-pool", "expressionize", "reduce-chains", "reduce-conditionals"]
        );
    }

    #[test]
    fn test_with_pass_appends() {
        let scheduler = PassScheduler::new(1, false)
            .with_pass(ReduceChainsPass::new())
            .with_pass(Countdown(1.into()));
        assert_eq!(
            scheduler.pass_names().collect::<Vec<_>>(),
            vec!["reduce-chains", "countdown"]
        );
    }

    #[test]
    fn test_fixpoint_is_bounded() {
        let mut cfg = CfgBuilder::build(&ActionList::new(Vec::new())).unwrap();

        let mut once = PassScheduler::new(10, false);
        once.add(Countdown(5.into()));
        assert!(once.run(&mut cfg).unwrap());

        let mut bounded = PassScheduler::new(3, true);
        bounded.add(Countdown(5.into()));
        assert!(bounded.run(&mut cfg).unwrap());

        let mut stable = PassScheduler::new(10, true);
        stable.add(Countdown(0.into()));
        assert!(!stable.run(&mut cfg).unwrap());
    }

    #[test]
    fn test_reduce_constant_pool_trace() {
        let actions = ActionList::new(vec![
            Action::ConstantPool {
                pool: vec!["x".into()],
            },
            Action::Push {
                values: vec![Value::Constant(0)],
            },
            Action::Trace,
        ]);
        let mut cfg = CfgBuilder::build(&actions).unwrap();

        assert!(PassScheduler::default().run(&mut cfg).unwrap());
        let kinds: Vec<_> = cfg.iter_edges().into_iter().map(|e| e.edge.kind()).collect();
        assert_eq!(kinds, vec!["Action", "Expression"]);
        assert!(matches!(
            cfg.iter_edges()[0].edge,
            Edge::Action(Action::ConstantPool { .. })
        ));
    }
}
