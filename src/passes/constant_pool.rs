use crate::{
    analysis::{dataflow::reduce_constant_pool, Cfg},
    passes::CfgPass,
    Result,
};

/// Inlines constant pool references into `Push` actions.
///
/// See [`reduce_constant_pool`] for the rewrite rule. In strict mode every action other than
/// `ConstantPool` is assumed to clobber the active pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantPoolPass {
    strict: bool,
}

impl ConstantPoolPass {
    /// Creates the pass.
    #[must_use]
    pub const fn new(strict: bool) -> Self {
        ConstantPoolPass { strict }
    }
}

impl CfgPass for ConstantPoolPass {
    fn name(&self) -> &'static str {
        "constant-pool"
    }

    fn run(&self, cfg: &mut Cfg) -> Result<bool> {
        reduce_constant_pool(cfg, self.strict)
    }

    fn description(&self) -> &'static str {
        "Replaces constant pool references by their string when a single pool is active"
    }
}
