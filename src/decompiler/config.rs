//! Configuration for the decompiler.
//!
//! This module provides the configuration types controlling the reduction pipeline and the
//! names substituted for VM builtins.

/// Names substituted for VM builtins during builtin lowering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinsConfig {
    /// Identifier replacing the implicit global object (default: `_global`).
    pub global: String,

    /// Identifier of the print builtin (default: `trace`).
    pub trace: String,
}

impl Default for BuiltinsConfig {
    fn default() -> Self {
        Self {
            global: "_global".to_string(),
            trace: "trace".to_string(),
        }
    }
}

impl BuiltinsConfig {
    /// Sets the identifier replacing the global object.
    #[must_use]
    pub fn with_global(mut self, global: impl Into<String>) -> Self {
        self.global = global.into();
        self
    }

    /// Sets the identifier of the print builtin.
    #[must_use]
    pub fn with_trace(mut self, trace: impl Into<String>) -> Self {
        self.trace = trace.into();
        self
    }
}

/// Configuration for the [`Decompiler`](crate::Decompiler).
///
/// # Examples
///
/// ```rust
/// use avm1_decompiler::DecompilerConfig;
///
/// let config = DecompilerConfig::thorough().with_max_iterations(4);
/// assert!(config.fixpoint);
/// assert_eq!(config.max_iterations, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecompilerConfig {
    /// Builtin names used by expressionize and builtin lowering.
    pub builtins: BuiltinsConfig,

    /// Repeat the reduction pipeline until no pass changes the graph (default: false).
    ///
    /// The default runs every pass exactly once, which leaves some nested patterns
    /// unreduced.
    pub fixpoint: bool,

    /// Treat every action other than `ConstantPool` as clobbering the active constant pool
    /// (default: false).
    pub strict: bool,

    /// Maximum iterations of the reduction pipeline in fixpoint mode (default: 16).
    pub max_iterations: usize,
}

impl Default for DecompilerConfig {
    fn default() -> Self {
        Self {
            builtins: BuiltinsConfig::default(),
            fixpoint: false,
            strict: false,
            max_iterations: 16,
        }
    }
}

impl DecompilerConfig {
    /// Creates a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration iterating the reduction pipeline to a fixpoint.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            fixpoint: true,
            ..Self::default()
        }
    }

    /// Sets the builtin names.
    #[must_use]
    pub fn with_builtins(mut self, builtins: BuiltinsConfig) -> Self {
        self.builtins = builtins;
        self
    }

    /// Enables or disables fixpoint iteration of the reduction pipeline.
    #[must_use]
    pub const fn with_fixpoint(mut self, fixpoint: bool) -> Self {
        self.fixpoint = fixpoint;
        self
    }

    /// Enables or disables strict constant pool tracking.
    #[must_use]
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Sets the maximum number of pipeline iterations in fixpoint mode.
    #[must_use]
    pub const fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let config = DecompilerConfig::new()
            .with_builtins(BuiltinsConfig::default().with_global("_root").with_trace("log"))
            .with_strict(true)
            .with_max_iterations(4);

        assert_eq!(config.builtins.global, "_root");
        assert_eq!(config.builtins.trace, "log");
        assert!(config.strict);
        assert!(!config.fixpoint);
        assert_eq!(config.max_iterations, 4);
        assert_eq!(DecompilerConfig::thorough().with_fixpoint(false), DecompilerConfig::new());
    }
}
