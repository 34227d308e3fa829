use thiserror::Error;

macro_rules! invariant_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::InvariantViolation {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::InvariantViolation {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Errors fall into two groups. Unsupported input ([`Error::Unsupported`]) means an action or
/// syntax node has no decompilation rule; the offending variant is named so callers can report
/// it. Everything else signals a broken internal contract: a chain that is not exclusively owned,
/// a node id from another structure, or a mutation attempted while a traversal is running. These
/// indicate a caller bug and are not meant to be recovered from.
///
/// Out-of-range branch targets during CFG construction are not errors; they end the affected
/// path and are reported through a `tracing` warning.
///
/// # Examples
///
/// ```rust
/// use avm1_decompiler::{action::{Action, ActionList}, Decompiler, Error};
///
/// let actions = ActionList::new(vec![Action::Stop]);
/// match Decompiler::default().decompile(&actions) {
///     Err(Error::Unsupported { kind }) => assert_eq!(kind, "Stop"),
///     other => panic!("unexpected result: {other:?}"),
/// }
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An action, statement, expression or pattern has no decompilation rule.
    ///
    /// `kind` is the variant tag of the rejected value, e.g. `"CallMethod"`.
    #[error("Unsupported operation: {kind}")]
    Unsupported {
        /// Tag of the variant without a rule
        kind: &'static str,
    },

    /// A chain replacement was requested with an empty chain.
    #[error("EmptyChain")]
    EmptyChain,

    /// A chain replacement was requested for nodes that do not form an exclusively owned chain.
    ///
    /// Every node after the first must have in-degree 1, must not be the graph source, and must
    /// be the direct successor of the previous node.
    #[error("InvalidChain")]
    InvalidChain,

    /// An internal structural invariant was broken.
    ///
    /// # Fields
    ///
    /// * `message` - Description of the violated invariant
    /// * `file` - Source file where the violation was detected
    /// * `line` - Source line where the violation was detected
    #[error("Invariant violation - {file}:{line}: {message}")]
    InvariantViolation {
        /// The message describing the violation
        message: String,
        /// The source file in which the violation was detected
        file: &'static str,
        /// The source line in which the violation was detected
        line: u32,
    },

    /// A tree replacement was attempted while a traversal over the same tree is running.
    #[error("Cannot replace nodes while a traversal is active")]
    TraversalActive,

    /// A node id does not belong to the structure it was used with.
    #[error("Node {0} does not exist")]
    NodeNotFound(usize),
}
