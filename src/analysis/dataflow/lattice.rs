//! Lattice trait for data flow analysis.
//!
//! Abstract states combine at control flow merge points through a join, the least upper
//! bound. Forward analyses over the CFG start from the least informative state a node can
//! have before it is reached and only ever move up the lattice, which guarantees
//! termination for lattices of finite height.

use std::fmt::Debug;

/// A join semi-lattice with a join (least upper bound) operation.
///
/// The join must satisfy:
///
/// - **Idempotent**: `x.join(x) = x`
/// - **Commutative**: `x.join(y) = y.join(x)`
/// - **Associative**: `x.join(y.join(z)) = (x.join(y)).join(z)`
///
/// # Examples
///
/// ```rust
/// use avm1_decompiler::analysis::dataflow::{CpState, JoinSemiLattice};
///
/// let pool = CpState::singleton(vec!["x".to_string()]);
/// assert_eq!(CpState::Uninitialized.join(&pool), pool);
/// assert!(pool.join(&CpState::Any).is_top());
/// ```
pub trait JoinSemiLattice: Clone + Debug + PartialEq {
    /// Computes the join (least upper bound) of two lattice elements.
    #[must_use]
    fn join(&self, other: &Self) -> Self;

    /// Returns `true` if this is the top element.
    ///
    /// Top absorbs every join: once reached, the state cannot change anymore.
    fn is_top(&self) -> bool;
}
