// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Operational transformation for small pieces of shared state.
//!
//! Every edit is an immutable operation. Each operation type describes its
//! algebra through [`Algebra`]; an [`OtSystem`](system::OtSystem) collects
//! the algebras of every operation kind a document uses and drives
//! transform, squash and invert over lists of operations.

pub mod document;
pub mod map;
pub mod primitives;
pub mod result;
pub mod scalar;
pub mod system;

pub use result::TransformResult;

/// The algebra of one operation type.
///
/// Implementations must satisfy, for every state `s` the operations apply
/// to:
/// - Convergence: for `a`, `b` built on `s`, `s + a + left_ops == s + b +
///   right_ops` where the ops come from `a.transform(&b)`.
/// - Symmetry: `b.transform(&a) == a.transform(&b).mirror()`.
/// - Inversion: `s + op + op.invert() == s`.
/// - Squash: `s + first.squash(&second) == s + first + second` whenever
///   it returns `Some`.
pub trait Algebra: Clone {
    /// Check if applying this operation leaves any state unchanged.
    fn is_empty(&self) -> bool;

    /// The operation that undoes this one.
    fn invert(&self) -> Self;

    /// Reconcile this operation with a concurrent `right` built on the
    /// same base.
    fn transform(&self, right: &Self) -> TransformResult<Self>;

    /// Combine this operation with `next`, applied right after it on the
    /// same replica, into a single operation.
    ///
    /// Returns `None` when the two cannot be expressed as one operation.
    fn squash(&self, next: &Self) -> Option<Self>;
}

/// A value mutated by applying operations.
pub trait OtState<O> {
    /// Apply one operation.
    fn apply(&mut self, op: &O);

    /// Apply operations in order.
    fn apply_all<'a>(&mut self, ops: impl IntoIterator<Item = &'a O>)
    where
        O: 'a,
    {
        for op in ops {
            self.apply(op);
        }
    }
}
