// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! The outcome of transforming two concurrent operations.
//!
//! Given `left` and `right` built on the same base, a transform tells each
//! replica what it still has to apply:
//!
//! ```text
//!            base
//!           /    \
//!       left      right
//!          \      /
//!  left_ops \    / right_ops
//!            merged
//! ```
//!
//! The left replica (which already applied `left`) applies `left_ops`;
//! the right replica applies `right_ops`. Last-writer-wins algebras only
//! ever need one side to move, so most results are `Left`, `Right` or
//! `Empty`. Operations on disjoint state need both sides to catch up,
//! which is `Both`.

use smallvec::SmallVec;

/// Operations one side applies after a transform.
pub type Ops<O> = SmallVec<[O; 2]>;

/// Adjustments that bring two concurrent replicas to the same state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransformResult<O> {
    /// Both sides already agree.
    Empty,
    /// Only the left side moves.
    Left(Ops<O>),
    /// Only the right side moves.
    Right(Ops<O>),
    /// Both sides move.
    Both {
        /// Applied by the left replica.
        left: Ops<O>,
        /// Applied by the right replica.
        right: Ops<O>,
    },
}

impl<O> TransformResult<O> {
    /// No adjustment needed.
    pub fn empty() -> TransformResult<O> {
        return TransformResult::Empty;
    }

    /// The left side applies `op`; the right side applies nothing.
    pub fn left(op: O) -> TransformResult<O> {
        let mut ops = Ops::new();
        ops.push(op);
        return TransformResult::Left(ops);
    }

    /// The right side applies `op`; the left side applies nothing.
    pub fn right(op: O) -> TransformResult<O> {
        let mut ops = Ops::new();
        ops.push(op);
        return TransformResult::Right(ops);
    }

    /// Build a result from both op lists, collapsing to the narrowest
    /// variant that describes it.
    pub fn of(left: impl IntoIterator<Item = O>, right: impl IntoIterator<Item = O>) -> TransformResult<O> {
        let left: Ops<O> = left.into_iter().collect();
        let right: Ops<O> = right.into_iter().collect();
        return match (left.is_empty(), right.is_empty()) {
            (true, true) => TransformResult::Empty,
            (false, true) => TransformResult::Left(left),
            (true, false) => TransformResult::Right(right),
            (false, false) => TransformResult::Both { left, right },
        };
    }

    /// Operations the left replica applies.
    pub fn left_ops(&self) -> &[O] {
        return match self {
            TransformResult::Left(ops) => ops.as_slice(),
            TransformResult::Both { left, .. } => left.as_slice(),
            TransformResult::Empty | TransformResult::Right(_) => &[],
        };
    }

    /// Operations the right replica applies.
    pub fn right_ops(&self) -> &[O] {
        return match self {
            TransformResult::Right(ops) => ops.as_slice(),
            TransformResult::Both { right, .. } => right.as_slice(),
            TransformResult::Empty | TransformResult::Left(_) => &[],
        };
    }

    /// Split into `(left_ops, right_ops)`.
    pub fn into_parts(self) -> (Ops<O>, Ops<O>) {
        return match self {
            TransformResult::Empty => (Ops::new(), Ops::new()),
            TransformResult::Left(ops) => (ops, Ops::new()),
            TransformResult::Right(ops) => (Ops::new(), ops),
            TransformResult::Both { left, right } => (left, right),
        };
    }

    /// Swap the two sides.
    ///
    /// `transform(b, a)` is always `transform(a, b).mirror()`.
    pub fn mirror(self) -> TransformResult<O> {
        return match self {
            TransformResult::Empty => TransformResult::Empty,
            TransformResult::Left(ops) => TransformResult::Right(ops),
            TransformResult::Right(ops) => TransformResult::Left(ops),
            TransformResult::Both { left, right } => TransformResult::Both { left: right, right: left },
        };
    }

    /// Convert every operation, keeping the sides.
    ///
    /// Used to lift a result over a concrete operation type into a sum
    /// type that embeds it.
    pub fn map<P>(self, mut f: impl FnMut(O) -> P) -> TransformResult<P> {
        return match self {
            TransformResult::Empty => TransformResult::Empty,
            TransformResult::Left(ops) => TransformResult::Left(ops.into_iter().map(&mut f).collect()),
            TransformResult::Right(ops) => TransformResult::Right(ops.into_iter().map(&mut f).collect()),
            TransformResult::Both { left, right } => TransformResult::Both {
                left: left.into_iter().map(&mut f).collect(),
                right: right.into_iter().map(&mut f).collect(),
            },
        };
    }

    /// Check whether neither side has anything to apply.
    pub fn is_empty(&self) -> bool {
        return matches!(self, TransformResult::Empty);
    }
}
