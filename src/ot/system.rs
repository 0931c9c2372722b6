// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! The operation registry and the generic transform driver.
//!
//! A document usually edits several kinds of state at once (a title, a
//! set of settings, ...). Its operations form a closed sum type `O`; each
//! variant wraps one concrete operation type with its own algebra. An
//! [`OtSystem<O>`] is a table of that algebra keyed by variant kind:
//!
//! - an empty predicate and an invert function per kind
//! - a transform function per pair of kinds (either orientation)
//! - a squash function per pair of kinds (required for `(k, k)`)
//!
//! The table is assembled with [`OtSystemBuilder`] and checked for
//! coverage when built, so a missing entry fails at startup rather than
//! in the middle of a merge. Once built the system is immutable and can
//! be shared freely between threads.
//!
//! On top of the table the system drives lists of operations:
//! `transform` reconciles two concurrent histories, `squash` compacts a
//! local history and `invert` undoes one.

use std::fmt;
use std::fmt::Debug;
use std::hash::Hash;
use std::slice;

use rustc_hash::FxHashMap;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use super::Algebra;
use super::OtState;
use super::TransformResult;
use crate::error::ConfigError;
use crate::error::OtError;

/// A closed set of operation kinds.
pub trait Variant: Clone {
    /// Tag identifying which variant an operation is.
    type Kind: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    /// Every kind this type can take. The registry must cover all of them.
    const KINDS: &'static [Self::Kind];

    /// The kind of this operation.
    fn kind(&self) -> Self::Kind;
}

/// Links a sum type to one of the concrete operation types it wraps.
///
/// `project` must return `Some` exactly when `kind() == KIND`.
pub trait Embed<T>: Variant {
    /// The kind of operations wrapping a `T`.
    const KIND: Self::Kind;

    /// Wrap a concrete operation.
    fn embed(op: T) -> Self;

    /// Borrow the concrete operation, if this is a `T`.
    fn project(&self) -> Option<&T>;
}

type EmptyFn<O> = Box<dyn Fn(&O) -> bool + Send + Sync>;
type InvertFn<O> = Box<dyn Fn(&O) -> Result<O, OtError> + Send + Sync>;
type TransformFn<O> = Box<dyn Fn(&O, &O) -> Result<TransformResult<O>, OtError> + Send + Sync>;
type SquashFn<O> = Box<dyn Fn(&O, &O) -> Option<O> + Send + Sync>;

type Pair<K> = (K, K);

fn kind_name<K: Debug>(kind: K) -> String {
    return format!("{:?}", kind);
}

fn mismatch<O: Variant>(expected: O::Kind, op: &O) -> OtError {
    return OtError::KindMismatch {
        expected: kind_name(expected),
        actual: kind_name(op.kind()),
    };
}

/// Assembles an [`OtSystem`].
pub struct OtSystemBuilder<O: Variant> {
    empty: FxHashMap<O::Kind, EmptyFn<O>>,
    invert: FxHashMap<O::Kind, InvertFn<O>>,
    transform: FxHashMap<Pair<O::Kind>, TransformFn<O>>,
    squash: FxHashMap<Pair<O::Kind>, SquashFn<O>>,
}

impl<O: Variant + 'static> Default for OtSystemBuilder<O> {
    fn default() -> Self {
        return Self::new();
    }
}

impl<O: Variant + 'static> OtSystemBuilder<O> {
    /// Create an empty builder.
    pub fn new() -> OtSystemBuilder<O> {
        return OtSystemBuilder {
            empty: FxHashMap::default(),
            invert: FxHashMap::default(),
            transform: FxHashMap::default(),
            squash: FxHashMap::default(),
        };
    }

    /// Register the empty predicate for `T`.
    pub fn with_empty_predicate<T: 'static>(mut self, f: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self
    where
        O: Embed<T>,
    {
        self.empty.insert(
            <O as Embed<T>>::KIND,
            Box::new(move |op: &O| {
                // An op that fails to project is never dropped as empty.
                return match <O as Embed<T>>::project(op) {
                    Some(op) => f(op),
                    None => false,
                };
            }),
        );
        return self;
    }

    /// Register the inverse of `T`.
    pub fn with_invert<T: 'static>(mut self, f: impl Fn(&T) -> T + Send + Sync + 'static) -> Self
    where
        O: Embed<T>,
    {
        let kind = <O as Embed<T>>::KIND;
        self.invert.insert(
            kind,
            Box::new(move |op: &O| {
                return match <O as Embed<T>>::project(op) {
                    Some(inner) => Ok(<O as Embed<T>>::embed(f(inner))),
                    None => Err(mismatch(kind, op)),
                };
            }),
        );
        return self;
    }

    /// Register the transform of a left `A` against a right `B`.
    ///
    /// The `(B, A)` orientation is derived by mirroring, so only one of
    /// the two needs registering.
    pub fn with_transform<A: 'static, B: 'static>(
        mut self,
        f: impl Fn(&A, &B) -> Result<TransformResult<O>, OtError> + Send + Sync + 'static,
    ) -> Self
    where
        O: Embed<A> + Embed<B>,
    {
        let left_kind = <O as Embed<A>>::KIND;
        let right_kind = <O as Embed<B>>::KIND;
        self.transform.insert(
            (left_kind, right_kind),
            Box::new(move |left: &O, right: &O| {
                let Some(a) = <O as Embed<A>>::project(left) else {
                    return Err(mismatch(left_kind, left));
                };
                let Some(b) = <O as Embed<B>>::project(right) else {
                    return Err(mismatch(right_kind, right));
                };
                return f(a, b);
            }),
        );
        return self;
    }

    /// Register the squash of a `first: A` followed by a `second: B`.
    ///
    /// `f` returns `None` when the pair cannot be combined.
    pub fn with_squash<A: 'static, B: 'static>(mut self, f: impl Fn(&A, &B) -> Option<O> + Send + Sync + 'static) -> Self
    where
        O: Embed<A> + Embed<B>,
    {
        self.squash.insert(
            (<O as Embed<A>>::KIND, <O as Embed<B>>::KIND),
            Box::new(move |first: &O, second: &O| {
                return match (<O as Embed<A>>::project(first), <O as Embed<B>>::project(second)) {
                    (Some(a), Some(b)) => f(a, b),
                    _ => None,
                };
            }),
        );
        return self;
    }

    /// Register everything for `T` from its [`Algebra`] impl.
    pub fn with_algebra<T: Algebra + 'static>(self) -> Self
    where
        O: Embed<T>,
    {
        return self
            .with_empty_predicate::<T>(T::is_empty)
            .with_invert::<T>(T::invert)
            .with_transform::<T, T>(|left: &T, right: &T| {
                return Ok(left.transform(right).map(<O as Embed<T>>::embed));
            })
            .with_squash::<T, T>(|first: &T, second: &T| {
                return first.squash(second).map(<O as Embed<T>>::embed);
            });
    }

    /// Declare that `A` and `B` touch disjoint state: each side simply
    /// applies the other's operation.
    pub fn with_independent<A: Clone + 'static, B: Clone + 'static>(self) -> Self
    where
        O: Embed<A> + Embed<B>,
    {
        return self.with_transform::<A, B>(|left: &A, right: &B| {
            return Ok(TransformResult::of(
                [<O as Embed<B>>::embed(right.clone())],
                [<O as Embed<A>>::embed(left.clone())],
            ));
        });
    }

    /// Check coverage and freeze the registry.
    pub fn build(self) -> Result<OtSystem<O>, ConfigError> {
        for &kind in O::KINDS {
            if !self.empty.contains_key(&kind) {
                return Err(ConfigError::MissingEmptyPredicate { kind: kind_name(kind) });
            }
            if !self.invert.contains_key(&kind) {
                return Err(ConfigError::MissingInvert { kind: kind_name(kind) });
            }
            if !self.squash.contains_key(&(kind, kind)) {
                return Err(ConfigError::MissingSquash { kind: kind_name(kind) });
            }
        }

        for (i, &left) in O::KINDS.iter().enumerate() {
            for &right in &O::KINDS[i..] {
                if !self.transform.contains_key(&(left, right)) && !self.transform.contains_key(&(right, left)) {
                    return Err(ConfigError::MissingTransform {
                        left: kind_name(left),
                        right: kind_name(right),
                    });
                }
            }
        }

        debug!(
            kinds = O::KINDS.len(),
            transforms = self.transform.len(),
            squashes = self.squash.len(),
            "built ot system"
        );

        return Ok(OtSystem {
            empty: self.empty,
            invert: self.invert,
            transform: self.transform,
            squash: self.squash,
        });
    }
}

/// An immutable registry of operation algebras plus the list driver.
///
/// Every method is a pure function of its arguments.
pub struct OtSystem<O: Variant> {
    empty: FxHashMap<O::Kind, EmptyFn<O>>,
    invert: FxHashMap<O::Kind, InvertFn<O>>,
    transform: FxHashMap<Pair<O::Kind>, TransformFn<O>>,
    squash: FxHashMap<Pair<O::Kind>, SquashFn<O>>,
}

impl<O: Variant> fmt::Debug for OtSystem<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f
            .debug_struct("OtSystem")
            .field("kinds", &O::KINDS)
            .field("transforms", &self.transform.len())
            .field("squashes", &self.squash.len())
            .finish();
    }
}

impl<O: Variant + 'static> OtSystem<O> {
    /// Start assembling a system.
    pub fn builder() -> OtSystemBuilder<O> {
        return OtSystemBuilder::new();
    }

    /// Check if `op` changes nothing.
    pub fn is_empty(&self, op: &O) -> bool {
        return match self.empty.get(&op.kind()) {
            Some(f) => f(op),
            None => false,
        };
    }

    /// Check if every operation in `ops` changes nothing.
    pub fn all_empty(&self, ops: &[O]) -> bool {
        return ops.iter().all(|op| self.is_empty(op));
    }

    /// The operations that undo `ops`: each one inverted, in reverse order.
    pub fn invert(&self, ops: &[O]) -> Result<Vec<O>, OtError> {
        let mut inverted = Vec::with_capacity(ops.len());
        for op in ops.iter().rev() {
            let kind = op.kind();
            let f = self.invert.get(&kind).ok_or_else(|| OtError::Unregistered { kind: kind_name(kind) })?;
            inverted.push(f(op)?);
        }
        return Ok(inverted);
    }

    /// Reconcile two concurrent operations built on the same base.
    ///
    /// The base itself is not inspected: the caller guarantees both
    /// operations were produced from the same state.
    pub fn transform_pair(&self, left: &O, right: &O) -> Result<TransformResult<O>, OtError> {
        let (left_kind, right_kind) = (left.kind(), right.kind());
        trace!(left = ?left_kind, right = ?right_kind, "transform pair");

        if let Some(f) = self.transform.get(&(left_kind, right_kind)) {
            return f(left, right);
        }
        if let Some(f) = self.transform.get(&(right_kind, left_kind)) {
            return Ok(f(right, left)?.mirror());
        }
        return Err(OtError::Unregistered {
            kind: format!("({}, {})", kind_name(left_kind), kind_name(right_kind)),
        });
    }

    /// Reconcile two concurrent histories built on the same base.
    ///
    /// After the left replica applies `left` then `left_ops()` of the
    /// result, and the right replica applies `right` then `right_ops()`,
    /// both hold the same state.
    pub fn transform(&self, left: &[O], right: &[O]) -> Result<TransformResult<O>, OtError> {
        let (left_ops, right_ops) = self.transform_lists(left, right)?;
        return Ok(TransformResult::of(left_ops, right_ops));
    }

    fn transform_lists(&self, left: &[O], right: &[O]) -> Result<(Vec<O>, Vec<O>), OtError> {
        return match (left, right) {
            ([], []) => Ok((Vec::new(), Vec::new())),
            ([], _) => Ok((right.to_vec(), Vec::new())),
            (_, []) => Ok((Vec::new(), left.to_vec())),
            ([l], [r]) => {
                let (left_ops, right_ops) = self.transform_pair(l, r)?.into_parts();
                Ok((left_ops.into_vec(), right_ops.into_vec()))
            }
            ([l], [r, rest @ ..]) => {
                // Catch up with the first right op, then carry the
                // adjusted left side through the rest.
                let (mut left_ops, head) = self.transform_lists(slice::from_ref(l), slice::from_ref(r))?;
                let (tail, right_ops) = self.transform_lists(&head, rest)?;
                left_ops.extend(tail);
                Ok((left_ops, right_ops))
            }
            ([l, rest @ ..], _) => {
                let (head, mut right_ops) = self.transform_lists(slice::from_ref(l), right)?;
                let (left_ops, tail) = self.transform_lists(rest, &head)?;
                right_ops.extend(tail);
                Ok((left_ops, right_ops))
            }
        };
    }

    /// Combine `first` and then `second` into one operation, if a squash
    /// function is registered for the pair and accepts it.
    pub fn try_squash(&self, first: &O, second: &O) -> Option<O> {
        let f = self.squash.get(&(first.kind(), second.kind()))?;
        return f(first, second);
    }

    /// Compact a sequential history from one replica.
    ///
    /// Adjacent operations are combined where possible and operations
    /// that change nothing are dropped. Applying the result is
    /// equivalent to applying `ops`.
    pub fn squash(&self, ops: &[O]) -> Vec<O> {
        let mut squashed = Vec::new();
        let mut iter = ops.iter();
        let Some(first) = iter.next() else {
            return squashed;
        };

        let mut current = first.clone();
        for op in iter {
            match self.try_squash(&current, op) {
                Some(combined) => current = combined,
                None => {
                    let done = std::mem::replace(&mut current, op.clone());
                    if !self.is_empty(&done) {
                        squashed.push(done);
                    }
                }
            }
        }
        if !self.is_empty(&current) {
            squashed.push(current);
        }

        trace!(input = ops.len(), output = squashed.len(), "squash");
        return squashed;
    }

    /// Apply two concurrent histories to `base` and return the state both
    /// replicas converge to.
    ///
    /// Fails with [`OtError::Diverged`] if the two sides end up different,
    /// which means a transform function broke convergence or the histories
    /// were not built on `base`.
    pub fn merge<S>(&self, base: &S, left: &[O], right: &[O]) -> Result<S, OtError>
    where
        S: OtState<O> + Clone + PartialEq,
    {
        let result = self.transform(left, right)?;

        let mut left_state = base.clone();
        left_state.apply_all(left);
        left_state.apply_all(result.left_ops());

        let mut right_state = base.clone();
        right_state.apply_all(right);
        right_state.apply_all(result.right_ops());

        if left_state != right_state {
            warn!(left = left.len(), right = right.len(), "replicas diverged after transform");
            return Err(OtError::Diverged);
        }
        return Ok(left_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // A toy document: an additive counter and a last-writer-wins integer.
    // =========================================================================

    #[derive(Clone, Debug, PartialEq, Eq)]
    struct Add(i64);

    #[derive(Clone, Debug, PartialEq, Eq)]
    struct Set {
        prev: i64,
        next: i64,
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    enum TestOp {
        Add(Add),
        Set(Set),
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    enum TestKind {
        Add,
        Set,
    }

    impl Variant for TestOp {
        type Kind = TestKind;
        const KINDS: &'static [TestKind] = &[TestKind::Add, TestKind::Set];

        fn kind(&self) -> TestKind {
            return match self {
                TestOp::Add(_) => TestKind::Add,
                TestOp::Set(_) => TestKind::Set,
            };
        }
    }

    impl Embed<Add> for TestOp {
        const KIND: TestKind = TestKind::Add;

        fn embed(op: Add) -> TestOp {
            return TestOp::Add(op);
        }

        fn project(&self) -> Option<&Add> {
            return match self {
                TestOp::Add(op) => Some(op),
                _ => None,
            };
        }
    }

    impl Embed<Set> for TestOp {
        const KIND: TestKind = TestKind::Set;

        fn embed(op: Set) -> TestOp {
            return TestOp::Set(op);
        }

        fn project(&self) -> Option<&Set> {
            return match self {
                TestOp::Set(op) => Some(op),
                _ => None,
            };
        }
    }

    #[derive(Clone, Debug, Default, PartialEq, Eq)]
    struct Counters {
        sum: i64,
        value: i64,
    }

    impl OtState<TestOp> for Counters {
        fn apply(&mut self, op: &TestOp) {
            match op {
                TestOp::Add(Add(delta)) => self.sum += delta,
                TestOp::Set(set) => self.value = set.next,
            }
        }
    }

    fn add(delta: i64) -> TestOp {
        return TestOp::Add(Add(delta));
    }

    fn set(prev: i64, next: i64) -> TestOp {
        return TestOp::Set(Set { prev, next });
    }

    fn builder_without_set_transform() -> OtSystemBuilder<TestOp> {
        return OtSystem::builder()
            .with_empty_predicate::<Add>(|op| op.0 == 0)
            .with_empty_predicate::<Set>(|op| op.prev == op.next)
            .with_invert::<Add>(|op| Add(-op.0))
            .with_invert::<Set>(|op| Set { prev: op.next, next: op.prev })
            .with_squash::<Add, Add>(|a, b| Some(TestOp::Add(Add(a.0 + b.0))))
            .with_squash::<Set, Set>(|a, b| Some(TestOp::Set(Set { prev: a.prev, next: b.next })))
            .with_transform::<Add, Add>(|l, r| {
                return Ok(TransformResult::of([TestOp::Add(r.clone())], [TestOp::Add(l.clone())]));
            })
            .with_independent::<Add, Set>();
    }

    fn system() -> OtSystem<TestOp> {
        return builder_without_set_transform()
            .with_transform::<Set, Set>(|l, r| {
                if l.next > r.next {
                    return Ok(TransformResult::right(TestOp::Set(Set { prev: r.next, next: l.next })));
                }
                if l.next < r.next {
                    return Ok(TransformResult::left(TestOp::Set(Set { prev: l.next, next: r.next })));
                }
                return Ok(TransformResult::empty());
            })
            .build()
            .unwrap();
    }

    // =========================================================================
    // Registry validation
    // =========================================================================

    #[test]
    fn build_rejects_missing_transform() {
        let err = builder_without_set_transform().build().unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingTransform {
                left: "Set".to_string(),
                right: "Set".to_string(),
            }
        );
    }

    #[test]
    fn build_rejects_missing_empty_predicate() {
        let err = OtSystem::<TestOp>::builder().build().unwrap_err();
        assert_eq!(err, ConfigError::MissingEmptyPredicate { kind: "Add".to_string() });
    }

    #[test]
    fn build_rejects_missing_squash() {
        let err = OtSystem::<TestOp>::builder()
            .with_empty_predicate::<Add>(|op| op.0 == 0)
            .with_invert::<Add>(|op| Add(-op.0))
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingSquash { kind: "Add".to_string() });
    }

    #[test]
    fn system_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OtSystem<TestOp>>();
    }

    // =========================================================================
    // Driver
    // =========================================================================

    #[test]
    fn reversed_pair_is_mirrored() {
        let system = system();
        let forward = system.transform_pair(&add(1), &set(0, 5)).unwrap();
        let backward = system.transform_pair(&set(0, 5), &add(1)).unwrap();
        assert_eq!(forward.left_ops(), &[set(0, 5)]);
        assert_eq!(forward.right_ops(), &[add(1)]);
        assert_eq!(backward.left_ops(), &[add(1)]);
        assert_eq!(backward.right_ops(), &[set(0, 5)]);
        assert_eq!(backward, forward.mirror());
    }

    #[test]
    fn transform_lists_converge() {
        let system = system();
        let left = vec![add(12), add(13), set(0, 10), set(10, 14), add(-2)];
        let right = vec![set(0, 3), add(-4), set(3, 13), add(43)];

        let merged = system.merge(&Counters::default(), &left, &right).unwrap();
        assert_eq!(merged, Counters { sum: 62, value: 14 });
    }

    #[test]
    fn transform_against_nothing() {
        let system = system();
        let ops = vec![add(1), set(0, 2)];

        let result = system.transform(&ops, &[]).unwrap();
        assert!(result.left_ops().is_empty());
        assert_eq!(result.right_ops(), ops.as_slice());

        assert!(system.transform(&[], &[]).unwrap().is_empty());
    }

    #[test]
    fn squash_combines_and_drops_empty() {
        let system = system();
        let ops = vec![add(1), add(12), add(-5), set(0, 3), set(3, 123)];
        assert_eq!(system.squash(&ops), vec![add(8), set(0, 123)]);

        let adds = vec![add(12), add(13), add(-2)];
        let mut undo = adds.clone();
        undo.extend(system.invert(&adds).unwrap());
        assert!(system.squash(&undo).is_empty());
        assert!(system.squash(&[]).is_empty());
    }

    #[test]
    fn invert_reverses_order() {
        let system = system();
        let ops = vec![add(1), set(0, 3)];
        assert_eq!(system.invert(&ops).unwrap(), vec![set(3, 0), add(-1)]);

        let mut state = Counters::default();
        state.apply_all(&ops);
        state.apply_all(&system.invert(&ops).unwrap());
        assert_eq!(state, Counters::default());
    }

    #[test]
    fn empty_checks() {
        let system = system();
        assert!(system.is_empty(&add(0)));
        assert!(system.is_empty(&set(4, 4)));
        assert!(!system.is_empty(&set(4, 5)));
        assert!(system.all_empty(&[add(0), set(1, 1)]));
        assert!(!system.all_empty(&[add(0), add(1)]));
    }

    #[test]
    fn conflicts_propagate() {
        let system = builder_without_set_transform()
            .with_transform::<Set, Set>(|_, _| Err(OtError::conflict("sets collide")))
            .build()
            .unwrap();

        let err = system.transform(&[add(1), set(0, 1)], &[set(0, 2)]).unwrap_err();
        assert!(err.is_conflict());
    }
}
