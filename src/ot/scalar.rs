// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Last-writer-wins changes to a single value.
//!
//! A `ScalarChange` replaces `previous` with `next` and carries the logical
//! timestamp of the replica that made it. Concurrent changes are ordered by
//! `(timestamp, next)`: the higher timestamp wins, and equal timestamps
//! fall back to the larger value. The value tie-break matters: two replicas
//! can stamp edits with the same time, and ordering them by arrival would
//! let replicas disagree.
//!
//! Structural form: `{"previous": .., "next": .., "timestamp": ..}`.

use std::cmp::Ordering;

use serde::Deserialize;
use serde::Serialize;

use super::Algebra;
use super::OtState;
use super::TransformResult;
use super::primitives::Timestamp;
use super::system::Embed;
use super::system::OtSystem;
use super::system::Variant;
use crate::error::ConfigError;

/// A change of one value from `previous` to `next`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScalarChange<V> {
    previous: V,
    next: V,
    timestamp: Timestamp,
}

impl<V> ScalarChange<V> {
    /// Create a change.
    pub fn new(previous: V, next: V, timestamp: Timestamp) -> ScalarChange<V> {
        return ScalarChange { previous, next, timestamp };
    }

    /// The value this change was made against.
    pub fn previous(&self) -> &V {
        return &self.previous;
    }

    /// The value this change sets.
    pub fn next(&self) -> &V {
        return &self.next;
    }

    /// When this change was made.
    pub fn timestamp(&self) -> Timestamp {
        return self.timestamp;
    }
}

impl<V: Clone + Ord> ScalarChange<V> {
    /// A registry containing only scalar changes.
    pub fn system() -> Result<OtSystem<ScalarChange<V>>, ConfigError>
    where
        V: 'static,
    {
        return OtSystem::builder().with_algebra::<ScalarChange<V>>().build();
    }
}

impl<V: Clone + Ord> Algebra for ScalarChange<V> {
    fn is_empty(&self) -> bool {
        return self.previous == self.next;
    }

    fn invert(&self) -> ScalarChange<V> {
        return ScalarChange::new(self.next.clone(), self.previous.clone(), self.timestamp);
    }

    fn transform(&self, right: &ScalarChange<V>) -> TransformResult<ScalarChange<V>> {
        let ordering = self
            .timestamp
            .cmp(&right.timestamp)
            .then_with(|| self.next.cmp(&right.next));

        return match ordering {
            // Left wins: the right replica moves onto left's value.
            Ordering::Greater => {
                TransformResult::right(ScalarChange::new(right.next.clone(), self.next.clone(), self.timestamp))
            }
            Ordering::Less => {
                TransformResult::left(ScalarChange::new(self.next.clone(), right.next.clone(), right.timestamp))
            }
            Ordering::Equal => TransformResult::empty(),
        };
    }

    fn squash(&self, next: &ScalarChange<V>) -> Option<ScalarChange<V>> {
        return Some(ScalarChange::new(self.previous.clone(), next.next.clone(), next.timestamp));
    }
}

/// Kind tag of a registry holding only scalar changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScalarKind;

impl<V: Clone> Variant for ScalarChange<V> {
    type Kind = ScalarKind;
    const KINDS: &'static [ScalarKind] = &[ScalarKind];

    fn kind(&self) -> ScalarKind {
        return ScalarKind;
    }
}

impl<V: Clone> Embed<ScalarChange<V>> for ScalarChange<V> {
    const KIND: ScalarKind = ScalarKind;

    fn embed(op: ScalarChange<V>) -> ScalarChange<V> {
        return op;
    }

    fn project(&self) -> Option<&ScalarChange<V>> {
        return Some(self);
    }
}

/// A single value mutated by [`ScalarChange`]s.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Register<V> {
    value: V,
}

impl<V> Register<V> {
    /// Create a register holding `value`.
    pub fn new(value: V) -> Register<V> {
        return Register { value };
    }

    /// The current value.
    pub fn get(&self) -> &V {
        return &self.value;
    }

    /// Take the current value out.
    pub fn into_inner(self) -> V {
        return self.value;
    }
}

impl<V: Clone> OtState<ScalarChange<V>> for Register<V> {
    fn apply(&mut self, op: &ScalarChange<V>) {
        self.value = op.next.clone();
    }
}
