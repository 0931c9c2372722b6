// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Patches over a map of independent fields.
//!
//! A [`MapPatch`] changes any number of fields at once; each entry is a
//! [`FieldChange`] from an optional previous value to an optional next
//! value, where `None` means "absent". Fields never interact, so a
//! concurrent pair is reconciled one field at a time:
//!
//! - a field only one side touched is passed through to the other side
//! - a field both sides set to the same value needs nothing
//! - otherwise the field is a last-writer-wins conflict, resolved with the
//!   same `(timestamp, next)` order as [`ScalarChange`](super::scalar::ScalarChange)
//!
//! Entries with `previous == next` are dropped whenever a patch is built,
//! including when one is decoded, so an empty patch is exactly one with no
//! entries.
//!
//! Structural form: `{"field": {"previous": .., "next": .., "timestamp": ..}, ..}`.
//! A missing `timestamp` decodes as [`Timestamp::ZERO`].

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

use super::Algebra;
use super::OtState;
use super::TransformResult;
use super::primitives::Timestamp;
use super::system::Embed;
use super::system::OtSystem;
use super::system::Variant;
use crate::error::ConfigError;

/// A change to one field of a map.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldChange<V> {
    /// The value before the change, `None` if the field was absent.
    pub previous: Option<V>,
    /// The value after the change, `None` to remove the field.
    pub next: Option<V>,
    /// When the change was made.
    #[serde(default)]
    pub timestamp: Timestamp,
}

impl<V: PartialEq> FieldChange<V> {
    /// Create a field change.
    pub fn new(previous: Option<V>, next: Option<V>, timestamp: Timestamp) -> FieldChange<V> {
        return FieldChange { previous, next, timestamp };
    }

    /// Check if the change leaves the field as it was.
    pub fn is_empty(&self) -> bool {
        return self.previous == self.next;
    }
}

impl<V: Clone> FieldChange<V> {
    fn inverted(&self) -> FieldChange<V> {
        return FieldChange {
            previous: self.next.clone(),
            next: self.previous.clone(),
            timestamp: self.timestamp,
        };
    }
}

/// A set of independent field changes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MapPatch<K, V> {
    changes: BTreeMap<K, FieldChange<V>>,
}

impl<K: Ord, V: PartialEq> MapPatch<K, V> {
    /// Create a patch whose changes all carry `timestamp`.
    ///
    /// Each item is `(field, previous, next)`.
    pub fn new(timestamp: Timestamp, changes: impl IntoIterator<Item = (K, Option<V>, Option<V>)>) -> MapPatch<K, V> {
        return MapPatch::from_changes(
            changes
                .into_iter()
                .map(|(key, previous, next)| (key, FieldChange::new(previous, next, timestamp))),
        );
    }

    /// Create a patch from already stamped field changes.
    pub fn from_changes(changes: impl IntoIterator<Item = (K, FieldChange<V>)>) -> MapPatch<K, V> {
        let changes = changes.into_iter().filter(|(_, change)| !change.is_empty()).collect();
        return MapPatch { changes };
    }

    /// A patch setting one field to `next`.
    pub fn set(key: K, previous: Option<V>, next: V, timestamp: Timestamp) -> MapPatch<K, V> {
        return MapPatch::new(timestamp, [(key, previous, Some(next))]);
    }

    /// A patch removing one field.
    pub fn remove(key: K, previous: V, timestamp: Timestamp) -> MapPatch<K, V> {
        return MapPatch::new(timestamp, [(key, Some(previous), None)]);
    }
}

impl<K, V> MapPatch<K, V> {
    /// The changes in this patch, keyed by field.
    pub fn changes(&self) -> &BTreeMap<K, FieldChange<V>> {
        return &self.changes;
    }

    /// The change to `key`, if this patch touches it.
    pub fn get(&self, key: &K) -> Option<&FieldChange<V>>
    where
        K: Ord,
    {
        return self.changes.get(key);
    }

    /// Number of fields touched.
    pub fn len(&self) -> usize {
        return self.changes.len();
    }

    /// Check if the patch touches no field.
    pub fn is_empty(&self) -> bool {
        return self.changes.is_empty();
    }
}

impl<K: Ord + Clone, V: Clone + Ord> MapPatch<K, V> {
    /// A registry containing only map patches.
    pub fn system() -> Result<OtSystem<MapPatch<K, V>>, ConfigError>
    where
        K: 'static,
        V: 'static,
    {
        return OtSystem::builder().with_algebra::<MapPatch<K, V>>().build();
    }
}

impl<K: Serialize, V: Serialize> Serialize for MapPatch<K, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        return self.changes.serialize(serializer);
    }
}

impl<'de, K, V> Deserialize<'de> for MapPatch<K, V>
where
    K: Ord + Deserialize<'de>,
    V: PartialEq + Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let changes = BTreeMap::<K, FieldChange<V>>::deserialize(deserializer)?;
        return Ok(MapPatch::from_changes(changes));
    }
}

/// How two concurrent changes to the same field reconcile.
enum FieldOutcome<V> {
    /// Both sides already hold the same value.
    Agree,
    /// The left replica has to apply this change.
    Left(FieldChange<V>),
    /// The right replica has to apply this change.
    Right(FieldChange<V>),
}

fn resolve_field<V: Clone + Ord>(left: &FieldChange<V>, right: &FieldChange<V>) -> FieldOutcome<V> {
    if left.next == right.next {
        return FieldOutcome::Agree;
    }
    if (left.timestamp, &left.next) > (right.timestamp, &right.next) {
        return FieldOutcome::Right(FieldChange::new(right.next.clone(), left.next.clone(), left.timestamp));
    }
    return FieldOutcome::Left(FieldChange::new(left.next.clone(), right.next.clone(), right.timestamp));
}

impl<K: Ord + Clone, V: Clone + Ord> Algebra for MapPatch<K, V> {
    fn is_empty(&self) -> bool {
        return self.changes.is_empty();
    }

    fn invert(&self) -> MapPatch<K, V> {
        let changes = self
            .changes
            .iter()
            .map(|(key, change)| (key.clone(), change.inverted()))
            .collect();
        return MapPatch { changes };
    }

    fn transform(&self, right: &MapPatch<K, V>) -> TransformResult<MapPatch<K, V>> {
        let mut left_ops = BTreeMap::new();
        let mut right_ops = BTreeMap::new();

        for (key, change) in &self.changes {
            match right.changes.get(key) {
                None => {
                    right_ops.insert(key.clone(), change.clone());
                }
                Some(other) => match resolve_field(change, other) {
                    FieldOutcome::Agree => {}
                    FieldOutcome::Left(adjust) => {
                        left_ops.insert(key.clone(), adjust);
                    }
                    FieldOutcome::Right(adjust) => {
                        right_ops.insert(key.clone(), adjust);
                    }
                },
            }
        }
        for (key, change) in &right.changes {
            if !self.changes.contains_key(key) {
                left_ops.insert(key.clone(), change.clone());
            }
        }

        let left_patch = MapPatch::from_changes(left_ops);
        let right_patch = MapPatch::from_changes(right_ops);
        return TransformResult::of(
            Some(left_patch).filter(|patch| !patch.is_empty()),
            Some(right_patch).filter(|patch| !patch.is_empty()),
        );
    }

    fn squash(&self, next: &MapPatch<K, V>) -> Option<MapPatch<K, V>> {
        let mut changes = self.changes.clone();
        for (key, second) in &next.changes {
            match changes.entry(key.clone()) {
                btree_map::Entry::Vacant(entry) => {
                    entry.insert(second.clone());
                }
                btree_map::Entry::Occupied(mut entry) => {
                    let first = entry.get_mut();
                    first.next = second.next.clone();
                    first.timestamp = second.timestamp;
                    if first.is_empty() {
                        entry.remove();
                    }
                }
            }
        }
        return Some(MapPatch { changes });
    }
}

/// Kind tag of a registry holding only map patches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MapKind;

impl<K: Clone, V: Clone> Variant for MapPatch<K, V> {
    type Kind = MapKind;
    const KINDS: &'static [MapKind] = &[MapKind];

    fn kind(&self) -> MapKind {
        return MapKind;
    }
}

impl<K: Clone, V: Clone> Embed<MapPatch<K, V>> for MapPatch<K, V> {
    const KIND: MapKind = MapKind;

    fn embed(op: MapPatch<K, V>) -> MapPatch<K, V> {
        return op;
    }

    fn project(&self) -> Option<&MapPatch<K, V>> {
        return Some(self);
    }
}

/// A map of fields mutated by [`MapPatch`]es.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[serde(bound(
    serialize = "K: Serialize, V: Serialize",
    deserialize = "K: Ord + Deserialize<'de>, V: Deserialize<'de>"
))]
pub struct FieldMap<K, V> {
    entries: BTreeMap<K, V>,
}

impl<K, V> Default for FieldMap<K, V> {
    fn default() -> Self {
        return FieldMap { entries: BTreeMap::new() };
    }
}

impl<K: Ord, V> FieldMap<K, V> {
    /// Create an empty map.
    pub fn new() -> FieldMap<K, V> {
        return FieldMap::default();
    }

    /// The value of `key`, if present.
    pub fn get(&self, key: &K) -> Option<&V> {
        return self.entries.get(key);
    }

    /// Check if `key` is present.
    pub fn contains_key(&self, key: &K) -> bool {
        return self.entries.contains_key(key);
    }

    /// Number of fields present.
    pub fn len(&self) -> usize {
        return self.entries.len();
    }

    /// Check if no field is present.
    pub fn is_empty(&self) -> bool {
        return self.entries.is_empty();
    }

    /// Iterate fields in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, K, V> {
        return self.entries.iter();
    }

    /// Take the underlying map out.
    pub fn into_inner(self) -> BTreeMap<K, V> {
        return self.entries;
    }
}

impl<K: Ord, V> From<BTreeMap<K, V>> for FieldMap<K, V> {
    fn from(entries: BTreeMap<K, V>) -> Self {
        return FieldMap { entries };
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for FieldMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        return FieldMap {
            entries: iter.into_iter().collect(),
        };
    }
}

/// Apply `patch` to a plain map.
pub(crate) fn apply_patch<K: Ord + Clone, V: Clone>(entries: &mut BTreeMap<K, V>, patch: &MapPatch<K, V>) {
    for (key, change) in &patch.changes {
        match &change.next {
            Some(value) => {
                entries.insert(key.clone(), value.clone());
            }
            None => {
                entries.remove(key);
            }
        }
    }
}

impl<K: Ord + Clone, V: Clone> OtState<MapPatch<K, V>> for FieldMap<K, V> {
    fn apply(&mut self, op: &MapPatch<K, V>) {
        apply_patch(&mut self.entries, op);
    }
}
