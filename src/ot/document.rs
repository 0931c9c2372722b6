// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! A named document with free-form fields.
//!
//! This is the shape shared by the collaborative apps: a display name
//! edited last-writer-wins, plus a map of settings edited field by field.
//! Renames and patches touch disjoint state, so they commute.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use super::OtState;
use super::map::MapPatch;
use super::map::apply_patch;
use super::primitives::Timestamp;
use super::scalar::ScalarChange;
use super::system::Embed;
use super::system::OtSystem;
use super::system::Variant;
use crate::error::ConfigError;

/// The state of a document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Document<V> {
    /// Display name.
    pub name: V,
    /// Free-form fields.
    pub fields: BTreeMap<String, V>,
}

impl<V> Document<V> {
    /// A document with no fields.
    pub fn new(name: V) -> Document<V> {
        return Document {
            name,
            fields: BTreeMap::new(),
        };
    }
}

/// An edit to a [`Document`].
///
/// Structural form: `{"type": "rename" | "patch", "op": ..}`, where `op` is
/// the structural form of the wrapped operation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "op", rename_all = "snake_case")]
#[serde(bound(
    serialize = "V: Serialize",
    deserialize = "V: PartialEq + Deserialize<'de>"
))]
pub enum DocumentOp<V> {
    /// Change the name.
    Rename(ScalarChange<V>),
    /// Change some fields.
    Patch(MapPatch<String, V>),
}

impl<V: PartialEq> DocumentOp<V> {
    /// Rename from `previous` to `next`.
    pub fn rename(previous: V, next: V, timestamp: Timestamp) -> DocumentOp<V> {
        return DocumentOp::Rename(ScalarChange::new(previous, next, timestamp));
    }

    /// Set one field.
    pub fn set_field(key: impl Into<String>, previous: Option<V>, next: V, timestamp: Timestamp) -> DocumentOp<V> {
        return DocumentOp::Patch(MapPatch::set(key.into(), previous, next, timestamp));
    }

    /// Remove one field.
    pub fn remove_field(key: impl Into<String>, previous: V, timestamp: Timestamp) -> DocumentOp<V> {
        return DocumentOp::Patch(MapPatch::remove(key.into(), previous, timestamp));
    }
}

/// Kinds of [`DocumentOp`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Rename,
    Patch,
}

impl<V: Clone> Variant for DocumentOp<V> {
    type Kind = DocumentKind;
    const KINDS: &'static [DocumentKind] = &[DocumentKind::Rename, DocumentKind::Patch];

    fn kind(&self) -> DocumentKind {
        return match self {
            DocumentOp::Rename(_) => DocumentKind::Rename,
            DocumentOp::Patch(_) => DocumentKind::Patch,
        };
    }
}

impl<V: Clone> Embed<ScalarChange<V>> for DocumentOp<V> {
    const KIND: DocumentKind = DocumentKind::Rename;

    fn embed(op: ScalarChange<V>) -> DocumentOp<V> {
        return DocumentOp::Rename(op);
    }

    fn project(&self) -> Option<&ScalarChange<V>> {
        return match self {
            DocumentOp::Rename(op) => Some(op),
            DocumentOp::Patch(_) => None,
        };
    }
}

impl<V: Clone> Embed<MapPatch<String, V>> for DocumentOp<V> {
    const KIND: DocumentKind = DocumentKind::Patch;

    fn embed(op: MapPatch<String, V>) -> DocumentOp<V> {
        return DocumentOp::Patch(op);
    }

    fn project(&self) -> Option<&MapPatch<String, V>> {
        return match self {
            DocumentOp::Patch(op) => Some(op),
            DocumentOp::Rename(_) => None,
        };
    }
}

impl<V: Clone> OtState<DocumentOp<V>> for Document<V> {
    fn apply(&mut self, op: &DocumentOp<V>) {
        match op {
            DocumentOp::Rename(change) => self.name = change.next().clone(),
            DocumentOp::Patch(patch) => apply_patch(&mut self.fields, patch),
        }
    }
}

/// The registry for [`DocumentOp`].
pub fn system<V: Clone + Ord + 'static>() -> Result<OtSystem<DocumentOp<V>>, ConfigError> {
    return OtSystem::builder()
        .with_algebra::<ScalarChange<V>>()
        .with_algebra::<MapPatch<String, V>>()
        .with_independent::<ScalarChange<V>, MapPatch<String, V>>()
        .build();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(value: &str) -> String {
        return value.to_string();
    }

    fn rename(previous: &str, next: &str, timestamp: u64) -> DocumentOp<String> {
        return DocumentOp::rename(s(previous), s(next), Timestamp(timestamp));
    }

    fn set(key: &str, previous: Option<&str>, next: &str, timestamp: u64) -> DocumentOp<String> {
        return DocumentOp::set_field(key, previous.map(s), s(next), Timestamp(timestamp));
    }

    #[test]
    fn system_builds() {
        let system = system::<String>().unwrap();
        assert!(system.is_empty(&rename("a", "a", 1)));
        assert!(system.is_empty(&DocumentOp::Patch(MapPatch::new(Timestamp(1), []))));
        assert!(!system.is_empty(&set("k", None, "v", 1)));
    }

    #[test]
    fn rename_and_patch_commute() {
        let system = system::<String>().unwrap();
        let left = rename("doc", "notes", 3);
        let right = set("color", None, "red", 1);

        let result = system.transform_pair(&left, &right).unwrap();
        assert_eq!(result.left_ops(), &[right.clone()]);
        assert_eq!(result.right_ops(), &[left.clone()]);

        let mirrored = system.transform_pair(&right, &left).unwrap();
        assert_eq!(mirrored, result.mirror());
    }

    #[test]
    fn mixed_histories_converge() {
        let system = system::<String>().unwrap();
        let base = Document::new(s("doc"));

        let left = vec![rename("doc", "plan", 2), set("owner", None, "ann", 2)];
        let right = vec![set("owner", None, "bob", 4), rename("doc", "draft", 1), set("tag", None, "x", 4)];

        let merged = system.merge(&base, &left, &right).unwrap();
        assert_eq!(merged.name, "plan");
        assert_eq!(merged.fields.get("owner").map(String::as_str), Some("bob"));
        assert_eq!(merged.fields.get("tag").map(String::as_str), Some("x"));
    }

    #[test]
    fn squash_keeps_kinds_apart() {
        let system = system::<String>().unwrap();
        let ops = vec![
            rename("a", "b", 1),
            rename("b", "c", 2),
            set("k", None, "1", 3),
            set("k", Some("1"), "2", 4),
        ];
        assert_eq!(system.squash(&ops), vec![rename("a", "c", 2), set("k", None, "2", 4)]);
    }

    #[test]
    fn structural_form() {
        let op = rename("a", "b", 1);
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "rename", "op": { "previous": "a", "next": "b", "timestamp": 1 } })
        );

        // A field literally called "type" is not confused with the tag.
        let op = set("type", None, "memo", 5);
        let json = serde_json::to_string(&op).unwrap();
        let decoded: DocumentOp<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, op);
    }
}
