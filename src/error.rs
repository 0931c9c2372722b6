// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Error types.
//!
//! The algebra itself is total: none of these errors can come out of a
//! well-typed operation passed to a correctly configured system.
//! - `ConfigError`: a registry is missing an entry. Raised by
//!   `OtSystemBuilder::build`, never at call time.
//! - `OtError`: a custom transform refused a pair, an `Embed` impl is
//!   inconsistent, or `merge` saw the two sides disagree.
//! - `DecodeError` / `EncodeError`: the structural form boundary.

use thiserror::Error;

/// Errors raised while driving a transform.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OtError {
    /// A transform function declared the two operations incompatible.
    #[error("operations conflict: {reason}")]
    Conflict {
        /// Why the pair cannot be reconciled.
        reason: String,
    },

    /// An operation reported one kind but projected to another.
    #[error("operation of kind {actual} was dispatched as {expected}")]
    KindMismatch {
        /// The kind the registry entry was built for.
        expected: String,
        /// The kind the operation reported.
        actual: String,
    },

    /// No entry is registered for an operation kind or pair of kinds.
    #[error("no algebra registered for {kind}")]
    Unregistered {
        /// The kind, or pair of kinds, that was looked up.
        kind: String,
    },

    /// Applying both sides of a transform produced different states.
    #[error("replicas diverged after transform")]
    Diverged,
}

impl OtError {
    /// Create a conflict error.
    pub fn conflict(reason: impl Into<String>) -> OtError {
        return OtError::Conflict { reason: reason.into() };
    }

    /// Check if this is a conflict reported by a transform function.
    pub fn is_conflict(&self) -> bool {
        return matches!(self, OtError::Conflict { .. });
    }
}

/// A registry is missing an entry for some operation kind or pair.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// No empty predicate registered.
    #[error("no empty predicate registered for {kind}")]
    MissingEmptyPredicate {
        /// The uncovered kind.
        kind: String,
    },

    /// No invert function registered.
    #[error("no invert function registered for {kind}")]
    MissingInvert {
        /// The uncovered kind.
        kind: String,
    },

    /// No transform function registered in either orientation.
    #[error("no transform function registered for ({left}, {right})")]
    MissingTransform {
        /// Left kind of the uncovered pair.
        left: String,
        /// Right kind of the uncovered pair.
        right: String,
    },

    /// No squash function registered for two operations of one kind.
    #[error("no squash function registered for ({kind}, {kind})")]
    MissingSquash {
        /// The uncovered kind.
        kind: String,
    },
}

/// The structural form of an operation could not be decoded.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The input was not valid JSON or did not match the expected shape
    /// (for example a change without a `timestamp`).
    #[error("malformed operation: {0}")]
    Json(#[from] serde_json::Error),
}

/// An operation could not be converted to its structural form.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The value has no JSON representation (for example a map keyed by
    /// a non-string type).
    #[error("cannot encode operation: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_kind() {
        let err = ConfigError::MissingTransform {
            left: "Rename".to_string(),
            right: "Patch".to_string(),
        };
        assert_eq!(err.to_string(), "no transform function registered for (Rename, Patch)");

        let err = ConfigError::MissingSquash { kind: "Rename".to_string() };
        assert_eq!(err.to_string(), "no squash function registered for (Rename, Rename)");
    }

    #[test]
    fn conflict_helper() {
        let err = OtError::conflict("ID collision");
        assert!(err.is_conflict());
        assert_eq!(err.to_string(), "operations conflict: ID collision");
        assert!(!OtError::Diverged.is_conflict());
    }
}
