// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Concord - Operational transformation for small pieces of shared state.
//!
//! Replicas edit a display name or a map of fields independently and
//! exchange operations. Given two concurrent operations built on the same
//! state, the transform tells each replica what it still has to apply so
//! that both end up with the same value.
//!
//! # Quick Start
//!
//! ```
//! use concord::ot::OtState;
//! use concord::ot::document::{self, Document, DocumentOp};
//! use concord::ot::primitives::Timestamp;
//!
//! let system = document::system::<String>().unwrap();
//! let base = Document::new("notes".to_string());
//!
//! // Two replicas rename the document at the same time.
//! let left = DocumentOp::rename("notes".to_string(), "plans".to_string(), Timestamp(2));
//! let right = DocumentOp::rename("notes".to_string(), "ideas".to_string(), Timestamp(1));
//!
//! let result = system.transform(&[left.clone()], &[right.clone()]).unwrap();
//!
//! let mut replica_a = base.clone();
//! replica_a.apply(&left);
//! replica_a.apply_all(result.left_ops());
//!
//! let mut replica_b = base.clone();
//! replica_b.apply(&right);
//! replica_b.apply_all(result.right_ops());
//!
//! // The later rename wins on both sides.
//! assert_eq!(replica_a, replica_b);
//! assert_eq!(replica_a.name, "plans");
//! ```

pub mod codec;
pub mod error;
pub mod ot;

pub use error::ConfigError;
pub use error::DecodeError;
pub use error::EncodeError;
pub use error::OtError;
pub use ot::Algebra;
pub use ot::OtState;
pub use ot::TransformResult;
pub use ot::system::OtSystem;
