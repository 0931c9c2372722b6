// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Shared primitives for operation types.
//!
//! ## Clocks
//! - `Timestamp`: totally ordered logical time carried by operations
//! - `LamportClock`: replica-side timestamp source

pub mod clock;

pub use clock::LamportClock;
pub use clock::Timestamp;
