// created = "2026-10-19"
// modified = "2026-10-19"
// driver = "Isaac Clayton"

//! Logical timestamps for ordering concurrent writes.
//!
//! # Timestamp
//!
//! A totally ordered logical counter attached to every operation. The
//! algebra only ever compares timestamps; it never creates them.
//!
//! # Lamport Clock
//!
//! A replica-side source of timestamps. Replicas tick the clock for each
//! local edit and update it whenever they receive a remote operation,
//! which keeps timestamps monotonic per replica and comparable across
//! replicas.
//!
//! Complexity:
//! - tick: O(1)
//! - update: O(1)
//! - compare: O(1)

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// A logical timestamp.
///
/// Serialized as a bare integer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// The smallest timestamp.
    pub const ZERO: Timestamp = Timestamp(0);

    /// Create a timestamp from a raw counter value.
    pub const fn new(time: u64) -> Timestamp {
        return Timestamp(time);
    }

    /// Get the raw counter value.
    #[inline]
    pub fn get(&self) -> u64 {
        return self.0;
    }
}

impl From<u64> for Timestamp {
    fn from(time: u64) -> Timestamp {
        return Timestamp(time);
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "t{}", self.0);
    }
}

/// A Lamport clock producing [`Timestamp`]s.
///
/// The clock is a simple counter that:
/// - Increments on local events (tick)
/// - Updates to max(local, remote) + 1 on receiving operations
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LamportClock {
    time: u64,
}

impl LamportClock {
    /// Create a new clock starting at 0.
    pub fn new() -> LamportClock {
        return LamportClock { time: 0 };
    }

    /// Create a clock with a specific starting time.
    pub fn with_time(time: u64) -> LamportClock {
        return LamportClock { time };
    }

    /// Get the current time without advancing the clock.
    #[inline]
    pub fn time(&self) -> Timestamp {
        return Timestamp(self.time);
    }

    /// Advance the clock for a local edit and return the timestamp to
    /// stamp it with.
    #[inline]
    pub fn tick(&mut self) -> Timestamp {
        self.time += 1;
        return Timestamp(self.time);
    }

    /// Observe a timestamp carried by a remote operation.
    /// Sets local time to max(local, remote) + 1.
    #[inline]
    pub fn update(&mut self, remote: Timestamp) -> Timestamp {
        self.time = self.time.max(remote.0) + 1;
        return Timestamp(self.time);
    }

    /// Merge with another clock (for sync).
    /// Sets local time to max(local, other).
    #[inline]
    pub fn merge(&mut self, other: &LamportClock) {
        self.time = self.time.max(other.time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lamport_tick() {
        let mut clock = LamportClock::new();
        assert_eq!(clock.time(), Timestamp::ZERO);

        assert_eq!(clock.tick(), Timestamp(1));
        assert_eq!(clock.tick(), Timestamp(2));
        assert_eq!(clock.time(), Timestamp(2));
    }

    #[test]
    fn lamport_update() {
        let mut clock = LamportClock::new();
        clock.tick(); // time = 1

        // Remote op stamped 5
        assert_eq!(clock.update(Timestamp(5)), Timestamp(6));

        // Remote op stamped 3 (behind us)
        assert_eq!(clock.update(Timestamp(3)), Timestamp(7));
    }

    #[test]
    fn lamport_merge() {
        let mut a = LamportClock::with_time(5);
        let b = LamportClock::with_time(10);

        a.merge(&b);
        assert_eq!(a.time(), Timestamp(10));
    }

    #[test]
    fn timestamps_are_totally_ordered() {
        assert!(Timestamp(5) < Timestamp(10));
        assert_eq!(Timestamp(5).max(Timestamp(3)), Timestamp(5));
        assert_eq!(Timestamp::default(), Timestamp::ZERO);
    }

    #[test]
    fn timestamp_serializes_as_integer() {
        let json = serde_json::to_string(&Timestamp(42)).unwrap();
        assert_eq!(json, "42");

        let back: Timestamp = serde_json::from_str("7").unwrap();
        assert_eq!(back, Timestamp(7));
    }
}
