use std::time::Duration;

use quanta::{Clock, Instant};

/// Number of host ticks in one second.
///
/// Host ticks are 100 nanosecond units.
pub const TICKS_PER_SECOND: i64 = 10_000_000;

const NANOS_PER_TICK: u128 = 100;

/// Converts a duration into host ticks, saturating at `i64::MAX`.
pub fn duration_to_ticks(duration: Duration) -> i64 {
    i64::try_from(duration.as_nanos() / NANOS_PER_TICK).unwrap_or(i64::MAX)
}

/// Converts host ticks into a duration.  Negative tick counts map to zero.
pub fn ticks_to_duration(ticks: i64) -> Duration {
    let ticks = u64::try_from(ticks).unwrap_or(0);
    Duration::from_nanos(ticks.saturating_mul(NANOS_PER_TICK as u64))
}

/// A monotonic source of host ticks.
///
/// Timestamps are measured from the moment the `TickClock` was created.  Clones share the same
/// origin, so timestamps taken from clones are comparable.
#[derive(Clone, Debug)]
pub struct TickClock {
    clock: Clock,
    origin: Instant,
}

impl TickClock {
    /// Creates a `TickClock` backed by the system's monotonic clock.
    pub fn new() -> Self {
        Self::from_clock(Clock::new())
    }

    /// Creates a `TickClock` backed by the given clock.
    ///
    /// Passing a mocked [`Clock`] allows time-dependent formulas to be driven deterministically.
    pub fn from_clock(clock: Clock) -> Self {
        let origin = clock.now();
        Self { clock, origin }
    }

    /// Current timestamp, in host ticks.
    pub fn now(&self) -> i64 {
        duration_to_ticks(self.clock.now().saturating_duration_since(self.origin))
    }

    /// Number of ticks per second.
    pub fn frequency(&self) -> i64 {
        TICKS_PER_SECOND
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}
