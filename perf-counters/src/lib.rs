//! Named performance counters with pluggable storage.
//!
//! `perf-counters` lets an application declare, update and sample named numeric counters, such
//! as counts, rates, averages and elapsed times, without depending on where the counter values
//! are actually stored.
//!
//! # Overview
//!
//! A counter is addressed by a [`CounterAddress`]: a category, a counter name, and optionally an
//! instance and a machine.  A [`CounterSource`] turns an address into a [`CounterHandle`], which
//! owns one raw, signed 64-bit value.  Typed counters, such as [`NumberOfItems`] or
//! [`AverageTimer`], wrap one or two handles and expose only the updates that make sense for
//! them.
//!
//! Some counters are composite: the value they report is a ratio of two raw values.  The primary
//! raw value lives at the counter's own address, and the base (denominator) lives at the same
//! address with [`BASE_SUFFIX`](naming::BASE_SUFFIX) appended to the counter name.  Both halves
//! are always created, reset and released together.
//!
//! What a sample means is decided by the counter's [`CounterKind`], which carries the formula
//! for every kind in one table.  The same kind drives the installation metadata produced by
//! [`Counter::creation_data`], so the type wrapping a handle and the kind a store has installed
//! cannot drift apart silently.
//!
//! # Sources
//!
//! This crate defines the seams; storage implementations live elsewhere (see
//! `perf-counters-util` for a host-backed store and an in-memory store for tests).  Sources are
//! passed explicitly to whatever constructs counters:
//!
//! ```rust,ignore
//! use perf_counters::{AverageTimer, Counter, CounterAddress, NumberOfItems};
//!
//! let hits = NumberOfItems::new(&source, &CounterAddress::new("Cache", "Hits"), false)?;
//! hits.increment()?;
//!
//! let fetch = AverageTimer::new(&source, &CounterAddress::new("Cache", "Fetch"), false)?;
//! let user = fetch.time(|| load_user(42))?;
//! ```
//!
//! Applications that prefer one shared source can install it once with [`set_default_source`]
//! and retrieve it with [`default_source`].
//!
//! # Concurrency
//!
//! Counters are `Send + Sync` and meant to be shared between threads.  Every update to a single
//! raw value is atomic, but the two halves of a composite counter are updated independently: a
//! sample taken between the two updates may observe one without the other.
#![deny(missing_docs)]

mod address;
pub use self::address::{CounterAddress, LOCAL_MACHINE};

pub mod atomics;

mod clock;
pub use self::clock::{duration_to_ticks, ticks_to_duration, TickClock, TICKS_PER_SECOND};

mod counters;
pub use self::counters::{
    AverageCount, AverageTimer, Counter, CounterDelta, CounterTimer, ElapsedTime, NumberOfItems,
    NumberOfItems32, RateOfCountsPerSecond, RawFraction, SampleCounter, SampleFraction,
    Timer100Ns, Timer100NsInverse,
};

mod errors;
pub use self::errors::{Error, SetSourceError};

mod handle;
pub use self::handle::{CounterHandle, RawCounter};

mod kind;
pub use self::kind::{CounterKind, RawSample};

mod metadata;
pub use self::metadata::{CategoryDefinition, CategoryInstaller, CategoryType, CounterCreationData};

pub mod naming;

mod source;
pub use self::source::{default_source, set_default_source, CounterSource};

#[cfg(test)]
mod test_util;
