//! Typed counters.
//!
//! Each counter type wraps one raw handle (simple counters) or a primary and a base handle
//! (composite counters), exposing only the updates that make sense for its kind.  The kind itself
//! lives in [`Counter::KIND`], which drives resetting, sampling in host-backed stores, and the
//! installation metadata from [`Counter::creation_data`].

use tracing::warn;

use crate::{CounterAddress, CounterCreationData, CounterHandle, CounterKind, CounterSource, Error};

mod composite;
pub use self::composite::{AverageCount, AverageTimer, RawFraction, SampleFraction};

mod simple;
pub use self::simple::{
    CounterDelta, CounterTimer, ElapsedTime, NumberOfItems, NumberOfItems32,
    RateOfCountsPerSecond, SampleCounter, Timer100Ns, Timer100NsInverse,
};

/// Operations shared by every counter type.
pub trait Counter {
    /// Kind of the primary counter.
    const KIND: CounterKind;

    /// Builds the installation records for a counter of this type.
    ///
    /// Composite types produce two records, the primary followed by its base.
    fn creation_data(name: &str, help: &str) -> Vec<CounterCreationData>
    where
        Self: Sized,
    {
        CounterCreationData::for_kind(Self::KIND, name, help)
    }

    /// Resets the counter to its start state.
    ///
    /// Every raw value goes back to zero, except for elapsed-time counters, which restart from
    /// the current timestamp.
    fn reset(&self) -> Result<(), Error>;

    /// Computes the current sample.
    ///
    /// How the sample is derived depends on the store: host-backed stores apply the kind's
    /// formula, while the in-memory store simply reports the primary raw value.
    fn sample(&self) -> Result<f64, Error>;

    /// Releases every handle held by the counter.  Safe to call repeatedly.
    fn dispose(&self);
}

/// Opens a handle, checking the installed kind when the store reports one.
pub(crate) fn open<S>(
    source: &S,
    address: &CounterAddress,
    read_only: bool,
    kind: CounterKind,
) -> Result<CounterHandle, Error>
where
    S: CounterSource + ?Sized,
{
    let handle = source.create(address, read_only)?;
    match handle.kind() {
        Some(installed) if installed != kind => {
            warn!(%address, %installed, expected = %kind, "Counter kind does not match store.");
            Err(Error::KindMismatch { address: address.to_string(), expected: kind, installed })
        }
        _ => Ok(handle),
    }
}

macro_rules! simple_counter {
    ($(#[$attr:meta])* $name:ident, $kind:expr) => {
        $(#[$attr])*
        pub struct $name {
            handle: $crate::CounterHandle,
        }

        impl $name {
            /// Opens the counter at `address` through `source`.
            ///
            /// # Errors
            ///
            /// Fails if the source cannot create the handle, or if the store has the counter
            /// installed as a different kind.
            pub fn new<S>(
                source: &S,
                address: &$crate::CounterAddress,
                read_only: bool,
            ) -> Result<Self, $crate::Error>
            where
                S: $crate::CounterSource + ?Sized,
            {
                let handle = $crate::counters::open(source, address, read_only, $kind)?;
                Ok(Self { handle })
            }

            /// The underlying raw handle.
            pub fn handle(&self) -> &$crate::CounterHandle {
                &self.handle
            }
        }

        impl $crate::Counter for $name {
            const KIND: $crate::CounterKind = $kind;

            fn reset(&self) -> Result<(), $crate::Error> {
                self.handle.reset(Self::KIND)
            }

            fn sample(&self) -> Result<f64, $crate::Error> {
                self.handle.sample()
            }

            fn dispose(&self) {
                self.handle.dispose();
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.handle, f)
            }
        }
    };
}

macro_rules! composite_counter {
    ($(#[$attr:meta])* $name:ident, $kind:expr, $base_kind:expr) => {
        $(#[$attr])*
        pub struct $name {
            counter: $crate::CounterHandle,
            base: $crate::CounterHandle,
        }

        impl $name {
            /// Opens the counter at `address`, and its base, through `source`.
            ///
            /// Both handles are created before the counter is returned; if the base cannot be
            /// opened, the primary handle is released again.
            ///
            /// # Errors
            ///
            /// Fails if the source cannot create either handle, or if the store has either
            /// counter installed as a different kind.
            pub fn new<S>(
                source: &S,
                address: &$crate::CounterAddress,
                read_only: bool,
            ) -> Result<Self, $crate::Error>
            where
                S: $crate::CounterSource + ?Sized,
            {
                let counter = $crate::counters::open(source, address, read_only, $kind)?;
                let base = $crate::counters::open(source, &address.base(), read_only, $base_kind)?;
                Ok(Self { counter, base })
            }

            /// The underlying primary handle.
            pub fn counter_handle(&self) -> &$crate::CounterHandle {
                &self.counter
            }

            /// The underlying base handle.
            pub fn base_handle(&self) -> &$crate::CounterHandle {
                &self.base
            }
        }

        impl $crate::Counter for $name {
            const KIND: $crate::CounterKind = $kind;

            fn reset(&self) -> Result<(), $crate::Error> {
                self.counter.reset(Self::KIND)?;
                self.base.reset($base_kind)
            }

            fn sample(&self) -> Result<f64, $crate::Error> {
                self.counter.sample()
            }

            fn dispose(&self) {
                self.counter.dispose();
                self.base.dispose();
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "counter={}, base={}", self.counter, self.base)
            }
        }
    };
}

// Raw value accessors and the three counting operations, on the handle named by `$field`.
macro_rules! counting_ops {
    ($name:ident, $field:ident) => {
        impl $name {
            /// Current raw value.
            pub fn raw_value(&self) -> i64 {
                self.$field.raw_value()
            }

            /// Sets the raw value.
            pub fn set_raw_value(&self, value: i64) -> Result<(), $crate::Error> {
                self.$field.set_raw_value(value)
            }

            /// Increments the raw value by one, returning the new raw value.
            pub fn increment(&self) -> Result<i64, $crate::Error> {
                self.$field.increment()
            }

            /// Decrements the raw value by one, returning the new raw value.
            pub fn decrement(&self) -> Result<i64, $crate::Error> {
                self.$field.decrement()
            }

            /// Adds `value` to the raw value, returning the new raw value.
            pub fn increment_by(&self, value: i64) -> Result<i64, $crate::Error> {
                self.$field.increment_by(value)
            }
        }
    };
}

pub(crate) use {composite_counter, counting_ops, simple_counter};
