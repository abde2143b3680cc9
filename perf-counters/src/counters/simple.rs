use super::{counting_ops, simple_counter};
use crate::{CounterKind, Error};

simple_counter!(
    /// An instantaneous 64-bit count, such as the number of items in a queue.
    ///
    /// Samples report the most recent raw value; no averaging takes place.
    NumberOfItems,
    CounterKind::NumberOfItems64
);

counting_ops!(NumberOfItems, handle);

simple_counter!(
    /// An instantaneous count, viewed as a 32-bit integer.
    ///
    /// The raw cell is 64 bits wide; reads truncate to 32 bits.
    NumberOfItems32,
    CounterKind::NumberOfItems32
);

impl NumberOfItems32 {
    /// Current raw value.
    pub fn raw_value(&self) -> i32 {
        self.handle.raw_value() as i32
    }

    /// Sets the raw value.
    pub fn set_raw_value(&self, value: i32) -> Result<(), Error> {
        self.handle.set_raw_value(i64::from(value))
    }

    /// Increments the raw value by one, returning the new raw value.
    pub fn increment(&self) -> Result<i32, Error> {
        self.handle.increment().map(|value| value as i32)
    }

    /// Decrements the raw value by one, returning the new raw value.
    pub fn decrement(&self) -> Result<i32, Error> {
        self.handle.decrement().map(|value| value as i32)
    }

    /// Adds `value` to the raw value, returning the new raw value.
    pub fn increment_by(&self, value: i32) -> Result<i32, Error> {
        self.handle.increment_by(i64::from(value)).map(|value| value as i32)
    }
}

simple_counter!(
    /// A 64-bit count whose samples report the change since the previous sample.
    ///
    /// Formula: `N1 - N0`.
    CounterDelta,
    CounterKind::CounterDelta64
);

counting_ops!(CounterDelta, handle);

simple_counter!(
    /// Average number of events per second, such as requests served.
    ///
    /// Formula: `(N1 - N0) / ((T1 - T0) / F)`, where `T` is the sample timestamp and `F` the tick
    /// frequency.
    RateOfCountsPerSecond,
    CounterKind::RateOfCountsPerSecond64
);

impl RateOfCountsPerSecond {
    /// Current raw value.
    pub fn raw_value(&self) -> i64 {
        self.handle.raw_value()
    }

    /// Sets the raw value.
    pub fn set_raw_value(&self, value: i64) -> Result<(), Error> {
        self.handle.set_raw_value(value)
    }

    /// Counts one event, returning the new raw value.
    pub fn increment(&self) -> Result<i64, Error> {
        self.handle.increment()
    }
}

simple_counter!(
    /// Time elapsed since the counter was last reset.
    ///
    /// The raw value is the start timestamp, in host ticks; [`reset`](crate::Counter::reset)
    /// restarts it from the current timestamp.  Samples report `(T1 - N1) / F` seconds.
    ElapsedTime,
    CounterKind::ElapsedTime
);

impl ElapsedTime {
    /// The start timestamp, in host ticks.
    pub fn start_timestamp(&self) -> i64 {
        self.handle.raw_value()
    }
}

macro_rules! active_time_ops {
    ($name:ident) => {
        impl $name {
            /// Current raw value, in ticks of active time.
            pub fn raw_value(&self) -> i64 {
                self.handle.raw_value()
            }

            /// Sets the raw value.
            pub fn set_raw_value(&self, value: i64) -> Result<(), Error> {
                self.handle.set_raw_value(value)
            }

            /// Adds `ticks` of active time, returning the new raw value.
            pub fn increment_by(&self, ticks: i64) -> Result<i64, Error> {
                self.handle.increment_by(ticks)
            }
        }
    };
}

simple_counter!(
    /// Percentage of elapsed time a component spent active.
    ///
    /// Formula: `(N1 - N0) / (T1 - T0) * 100`.
    CounterTimer,
    CounterKind::CounterTimer
);

active_time_ops!(CounterTimer);

simple_counter!(
    /// Percentage of elapsed time a component spent active, measured in 100ns units.
    Timer100Ns,
    CounterKind::Timer100Ns
);

active_time_ops!(Timer100Ns);

simple_counter!(
    /// Percentage of elapsed time a component spent active, computed from the time it spent
    /// inactive.
    ///
    /// The raw value accumulates inactive ticks.  Formula: `(1 - (N1 - N0) / (T1 - T0)) * 100`.
    Timer100NsInverse,
    CounterKind::Timer100NsInverse
);

active_time_ops!(Timer100NsInverse);

simple_counter!(
    /// Successful samples per second, where each sample is counted as either one (success) or
    /// zero.
    SampleCounter,
    CounterKind::SampleCounter
);

counting_ops!(SampleCounter, handle);
