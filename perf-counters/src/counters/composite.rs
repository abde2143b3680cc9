use std::time::Duration;

use super::{composite_counter, counting_ops};
use crate::{clock::duration_to_ticks, CounterKind, Error};

composite_counter!(
    /// Average number of items processed per operation.
    ///
    /// The primary counter accumulates items, the base counts operations.  Samples report
    /// `(N1 - N0) / (B1 - B0)`, so for example the number of bytes per transfer.
    AverageCount,
    CounterKind::AverageCount64,
    CounterKind::AverageBase
);

impl AverageCount {
    /// Current raw value of the primary counter.
    pub fn raw_value(&self) -> i64 {
        self.counter.raw_value()
    }

    /// Sets the raw value of the primary counter.
    pub fn set_raw_value(&self, value: i64) -> Result<(), Error> {
        self.counter.set_raw_value(value)
    }

    /// Current raw value of the base counter.
    pub fn base_raw_value(&self) -> i64 {
        self.base.raw_value()
    }

    /// Sets the raw value of the base counter.
    pub fn set_base_raw_value(&self, value: i64) -> Result<(), Error> {
        self.base.set_raw_value(value)
    }

    /// Records `items` processed over `operations` completed operations.
    ///
    /// The two counters are updated one after the other; a concurrent sample may observe the
    /// first update without the second.
    pub fn increment(&self, items: i64, operations: i64) -> Result<(), Error> {
        self.counter.increment_by(items)?;
        self.base.increment_by(operations)?;
        Ok(())
    }
}

composite_counter!(
    /// Average time taken per operation.
    ///
    /// The primary counter accumulates elapsed ticks, the base counts operations.  Samples report
    /// `((N1 - N0) / F) / (B1 - B0)` seconds per operation.
    AverageTimer,
    CounterKind::AverageTimer32,
    CounterKind::AverageBase
);

impl AverageTimer {
    /// Current raw value of the primary counter, in ticks.
    pub fn raw_value(&self) -> i64 {
        self.counter.raw_value()
    }

    /// Sets the raw value of the primary counter.
    pub fn set_raw_value(&self, value: i64) -> Result<(), Error> {
        self.counter.set_raw_value(value)
    }

    /// Current raw value of the base counter.
    pub fn base_raw_value(&self) -> i64 {
        self.base.raw_value()
    }

    /// Sets the raw value of the base counter.
    pub fn set_base_raw_value(&self, value: i64) -> Result<(), Error> {
        self.base.set_raw_value(value)
    }

    /// Records one operation that took `elapsed_ticks`.
    pub fn increment(&self, elapsed_ticks: i64) -> Result<(), Error> {
        self.counter.increment_by(elapsed_ticks)?;
        self.base.increment()?;
        Ok(())
    }

    /// Records one operation that took `elapsed`.
    pub fn record(&self, elapsed: Duration) -> Result<(), Error> {
        self.increment(duration_to_ticks(elapsed))
    }

    /// Runs `f`, recording how long it took on the store's clock.
    ///
    /// The operation is recorded even if its result is an error of the caller's own.
    pub fn time<T, F>(&self, f: F) -> Result<T, Error>
    where
        F: FnOnce() -> T,
    {
        let start = self.counter.timestamp();
        let output = f();
        self.increment(self.counter.timestamp().saturating_sub(start))?;
        Ok(output)
    }
}

macro_rules! fraction_ops {
    ($name:ident) => {
        impl $name {
            /// Current raw value of the numerator.
            pub fn numerator(&self) -> i64 {
                self.counter.raw_value()
            }

            /// Sets the numerator.
            pub fn set_numerator(&self, value: i64) -> Result<(), Error> {
                self.counter.set_raw_value(value)
            }

            /// Current raw value of the denominator.
            pub fn denominator(&self) -> i64 {
                self.base.raw_value()
            }

            /// Sets the denominator.
            pub fn set_denominator(&self, value: i64) -> Result<(), Error> {
                self.base.set_raw_value(value)
            }
        }

        counting_ops!($name, counter);
    };
}

composite_counter!(
    /// Instantaneous ratio of a subset to its set, as a percentage, such as disk space in use.
    ///
    /// The numerator is updated through the counting operations, while the denominator is
    /// managed by the caller through [`set_denominator`](RawFraction::set_denominator).  Samples
    /// report `N1 / D1 * 100`.
    ///
    /// [`decrement`](RawFraction::decrement) lowers the numerator by one.
    RawFraction,
    CounterKind::RawFraction,
    CounterKind::RawBase
);

fraction_ops!(RawFraction);

composite_counter!(
    /// Ratio of successful attempts to all attempts over an interval, as a percentage, such as
    /// cache hit rate.
    ///
    /// Samples report `(N1 - N0) / (D1 - D0) * 100`.
    SampleFraction,
    CounterKind::SampleFraction,
    CounterKind::SampleBase
);

fraction_ops!(SampleFraction);

impl SampleFraction {
    /// Records one attempt, counting it in the numerator only if it succeeded.
    pub fn record_attempt(&self, success: bool) -> Result<(), Error> {
        if success {
            self.counter.increment()?;
        }
        self.base.increment()?;
        Ok(())
    }
}
