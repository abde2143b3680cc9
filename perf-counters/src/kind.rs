use std::fmt;

use crate::Error;

/// Counter kind.
///
/// Defines the type of a raw counter as installed in a category, which in turn decides how a
/// sample is derived from its raw values.  Composite kinds are paired with a base kind holding
/// their denominator; see [`base_kind`](CounterKind::base_kind).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum CounterKind {
    /// Instantaneous 32-bit count.
    NumberOfItems32,
    /// Instantaneous 64-bit count.
    NumberOfItems64,
    /// Difference of a 32-bit count between two samples.
    CounterDelta32,
    /// Difference of a 64-bit count between two samples.
    CounterDelta64,
    /// Average number of 32-bit counts per second.
    RateOfCountsPerSecond32,
    /// Average number of 64-bit counts per second.
    RateOfCountsPerSecond64,
    /// Seconds elapsed since a start timestamp held as the raw value.
    ElapsedTime,
    /// Percentage of time a component was active.
    CounterTimer,
    /// Percentage of time a component was inactive, reported as active.
    CounterTimerInverse,
    /// Percentage of time a component was active, in 100ns units.
    Timer100Ns,
    /// Percentage of time a component was inactive, reported as active, in 100ns units.
    Timer100NsInverse,
    /// Successful samples per second.
    SampleCounter,
    /// Items processed per operation.
    AverageCount64,
    /// Seconds taken per operation.
    AverageTimer32,
    /// Base of [`AverageCount64`](CounterKind::AverageCount64) and
    /// [`AverageTimer32`](CounterKind::AverageTimer32).
    AverageBase,
    /// Instantaneous ratio of a subset to its set, as a percentage.
    RawFraction,
    /// Base of [`RawFraction`](CounterKind::RawFraction).
    RawBase,
    /// Ratio of successful samples to all samples over an interval, as a percentage.
    SampleFraction,
    /// Base of [`SampleFraction`](CounterKind::SampleFraction).
    SampleBase,
}

/// A point-in-time reading of a raw counter, and of its base if it has one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawSample {
    /// Raw value of the counter.
    pub raw: i64,
    /// Raw value of the base counter, or zero if there is none.
    pub base: i64,
    /// When the reading was taken, in host ticks.
    pub timestamp: i64,
}

impl RawSample {
    /// Creates a `RawSample`.
    pub const fn new(raw: i64, base: i64, timestamp: i64) -> Self {
        Self { raw, base, timestamp }
    }

    /// The empty reading a counter is assumed to start from at the given timestamp.
    pub const fn zero(timestamp: i64) -> Self {
        Self::new(0, 0, timestamp)
    }
}

impl CounterKind {
    /// Name of this kind, as recorded in category metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            CounterKind::NumberOfItems32 => "NumberOfItems32",
            CounterKind::NumberOfItems64 => "NumberOfItems64",
            CounterKind::CounterDelta32 => "CounterDelta32",
            CounterKind::CounterDelta64 => "CounterDelta64",
            CounterKind::RateOfCountsPerSecond32 => "RateOfCountsPerSecond32",
            CounterKind::RateOfCountsPerSecond64 => "RateOfCountsPerSecond64",
            CounterKind::ElapsedTime => "ElapsedTime",
            CounterKind::CounterTimer => "CounterTimer",
            CounterKind::CounterTimerInverse => "CounterTimerInverse",
            CounterKind::Timer100Ns => "Timer100Ns",
            CounterKind::Timer100NsInverse => "Timer100NsInverse",
            CounterKind::SampleCounter => "SampleCounter",
            CounterKind::AverageCount64 => "AverageCount64",
            CounterKind::AverageTimer32 => "AverageTimer32",
            CounterKind::AverageBase => "AverageBase",
            CounterKind::RawFraction => "RawFraction",
            CounterKind::RawBase => "RawBase",
            CounterKind::SampleFraction => "SampleFraction",
            CounterKind::SampleBase => "SampleBase",
        }
    }

    /// Kind of the base counter this kind must be paired with, if any.
    pub fn base_kind(&self) -> Option<CounterKind> {
        match self {
            CounterKind::AverageCount64 | CounterKind::AverageTimer32 => {
                Some(CounterKind::AverageBase)
            }
            CounterKind::RawFraction => Some(CounterKind::RawBase),
            CounterKind::SampleFraction => Some(CounterKind::SampleBase),
            _ => None,
        }
    }

    /// Whether or not this kind is the base half of a composite counter.
    pub fn is_base(&self) -> bool {
        matches!(self, CounterKind::AverageBase | CounterKind::RawBase | CounterKind::SampleBase)
    }

    /// Raw value a counter of this kind holds after being reset at `timestamp`.
    ///
    /// Elapsed-time counters hold their start timestamp; everything else starts from zero.
    pub fn reset_value(&self, timestamp: i64) -> i64 {
        match self {
            CounterKind::ElapsedTime => timestamp,
            _ => 0,
        }
    }

    /// Derives a sample from two readings of a counter of this kind.
    ///
    /// `previous` is the reading taken at the last sample (or the zero reading taken when the
    /// counter was opened), `current` is the reading being sampled now, and `frequency` is the
    /// number of ticks per second.
    ///
    /// # Errors
    ///
    /// If the formula's denominator is zero, for example when no time has passed for a rate or no
    /// operations were counted by a base, [`Error::AmbiguousDivision`] is returned.
    pub fn calculate(
        &self,
        previous: &RawSample,
        current: &RawSample,
        frequency: i64,
    ) -> Result<f64, Error> {
        let delta = current.raw.wrapping_sub(previous.raw) as f64;
        let elapsed = current.timestamp.wrapping_sub(previous.timestamp);
        let base_delta = current.base.wrapping_sub(previous.base);

        let value = match self {
            CounterKind::NumberOfItems32 => f64::from(current.raw as i32),
            CounterKind::NumberOfItems64
            | CounterKind::AverageBase
            | CounterKind::RawBase
            | CounterKind::SampleBase => current.raw as f64,
            CounterKind::CounterDelta32 | CounterKind::CounterDelta64 => delta,
            CounterKind::RateOfCountsPerSecond32
            | CounterKind::RateOfCountsPerSecond64
            | CounterKind::SampleCounter => {
                self.ratio(delta, elapsed)? * frequency as f64
            }
            CounterKind::ElapsedTime => {
                current.timestamp.wrapping_sub(current.raw) as f64 / frequency as f64
            }
            CounterKind::CounterTimer | CounterKind::Timer100Ns => {
                self.ratio(delta, elapsed)? * 100.0
            }
            CounterKind::CounterTimerInverse | CounterKind::Timer100NsInverse => {
                (1.0 - self.ratio(delta, elapsed)?) * 100.0
            }
            CounterKind::AverageCount64 => self.ratio(delta, base_delta)?,
            CounterKind::AverageTimer32 => self.ratio(delta / frequency as f64, base_delta)?,
            CounterKind::RawFraction => self.ratio(current.raw as f64, current.base)? * 100.0,
            CounterKind::SampleFraction => self.ratio(delta, base_delta)? * 100.0,
        };

        Ok(value)
    }

    fn ratio(&self, numerator: f64, denominator: i64) -> Result<f64, Error> {
        if denominator == 0 {
            return Err(Error::AmbiguousDivision { kind: *self });
        }

        Ok(numerator / denominator as f64)
    }
}

impl fmt::Display for CounterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{CounterKind, RawSample};
    use crate::{Error, TICKS_PER_SECOND};

    const F: i64 = TICKS_PER_SECOND;

    fn calc(kind: CounterKind, previous: RawSample, current: RawSample) -> Result<f64, Error> {
        kind.calculate(&previous, &current, F)
    }

    #[test]
    fn base_pairing() {
        assert_eq!(CounterKind::AverageCount64.base_kind(), Some(CounterKind::AverageBase));
        assert_eq!(CounterKind::AverageTimer32.base_kind(), Some(CounterKind::AverageBase));
        assert_eq!(CounterKind::RawFraction.base_kind(), Some(CounterKind::RawBase));
        assert_eq!(CounterKind::SampleFraction.base_kind(), Some(CounterKind::SampleBase));
        assert_eq!(CounterKind::NumberOfItems64.base_kind(), None);
        assert_eq!(CounterKind::AverageBase.base_kind(), None);

        assert!(CounterKind::RawBase.is_base());
        assert!(!CounterKind::RawFraction.is_base());
    }

    #[test]
    fn reset_values() {
        assert_eq!(CounterKind::ElapsedTime.reset_value(1234), 1234);
        assert_eq!(CounterKind::NumberOfItems64.reset_value(1234), 0);
        assert_eq!(CounterKind::AverageTimer32.reset_value(1234), 0);
    }

    #[test]
    fn instantaneous_counts_ignore_previous() {
        let value = calc(
            CounterKind::NumberOfItems64,
            RawSample::new(10, 0, 0),
            RawSample::new(42, 0, 0),
        );
        assert_eq!(value, Ok(42.0));
    }

    #[test]
    fn narrow_counts_wrap_at_32_bits() {
        let past_max = i64::from(i32::MAX) + 1;
        let narrow =
            calc(CounterKind::NumberOfItems32, RawSample::zero(0), RawSample::new(past_max, 0, 0));
        let wide =
            calc(CounterKind::NumberOfItems64, RawSample::zero(0), RawSample::new(past_max, 0, 0));

        assert_eq!(narrow, Ok(f64::from(i32::MIN)));
        assert_eq!(wide, Ok(past_max as f64));
    }

    #[test]
    fn delta_is_difference_between_samples() {
        let value =
            calc(CounterKind::CounterDelta64, RawSample::new(10, 0, 0), RawSample::new(42, 0, 5));
        assert_eq!(value, Ok(32.0));
    }

    #[test]
    fn rate_divides_by_elapsed_seconds() {
        let value = calc(
            CounterKind::RateOfCountsPerSecond64,
            RawSample::new(0, 0, 0),
            RawSample::new(50, 0, 2 * F),
        )
        .unwrap();
        assert_relative_eq!(value, 25.0);
    }

    #[test]
    fn rate_without_elapsed_time_is_ambiguous() {
        let value = calc(
            CounterKind::RateOfCountsPerSecond64,
            RawSample::new(0, 0, 7),
            RawSample::new(50, 0, 7),
        );
        assert_eq!(value, Err(Error::AmbiguousDivision { kind: CounterKind::RateOfCountsPerSecond64 }));
    }

    #[test]
    fn elapsed_time_measures_from_raw_start() {
        let start = 3 * F;
        let value = calc(
            CounterKind::ElapsedTime,
            RawSample::zero(0),
            RawSample::new(start, 0, start + F / 2),
        )
        .unwrap();
        assert_relative_eq!(value, 0.5);
    }

    #[test]
    fn timers_are_percentages_of_elapsed_ticks() {
        let previous = RawSample::new(0, 0, 0);
        let current = RawSample::new(250, 0, 1000);

        assert_relative_eq!(calc(CounterKind::CounterTimer, previous, current).unwrap(), 25.0);
        assert_relative_eq!(calc(CounterKind::Timer100Ns, previous, current).unwrap(), 25.0);
        assert_relative_eq!(
            calc(CounterKind::CounterTimerInverse, previous, current).unwrap(),
            75.0
        );
        assert_relative_eq!(calc(CounterKind::Timer100NsInverse, previous, current).unwrap(), 75.0);
    }

    #[test]
    fn sample_counter_is_successes_per_second() {
        let value = calc(
            CounterKind::SampleCounter,
            RawSample::new(4, 0, F),
            RawSample::new(10, 0, 3 * F),
        )
        .unwrap();
        assert_relative_eq!(value, 3.0);
    }

    #[test]
    fn average_count_is_items_per_operation() {
        let value = calc(
            CounterKind::AverageCount64,
            RawSample::zero(0),
            RawSample::new(30, 5, 0),
        );
        assert_eq!(value, Ok(6.0));
    }

    #[test]
    fn average_timer_is_seconds_per_operation() {
        let value = calc(
            CounterKind::AverageTimer32,
            RawSample::new(F, 1, 0),
            RawSample::new(4 * F, 4, 0),
        )
        .unwrap();
        assert_relative_eq!(value, 1.0);
    }

    #[test]
    fn raw_fraction_is_instantaneous_percentage() {
        let value =
            calc(CounterKind::RawFraction, RawSample::new(99, 99, 0), RawSample::new(25, 100, 0));
        assert_eq!(value, Ok(25.0));
    }

    #[test]
    fn sample_fraction_is_interval_percentage() {
        let value = calc(
            CounterKind::SampleFraction,
            RawSample::new(10, 20, 0),
            RawSample::new(13, 24, 0),
        );
        assert_eq!(value, Ok(75.0));
    }

    #[test]
    fn zero_base_delta_is_ambiguous() {
        for kind in [
            CounterKind::AverageCount64,
            CounterKind::AverageTimer32,
            CounterKind::RawFraction,
            CounterKind::SampleFraction,
        ] {
            let value = calc(kind, RawSample::new(5, 0, 0), RawSample::new(9, 0, 10));
            assert_eq!(value, Err(Error::AmbiguousDivision { kind }));
        }
    }

    #[test]
    fn base_kinds_sample_their_raw_value() {
        let value = calc(CounterKind::AverageBase, RawSample::zero(0), RawSample::new(7, 0, 0));
        assert_eq!(value, Ok(7.0));
    }
}
