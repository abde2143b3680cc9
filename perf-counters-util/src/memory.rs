use std::sync::{atomic::Ordering, Arc};

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use perf_counters::{
    atomics::AtomicI64, CounterAddress, CounterHandle, CounterKind, CounterSource, Error,
    RawCounter, TickClock,
};
use quanta::Clock;
use tracing::debug;

static SHARED: Lazy<MemoryCounterSource> = Lazy::new(MemoryCounterSource::new);

type Cells = Mutex<IndexMap<CounterAddress, Arc<AtomicI64>>>;

struct Inner {
    cells: Cells,
    clock: TickClock,
}

/// An in-memory counter store, for testing.
///
/// Every address gets one shared cell, allocated the first time the address is referenced, so
/// handles opened on the same address observe each other's updates.  Creation never fails, no
/// category needs to be installed, and samples simply report the raw value: no formula is
/// applied.
///
/// Callers can take snapshots of every cell at any time, in the order the cells were first
/// referenced.
#[derive(Clone)]
pub struct MemoryCounterSource {
    inner: Arc<Inner>,
}

impl MemoryCounterSource {
    /// Creates an empty `MemoryCounterSource`.
    pub fn new() -> Self {
        Self::with_clock(Clock::new())
    }

    /// Creates an empty `MemoryCounterSource` whose handles report timestamps from `clock`.
    pub fn with_clock(clock: Clock) -> Self {
        let clock = TickClock::from_clock(clock);
        let inner = Inner { cells: Mutex::new(IndexMap::new()), clock };
        Self { inner: Arc::new(inner) }
    }

    /// The process-wide shared instance.
    ///
    /// Initialized on first use; every caller sees the same cells.
    pub fn shared() -> &'static MemoryCounterSource {
        &SHARED
    }

    /// Current raw value at `address`, if it has ever been referenced.
    pub fn raw_value(&self, address: &CounterAddress) -> Option<i64> {
        self.inner.cells.lock().get(address).map(|cell| cell.load(Ordering::Acquire))
    }

    /// Takes a snapshot of every cell, in order of first reference.
    pub fn snapshot(&self) -> Vec<(CounterAddress, i64)> {
        let cells = self.inner.cells.lock().clone();
        cells.into_iter().map(|(address, cell)| (address, cell.load(Ordering::Acquire))).collect()
    }

    fn cell(&self, address: &CounterAddress) -> Arc<AtomicI64> {
        let mut cells = self.inner.cells.lock();
        let cell = cells.entry(address.clone()).or_insert_with(|| Arc::new(AtomicI64::new(0)));
        Arc::clone(cell)
    }
}

impl Default for MemoryCounterSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterSource for MemoryCounterSource {
    fn create(&self, address: &CounterAddress, read_only: bool) -> Result<CounterHandle, Error> {
        let raw = MemoryCounter { cell: self.cell(address), clock: self.inner.clock.clone() };
        debug!(%address, read_only, "Opened in-memory counter.");
        Ok(CounterHandle::new(address.clone(), read_only, raw))
    }
}

struct MemoryCounter {
    cell: Arc<AtomicI64>,
    clock: TickClock,
}

impl RawCounter for MemoryCounter {
    fn kind(&self) -> Option<CounterKind> {
        None
    }

    fn load(&self) -> i64 {
        self.cell.load(Ordering::Acquire)
    }

    fn store(&self, value: i64) {
        self.cell.store(value, Ordering::Release);
    }

    fn add(&self, delta: i64) -> i64 {
        self.cell.fetch_add(delta, Ordering::AcqRel).wrapping_add(delta)
    }

    fn timestamp(&self) -> i64 {
        self.clock.now()
    }

    fn sample(&self) -> Result<f64, Error> {
        Ok(self.load() as f64)
    }

    fn release(&self) {}
}

#[cfg(test)]
mod tests {
    use std::thread;

    use perf_counters::{
        AverageCount, Counter, CounterAddress, CounterSource, Error, NumberOfItems,
        RateOfCountsPerSecond,
    };
    use proptest::prelude::*;

    use super::MemoryCounterSource;

    fn hits() -> CounterAddress {
        CounterAddress::new("Cache", "Hits")
    }

    #[test]
    fn handles_share_cells_per_address() {
        let source = MemoryCounterSource::new();
        let first = source.create(&hits(), false).unwrap();
        let second = source.create(&hits(), false).unwrap();

        first.increment_by(5).unwrap();
        assert_eq!(second.raw_value(), 5);
        assert_eq!(source.raw_value(&hits()), Some(5));

        let other = source.create_instanced("Cache", "Hits", "users", false).unwrap();
        assert_eq!(other.raw_value(), 0);
    }

    #[test]
    fn sample_reports_raw_value() {
        let source = MemoryCounterSource::new();
        let counter = RateOfCountsPerSecond::new(&source, &hits(), false).unwrap();
        counter.increment().unwrap();
        counter.increment().unwrap();

        assert_eq!(counter.sample(), Ok(2.0));
    }

    #[test]
    fn read_only_handles_observe_but_never_mutate() {
        let source = MemoryCounterSource::new();
        let writer = NumberOfItems::new(&source, &hits(), false).unwrap();
        let reader = NumberOfItems::new(&source, &hits(), true).unwrap();

        writer.increment_by(3).unwrap();
        assert_eq!(reader.raw_value(), 3);
        assert_eq!(
            reader.increment(),
            Err(Error::ReadOnlyViolation { address: hits().to_string() })
        );
        assert_eq!(writer.raw_value(), 3);
    }

    #[test]
    fn snapshot_is_in_first_reference_order() {
        let source = MemoryCounterSource::new();
        let fetch = CounterAddress::new("Cache", "Fetch");
        let counter = AverageCount::new(&source, &fetch, false).unwrap();
        let count = NumberOfItems::new(&source, &hits(), false).unwrap();

        count.increment().unwrap();
        counter.increment(10, 2).unwrap();

        assert_eq!(
            source.snapshot(),
            vec![(fetch.clone(), 10), (fetch.base(), 2), (hits(), 1)]
        );
    }

    #[test]
    fn concurrent_increments_are_never_lost() {
        let source = MemoryCounterSource::new();
        let counter = NumberOfItems::new(&source, &hits(), false).unwrap();

        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..1000 {
                        counter.increment().unwrap();
                    }
                });
            }
        });

        assert_eq!(counter.raw_value(), 8000);
    }

    #[test]
    fn shared_instance_is_a_singleton() {
        let address = CounterAddress::new("MemoryTests", "Singleton");
        let first = MemoryCounterSource::shared().create(&address, false).unwrap();
        first.increment().unwrap();

        let second = MemoryCounterSource::shared().create(&address, true).unwrap();
        assert_eq!(second.raw_value(), 1);
    }

    proptest! {
        #[test]
        fn increments_sum_in_any_order(deltas in prop::collection::vec(-1_000_000i64..1_000_000, 0..64)) {
            let source = MemoryCounterSource::new();
            let forward = source.create(&hits(), false).unwrap();
            let backward = source.create(&CounterAddress::new("Cache", "Misses"), false).unwrap();

            for delta in &deltas {
                forward.increment_by(*delta).unwrap();
            }
            for delta in deltas.iter().rev() {
                backward.increment_by(*delta).unwrap();
            }

            let expected: i64 = deltas.iter().sum();
            prop_assert_eq!(forward.raw_value(), expected);
            prop_assert_eq!(backward.raw_value(), expected);
        }
    }
}
