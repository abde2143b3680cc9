use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use parking_lot::Mutex;
use perf_counters::{atomics::AtomicI64, CounterKind, Error, RawCounter, RawSample, TickClock};

/// A handle's view of a host cell.
///
/// The cell itself is shared by every handle on the same counter; the previous sample is private
/// to this handle, so two readers sampling the same counter each see the change since their own
/// last sample.
pub(super) struct HostCounter {
    kind: CounterKind,
    cell: Arc<AtomicI64>,
    base: Option<Arc<AtomicI64>>,
    clock: TickClock,
    previous: Mutex<RawSample>,
    open_handles: Arc<AtomicUsize>,
}

impl HostCounter {
    pub fn new(
        kind: CounterKind,
        cell: Arc<AtomicI64>,
        base: Option<Arc<AtomicI64>>,
        clock: TickClock,
        open_handles: Arc<AtomicUsize>,
    ) -> Self {
        let previous = Mutex::new(RawSample::zero(clock.now()));
        open_handles.fetch_add(1, Ordering::AcqRel);
        Self { kind, cell, base, clock, previous, open_handles }
    }

    fn read(&self) -> RawSample {
        let base = self.base.as_ref().map_or(0, |base| base.load(Ordering::Acquire));
        RawSample::new(self.cell.load(Ordering::Acquire), base, self.clock.now())
    }
}

impl RawCounter for HostCounter {
    fn kind(&self) -> Option<CounterKind> {
        Some(self.kind)
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

    fn reset(&self, value: i64) {
        // Composite bases are reset right after their primary, always back to zero.
        let mut previous = self.previous.lock();
        self.store(value);
        *previous = RawSample::new(value, 0, self.clock.now());
    }

    fn timestamp(&self) -> i64 {
        self.clock.now()
    }

    fn sample(&self) -> Result<f64, Error> {
        let mut previous = self.previous.lock();
        let current = self.read();
        let value = self.kind.calculate(&previous, &current, self.clock.frequency());
        *previous = current;
        value
    }

    fn release(&self) {
        self.open_handles.fetch_sub(1, Ordering::AcqRel);
    }
}
