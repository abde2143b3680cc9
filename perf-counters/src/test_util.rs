use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use mockall::mock;

use crate::{CounterAddress, CounterHandle, CounterKind, CounterSource, Error, RawCounter};

mock! {
    pub RawCounter {}

    impl RawCounter for RawCounter {
        fn kind(&self) -> Option<CounterKind>;
        fn load(&self) -> i64;
        fn store(&self, value: i64);
        fn add(&self, delta: i64) -> i64;
        fn timestamp(&self) -> i64;
        fn sample(&self) -> Result<f64, Error>;
        fn release(&self);
    }
}

mock! {
    pub CounterSource {}

    impl CounterSource for CounterSource {
        fn create(&self, address: &CounterAddress, read_only: bool) -> Result<CounterHandle, Error>;
    }
}

/// Builds a raw counter mock that tolerates any reads and counts releases.
pub fn releasing_counter(kind: Option<CounterKind>, released: &Arc<AtomicUsize>) -> MockRawCounter {
    let released = Arc::clone(released);
    let mut raw = MockRawCounter::new();
    raw.expect_kind().return_const(kind);
    raw.expect_load().return_const(0i64);
    raw.expect_timestamp().return_const(0i64);
    raw.expect_release().returning(move || {
        released.fetch_add(1, Ordering::SeqCst);
    });
    raw
}

/// Builds a source mock expecting exactly `times` creations, each returning a handle whose
/// storage reports the kind chosen by `kind_for`.
pub fn counting_source<F>(
    times: usize,
    released: &Arc<AtomicUsize>,
    kind_for: F,
) -> MockCounterSource
where
    F: Fn(&CounterAddress) -> Option<CounterKind> + Send + 'static,
{
    let released = Arc::clone(released);
    let mut source = MockCounterSource::new();
    source.expect_create().times(times).returning(move |address, read_only| {
        let raw = releasing_counter(kind_for(address), &released);
        Ok(CounterHandle::new(address.clone(), read_only, raw))
    });
    source
}
