use std::{
    fmt,
    sync::atomic::{AtomicBool, Ordering},
};

use tracing::{trace, warn};

use crate::{CounterAddress, CounterKind, Error};

/// Storage for a single raw counter.
///
/// Implemented by counter stores.  Mutation is infallible at this level: read-only enforcement
/// happens in [`CounterHandle`], so every store gets the same behavior.
pub trait RawCounter: Send + Sync {
    /// Kind of the counter as installed in the store, if the store records one.
    fn kind(&self) -> Option<CounterKind>;

    /// Loads the raw value.
    fn load(&self) -> i64;

    /// Stores a new raw value.
    fn store(&self, value: i64);

    /// Adds `delta` to the raw value, returning the new raw value.
    ///
    /// This must be a single atomic read-modify-write: concurrent callers must never lose an
    /// update.
    fn add(&self, delta: i64) -> i64;

    /// Resets the raw value to `value` and restarts any sampling interval kept for this counter.
    ///
    /// The next sample is computed against the reset state rather than the last reading taken
    /// before the reset.  Stores that keep no sampling state can rely on the default, which only
    /// stores `value`.
    fn reset(&self, value: i64) {
        self.store(value);
    }

    /// Current timestamp on the store's clock, in host ticks.
    fn timestamp(&self) -> i64;

    /// Computes the current sample.
    fn sample(&self) -> Result<f64, Error>;

    /// Releases any resource held for this counter.
    ///
    /// Called at most once per handle.
    fn release(&self);
}

/// A handle to one raw counter.
///
/// Handles are created by a [`CounterSource`](crate::CounterSource) and release their storage
/// when disposed, or when dropped if they were never disposed explicitly.
pub struct CounterHandle {
    address: CounterAddress,
    read_only: bool,
    inner: Box<dyn RawCounter>,
    disposed: AtomicBool,
}

impl CounterHandle {
    /// Creates a `CounterHandle` over the given storage.
    ///
    /// Handles opened on a remote address are always read-only, regardless of `read_only`.
    pub fn new<R>(address: CounterAddress, read_only: bool, raw: R) -> Self
    where
        R: RawCounter + 'static,
    {
        Self::from_boxed(address, read_only, Box::new(raw))
    }

    /// Creates a `CounterHandle` over boxed storage.
    pub fn from_boxed(address: CounterAddress, read_only: bool, raw: Box<dyn RawCounter>) -> Self {
        let read_only = read_only || address.is_remote();
        Self { address, read_only, inner: raw, disposed: AtomicBool::new(false) }
    }

    /// Address of the counter.
    pub fn address(&self) -> &CounterAddress {
        &self.address
    }

    /// Whether or not this handle rejects mutation.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Kind of the counter as installed in the store, if the store records one.
    pub fn kind(&self) -> Option<CounterKind> {
        self.inner.kind()
    }

    /// Current raw value.
    pub fn raw_value(&self) -> i64 {
        self.inner.load()
    }

    /// Sets the raw value.
    pub fn set_raw_value(&self, value: i64) -> Result<(), Error> {
        self.check_writable()?;
        self.inner.store(value);
        Ok(())
    }

    /// Increments the raw value by one, returning the new raw value.
    pub fn increment(&self) -> Result<i64, Error> {
        self.increment_by(1)
    }

    /// Decrements the raw value by one, returning the new raw value.
    pub fn decrement(&self) -> Result<i64, Error> {
        self.increment_by(-1)
    }

    /// Adds `delta` to the raw value, returning the new raw value.
    ///
    /// `delta` may be negative.
    pub fn increment_by(&self, delta: i64) -> Result<i64, Error> {
        self.check_writable()?;
        Ok(self.inner.add(delta))
    }

    /// Computes the current sample.
    pub fn sample(&self) -> Result<f64, Error> {
        self.inner.sample()
    }

    /// Current timestamp on the store's clock, in host ticks.
    pub fn timestamp(&self) -> i64 {
        self.inner.timestamp()
    }

    /// Resets the raw value to the start state of the given kind.
    pub fn reset(&self, kind: CounterKind) -> Result<(), Error> {
        self.check_writable()?;
        self.inner.reset(kind.reset_value(self.inner.timestamp()));
        Ok(())
    }

    /// Releases the storage behind this handle.
    ///
    /// Safe to call any number of times; only the first call releases anything.
    pub fn dispose(&self) {
        if !self.disposed.swap(true, Ordering::AcqRel) {
            trace!(address = %self.address, "Releasing counter handle.");
            self.inner.release();
        }
    }

    /// Whether or not this handle has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    fn check_writable(&self) -> Result<(), Error> {
        if self.read_only {
            warn!(address = %self.address, "Attempted to mutate a read-only counter.");
            return Err(Error::ReadOnlyViolation { address: self.address.to_string() });
        }

        Ok(())
    }
}

impl Drop for CounterHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl fmt::Display for CounterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.address, self.raw_value())
    }
}

impl fmt::Debug for CounterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CounterHandle")
            .field("address", &self.address)
            .field("read_only", &self.read_only)
            .field("raw_value", &self.raw_value())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;

    use super::CounterHandle;
    use crate::{test_util::MockRawCounter, CounterAddress, CounterKind, Error};

    fn address() -> CounterAddress {
        CounterAddress::new("Cache", "Hits")
    }

    #[test]
    fn read_only_rejects_every_mutation() {
        let mut raw = MockRawCounter::new();
        raw.expect_load().return_const(5i64);
        raw.expect_sample().returning(|| Ok(5.0));
        raw.expect_timestamp().return_const(0i64);
        raw.expect_store().never();
        raw.expect_add().never();
        raw.expect_release().times(1).return_const(());

        let handle = CounterHandle::new(address(), true, raw);
        let violation: Result<i64, Error> =
            Err(Error::ReadOnlyViolation { address: address().to_string() });

        assert_eq!(handle.set_raw_value(1), violation.clone().map(|_: i64| ()));
        assert_eq!(handle.increment(), violation.clone());
        assert_eq!(handle.decrement(), violation.clone());
        assert_eq!(handle.increment_by(3), violation.clone());
        assert_eq!(handle.reset(CounterKind::NumberOfItems64), violation.map(|_: i64| ()));

        assert_eq!(handle.raw_value(), 5);
        assert_eq!(handle.sample(), Ok(5.0));
    }

    #[test]
    fn remote_handles_are_read_only() {
        let mut raw = MockRawCounter::new();
        raw.expect_release().return_const(());

        let handle = CounterHandle::new(address().on_machine("elsewhere"), false, raw);
        assert!(handle.is_read_only());
    }

    #[test]
    fn increments_delegate_to_storage() {
        let mut raw = MockRawCounter::new();
        raw.expect_add().with(eq(1i64)).times(1).return_const(1i64);
        raw.expect_add().with(eq(-1i64)).times(1).return_const(0i64);
        raw.expect_add().with(eq(-7i64)).times(1).return_const(-7i64);
        raw.expect_release().return_const(());

        let handle = CounterHandle::new(address(), false, raw);
        assert_eq!(handle.increment(), Ok(1));
        assert_eq!(handle.decrement(), Ok(0));
        assert_eq!(handle.increment_by(-7), Ok(-7));
    }

    #[test]
    fn reset_uses_kind_start_state() {
        let mut raw = MockRawCounter::new();
        raw.expect_timestamp().return_const(9000i64);
        raw.expect_store().with(eq(9000i64)).times(1).return_const(());
        raw.expect_store().with(eq(0i64)).times(1).return_const(());
        raw.expect_release().return_const(());

        let handle = CounterHandle::new(address(), false, raw);
        handle.reset(CounterKind::ElapsedTime).unwrap();
        handle.reset(CounterKind::CounterDelta64).unwrap();
    }

    #[test]
    fn dispose_releases_once() {
        let mut raw = MockRawCounter::new();
        raw.expect_release().times(1).return_const(());

        let handle = CounterHandle::new(address(), false, raw);
        handle.dispose();
        handle.dispose();
        assert!(handle.is_disposed());
        drop(handle);
    }

    #[test]
    fn drop_releases_undisposed_handle() {
        let mut raw = MockRawCounter::new();
        raw.expect_release().times(1).return_const(());

        drop(CounterHandle::new(address(), false, raw));
    }
}
