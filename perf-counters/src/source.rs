use once_cell::sync::OnceCell;

use crate::{CounterAddress, CounterHandle, Error, SetSourceError};

static DEFAULT_SOURCE: OnceCell<Box<dyn CounterSource>> = OnceCell::new();

/// A factory for raw counter handles.
///
/// This is the seam between what a counter means and where its value lives: counter types ask a
/// source for handles, and never construct storage themselves.  Every call produces a new handle;
/// sources do not cache or deduplicate them, so callers hold the returned handle for as long as
/// they use the counter.
pub trait CounterSource: Send + Sync {
    /// Creates a handle to the counter at the given address.
    ///
    /// A handle for a remote address is always read-only.
    ///
    /// # Errors
    ///
    /// If the store cannot locate the counter, [`Error::StorageUnavailable`] is returned.
    fn create(&self, address: &CounterAddress, read_only: bool) -> Result<CounterHandle, Error>;

    /// Creates a handle to a counter of a single-instance category on the local machine.
    fn create_local(
        &self,
        category: &str,
        counter: &str,
        read_only: bool,
    ) -> Result<CounterHandle, Error> {
        self.create(&CounterAddress::new(category, counter), read_only)
    }

    /// Creates a handle to an instance of a counter on the local machine.
    fn create_instanced(
        &self,
        category: &str,
        counter: &str,
        instance: &str,
        read_only: bool,
    ) -> Result<CounterHandle, Error> {
        self.create(&CounterAddress::new(category, counter).with_instance(instance), read_only)
    }

    /// Creates a read-only handle to an instance of a counter on another machine.
    fn create_remote(
        &self,
        category: &str,
        counter: &str,
        instance: &str,
        machine: &str,
    ) -> Result<CounterHandle, Error> {
        let address =
            CounterAddress::new(category, counter).with_instance(instance).on_machine(machine);
        self.create(&address, true)
    }
}

// Blanket implementations.
macro_rules! impl_counter_source {
    ($inner_ty:ident, $ptr_ty:ty) => {
        impl<$inner_ty> $crate::CounterSource for $ptr_ty
        where
            $inner_ty: $crate::CounterSource + ?Sized,
        {
            fn create(
                &self,
                address: &$crate::CounterAddress,
                read_only: bool,
            ) -> Result<$crate::CounterHandle, $crate::Error> {
                std::ops::Deref::deref(self).create(address, read_only)
            }
        }
    };
}

impl_counter_source!(T, &T);
impl_counter_source!(T, std::boxed::Box<T>);
impl_counter_source!(T, std::sync::Arc<T>);

/// Sets the process-wide default counter source.
///
/// This may only be called once in the lifetime of a program.  Passing sources explicitly is
/// preferred; the default exists for applications that want one source shared by every component
/// without threading it through constructors.
///
/// # Errors
///
/// An error is returned if a default source has already been set.
pub fn set_default_source<S>(source: S) -> Result<(), SetSourceError>
where
    S: CounterSource + 'static,
{
    DEFAULT_SOURCE.set(Box::new(source)).map_err(|_| SetSourceError::new())
}

/// Returns the process-wide default counter source, if one has been set.
pub fn default_source() -> Option<&'static dyn CounterSource> {
    DEFAULT_SOURCE.get().map(|source| source.as_ref())
}
