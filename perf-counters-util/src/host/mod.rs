//! Host-backed counter storage.
//!
//! [`HostCounterSource`] models a machine's counter store: categories must be installed before
//! their counters can be opened, every counter lives in one cell shared by all handles opened on
//! it, and samples are derived with the formula of the counter's installed kind.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use hashbrown::HashMap;
use parking_lot::RwLock;
use perf_counters::{
    CategoryDefinition, CategoryInstaller, CounterAddress, CounterHandle, CounterSource, Error,
    TickClock, LOCAL_MACHINE,
};
use quanta::Clock;
use tracing::{debug, info};

mod builder;
pub use self::builder::HostCounterSourceBuilder;

mod category;
use self::category::InstalledCategory;

mod counter;
use self::counter::HostCounter;

mod storage;
use self::storage::{CellKey, CellRegistry};

struct Inner {
    machine_name: String,
    clock: TickClock,
    categories: RwLock<HashMap<String, Arc<InstalledCategory>>>,
    cells: CellRegistry,
    open_handles: Arc<AtomicUsize>,
}

/// A counter store hosted by this process.
///
/// Cloning a `HostCounterSource` is cheap, and clones share the same categories and cells.
#[derive(Clone)]
pub struct HostCounterSource {
    inner: Arc<Inner>,
}

impl HostCounterSource {
    /// Creates a `HostCounterSource` with default settings.
    ///
    /// Use [`HostCounterSource::builder`] to configure the machine name or the clock.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a builder for a `HostCounterSource`.
    pub fn builder() -> HostCounterSourceBuilder {
        HostCounterSourceBuilder::new()
    }

    pub(crate) fn from_parts(machine_name: String, clock: Clock) -> Self {
        let inner = Inner {
            machine_name,
            clock: TickClock::from_clock(clock),
            categories: RwLock::new(HashMap::new()),
            cells: CellRegistry::new(),
            open_handles: Arc::new(AtomicUsize::new(0)),
        };
        Self { inner: Arc::new(inner) }
    }

    /// The name this host answers to.
    pub fn machine_name(&self) -> &str {
        &self.inner.machine_name
    }

    /// Number of handles opened on this store that have not yet been released.
    pub fn open_handles(&self) -> usize {
        self.inner.open_handles.load(Ordering::Acquire)
    }

    /// The definition of an installed category.
    pub fn category(&self, name: &str) -> Option<CategoryDefinition> {
        self.inner.categories.read().get(name).map(|category| category.definition().clone())
    }

    fn is_reachable(&self, address: &CounterAddress) -> bool {
        match address.machine() {
            None => true,
            Some(machine) => {
                machine == LOCAL_MACHINE || machine.eq_ignore_ascii_case(&self.inner.machine_name)
            }
        }
    }

    fn installed(&self, address: &CounterAddress) -> Result<Arc<InstalledCategory>, Error> {
        if !self.is_reachable(address) {
            let machine = address.machine().unwrap_or_default();
            return Err(Error::StorageUnavailable {
                address: address.to_string(),
                reason: format!("machine {} is not reachable", machine),
            });
        }

        self.inner.categories.read().get(address.category()).cloned().ok_or_else(|| {
            Error::StorageUnavailable {
                address: address.to_string(),
                reason: format!("category {} is not installed", address.category()),
            }
        })
    }
}

impl Default for HostCounterSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterSource for HostCounterSource {
    fn create(&self, address: &CounterAddress, read_only: bool) -> Result<CounterHandle, Error> {
        let category = self.installed(address)?;
        let kind = category.resolve(address)?;

        let instance = address.instance();
        let key = CellKey::new(address.category(), instance, address.counter());
        let cell = self.inner.cells.get_or_create(&key);
        let base = kind.base_kind().map(|_| {
            let base = address.base();
            self.inner.cells.get_or_create(&CellKey::new(base.category(), instance, base.counter()))
        });

        let raw = HostCounter::new(
            kind,
            cell,
            base,
            self.inner.clock.clone(),
            Arc::clone(&self.inner.open_handles),
        );
        debug!(%address, %kind, read_only, "Opened host counter.");
        Ok(CounterHandle::new(address.clone(), read_only, raw))
    }
}

impl CategoryInstaller for HostCounterSource {
    fn install(&self, category: CategoryDefinition) -> Result<(), Error> {
        category.validate()?;

        let mut categories = self.inner.categories.write();
        if categories.contains_key(category.name()) {
            return Err(Error::InvalidCategory {
                category: category.name().to_owned(),
                reason: "category is already installed".to_owned(),
            });
        }

        info!(
            category = category.name(),
            category_type = ?category.category_type(),
            counters = category.counters().len(),
            "Installed counter category."
        );
        categories.insert(category.name().to_owned(), Arc::new(InstalledCategory::new(category)));
        Ok(())
    }

    fn uninstall(&self, name: &str) -> bool {
        let removed = self.inner.categories.write().remove(name).is_some();
        if removed {
            self.inner.cells.retain(|key| key.category != name);
            info!(category = name, "Uninstalled counter category.");
        }
        removed
    }

    fn exists(&self, name: &str) -> bool {
        self.inner.categories.read().contains_key(name)
    }
}
