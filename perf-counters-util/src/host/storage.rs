use std::{
    hash::BuildHasher,
    iter::repeat,
    num::NonZeroUsize,
    sync::Arc,
    thread::available_parallelism,
};

use hashbrown::{DefaultHashBuilder, HashMap};
use parking_lot::RwLock;
use perf_counters::atomics::AtomicI64;

/// Identifies one shared cell: a counter within a category, for one instance.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(super) struct CellKey {
    pub category: String,
    pub instance: Option<String>,
    pub counter: String,
}

impl CellKey {
    pub fn new(category: &str, instance: Option<&str>, counter: &str) -> Self {
        Self {
            category: category.to_owned(),
            instance: instance.map(str::to_owned),
            counter: counter.to_owned(),
        }
    }
}

type Shard = RwLock<HashMap<CellKey, Arc<AtomicI64>>>;

/// Sharded storage for the raw cells of every installed counter.
///
/// Cells are created on first reference and shared by every handle opened on the same key.
/// Lookups of existing cells only take a read lock on one shard.
pub(super) struct CellRegistry {
    shards: Vec<Shard>,
    shard_mask: usize,
    hasher: DefaultHashBuilder,
}

impl CellRegistry {
    pub fn new() -> Self {
        let shard_count = available_parallelism().map_or(1, NonZeroUsize::get).next_power_of_two();
        let shards = repeat(()).take(shard_count).map(|_| RwLock::new(HashMap::new())).collect();

        Self { shards, shard_mask: shard_count - 1, hasher: DefaultHashBuilder::default() }
    }

    fn shard(&self, key: &CellKey) -> &Shard {
        let index = (self.hasher.hash_one(key) as usize) & self.shard_mask;
        &self.shards[index]
    }

    /// Gets the cell for `key`, creating it if it does not yet exist.
    pub fn get_or_create(&self, key: &CellKey) -> Arc<AtomicI64> {
        let shard = self.shard(key);
        if let Some(cell) = shard.read().get(key) {
            return Arc::clone(cell);
        }

        let mut shard = shard.write();
        let cell = shard.entry(key.clone()).or_insert_with(|| Arc::new(AtomicI64::new(0)));
        Arc::clone(cell)
    }

    /// Drops every cell for which `f` returns `false`.
    ///
    /// Handles that already hold a dropped cell keep it alive, but it is no longer reachable
    /// through the registry.
    pub fn retain<F>(&self, mut f: F)
    where
        F: FnMut(&CellKey) -> bool,
    {
        for shard in &self.shards {
            shard.write().retain(|key, _| f(key));
        }
    }

    /// Number of cells in the registry.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().len()).sum()
    }
}
