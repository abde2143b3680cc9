use std::{collections::HashMap, hash::Hash, thread, time::Duration};

use perf_counters::{
    AverageTimer, CategoryDefinition, CategoryInstaller, CategoryType, Counter, CounterAddress,
    CounterCreationData, CounterSource, Error, NumberOfItems32,
};
use perf_counters_util::HostCounterSource;
use tracing::info;

const CATEGORY: &str = "Example User Cache";
const CACHE_NAME: &str = "UserCache";

/// Counters describing one cache.
struct CacheMonitor {
    count: NumberOfItems32,
    average_fetch: AverageTimer,
}

impl CacheMonitor {
    fn new<S>(source: &S, category: &str, cache_name: &str, read_only: bool) -> Result<Self, Error>
    where
        S: CounterSource + ?Sized,
    {
        let count = NumberOfItems32::new(
            source,
            &CounterAddress::new(category, format!("{cache_name}Count")),
            read_only,
        )?;
        let average_fetch = AverageTimer::new(
            source,
            &CounterAddress::new(category, format!("{cache_name}AverageFetch")),
            read_only,
        )?;

        let monitor = Self { count, average_fetch };
        if !read_only {
            monitor.reset()?;
        }
        Ok(monitor)
    }

    fn reset(&self) -> Result<(), Error> {
        self.count.reset()?;
        self.average_fetch.reset()
    }

    fn creation_data(cache_name: &str) -> Vec<CounterCreationData> {
        let mut records = NumberOfItems32::creation_data(
            &format!("{cache_name}Count"),
            "The number of times the cache has been accessed",
        );
        records.extend(CounterCreationData::for_kind_with_base_help(
            AverageTimer::KIND,
            &format!("{cache_name}AverageFetch"),
            "The average time taken to fetch an item from the cache",
            "AverageFetch base",
        ));
        records
    }
}

/// A read-through cache that records every miss on its monitor.
struct Cache<K, V, F> {
    entries: HashMap<K, V>,
    fetch: F,
    monitor: CacheMonitor,
}

impl<K, V, F> Cache<K, V, F>
where
    K: Eq + Hash + Clone,
    V: Clone,
    F: FnMut(&K) -> Option<V>,
{
    fn new(fetch: F, monitor: CacheMonitor) -> Self {
        Self { entries: HashMap::new(), fetch, monitor }
    }

    fn get(&mut self, key: &K) -> Result<Option<V>, Error> {
        if let Some(value) = self.entries.get(key) {
            return Ok(Some(value.clone()));
        }

        let fetch = &mut self.fetch;
        let value = self.monitor.average_fetch.time(|| fetch(key))?;
        self.monitor.count.increment()?;

        if let Some(value) = &value {
            self.entries.insert(key.clone(), value.clone());
        }
        Ok(value)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let source = HostCounterSource::new();
    source.install(
        CategoryDefinition::new(CATEGORY, "An example cache of users.", CategoryType::SingleInstance)
            .with_counters(CacheMonitor::creation_data(CACHE_NAME)),
    )?;

    let monitor = CacheMonitor::new(&source, CATEGORY, CACHE_NAME, false)?;
    let mut cache = Cache::new(
        |id: &u32| {
            thread::sleep(Duration::from_millis(u64::from(*id % 5) * 10));
            (*id != 13).then(|| format!("user-{id}"))
        },
        monitor,
    );

    // A second, read-only view of the same counters, the way an external observer would see them.
    let observer = CacheMonitor::new(&source, CATEGORY, CACHE_NAME, true)?;

    for round in 0..3 {
        for id in [1, 2, 3, 13, 4] {
            let user = cache.get(&id)?;
            info!(round, id, ?user, "Looked up user.");
        }

        info!(
            round,
            misses = observer.count.raw_value(),
            average_fetch_secs = ?observer.average_fetch.sample(),
            "Cache counters."
        );
    }

    source.uninstall(CATEGORY);
    Ok(())
}
