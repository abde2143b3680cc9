use hashbrown::HashMap;
use perf_counters::{CategoryDefinition, CategoryType, CounterAddress, CounterKind, Error};

/// An installed category: its definition plus a lookup of counter kinds by name.
pub(super) struct InstalledCategory {
    definition: CategoryDefinition,
    kinds: HashMap<String, CounterKind>,
}

impl InstalledCategory {
    pub fn new(definition: CategoryDefinition) -> Self {
        let kinds = definition
            .counters()
            .iter()
            .map(|record| (record.name().to_owned(), record.kind()))
            .collect();

        Self { definition, kinds }
    }

    pub fn definition(&self) -> &CategoryDefinition {
        &self.definition
    }

    /// Resolves the kind of the counter at `address`, checking that the instance name fits the
    /// category type.
    pub fn resolve(&self, address: &CounterAddress) -> Result<CounterKind, Error> {
        let unavailable = |reason: String| Error::StorageUnavailable {
            address: address.to_string(),
            reason,
        };

        let kind = self.kinds.get(address.counter()).copied().ok_or_else(|| {
            unavailable(format!(
                "counter {} is not installed in category {}",
                address.counter(),
                self.definition.name()
            ))
        })?;

        match (self.definition.category_type(), address.instance()) {
            (CategoryType::SingleInstance, Some(instance)) => Err(unavailable(format!(
                "category {} is single-instance, but instance {} was requested",
                self.definition.name(),
                instance
            ))),
            (CategoryType::MultiInstance, None) => Err(unavailable(format!(
                "category {} is multi-instance, but no instance was requested",
                self.definition.name()
            ))),
            _ => Ok(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use perf_counters::{
        CategoryDefinition, CategoryType, CounterAddress, CounterCreationData, CounterKind, Error,
    };

    use super::InstalledCategory;

    fn category(category_type: CategoryType) -> InstalledCategory {
        InstalledCategory::new(CategoryDefinition::new("Cache", "", category_type).with_counters(
            CounterCreationData::for_kind(CounterKind::AverageTimer32, "Fetch", "Fetch time"),
        ))
    }

    #[test]
    fn resolves_primary_and_base() {
        let installed = category(CategoryType::SingleInstance);
        let address = CounterAddress::new("Cache", "Fetch");

        assert_eq!(installed.resolve(&address), Ok(CounterKind::AverageTimer32));
        assert_eq!(installed.resolve(&address.base()), Ok(CounterKind::AverageBase));
    }

    #[test]
    fn rejects_instance_misuse() {
        let single = category(CategoryType::SingleInstance);
        let multi = category(CategoryType::MultiInstance);
        let plain = CounterAddress::new("Cache", "Fetch");
        let instanced = plain.clone().with_instance("users");

        assert!(matches!(single.resolve(&instanced), Err(Error::StorageUnavailable { .. })));
        assert!(matches!(multi.resolve(&plain), Err(Error::StorageUnavailable { .. })));
        assert_eq!(multi.resolve(&instanced), Ok(CounterKind::AverageTimer32));
    }
}
