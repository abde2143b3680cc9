//! Declarative counter metadata.
//!
//! Counters must be installed into a category before a host-backed store can open them.  The
//! types here describe what to install, and are produced by the counter types themselves via
//! [`Counter::creation_data`](crate::Counter::creation_data) so that the installed kind always
//! matches the type that will later wrap the handle.

use std::collections::HashSet;

use crate::{
    naming::{base_counter_help, base_counter_name},
    CounterKind, Error,
};

/// Installation record for a single raw counter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CounterCreationData {
    name: String,
    help: String,
    kind: CounterKind,
}

impl CounterCreationData {
    /// Creates a single installation record.
    pub fn new<N, H>(name: N, help: H, kind: CounterKind) -> Self
    where
        N: Into<String>,
        H: Into<String>,
    {
        Self { name: name.into(), help: help.into(), kind }
    }

    /// Builds the installation records for a counter of the given kind.
    ///
    /// Simple kinds produce one record.  Composite kinds produce the primary record followed by
    /// the base record, named with [`base_counter_name`] and described with
    /// [`base_counter_help`].
    pub fn for_kind(kind: CounterKind, name: &str, help: &str) -> Vec<Self> {
        Self::for_kind_with_base_help(kind, name, help, &base_counter_help(help))
    }

    /// Builds the installation records for a counter of the given kind, with explicit help text
    /// for the base record.
    ///
    /// The base name is always derived from `name`, since it is how stores locate the base.
    /// `base_help` is ignored for simple kinds.
    pub fn for_kind_with_base_help(
        kind: CounterKind,
        name: &str,
        help: &str,
        base_help: &str,
    ) -> Vec<Self> {
        let mut records = vec![Self::new(name, help, kind)];
        if let Some(base_kind) = kind.base_kind() {
            records.push(Self::new(base_counter_name(name), base_help, base_kind));
        }
        records
    }

    /// Counter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Help text.
    pub fn help(&self) -> &str {
        &self.help
    }

    /// Counter kind.
    pub fn kind(&self) -> CounterKind {
        self.kind
    }
}

/// Whether a category holds one set of counters or one set per instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CategoryType {
    /// Counters are addressed without an instance name.
    SingleInstance,
    /// Counters are addressed with an instance name.
    MultiInstance,
}

/// A category of counters, ready to be installed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryDefinition {
    name: String,
    help: String,
    category_type: CategoryType,
    counters: Vec<CounterCreationData>,
}

impl CategoryDefinition {
    /// Creates an empty category definition.
    pub fn new<N, H>(name: N, help: H, category_type: CategoryType) -> Self
    where
        N: Into<String>,
        H: Into<String>,
    {
        Self { name: name.into(), help: help.into(), category_type, counters: Vec::new() }
    }

    /// Appends counter records, in order.
    #[must_use]
    pub fn with_counters<I>(mut self, counters: I) -> Self
    where
        I: IntoIterator<Item = CounterCreationData>,
    {
        self.counters.extend(counters);
        self
    }

    /// Category name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Help text.
    pub fn help(&self) -> &str {
        &self.help
    }

    /// Category type.
    pub fn category_type(&self) -> CategoryType {
        self.category_type
    }

    /// Counter records, in installation order.
    pub fn counters(&self) -> &[CounterCreationData] {
        &self.counters
    }

    /// Checks that the definition can be installed.
    ///
    /// Counter names must be unique, every composite counter must be immediately followed by its
    /// base counter (with the derived name and the matching base kind), and every base counter
    /// must follow the composite counter it belongs to.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidCategory`] describes the first problem found.
    pub fn validate(&self) -> Result<(), Error> {
        let invalid =
            |reason: String| Error::InvalidCategory { category: self.name.clone(), reason };

        if self.name.is_empty() {
            return Err(invalid("category name is empty".to_string()));
        }

        let mut seen = HashSet::new();
        for record in &self.counters {
            if record.name.is_empty() {
                return Err(invalid("counter name is empty".to_string()));
            }
            if !seen.insert(record.name.as_str()) {
                return Err(invalid(format!("counter {} is defined more than once", record.name)));
            }
        }

        let mut records = self.counters.iter().peekable();
        while let Some(record) = records.next() {
            if record.kind.is_base() {
                return Err(invalid(format!(
                    "base counter {} does not follow a composite counter",
                    record.name
                )));
            }

            if let Some(base_kind) = record.kind.base_kind() {
                let expected = base_counter_name(&record.name);
                match records.next() {
                    Some(base) if base.name == expected && base.kind == base_kind => {}
                    _ => {
                        return Err(invalid(format!(
                            "counter {} must be followed by base counter {} of kind {}",
                            record.name, expected, base_kind
                        )))
                    }
                }
            }
        }

        Ok(())
    }
}

/// Installs category definitions into a counter store.
///
/// The counter types only produce metadata; whatever owns the store's registration of
/// categories implements this trait.
pub trait CategoryInstaller {
    /// Installs a category.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidCategory`] if the definition does not validate or the category already
    /// exists.
    fn install(&self, category: CategoryDefinition) -> Result<(), Error>;

    /// Removes a category, returning `true` if it existed.
    fn uninstall(&self, name: &str) -> bool;

    /// Whether or not a category with the given name is installed.
    fn exists(&self, name: &str) -> bool;
}
