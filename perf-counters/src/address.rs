use std::fmt;

use crate::naming::base_counter_name;

/// Machine name that refers to the local machine.
pub const LOCAL_MACHINE: &str = ".";

/// The address of a single raw counter.
///
/// An address always includes a category and a counter name, and can optionally name an instance
/// of a multi-instance category and the machine that hosts the counter.  Addresses are fixed once
/// built.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CounterAddress {
    category: String,
    counter: String,
    instance: Option<String>,
    machine: Option<String>,
}

impl CounterAddress {
    /// Creates an address for a counter in a category on the local machine.
    pub fn new<C, N>(category: C, counter: N) -> Self
    where
        C: Into<String>,
        N: Into<String>,
    {
        Self { category: category.into(), counter: counter.into(), instance: None, machine: None }
    }

    /// Sets the instance name.
    ///
    /// An empty instance name is treated as no instance at all.
    #[must_use]
    pub fn with_instance<I>(mut self, instance: I) -> Self
    where
        I: Into<String>,
    {
        let instance = instance.into();
        self.instance = if instance.is_empty() { None } else { Some(instance) };
        self
    }

    /// Sets the machine that hosts the counter.
    #[must_use]
    pub fn on_machine<M>(mut self, machine: M) -> Self
    where
        M: Into<String>,
    {
        self.machine = Some(machine.into());
        self
    }

    /// Category name.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Counter name.
    pub fn counter(&self) -> &str {
        &self.counter
    }

    /// Instance name, if any.
    pub fn instance(&self) -> Option<&str> {
        self.instance.as_deref()
    }

    /// Machine name, if any.
    pub fn machine(&self) -> Option<&str> {
        self.machine.as_deref()
    }

    /// Whether or not this address names a machine other than the local one.
    ///
    /// Handles opened on a remote address are always read-only.
    pub fn is_remote(&self) -> bool {
        matches!(self.machine.as_deref(), Some(machine) if machine != LOCAL_MACHINE)
    }

    /// Address of the base counter paired with this counter.
    ///
    /// The base shares the category, instance and machine, and its name is derived with
    /// [`base_counter_name`].
    pub fn base(&self) -> Self {
        Self {
            category: self.category.clone(),
            counter: base_counter_name(&self.counter),
            instance: self.instance.clone(),
            machine: self.machine.clone(),
        }
    }
}

impl fmt::Display for CounterAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(machine) = &self.machine {
            write!(f, "\\\\{}", machine)?;
        }
        write!(f, "\\{}", self.category)?;
        if let Some(instance) = &self.instance {
            write!(f, "({})", instance)?;
        }
        write!(f, "\\{}", self.counter)
    }
}

#[cfg(test)]
mod tests {
    use super::CounterAddress;

    #[test]
    fn base_address_keeps_qualifiers() {
        let address = CounterAddress::new("Cache", "Hits").with_instance("users").on_machine("box");
        let base = address.base();

        assert_eq!(base.category(), "Cache");
        assert_eq!(base.counter(), "HitsBase");
        assert_eq!(base.instance(), Some("users"));
        assert_eq!(base.machine(), Some("box"));
    }

    #[test]
    fn remote_detection() {
        assert!(!CounterAddress::new("Cache", "Hits").is_remote());
        assert!(!CounterAddress::new("Cache", "Hits").on_machine(".").is_remote());
        assert!(CounterAddress::new("Cache", "Hits").on_machine("box").is_remote());
    }

    #[test]
    fn empty_instance_is_no_instance() {
        assert_eq!(CounterAddress::new("Cache", "Hits").with_instance("").instance(), None);
    }

    #[test]
    fn display() {
        assert_eq!(CounterAddress::new("Cache", "Hits").to_string(), "\\Cache\\Hits");
        assert_eq!(
            CounterAddress::new("Cache", "Hits").with_instance("users").on_machine("box").to_string(),
            "\\\\box\\Cache(users)\\Hits"
        );
    }
}
