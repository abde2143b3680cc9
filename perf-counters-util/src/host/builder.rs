use std::env;

use quanta::Clock;

use super::HostCounterSource;

const DEFAULT_MACHINE_NAME: &str = "localhost";

/// Builder for a host-backed counter source.
pub struct HostCounterSourceBuilder {
    machine_name: Option<String>,
    clock: Option<Clock>,
}

impl HostCounterSourceBuilder {
    /// Creates a new `HostCounterSourceBuilder` with default settings.
    pub fn new() -> Self {
        Self { machine_name: None, clock: None }
    }

    /// Sets the name this host answers to.
    ///
    /// Addresses that name this machine, or the local machine (`"."`), are served by the store;
    /// any other machine is unreachable.
    ///
    /// Defaults to the `HOSTNAME` (or `COMPUTERNAME`) environment variable, falling back to
    /// `localhost`.
    #[must_use]
    pub fn with_machine_name<N>(mut self, machine_name: N) -> Self
    where
        N: Into<String>,
    {
        self.machine_name = Some(machine_name.into());
        self
    }

    /// Sets the clock used to timestamp samples.
    ///
    /// Passing a mocked [`Clock`] makes rate, elapsed-time and timer samples deterministic.
    ///
    /// Defaults to the system's monotonic clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds the counter source.
    ///
    /// The store starts without any installed category.
    pub fn build(self) -> HostCounterSource {
        let machine_name = self.machine_name.unwrap_or_else(default_machine_name);
        let clock = self.clock.unwrap_or_else(Clock::new);
        HostCounterSource::from_parts(machine_name, clock)
    }
}

impl Default for HostCounterSourceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn default_machine_name() -> String {
    env::var("HOSTNAME")
        .or_else(|_| env::var("COMPUTERNAME"))
        .ok()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_MACHINE_NAME.to_owned())
}
