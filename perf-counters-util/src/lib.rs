//! Counter stores for `perf-counters`.
//!
//! - [`HostCounterSource`]: a host-backed store with installable categories and real sample
//!   formulas.
//! - [`MemoryCounterSource`]: an in-memory store for tests, which never fails and reports raw
//!   values as samples.
#![deny(missing_docs)]

mod host;
pub use host::{HostCounterSource, HostCounterSourceBuilder};

mod memory;
pub use memory::MemoryCounterSource;
