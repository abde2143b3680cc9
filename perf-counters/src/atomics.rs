//! Atomic types used for counter storage.
//!
//! Every raw counter is a signed 64-bit cell, and stores need an atomic integer of that size
//! regardless of whether the standard library exposes one for the target architecture.
//!
//! The atomic type is publicly re-exported here so that storage implementations in downstream
//! crates agree on a single cell type.

#[cfg(target_pointer_width = "32")]
pub use portable_atomic::AtomicI64;
#[cfg(not(target_pointer_width = "32"))]
pub use std::sync::atomic::AtomicI64;
