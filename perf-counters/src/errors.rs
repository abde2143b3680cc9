use std::{error::Error as StdError, fmt};

use thiserror::Error;

use crate::CounterKind;

const SET_SOURCE_ERROR: &str =
    "attempted to set a default counter source after one was already installed";

/// Errors that can occur while creating, updating or sampling counters.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A mutating operation was attempted on a handle opened read-only.
    #[error("counter {address} is read-only")]
    ReadOnlyViolation {
        /// The address of the counter.
        address: String,
    },

    /// The store could not locate the requested category or counter.
    #[error("counter storage unavailable for {address}: {reason}")]
    StorageUnavailable {
        /// The address of the counter.
        address: String,
        /// Why the storage could not be located.
        reason: String,
    },

    /// A ratio sample had a zero denominator.
    #[error("sample of {kind} counter has a zero denominator")]
    AmbiguousDivision {
        /// The kind of counter being sampled.
        kind: CounterKind,
    },

    /// The counter type wrapping a handle does not match the kind the store has installed.
    #[error("counter {address} is installed as {installed}, but was opened as {expected}")]
    KindMismatch {
        /// The address of the counter.
        address: String,
        /// The kind required by the wrapping counter type.
        expected: CounterKind,
        /// The kind recorded by the store.
        installed: CounterKind,
    },

    /// A category definition could not be installed.
    #[error("invalid category {category}: {reason}")]
    InvalidCategory {
        /// The category name.
        category: String,
        /// Why the definition was rejected.
        reason: String,
    },
}

/// The type returned by [`set_default_source`](crate::set_default_source) if a default source
/// has already been installed.
pub struct SetSourceError(());

impl SetSourceError {
    pub(crate) fn new() -> Self {
        Self(())
    }
}

impl fmt::Debug for SetSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetSourceError").finish_non_exhaustive()
    }
}

impl fmt::Display for SetSourceError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(SET_SOURCE_ERROR)
    }
}

impl StdError for SetSourceError {}
