//! Structured events emitted by the coordinator
//!
//! The coordinator performs no direct output. Everything worth logging is
//! described by a `CoordinatorEvent` and handed to the injected `EventSink`.

use std::time::Duration;

use serde::Serialize;

use super::availability::LookupSource;

/// Cache operation that failed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CacheOp {
    Get,
    Set,
}

/// Observable coordinator events
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CoordinatorEvent {
    /// Input failed handle validation
    InvalidFormat { input: String, reason: String },
    /// Filter answered "definitely absent"
    FilterShortCircuit { key: String },
    /// Cache returned an authoritative value
    CacheHit { key: String, taken: bool },
    /// Cache had no entry
    CacheMiss { key: String },
    /// Cache failed and was bypassed
    CacheFailure {
        key: String,
        op: CacheOp,
        error: String,
    },
    /// Store answered an existence query
    StoreLookup {
        key: String,
        taken: bool,
        source: LookupSource,
    },
    /// Store failed; surfaced to the caller
    StoreFailure { key: String, error: String },
    /// A taken handle was missing from a ready filter and has been added
    FilterRepaired { key: String },
    /// Registration accepted by the store
    Registered { key: String },
    /// Registration rejected as a duplicate
    RegistrationConflict { key: String },
    /// Registration failed at the store
    RegistrationFailed { key: String, error: String },
    /// Filter population started
    WarmupStarted {
        size_bits: usize,
        hash_count: usize,
    },
    /// Filter population finished
    WarmupCompleted { keys_loaded: u64, elapsed: Duration },
    /// Filter population aborted by a store error
    WarmupFailed { keys_loaded: u64, error: String },
    /// Filter replaced from a snapshot
    SnapshotRestored { inserted_count: u64 },
    /// Snapshot unusable; the filter will be rebuilt from the store
    SnapshotRejected { error: String },
}
