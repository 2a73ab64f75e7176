//! Error types for the lookup coordinator and its collaborators

use hc_01_membership_filter::FilterError;
use thiserror::Error;

use crate::domain::WarmupState;

/// Errors surfaced to callers of the coordinator
///
/// `Conflict` is deliberately absent: a duplicate registration is a defined
/// outcome (`RegisterOutcome::Conflict`), not an error.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("Invalid handle format: {0}")]
    InvalidFormat(String),

    #[error("Internal error: {0}")]
    Internal(#[from] StoreError),

    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Filter is not ready for this operation (state: {0:?})")]
    FilterNotReady(WarmupState),

    #[error("Snapshot persistence error: {0}")]
    Persistence(#[from] SnapshotStoreError),
}

/// Errors from the authoritative store
///
/// Every variant is transient from the coordinator's point of view; the
/// caller decides whether to retry.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Timeout")]
    Timeout,

    #[error("Query error: {0}")]
    QueryError(String),
}

/// Errors from the cache (always absorbed by the coordinator)
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    #[error("Timeout")]
    Timeout,
}

/// Errors from persisting or loading filter snapshots
#[derive(Debug, Error)]
pub enum SnapshotStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
