//! Outbound Ports (Driven Ports)
//!
//! Collaborators the coordinator depends on. Cache and Store state are owned
//! by their implementations and reached only through these narrow interfaces.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::domain::CoordinatorEvent;
use crate::error::{CacheError, SnapshotStoreError, StoreError};

/// Outcome of an atomic unique insert
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The key was absent and is now stored
    Created,
    /// The key was already stored
    AlreadyExists,
}

/// Authoritative handle store (Driven Port)
///
/// Production: a database with a uniqueness constraint on the handle column
/// Testing: `InMemoryStore`
#[async_trait]
pub trait HandleStore: Send + Sync {
    /// Check whether a handle is registered
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Insert a handle, atomically failing if it already exists
    ///
    /// Two racing inserts of the same key must yield exactly one `Created`.
    /// An `Err` is the transient-error signal: nothing was written.
    async fn insert_unique(&self, key: &str) -> Result<InsertOutcome, StoreError>;

    /// Lazily stream every registered handle
    ///
    /// Finite. Used only for filter warm-up; restartable by calling again.
    fn stream_all_keys(&self) -> BoxStream<'_, Result<String, StoreError>>;
}

/// Best-effort existence cache (Driven Port)
///
/// Every error is treated as a miss by the coordinator.
#[async_trait]
pub trait AvailabilityCache: Send + Sync {
    /// Cached "taken" flag for a key, or `None` on miss
    async fn get(&self, key: &str) -> Result<Option<bool>, CacheError>;

    /// Store a "taken" flag with an expiry
    async fn set(&self, key: &str, taken: bool, ttl: Duration) -> Result<(), CacheError>;
}

/// Receiver of structured coordinator events (Driven Port)
///
/// Must not block: it is called inline on the request path.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &CoordinatorEvent);
}

/// Discards all events
#[derive(Default)]
pub struct NoOpEvents;

impl EventSink for NoOpEvents {
    fn emit(&self, _: &CoordinatorEvent) {}
}

/// Durable location for filter snapshots (Driven Port)
///
/// Both calls are synchronous and may block on I/O. The coordinator only
/// invokes them from `save_snapshot` and once from `initialize` at startup;
/// callers on a busy runtime should wrap `save_snapshot` in
/// `tokio::task::spawn_blocking`.
pub trait SnapshotStore: Send + Sync {
    /// Persist a snapshot, replacing any previous one atomically
    fn save(&self, snapshot: &[u8]) -> Result<(), SnapshotStoreError>;

    /// Load the latest snapshot, if any
    fn load(&self) -> Result<Option<Vec<u8>>, SnapshotStoreError>;
}
