//! Adapters Layer - Concrete collaborators for the outbound ports
//!
//! - `InMemoryStore`: authoritative store backed by a hash set
//! - `InMemoryCache`: LRU cache with per-entry expiry
//! - `FileSnapshotStore`: snapshot persistence on the local filesystem
//! - `TracingEventSink`: forwards coordinator events to `tracing`

pub mod memory_cache;
pub mod memory_store;
pub mod snapshot_file;
pub mod tracing_events;

pub use memory_cache::InMemoryCache;
pub use memory_store::InMemoryStore;
pub use snapshot_file::FileSnapshotStore;
pub use tracing_events::TracingEventSink;
