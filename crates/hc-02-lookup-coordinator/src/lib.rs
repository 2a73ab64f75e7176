//! # HC-02 Lookup Coordinator
//!
//! Tiered "is this handle taken?" lookups over a membership filter, a
//! best-effort cache and an authoritative store.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure types, no I/O
//!   - `Handle`: Validated, lower-cased handle
//!   - `CoordinatorConfig`: Configuration with validation and env overrides
//!   - `CoordinatorEvent`: Structured events
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `AvailabilityApi`: Driving port (inbound API)
//!   - `HandleStore`, `AvailabilityCache`, `EventSink`, `SnapshotStore`: Driven ports
//!
//! - **Service Layer** (`service/`): Orchestration
//!   - `LookupCoordinator`: Implements `AvailabilityApi`
//!
//! - **Adapters Layer** (`adapters/`): In-memory store and cache, file
//!   snapshots, `tracing` event sink
//!
//! ## Guarantees
//!
//! - A check reports "available" from the filter only when the filter is
//!   `Ready` and answers "definitely absent"
//! - A forced-bypass check never reports `LookupSource::Filter`
//! - Cache failures degrade to a store lookup; store failures surface as
//!   `CoordinatorError::Internal`
//! - Of two racing registrations of one handle, exactly one is `Created`
//!
//! ## Usage Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use hc_02_lookup_coordinator::{
//!     AvailabilityApi, CheckOptions, CoordinatorConfig, InMemoryCache, InMemoryStore,
//!     LookupCoordinator,
//! };
//!
//! let coordinator = LookupCoordinator::new(
//!     Arc::new(InMemoryStore::new()),
//!     Arc::new(InMemoryCache::new(100_000)),
//!     CoordinatorConfig::from_env()?,
//! )?;
//! coordinator.warm_up().await?;
//!
//! coordinator.register_key("alice").await?;
//! let answer = coordinator.check_availability("Alice", CheckOptions::default()).await?;
//! assert!(!answer.available);
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapters::{FileSnapshotStore, InMemoryCache, InMemoryStore, TracingEventSink};
pub use domain::{
    Availability, CacheOp, CheckOptions, CoordinatorConfig, CoordinatorConfigBuilder,
    CoordinatorEvent, Handle, LookupSource, RegisterOutcome, WarmupState,
};
pub use error::{CacheError, CoordinatorError, SnapshotStoreError, StoreError};
pub use metrics::{CoordinatorMetrics, LatencyPercentiles, MetricsRecorder, MetricsSnapshot};
pub use ports::{
    AvailabilityApi, AvailabilityCache, EventSink, HandleStore, InsertOutcome, NoOpEvents,
    SnapshotStore,
};
pub use service::LookupCoordinator;
