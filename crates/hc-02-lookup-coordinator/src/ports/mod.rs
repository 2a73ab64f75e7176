//! Ports Layer
//!
//! Defines the interfaces (traits) for:
//! - Driving Ports (inbound) - API for callers
//! - Driven Ports (outbound) - Store, Cache, event and snapshot collaborators

pub mod inbound;
pub mod outbound;

pub use inbound::AvailabilityApi;
pub use outbound::{
    AvailabilityCache, EventSink, HandleStore, InsertOutcome, NoOpEvents, SnapshotStore,
};
