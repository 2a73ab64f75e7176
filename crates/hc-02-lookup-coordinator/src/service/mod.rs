//! Service Layer - Tiered lookup orchestration

pub mod lookup_coordinator;

pub use lookup_coordinator::LookupCoordinator;
