//! Domain Layer - Pure coordinator types
//!
//! This layer contains:
//! - Handle validation and normalization
//! - Request options and outcomes
//! - Configuration
//! - Structured events
//!
//! RULES:
//! - No I/O operations
//! - No async code

pub mod availability;
pub mod config;
pub mod events;
pub mod handle;

pub use availability::{Availability, CheckOptions, LookupSource, RegisterOutcome, WarmupState};
pub use config::{CoordinatorConfig, CoordinatorConfigBuilder};
pub use events::{CacheOp, CoordinatorEvent};
pub use handle::Handle;
