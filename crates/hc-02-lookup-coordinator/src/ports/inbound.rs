//! Inbound Ports (Driving Ports)
//!
//! The API that transports (HTTP handlers, RPC servers, tests) use to reach
//! the coordinator.

use async_trait::async_trait;

use crate::domain::{Availability, CheckOptions, RegisterOutcome};
use crate::error::CoordinatorError;
use crate::metrics::CoordinatorMetrics;

/// Primary availability API (Driving Port)
#[async_trait]
pub trait AvailabilityApi: Send + Sync {
    /// Decide whether a handle is available using the cheapest tier that can
    /// answer authoritatively
    ///
    /// Fails with `InvalidFormat` for input outside the handle grammar and with
    /// `Internal` when the store had to be consulted and failed.
    async fn check_availability(
        &self,
        key: &str,
        options: CheckOptions,
    ) -> Result<Availability, CoordinatorError>;

    /// Register a handle
    ///
    /// `Conflict` is an `Ok` outcome. `InvalidFormat` and `Internal` leave no
    /// filter or cache mutation behind.
    async fn register_key(&self, key: &str) -> Result<RegisterOutcome, CoordinatorError>;

    /// Counters, latency percentiles and filter diagnostics
    fn snapshot_metrics(&self) -> CoordinatorMetrics;
}
