//! # HC Telemetry
//!
//! Structured logging for the handle availability service.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hc_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let _guard = init_telemetry(TelemetryConfig::from_env()).expect("Failed to init telemetry");
//!     hc_telemetry::log_event!(info, "hc-02-lookup-coordinator", "Service started");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `handle-availability` | Service name attached to logs |
//! | `HC_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `HC_JSON_LOGS` | `false` | JSON output instead of human-readable |
//! | `HC_CONSOLE_OUTPUT` | `true` | Write logs to stdout |

mod config;
mod logging;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use tracing_setup::TracingGuard;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Failed to install subscriber: {0}")]
    SubscriberInit(String),
}

/// Install the global `tracing` subscriber.
///
/// Fails if a subscriber is already installed. The returned guard should be
/// held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let tracing_guard = tracing_setup::init_tracing(&config)?;

    Ok(TelemetryGuard {
        _tracing: tracing_guard,
    })
}

/// Guard that keeps telemetry active
pub struct TelemetryGuard {
    _tracing: TracingGuard,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}
