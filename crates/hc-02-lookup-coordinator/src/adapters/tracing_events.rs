//! Event sink that forwards coordinator events to `tracing`
//!
//! Per-request events are logged at `debug`, degraded paths at `warn`,
//! surfaced failures at `error`, lifecycle events at `info`.

use hc_telemetry::log_event;

use crate::domain::CoordinatorEvent;
use crate::ports::EventSink;

const COMPONENT: &str = "hc-02-lookup-coordinator";

/// Logs every event with a `component` field
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: &CoordinatorEvent) {
        match event {
            CoordinatorEvent::InvalidFormat { input, reason } => {
                log_event!(debug, COMPONENT, "Rejected malformed handle", input = %input, reason = %reason);
            }
            CoordinatorEvent::FilterShortCircuit { key } => {
                log_event!(debug, COMPONENT, "Filter: definitely absent", key = %key);
            }
            CoordinatorEvent::CacheHit { key, taken } => {
                log_event!(debug, COMPONENT, "Cache hit", key = %key, taken = *taken);
            }
            CoordinatorEvent::CacheMiss { key } => {
                log_event!(debug, COMPONENT, "Cache miss", key = %key);
            }
            CoordinatorEvent::CacheFailure { key, op, error } => {
                log_event!(warn, COMPONENT, "Cache failure absorbed", key = %key, op = ?op, error = %error);
            }
            CoordinatorEvent::StoreLookup { key, taken, source } => {
                log_event!(debug, COMPONENT, "Store lookup", key = %key, taken = *taken, source = ?source);
            }
            CoordinatorEvent::StoreFailure { key, error } => {
                log_event!(error, COMPONENT, "Store lookup failed", key = %key, error = %error);
            }
            CoordinatorEvent::FilterRepaired { key } => {
                log_event!(warn, COMPONENT, "Taken handle missing from filter; added", key = %key);
            }
            CoordinatorEvent::Registered { key } => {
                log_event!(info, COMPONENT, "Handle registered", key = %key);
            }
            CoordinatorEvent::RegistrationConflict { key } => {
                log_event!(debug, COMPONENT, "Handle already registered", key = %key);
            }
            CoordinatorEvent::RegistrationFailed { key, error } => {
                log_event!(error, COMPONENT, "Registration failed", key = %key, error = %error);
            }
            CoordinatorEvent::WarmupStarted {
                size_bits,
                hash_count,
            } => {
                log_event!(info, COMPONENT, "Filter warm-up started", size_bits = *size_bits, hash_count = *hash_count);
            }
            CoordinatorEvent::WarmupCompleted {
                keys_loaded,
                elapsed,
            } => {
                log_event!(
                    info,
                    COMPONENT,
                    "Filter warm-up completed",
                    keys_loaded = *keys_loaded,
                    elapsed_ms = (elapsed.as_millis() as u64)
                );
            }
            CoordinatorEvent::WarmupFailed { keys_loaded, error } => {
                log_event!(error, COMPONENT, "Filter warm-up failed", keys_loaded = *keys_loaded, error = %error);
            }
            CoordinatorEvent::SnapshotRestored { inserted_count } => {
                log_event!(info, COMPONENT, "Filter restored from snapshot", inserted_count = *inserted_count);
            }
            CoordinatorEvent::SnapshotRejected { error } => {
                log_event!(warn, COMPONENT, "Snapshot rejected; rebuilding from store", error = %error);
            }
        }
    }
}
