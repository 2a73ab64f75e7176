//! Metrics for coordinator operations
//!
//! Counters are plain atomics. Latency samples go into a bounded ring buffer
//! guarded by a mutex that is only ever `try_lock`ed on the request path: under
//! contention the sample is dropped instead of blocking the request.
//!
//! ## Usage
//!
//! ```ignore
//! use hc_02_lookup_coordinator::metrics::MetricsRecorder;
//!
//! let metrics = MetricsRecorder::new(10_000);
//! let start = std::time::Instant::now();
//! metrics.record_request();
//! // ... serve the request ...
//! metrics.record_latency(start.elapsed());
//! let snapshot = metrics.snapshot();
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use hc_01_membership_filter::FilterStats;
use parking_lot::Mutex;
use serde::Serialize;

use crate::domain::WarmupState;

/// Bounded window of the most recent latency samples (microseconds)
struct LatencyWindow {
    samples: VecDeque<u64>,
    capacity: usize,
}

impl LatencyWindow {
    fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, micros: u64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(micros);
    }
}

/// Process-wide counters and latency samples
///
/// Reset only by an explicit `reset()` call.
pub struct MetricsRecorder {
    /// Checks and registrations received
    pub total_requests: AtomicU64,
    /// Checks answered by the filter alone
    pub filter_short_circuits: AtomicU64,
    /// Checks answered by the cache
    pub cache_hits: AtomicU64,
    /// Checks that reached the store
    pub store_fallbacks: AtomicU64,
    /// Cache errors absorbed
    pub cache_errors: AtomicU64,
    /// Store errors surfaced
    pub store_errors: AtomicU64,
    /// Requests rejected by handle validation
    pub invalid_format: AtomicU64,
    /// Registrations accepted by the store
    pub registrations_created: AtomicU64,
    /// Registrations rejected as duplicates
    pub registrations_conflicted: AtomicU64,
    /// Latency samples dropped under contention
    pub samples_dropped: AtomicU64,
    latencies: Mutex<LatencyWindow>,
}

impl MetricsRecorder {
    /// Create a recorder keeping at most `sample_capacity` latency samples
    pub fn new(sample_capacity: usize) -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            filter_short_circuits: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            store_fallbacks: AtomicU64::new(0),
            cache_errors: AtomicU64::new(0),
            store_errors: AtomicU64::new(0),
            invalid_format: AtomicU64::new(0),
            registrations_created: AtomicU64::new(0),
            registrations_conflicted: AtomicU64::new(0),
            samples_dropped: AtomicU64::new(0),
            latencies: Mutex::new(LatencyWindow::new(sample_capacity.max(1))),
        }
    }

    pub fn record_request(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_filter_short_circuit(&self) {
        self.filter_short_circuits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_fallback(&self) {
        self.store_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_error(&self) {
        self.cache_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_error(&self) {
        self.store_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalid_format(&self) {
        self.invalid_format.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_registration_created(&self) {
        self.registrations_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_registration_conflict(&self) {
        self.registrations_conflicted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a request latency without blocking
    pub fn record_latency(&self, duration: Duration) {
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        match self.latencies.try_lock() {
            Some(mut window) => window.push(micros),
            None => {
                self.samples_dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Nearest-rank percentiles over the retained samples
    pub fn latency_percentiles(&self) -> LatencyPercentiles {
        let mut samples: Vec<u64> = self.latencies.lock().samples.iter().copied().collect();
        if samples.is_empty() {
            return LatencyPercentiles::default();
        }
        samples.sort_unstable();

        LatencyPercentiles {
            p50_us: nearest_rank(&samples, 0.50),
            p95_us: nearest_rank(&samples, 0.95),
            p99_us: nearest_rank(&samples, 0.99),
            sample_count: samples.len(),
        }
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            filter_short_circuits: self.filter_short_circuits.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            store_fallbacks: self.store_fallbacks.load(Ordering::Relaxed),
            cache_errors: self.cache_errors.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
            invalid_format: self.invalid_format.load(Ordering::Relaxed),
            registrations_created: self.registrations_created.load(Ordering::Relaxed),
            registrations_conflicted: self.registrations_conflicted.load(Ordering::Relaxed),
            samples_dropped: self.samples_dropped.load(Ordering::Relaxed),
            latency: self.latency_percentiles(),
        }
    }

    /// Reset all counters and samples (operator action)
    pub fn reset(&self) {
        self.total_requests.store(0, Ordering::Relaxed);
        self.filter_short_circuits.store(0, Ordering::Relaxed);
        self.cache_hits.store(0, Ordering::Relaxed);
        self.store_fallbacks.store(0, Ordering::Relaxed);
        self.cache_errors.store(0, Ordering::Relaxed);
        self.store_errors.store(0, Ordering::Relaxed);
        self.invalid_format.store(0, Ordering::Relaxed);
        self.registrations_created.store(0, Ordering::Relaxed);
        self.registrations_conflicted.store(0, Ordering::Relaxed);
        self.samples_dropped.store(0, Ordering::Relaxed);
        self.latencies.lock().samples.clear();
    }
}

fn nearest_rank(sorted: &[u64], quantile: f64) -> u64 {
    let rank = (quantile * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

/// Latency percentiles in microseconds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LatencyPercentiles {
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub sample_count: usize,
}

/// Point-in-time counter snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub filter_short_circuits: u64,
    pub cache_hits: u64,
    pub store_fallbacks: u64,
    pub cache_errors: u64,
    pub store_errors: u64,
    pub invalid_format: u64,
    pub registrations_created: u64,
    pub registrations_conflicted: u64,
    pub samples_dropped: u64,
    pub latency: LatencyPercentiles,
}

/// Everything the reporting surface consumes: counters plus filter diagnostics
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CoordinatorMetrics {
    pub total_requests: u64,
    pub filter_short_circuits: u64,
    pub cache_hits: u64,
    pub store_fallbacks: u64,
    pub fill_ratio: f64,
    pub estimated_false_positive_rate: f64,
    pub bit_array_size: usize,
    pub hash_function_count: usize,
    pub latency_percentiles: LatencyPercentiles,
    pub warmup_state: WarmupState,
    pub counters: MetricsSnapshot,
    pub filter: FilterStats,
}

impl CoordinatorMetrics {
    pub fn new(counters: MetricsSnapshot, filter: FilterStats, warmup_state: WarmupState) -> Self {
        Self {
            total_requests: counters.total_requests,
            filter_short_circuits: counters.filter_short_circuits,
            cache_hits: counters.cache_hits,
            store_fallbacks: counters.store_fallbacks,
            fill_ratio: filter.fill_ratio,
            estimated_false_positive_rate: filter.estimated_false_positive_rate,
            bit_array_size: filter.size_bits,
            hash_function_count: filter.hash_count,
            latency_percentiles: counters.latency,
            warmup_state,
            counters,
            filter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_metrics_initialization() {
        let snapshot = MetricsRecorder::new(100).snapshot();

        assert_eq!(snapshot, MetricsSnapshot::default());
    }

    #[test]
    fn test_counters_accumulate() {
        let metrics = MetricsRecorder::new(100);

        metrics.record_request();
        metrics.record_request();
        metrics.record_filter_short_circuit();
        metrics.record_cache_hit();
        metrics.record_store_fallback();
        metrics.record_registration_created();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_requests, 2);
        assert_eq!(snapshot.filter_short_circuits, 1);
        assert_eq!(snapshot.cache_hits, 1);
        assert_eq!(snapshot.store_fallbacks, 1);
        assert_eq!(snapshot.registrations_created, 1);
    }

    #[test]
    fn test_latency_percentiles_nearest_rank() {
        let metrics = MetricsRecorder::new(1000);
        for micros in 1..=100 {
            metrics.record_latency(Duration::from_micros(micros));
        }

        let p = metrics.latency_percentiles();
        assert_eq!(p.sample_count, 100);
        assert_eq!(p.p50_us, 50);
        assert_eq!(p.p95_us, 95);
        assert_eq!(p.p99_us, 99);
    }

    #[test]
    fn test_latency_window_is_bounded() {
        let metrics = MetricsRecorder::new(10);
        for micros in 1..=100 {
            metrics.record_latency(Duration::from_micros(micros));
        }

        let p = metrics.latency_percentiles();
        assert_eq!(p.sample_count, 10);
        assert_eq!(p.p50_us, 95, "Only the newest samples (91..=100) remain");
    }

    #[test]
    fn test_empty_percentiles_are_zero() {
        assert_eq!(
            MetricsRecorder::new(10).latency_percentiles(),
            LatencyPercentiles::default()
        );
    }

    #[test]
    fn test_reset() {
        let metrics = MetricsRecorder::new(10);
        metrics.record_request();
        metrics.record_cache_hit();
        metrics.record_latency(Duration::from_micros(5));

        metrics.reset();

        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_concurrent_increments_are_not_lost() {
        let metrics = Arc::new(MetricsRecorder::new(100));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let metrics = Arc::clone(&metrics);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        metrics.record_request();
                        metrics.record_latency(Duration::from_micros(1));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_requests, 8000);
        assert!(snapshot.latency.sample_count <= 100);
        assert!(snapshot.samples_dropped < 8000);
    }
}
