//! Coordinator configuration and validation
//!
//! # Example
//!
//! ```ignore
//! use hc_02_lookup_coordinator::domain::CoordinatorConfigBuilder;
//! use std::time::Duration;
//!
//! let config = CoordinatorConfigBuilder::new()
//!     .expected_element_count(5_000_000)
//!     .target_false_positive_rate(0.001)
//!     .cache_ttl(Duration::from_secs(600))
//!     .build()?;
//! ```

use std::env;
use std::time::Duration;

use hc_01_membership_filter::FilterConfig;

use crate::error::CoordinatorError;

/// Default time-to-live for write-through cache entries
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);
/// Default time-to-live for cached "available" answers
///
/// Shorter than `DEFAULT_CACHE_TTL`: a negative answer written just before a
/// concurrent registration lands would otherwise hide that registration.
pub const DEFAULT_NEGATIVE_CACHE_TTL: Duration = Duration::from_secs(30);
/// Longest accepted cache TTL (one week)
pub const MAX_CACHE_TTL: Duration = Duration::from_secs(7 * 24 * 3600);
/// Default number of latency samples kept for percentiles
pub const DEFAULT_LATENCY_SAMPLES: usize = 10_000;
/// Default number of keys inserted per filter write lock during warm-up
pub const DEFAULT_WARMUP_BATCH: usize = 1_000;
/// Upper bound for sample capacity and warm-up batch size
pub const MAX_BOUNDED_SIZE: usize = 1_000_000;

/// Every option the coordinator recognizes
#[derive(Clone, Debug, PartialEq)]
pub struct CoordinatorConfig {
    /// Filter sizing (expected element count, target FPR)
    pub filter: FilterConfig,
    /// Expiry of write-through cache entries for taken handles
    pub cache_ttl: Duration,
    /// Expiry of write-through cache entries for available handles
    pub negative_cache_ttl: Duration,
    /// Latency samples retained for percentile estimation
    pub latency_sample_capacity: usize,
    /// Keys per filter write lock during warm-up
    pub warmup_batch_size: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            cache_ttl: DEFAULT_CACHE_TTL,
            negative_cache_ttl: DEFAULT_NEGATIVE_CACHE_TTL,
            latency_sample_capacity: DEFAULT_LATENCY_SAMPLES,
            warmup_batch_size: DEFAULT_WARMUP_BATCH,
        }
    }
}

impl CoordinatorConfig {
    /// Validate every option; called by the builder and the coordinator
    pub fn validate(&self) -> Result<(), CoordinatorError> {
        self.filter.validate()?;

        if self.cache_ttl.is_zero() || self.cache_ttl > MAX_CACHE_TTL {
            return Err(CoordinatorError::Config(format!(
                "cache_ttl must be in (0, {}s], got {:?}",
                MAX_CACHE_TTL.as_secs(),
                self.cache_ttl
            )));
        }

        if self.negative_cache_ttl.is_zero() || self.negative_cache_ttl > self.cache_ttl {
            return Err(CoordinatorError::Config(format!(
                "negative_cache_ttl must be in (0, cache_ttl={:?}], got {:?}",
                self.cache_ttl, self.negative_cache_ttl
            )));
        }

        if !(1..=MAX_BOUNDED_SIZE).contains(&self.latency_sample_capacity) {
            return Err(CoordinatorError::Config(format!(
                "latency_sample_capacity must be in 1..={}, got {}",
                MAX_BOUNDED_SIZE, self.latency_sample_capacity
            )));
        }

        if !(1..=MAX_BOUNDED_SIZE).contains(&self.warmup_batch_size) {
            return Err(CoordinatorError::Config(format!(
                "warmup_batch_size must be in 1..={}, got {}",
                MAX_BOUNDED_SIZE, self.warmup_batch_size
            )));
        }

        Ok(())
    }

    /// Load configuration from environment variables
    ///
    /// # Environment Variables
    ///
    /// - `HC_EXPECTED_ELEMENTS`: expected handle count (default: 1000000)
    /// - `HC_TARGET_FPR`: target false positive rate (default: 0.001)
    /// - `HC_CACHE_TTL_SECS`: cache entry TTL in seconds (default: 3600)
    /// - `HC_NEGATIVE_CACHE_TTL_SECS`: TTL of cached "available" answers (default: 30, capped at the cache TTL)
    /// - `HC_LATENCY_SAMPLES`: retained latency samples (default: 10000)
    /// - `HC_WARMUP_BATCH`: keys per warm-up batch (default: 1000)
    ///
    /// Unparsable or out-of-range values are rejected, not defaulted.
    pub fn from_env() -> Result<Self, CoordinatorError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoordinatorError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = CoordinatorConfigBuilder::new();

        if let Some(n) = parse_var(&lookup, "HC_EXPECTED_ELEMENTS")? {
            builder = builder.expected_element_count(n);
        }
        if let Some(p) = parse_var(&lookup, "HC_TARGET_FPR")? {
            builder = builder.target_false_positive_rate(p);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "HC_CACHE_TTL_SECS")? {
            builder = builder.cache_ttl(Duration::from_secs(secs));
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "HC_NEGATIVE_CACHE_TTL_SECS")? {
            builder = builder.negative_cache_ttl(Duration::from_secs(secs));
        }
        if let Some(samples) = parse_var(&lookup, "HC_LATENCY_SAMPLES")? {
            builder = builder.latency_sample_capacity(samples);
        }
        if let Some(batch) = parse_var(&lookup, "HC_WARMUP_BATCH")? {
            builder = builder.warmup_batch_size(batch);
        }

        builder.build()
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>, CoordinatorError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            CoordinatorError::Config(format!("{} has unparsable value {:?}", name, raw))
        }),
    }
}

/// Builder for CoordinatorConfig with validation
#[derive(Default)]
pub struct CoordinatorConfigBuilder {
    expected_element_count: Option<u64>,
    target_false_positive_rate: Option<f64>,
    cache_ttl: Option<Duration>,
    negative_cache_ttl: Option<Duration>,
    latency_sample_capacity: Option<usize>,
    warmup_batch_size: Option<usize>,
}

impl CoordinatorConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the expected number of handles (filter n)
    pub fn expected_element_count(mut self, n: u64) -> Self {
        self.expected_element_count = Some(n);
        self
    }

    /// Set the target false positive rate (filter p)
    pub fn target_false_positive_rate(mut self, p: f64) -> Self {
        self.target_false_positive_rate = Some(p);
        self
    }

    /// Set the write-through cache TTL
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Set the TTL of cached "available" answers
    pub fn negative_cache_ttl(mut self, ttl: Duration) -> Self {
        self.negative_cache_ttl = Some(ttl);
        self
    }

    /// Set the number of retained latency samples
    pub fn latency_sample_capacity(mut self, samples: usize) -> Self {
        self.latency_sample_capacity = Some(samples);
        self
    }

    /// Set the warm-up batch size
    pub fn warmup_batch_size(mut self, batch: usize) -> Self {
        self.warmup_batch_size = Some(batch);
        self
    }

    /// Build the configuration, validating all options
    pub fn build(self) -> Result<CoordinatorConfig, CoordinatorError> {
        let defaults = CoordinatorConfig::default();

        let cache_ttl = self.cache_ttl.unwrap_or(defaults.cache_ttl);

        let config = CoordinatorConfig {
            filter: FilterConfig {
                expected_element_count: self
                    .expected_element_count
                    .unwrap_or(defaults.filter.expected_element_count),
                target_false_positive_rate: self
                    .target_false_positive_rate
                    .unwrap_or(defaults.filter.target_false_positive_rate),
            },
            cache_ttl,
            negative_cache_ttl: self
                .negative_cache_ttl
                .unwrap_or_else(|| defaults.negative_cache_ttl.min(cache_ttl)),
            latency_sample_capacity: self
                .latency_sample_capacity
                .unwrap_or(defaults.latency_sample_capacity),
            warmup_batch_size: self.warmup_batch_size.unwrap_or(defaults.warmup_batch_size),
        };

        config.validate()?;
        Ok(config)
    }
}
