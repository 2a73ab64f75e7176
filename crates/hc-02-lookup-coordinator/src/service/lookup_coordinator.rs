//! Lookup Coordinator
//!
//! Decides, for each availability check, the cheapest tier that can answer
//! authoritatively, and keeps the filter and cache consistent with the store
//! on successful registrations.
//!
//! ```text
//! check:    [validate] -> FILTER --absent--> available (source=filter)
//!                            |maybe
//!                          CACHE  --hit----> cached value (source=cache)
//!                            |miss/error
//!                          STORE  --------> answer + write-through (source=store)
//!
//! register: [validate] -> STORE.insert_unique
//!                            Created       -> filter.add, cache=taken
//!                            AlreadyExists -> Conflict
//!                            Err           -> Internal (no mutation)
//! ```

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use futures::StreamExt;
use hc_01_membership_filter::{FilterConfig, FilterStats, ProbabilisticFilter};
use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::domain::{
    Availability, CacheOp, CheckOptions, CoordinatorConfig, CoordinatorEvent, Handle,
    LookupSource, RegisterOutcome, WarmupState,
};
use crate::error::CoordinatorError;
use crate::metrics::{CoordinatorMetrics, MetricsRecorder};
use crate::ports::{
    AvailabilityApi, AvailabilityCache, EventSink, HandleStore, InsertOutcome, NoOpEvents,
    SnapshotStore,
};

/// The filter together with its population state
///
/// Kept under one lock so a check never pairs a `Ready` state with a filter
/// that is being replaced.
struct FilterSlot {
    filter: ProbabilisticFilter,
    state: WarmupState,
}

/// Tiered lookup coordinator
///
/// Owns the filter exclusively; shares the store and cache. Starts `Cold`:
/// until `warm_up`, `rebuild` or a snapshot restore completes, every check
/// goes to the cache/store tiers.
pub struct LookupCoordinator<S: HandleStore, C: AvailabilityCache> {
    /// Authoritative store (driven port)
    store: Arc<S>,
    /// Best-effort cache (driven port)
    cache: Arc<C>,
    /// Filter and population state
    slot: RwLock<FilterSlot>,
    /// Serializes warm-up, rebuild and restore
    population: Mutex<()>,
    config: CoordinatorConfig,
    metrics: MetricsRecorder,
    events: Arc<dyn EventSink>,
}

impl<S: HandleStore, C: AvailabilityCache> LookupCoordinator<S, C> {
    /// Create a cold coordinator with an empty filter
    pub fn new(
        store: Arc<S>,
        cache: Arc<C>,
        config: CoordinatorConfig,
    ) -> Result<Self, CoordinatorError> {
        config.validate()?;
        let filter = ProbabilisticFilter::from_config(&config.filter)?;

        Ok(Self {
            store,
            cache,
            slot: RwLock::new(FilterSlot {
                filter,
                state: WarmupState::Cold,
            }),
            population: Mutex::new(()),
            metrics: MetricsRecorder::new(config.latency_sample_capacity),
            config,
            events: Arc::new(NoOpEvents),
        })
    }

    /// Attach an event sink
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Current population state
    pub fn warmup_state(&self) -> WarmupState {
        self.slot.read().state
    }

    /// Active configuration
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Diagnostic statistics of the live filter
    pub fn filter_stats(&self) -> FilterStats {
        self.slot.read().filter.stats()
    }

    /// Direct access to the recorder
    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }

    /// Reset all counters and latency samples (operator action)
    pub fn reset_metrics(&self) {
        self.metrics.reset();
    }

    /// Populate a fresh filter, sized like the live one, from the store
    ///
    /// Returns the number of keys loaded. On a store error the coordinator is
    /// left `Cold` and the error is surfaced; calling again restarts the scan.
    pub async fn warm_up(&self) -> Result<u64, CoordinatorError> {
        let filter_config = {
            let slot = self.slot.read();
            FilterConfig {
                expected_element_count: slot.filter.expected_elements(),
                target_false_positive_rate: slot.filter.target_fpr(),
            }
        };
        self.rebuild(filter_config).await
    }

    /// Replace the filter with a fresh one (possibly resized) and populate it
    ///
    /// Registrations that land during the rebuild are added to the new filter,
    /// so nothing registered concurrently is lost.
    pub async fn rebuild(&self, filter_config: FilterConfig) -> Result<u64, CoordinatorError> {
        let fresh = ProbabilisticFilter::from_config(&filter_config)?;
        let _population = self.population.lock().await;

        self.emit(CoordinatorEvent::WarmupStarted {
            size_bits: fresh.size_bits(),
            hash_count: fresh.hash_count(),
        });
        {
            let mut slot = self.slot.write();
            slot.filter = fresh;
            slot.state = WarmupState::Warming;
        }

        let started = Instant::now();
        let batch_size = self.config.warmup_batch_size;
        let mut batch = Vec::with_capacity(batch_size);
        let mut loaded = 0u64;
        let mut keys = self.store.stream_all_keys();

        while let Some(item) = keys.next().await {
            match item {
                Ok(key) => {
                    batch.push(key);
                    if batch.len() >= batch_size {
                        loaded += self.load_batch(&mut batch);
                    }
                }
                Err(e) => {
                    self.slot.write().state = WarmupState::Cold;
                    self.emit(CoordinatorEvent::WarmupFailed {
                        keys_loaded: loaded,
                        error: e.to_string(),
                    });
                    return Err(CoordinatorError::Internal(e));
                }
            }
        }
        loaded += self.load_batch(&mut batch);

        self.slot.write().state = WarmupState::Ready;
        self.emit(CoordinatorEvent::WarmupCompleted {
            keys_loaded: loaded,
            elapsed: started.elapsed(),
        });
        Ok(loaded)
    }

    fn load_batch(&self, batch: &mut Vec<String>) -> u64 {
        if batch.is_empty() {
            return 0;
        }
        self.slot.write().filter.add_batch(batch.drain(..)) as u64
    }

    /// Serialize the live filter
    ///
    /// Only a `Ready` filter may be persisted: restoring a partial one would
    /// produce false negatives.
    pub fn snapshot_filter(&self) -> Result<Vec<u8>, CoordinatorError> {
        let slot = self.slot.read();
        if !slot.state.is_ready() {
            return Err(CoordinatorError::FilterNotReady(slot.state));
        }
        Ok(slot.filter.to_snapshot_bytes()?)
    }

    /// Replace the live filter with one reconstructed from a snapshot
    ///
    /// Handles registered in this process before the restore are merged into
    /// the restored filter. If the snapshot's sizing differs from a live filter
    /// that already holds registrations, the restore is refused; use `rebuild`.
    pub async fn restore_snapshot(&self, bytes: &[u8]) -> Result<(), CoordinatorError> {
        let mut restored = ProbabilisticFilter::from_snapshot_bytes(bytes)?;
        let _population = self.population.lock().await;

        let mut slot = self.slot.write();
        if restored.is_compatible(&slot.filter) {
            restored.merge(&slot.filter)?;
        } else if slot.filter.inserted_count() > 0 {
            return Err(CoordinatorError::Config(format!(
                "snapshot sizing (m={}, k={}) differs from the live filter (m={}, k={}) holding registrations",
                restored.size_bits(),
                restored.hash_count(),
                slot.filter.size_bits(),
                slot.filter.hash_count()
            )));
        }

        let inserted_count = restored.inserted_count();
        slot.filter = restored;
        slot.state = WarmupState::Ready;
        drop(slot);

        self.emit(CoordinatorEvent::SnapshotRestored { inserted_count });
        Ok(())
    }

    /// Persist the live filter to a snapshot store
    pub fn save_snapshot(&self, snapshots: &dyn SnapshotStore) -> Result<(), CoordinatorError> {
        let bytes = self.snapshot_filter()?;
        snapshots.save(&bytes)?;
        Ok(())
    }

    /// Restart recovery: restore from a snapshot, falling back to a store scan
    ///
    /// A missing or unusable snapshot triggers `warm_up`. Returns the state
    /// the coordinator ends in.
    pub async fn initialize(
        &self,
        snapshots: Option<&dyn SnapshotStore>,
    ) -> Result<WarmupState, CoordinatorError> {
        if let Some(snapshots) = snapshots {
            match snapshots.load() {
                Ok(Some(bytes)) => match self.restore_snapshot(&bytes).await {
                    Ok(()) => return Ok(self.warmup_state()),
                    Err(e) => self.emit(CoordinatorEvent::SnapshotRejected {
                        error: e.to_string(),
                    }),
                },
                Ok(None) => {}
                Err(e) => self.emit(CoordinatorEvent::SnapshotRejected {
                    error: e.to_string(),
                }),
            }
        }

        self.warm_up().await?;
        Ok(self.warmup_state())
    }

    /// Filter verdict, or `None` when the filter may not be trusted
    fn filter_verdict(&self, handle: &Handle) -> Option<bool> {
        let slot = self.slot.read();
        slot.state
            .is_ready()
            .then(|| slot.filter.might_contain(handle.as_str()))
    }

    /// Add a handle the store reported as taken but the filter lacks
    fn repair_filter(&self, handle: &Handle) {
        if self.filter_verdict(handle) == Some(false) {
            self.slot.write().filter.add(handle.as_str());
            self.emit(CoordinatorEvent::FilterRepaired {
                key: handle.to_string(),
            });
        }
    }

    fn parse_handle(&self, key: &str) -> Result<Handle, CoordinatorError> {
        Handle::parse(key).map_err(|e| {
            self.metrics.record_invalid_format();
            self.emit(CoordinatorEvent::InvalidFormat {
                input: key.to_string(),
                reason: e.to_string(),
            });
            e
        })
    }

    async fn resolve(
        &self,
        handle: &Handle,
        options: CheckOptions,
    ) -> Result<Availability, CoordinatorError> {
        let key = handle.as_str();

        if !options.force_bypass_filter && self.filter_verdict(handle) == Some(false) {
            self.metrics.record_filter_short_circuit();
            self.emit(CoordinatorEvent::FilterShortCircuit {
                key: key.to_string(),
            });
            return Ok(Availability {
                available: true,
                source: LookupSource::Filter,
            });
        }

        match self.cache.get(key).await {
            Ok(Some(taken)) => {
                self.metrics.record_cache_hit();
                self.emit(CoordinatorEvent::CacheHit {
                    key: key.to_string(),
                    taken,
                });
                return Ok(Availability {
                    available: !taken,
                    source: LookupSource::Cache,
                });
            }
            Ok(None) => self.emit(CoordinatorEvent::CacheMiss {
                key: key.to_string(),
            }),
            Err(e) => self.cache_failure(key, CacheOp::Get, e.to_string()),
        }

        self.metrics.record_store_fallback();
        let taken = match self.store.exists(key).await {
            Ok(taken) => taken,
            Err(e) => {
                self.metrics.record_store_error();
                self.emit(CoordinatorEvent::StoreFailure {
                    key: key.to_string(),
                    error: e.to_string(),
                });
                return Err(CoordinatorError::Internal(e));
            }
        };

        let source = if options.force_bypass_filter {
            LookupSource::ForcedStore
        } else {
            LookupSource::Store
        };
        self.emit(CoordinatorEvent::StoreLookup {
            key: key.to_string(),
            taken,
            source,
        });

        if taken {
            self.repair_filter(handle);
        }
        // A concurrent registration may land between the store read and this
        // write, so "available" answers are only kept for the negative TTL.
        let ttl = if taken {
            self.config.cache_ttl
        } else {
            self.config.negative_cache_ttl
        };
        if let Err(e) = self.cache.set(key, taken, ttl).await {
            self.cache_failure(key, CacheOp::Set, e.to_string());
        }

        Ok(Availability {
            available: !taken,
            source,
        })
    }

    async fn register(&self, handle: &Handle) -> Result<RegisterOutcome, CoordinatorError> {
        let key = handle.as_str();

        match self.store.insert_unique(key).await {
            Ok(InsertOutcome::Created) => {
                // Never undone, even if the cache write below fails.
                self.slot.write().filter.add(key);
                if let Err(e) = self.cache.set(key, true, self.config.cache_ttl).await {
                    self.cache_failure(key, CacheOp::Set, e.to_string());
                }
                self.metrics.record_registration_created();
                self.emit(CoordinatorEvent::Registered {
                    key: key.to_string(),
                });
                Ok(RegisterOutcome::Created)
            }
            Ok(InsertOutcome::AlreadyExists) => {
                self.metrics.record_registration_conflict();
                self.emit(CoordinatorEvent::RegistrationConflict {
                    key: key.to_string(),
                });
                Ok(RegisterOutcome::Conflict)
            }
            Err(e) => {
                self.metrics.record_store_error();
                self.emit(CoordinatorEvent::RegistrationFailed {
                    key: key.to_string(),
                    error: e.to_string(),
                });
                Err(CoordinatorError::Internal(e))
            }
        }
    }

    fn cache_failure(&self, key: &str, op: CacheOp, error: String) {
        self.metrics.record_cache_error();
        self.emit(CoordinatorEvent::CacheFailure {
            key: key.to_string(),
            op,
            error,
        });
    }

    fn emit(&self, event: CoordinatorEvent) {
        self.events.emit(&event);
    }
}

#[async_trait]
impl<S, C> AvailabilityApi for LookupCoordinator<S, C>
where
    S: HandleStore + 'static,
    C: AvailabilityCache + 'static,
{
    async fn check_availability(
        &self,
        key: &str,
        options: CheckOptions,
    ) -> Result<Availability, CoordinatorError> {
        let started = Instant::now();
        self.metrics.record_request();

        let result = match self.parse_handle(key) {
            Ok(handle) => self.resolve(&handle, options).await,
            Err(e) => Err(e),
        };

        self.metrics.record_latency(started.elapsed());
        result
    }

    async fn register_key(&self, key: &str) -> Result<RegisterOutcome, CoordinatorError> {
        let started = Instant::now();
        self.metrics.record_request();

        let result = match self.parse_handle(key) {
            Ok(handle) => self.register(&handle).await,
            Err(e) => Err(e),
        };

        self.metrics.record_latency(started.elapsed());
        result
    }

    fn snapshot_metrics(&self) -> CoordinatorMetrics {
        let (filter, state) = {
            let slot = self.slot.read();
            (slot.filter.stats(), slot.state)
        };
        CoordinatorMetrics::new(self.metrics.snapshot(), filter, state)
    }
}
