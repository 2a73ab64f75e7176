//! # End-to-End Lookup Flows
//!
//! Drives `LookupCoordinator` through its public API against in-memory and
//! file-backed collaborators.

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;

    use hc_01_membership_filter::FilterConfig;
    use hc_02_lookup_coordinator::test_utils::{CountingCache, CountingStore, RecordingEvents};
    use hc_02_lookup_coordinator::{
        AvailabilityApi, CheckOptions, CoordinatorConfig, CoordinatorConfigBuilder,
        CoordinatorEvent, FileSnapshotStore, HandleStore, InMemoryCache, InMemoryStore,
        LookupCoordinator, LookupSource, RegisterOutcome, SnapshotStore, TracingEventSink,
        WarmupState,
    };
    use hc_telemetry::{init_telemetry, TelemetryConfig, TelemetryError};
    use tempfile::TempDir;

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    fn config() -> CoordinatorConfig {
        CoordinatorConfigBuilder::new()
            .expected_element_count(10_000)
            .target_false_positive_rate(0.01)
            .cache_ttl(Duration::from_secs(60))
            .warmup_batch_size(256)
            .build()
            .unwrap()
    }

    fn user_keys(range: std::ops::Range<usize>) -> Vec<String> {
        range.map(|i| format!("user_{}", i)).collect()
    }

    fn coordinator_over(
        store: Arc<CountingStore>,
    ) -> (LookupCoordinator<CountingStore, CountingCache>, Arc<RecordingEvents>) {
        let events = Arc::new(RecordingEvents::new());
        let coordinator = LookupCoordinator::new(store, Arc::new(CountingCache::new()), config())
            .unwrap()
            .with_events(events.clone());
        (coordinator, events)
    }

    // =========================================================================
    // FLOW 1: Warm-up then check (no false negatives, bounded false positives)
    // =========================================================================

    #[tokio::test]
    async fn test_warm_filter_never_hides_taken_handles() {
        let taken = user_keys(0..5_000);
        let store = Arc::new(CountingStore::with_keys(taken.iter().cloned()));
        let (coordinator, _) = coordinator_over(Arc::clone(&store));

        assert_eq!(coordinator.warm_up().await.unwrap(), 5_000);

        for key in &taken {
            let answer = coordinator
                .check_availability(key, CheckOptions::default())
                .await
                .unwrap();
            assert!(!answer.available, "{key} reported available");
            assert_ne!(answer.source, LookupSource::Filter);
        }
    }

    #[tokio::test]
    async fn test_most_free_handles_are_answered_by_filter() {
        let store = Arc::new(CountingStore::with_keys(user_keys(0..5_000)));
        let (coordinator, _) = coordinator_over(Arc::clone(&store));
        coordinator.warm_up().await.unwrap();

        let free = user_keys(100_000..102_000);
        let mut short_circuited = 0usize;
        for key in &free {
            let answer = coordinator
                .check_availability(key, CheckOptions::default())
                .await
                .unwrap();
            assert!(answer.available);
            if answer.source == LookupSource::Filter {
                short_circuited += 1;
            }
        }

        assert!(
            short_circuited as f64 / free.len() as f64 >= 0.95,
            "only {short_circuited} of {} short-circuited",
            free.len()
        );
        let metrics = coordinator.snapshot_metrics();
        assert_eq!(metrics.filter_short_circuits as usize, short_circuited);
        assert_eq!(metrics.total_requests, 2_000);
        assert_eq!(metrics.fill_ratio, 0.5);
        assert!(metrics.filter.theoretical_false_positive_rate < 0.01);
    }

    // =========================================================================
    // FLOW 2: Snapshot survives a restart
    // =========================================================================

    #[tokio::test]
    async fn test_restart_restores_filter_without_store_scan() {
        let dir = TempDir::new().unwrap();
        let snapshots = FileSnapshotStore::new(dir.path().join("filter.snap"));
        let store = Arc::new(CountingStore::with_keys(user_keys(0..1_000)));

        let (first, _) = coordinator_over(Arc::clone(&store));
        first.warm_up().await.unwrap();
        for key in ["late_one", "late_two"] {
            assert_eq!(first.register_key(key).await.unwrap(), RegisterOutcome::Created);
        }
        first.save_snapshot(&snapshots).unwrap();
        let streams_before = store.stream_calls.load(Ordering::SeqCst);
        drop(first);

        let (second, events) = coordinator_over(Arc::clone(&store));
        let state = second.initialize(Some(&snapshots)).await.unwrap();

        assert_eq!(state, WarmupState::Ready);
        assert_eq!(store.stream_calls.load(Ordering::SeqCst), streams_before);
        assert_eq!(second.filter_stats().inserted_count, 1_002);
        assert_eq!(
            events.count(|e| matches!(e, CoordinatorEvent::SnapshotRestored { .. })),
            1
        );
        for key in ["late_one", "late_two", "user_0", "user_999"] {
            let answer = second
                .check_availability(key, CheckOptions::default())
                .await
                .unwrap();
            assert!(!answer.available);
            assert_eq!(answer.source, LookupSource::Store);
        }
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_falls_back_to_store_scan() {
        let dir = TempDir::new().unwrap();
        let snapshots = FileSnapshotStore::new(dir.path().join("filter.snap"));
        let store = Arc::new(CountingStore::with_keys(user_keys(0..100)));

        let (first, _) = coordinator_over(Arc::clone(&store));
        first.warm_up().await.unwrap();
        let mut bytes = first.snapshot_filter().unwrap();
        let middle = bytes.len() / 2;
        bytes[middle] ^= 0xFF;
        snapshots.save(&bytes).unwrap();

        let (second, events) = coordinator_over(Arc::clone(&store));
        let state = second.initialize(Some(&snapshots)).await.unwrap();

        assert_eq!(state, WarmupState::Ready);
        assert_eq!(second.filter_stats().inserted_count, 100);
        assert_eq!(
            events.count(|e| matches!(e, CoordinatorEvent::SnapshotRejected { .. })),
            1
        );
    }

    // =========================================================================
    // FLOW 3: Concurrency
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_registration_storm_has_one_winner_per_handle() {
        let store = Arc::new(CountingStore::new());
        let (coordinator, _) = coordinator_over(Arc::clone(&store));
        coordinator.warm_up().await.unwrap();
        let coordinator = Arc::new(coordinator);

        let mut tasks = Vec::new();
        for _ in 0..4 {
            for key in user_keys(0..50) {
                let coordinator = Arc::clone(&coordinator);
                tasks.push(tokio::spawn(async move {
                    coordinator.register_key(&key).await.unwrap()
                }));
            }
        }

        let mut created = 0;
        for task in tasks {
            if task.await.unwrap() == RegisterOutcome::Created {
                created += 1;
            }
        }

        assert_eq!(created, 50);
        assert_eq!(store.inner().len(), 50);
        assert_eq!(coordinator.filter_stats().inserted_count, 50);
        assert_eq!(coordinator.snapshot_metrics().counters.registrations_conflicted, 150);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_registrations_during_rebuild_are_not_lost() {
        let store = Arc::new(CountingStore::with_keys(user_keys(0..2_000)));
        let (coordinator, _) = coordinator_over(Arc::clone(&store));
        coordinator.warm_up().await.unwrap();
        let coordinator = Arc::new(coordinator);

        let rebuild = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move {
                coordinator
                    .rebuild(FilterConfig::new(20_000, 0.001).unwrap())
                    .await
                    .unwrap()
            })
        };
        let registrations: Vec<_> = user_keys(5_000..5_100)
            .into_iter()
            .map(|key| {
                let coordinator = Arc::clone(&coordinator);
                tokio::spawn(async move { coordinator.register_key(&key).await.unwrap() })
            })
            .collect();

        for task in registrations {
            assert_eq!(task.await.unwrap(), RegisterOutcome::Created);
        }
        rebuild.await.unwrap();

        assert_eq!(coordinator.warmup_state(), WarmupState::Ready);
        assert_eq!(coordinator.filter_stats().expected_elements, 20_000);
        for key in user_keys(5_000..5_100) {
            let answer = coordinator
                .check_availability(&key, CheckOptions::default())
                .await
                .unwrap();
            assert!(!answer.available, "{key} lost during rebuild");
            assert_ne!(answer.source, LookupSource::Filter);
        }
    }

    // =========================================================================
    // FLOW 4: Cache expiry bounds staleness
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_stale_cache_entry_expires() {
        let store = Arc::new(InMemoryStore::new());
        let config = CoordinatorConfigBuilder::new()
            .expected_element_count(10_000)
            .cache_ttl(Duration::from_secs(60))
            .negative_cache_ttl(Duration::from_secs(5))
            .build()
            .unwrap();
        let coordinator = LookupCoordinator::new(
            Arc::clone(&store),
            Arc::new(InMemoryCache::new(1_000)),
            config,
        )
        .unwrap();

        let first = coordinator
            .check_availability("bob_x", CheckOptions::bypass_filter())
            .await
            .unwrap();
        assert!(first.available);

        store.insert_unique("bob_x").await.unwrap();

        let stale = coordinator
            .check_availability("bob_x", CheckOptions::bypass_filter())
            .await
            .unwrap();
        assert!(stale.available);
        assert_eq!(stale.source, LookupSource::Cache);

        tokio::time::advance(Duration::from_secs(6)).await;

        let fresh = coordinator
            .check_availability("bob_x", CheckOptions::bypass_filter())
            .await
            .unwrap();
        assert!(!fresh.available);
        assert_eq!(fresh.source, LookupSource::ForcedStore);
    }

    // =========================================================================
    // FLOW 5: Logging wired through telemetry
    // =========================================================================

    #[tokio::test]
    async fn test_tracing_sink_with_installed_subscriber() {
        let telemetry = TelemetryConfig {
            console_output: false,
            ..TelemetryConfig::default()
        };
        let guard = match init_telemetry(telemetry) {
            Ok(guard) => Some(guard),
            Err(TelemetryError::SubscriberInit(_)) => None,
            Err(e) => panic!("unexpected telemetry error: {e}"),
        };

        let coordinator = LookupCoordinator::new(
            Arc::new(InMemoryStore::with_keys(["alice"])),
            Arc::new(InMemoryCache::new(100)),
            config(),
        )
        .unwrap()
        .with_events(Arc::new(TracingEventSink));
        coordinator.warm_up().await.unwrap();

        assert_eq!(
            coordinator.register_key("alice").await.unwrap(),
            RegisterOutcome::Conflict
        );
        assert!(coordinator.check_availability("a", CheckOptions::default()).await.is_err());
        drop(guard);
    }
}
