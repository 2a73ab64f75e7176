//! # Handle Availability Benchmarks
//!
//! | Path | Target |
//! |------|--------|
//! | Filter `might_contain` | < 1μs |
//! | Filter `add` | < 1μs |
//! | Coordinator check, filter short-circuit | < 10μs |
//! | Coordinator check, cache hit | < 20μs |

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hc_01_membership_filter::ProbabilisticFilter;
use hc_02_lookup_coordinator::{
    AvailabilityApi, CheckOptions, CoordinatorConfigBuilder, InMemoryCache, InMemoryStore,
    LookupCoordinator,
};
use rand::Rng;

fn random_handle(rng: &mut impl Rng) -> String {
    format!("h_{:016x}", rng.gen::<u64>())
}

// ============================================================================
// HC-01: Membership Filter
// ============================================================================

fn bench_filter_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("hc-01-membership-filter");
    group.measurement_time(Duration::from_secs(5));

    let mut rng = rand::thread_rng();
    let members: Vec<String> = (0..100_000).map(|_| random_handle(&mut rng)).collect();

    let mut filter = ProbabilisticFilter::new(1_000_000, 0.001).unwrap();
    filter.add_batch(&members);

    group.bench_function("might_contain_member", |b| {
        let mut i = 0;
        b.iter(|| {
            i = (i + 1) % members.len();
            black_box(filter.might_contain(&members[i]))
        })
    });

    group.bench_function("might_contain_absent", |b| {
        let mut rng = rand::thread_rng();
        b.iter(|| black_box(filter.might_contain(&random_handle(&mut rng))))
    });

    for size in [1_000usize, 10_000, 100_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("add_batch", size), &size, |b, &size| {
            b.iter(|| {
                let mut filter = ProbabilisticFilter::new(size as u64, 0.001).unwrap();
                black_box(filter.add_batch(&members[..size]))
            })
        });
    }

    group.bench_function("snapshot_encode", |b| {
        b.iter(|| black_box(filter.to_snapshot_bytes().unwrap()))
    });

    group.finish();
}

// ============================================================================
// HC-02: Lookup Coordinator
// ============================================================================

fn bench_coordinator_checks(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("hc-02-lookup-coordinator");

    let mut rng = rand::thread_rng();
    let members: Vec<String> = (0..10_000).map(|_| random_handle(&mut rng)).collect();
    let config = CoordinatorConfigBuilder::new()
        .expected_element_count(100_000)
        .build()
        .unwrap();
    let coordinator = LookupCoordinator::new(
        Arc::new(InMemoryStore::with_keys(members.iter().cloned())),
        Arc::new(InMemoryCache::new(100_000)),
        config,
    )
    .unwrap();
    runtime.block_on(coordinator.warm_up()).unwrap();

    group.bench_function("check_filter_short_circuit", |b| {
        let mut rng = rand::thread_rng();
        b.iter(|| {
            let key = random_handle(&mut rng);
            black_box(
                runtime
                    .block_on(coordinator.check_availability(&key, CheckOptions::default()))
                    .unwrap(),
            )
        })
    });

    runtime
        .block_on(coordinator.check_availability(&members[0], CheckOptions::default()))
        .unwrap();
    group.bench_function("check_cache_hit", |b| {
        b.iter(|| {
            black_box(
                runtime
                    .block_on(coordinator.check_availability(&members[0], CheckOptions::default()))
                    .unwrap(),
            )
        })
    });

    group.finish();
}

criterion_group!(benches, bench_filter_operations, bench_coordinator_checks);

criterion_main!(benches);
