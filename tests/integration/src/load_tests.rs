//! Load tests for the mapping cache with many group/versions and tasks.
//!
//! These tests verify the cache under high concurrency:
//! - Hundreds of tasks resolving the same group/version at once
//! - Lookups spread across many group/versions
//! - Stale retries racing with ordinary hits
//!
//! Run with: `cargo test --package restmap-integration-tests --test load_tests -- --nocapture`

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use restmap::prelude::*;
use restmap_core::fixture::StaticDiscovery;
use tokio::sync::Barrier;

/// Discovery with `num_groups` CRD groups, each serving `kinds` kinds at v1.
fn crd_cluster(num_groups: usize, kinds: usize) -> Arc<StaticDiscovery> {
    let discovery = StaticDiscovery::new();
    for g in 0..num_groups {
        for k in 0..kinds {
            discovery.add_resource(
                &format!("crd{g}.example.com"),
                "v1",
                &format!("Kind{k}"),
                &format!("kind{k}s"),
                Scope::Namespaced,
            );
        }
    }
    Arc::new(discovery)
}

/// 500 tasks released together against one cold group/version.
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_thundering_herd_single_fetch() {
    let discovery = crd_cluster(1, 10);
    discovery.set_latency(Some(Duration::from_millis(25)));
    let cache = Arc::new(DiscoveryCache::new(Arc::clone(&discovery)));
    let num_tasks = 500;

    let barrier = Arc::new(Barrier::new(num_tasks));
    let mut handles = Vec::with_capacity(num_tasks);
    for i in 0..num_tasks {
        let cache = Arc::clone(&cache);
        let barrier = Arc::clone(&barrier);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            let gv = GroupVersion::new("crd0.example.com", "v1");
            cache.find_mapping(&gv, &format!("Kind{}", i % 10)).await
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let mapping = handle.await.expect("Task panicked").unwrap();
        // Every task saw a fully populated entry.
        assert_eq!(mapping.resource().resource(), format!("kind{}s", i % 10));
    }

    assert_eq!(discovery.fetch_count(), 1);
    assert_eq!(cache.len(), 1);
}

/// Many tasks resolving across 100 group/versions.
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_100_group_versions() {
    let num_groups = 100;
    let num_tasks = 20;
    let lookups_per_task = 500;
    let discovery = crd_cluster(num_groups, 5);
    let cache = Arc::new(DiscoveryCache::new(Arc::clone(&discovery)));
    let mapper = ControllerRestMapper::new(Arc::clone(&cache));

    let barrier = Arc::new(Barrier::new(num_tasks));
    let total_ops = Arc::new(AtomicU64::new(0));
    let start = Instant::now();

    let mut handles = Vec::new();
    for task_id in 0..num_tasks {
        let mapper = mapper.clone();
        let barrier = Arc::clone(&barrier);
        let total_ops = Arc::clone(&total_ops);

        handles.push(tokio::spawn(async move {
            barrier.wait().await;

            for i in 0..lookups_per_task {
                let n = task_id * lookups_per_task + i;
                let gk = GroupKind::new(
                    format!("crd{}.example.com", n % num_groups),
                    format!("Kind{}", n % 5),
                );
                let mapping = mapper.resolve(&gk, &["v1"]).await.unwrap();
                assert_eq!(mapping.kind(), gk.kind());
                total_ops.fetch_add(1, Ordering::Relaxed);
            }
        }));
    }

    for handle in handles {
        handle.await.expect("Task panicked");
    }

    let duration = start.elapsed();
    let ops = total_ops.load(Ordering::Relaxed);
    println!(
        "Concurrent resolve: {} ops in {:?} ({:.2} µs/op, {:.0} ops/sec)",
        ops,
        duration,
        duration.as_micros() as f64 / ops as f64,
        ops as f64 / duration.as_secs_f64()
    );

    let stats = cache.stats();
    println!(
        "Cache stats: hits={}, misses={}, fetches={}, hit_rate={:.2}%",
        stats.hits(),
        stats.misses(),
        stats.fetches(),
        stats.hit_rate() * 100.0
    );

    assert_eq!(ops, (num_tasks * lookups_per_task) as u64);
    assert_eq!(cache.len(), num_groups);
    // Coalescing keeps it to one fetch per group/version.
    assert_eq!(discovery.fetch_count(), num_groups as u64);
}

/// Stale retries for a new kind while other tasks keep hitting the entry.
#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_stale_retries_under_load() {
    let discovery = crd_cluster(1, 3);
    let cache = Arc::new(DiscoveryCache::new(Arc::clone(&discovery)));
    let gv = GroupVersion::new("crd0.example.com", "v1");
    cache.find_mapping(&gv, "Kind0").await.unwrap();

    discovery.add_resource("crd0.example.com", "v1", "Late", "lates", Scope::Cluster);
    discovery.set_latency(Some(Duration::from_millis(10)));

    let num_tasks = 100;
    let barrier = Arc::new(Barrier::new(num_tasks));
    let mut handles = Vec::with_capacity(num_tasks);
    for i in 0..num_tasks {
        let cache = Arc::clone(&cache);
        let barrier = Arc::clone(&barrier);
        let gv = gv.clone();
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            let kind = if i % 2 == 0 { "Late" } else { "Kind1" };
            cache.find_mapping(&gv, kind).await
        }));
    }

    for handle in handles {
        handle.await.expect("Task panicked").unwrap();
    }

    // Each lookup fetches at most twice; with coalescing the new kind
    // is picked up by a single shared refresh.
    assert_eq!(discovery.fetch_count(), 2);
    assert!(cache.entry(&gv).unwrap().contains_kind("Late"));
}
