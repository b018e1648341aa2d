//! Cache integration tests.

use std::sync::Arc;
use std::time::Duration;

use restmap::prelude::*;
use restmap_core::fixture::StaticDiscovery;

fn cluster() -> Arc<StaticDiscovery> {
    Arc::new(
        StaticDiscovery::new()
            .with_resource("", "v1", "Pod", "pods", Scope::Namespaced)
            .with_resource("", "v1", "Namespace", "namespaces", Scope::Cluster)
            .with_resource("apps", "v1", "Deployment", "deployments", Scope::Namespaced)
            .with_resource("apps", "v1", "DaemonSet", "daemonsets", Scope::Namespaced)
            .with_resource(
                "rbac.authorization.k8s.io",
                "v1",
                "ClusterRole",
                "clusterroles",
                Scope::Cluster,
            ),
    )
}

#[tokio::test]
async fn cache_returns_every_enumerated_kind() {
    let discovery = cluster();
    let cache = DiscoveryCache::new(Arc::clone(&discovery));

    let expected = [
        ("", "Pod", "pods", Scope::Namespaced),
        ("", "Namespace", "namespaces", Scope::Cluster),
        ("apps", "Deployment", "deployments", Scope::Namespaced),
        ("apps", "DaemonSet", "daemonsets", Scope::Namespaced),
        ("rbac.authorization.k8s.io", "ClusterRole", "clusterroles", Scope::Cluster),
    ];

    for (group, kind, resource, scope) in expected {
        let gv = GroupVersion::new(group, "v1");
        let mapping = cache.find_mapping(&gv, kind).await.unwrap();
        assert_eq!(mapping.gvk(), &gv.with_kind(kind));
        assert_eq!(mapping.resource(), &gv.with_resource(resource));
        assert_eq!(mapping.scope(), scope);
    }

    // One fetch per group/version, never per kind.
    assert_eq!(discovery.fetch_count(), 3);
    assert_eq!(cache.len(), 3);
}

#[tokio::test]
async fn cache_absent_kind_costs_at_most_two_fetches() {
    let discovery = cluster();
    let cache = DiscoveryCache::new(Arc::clone(&discovery));
    let apps = GroupVersion::new("apps", "v1");

    // Uncached: one fetch, no retry.
    assert!(cache.find_mapping(&apps, "Widget").await.unwrap_err().is_not_found());
    assert_eq!(discovery.fetch_count(), 1);

    // Cached: the single stale retry.
    assert!(cache.find_mapping(&apps, "Widget").await.unwrap_err().is_not_found());
    assert_eq!(discovery.fetch_count(), 2);
    assert_eq!(cache.stats().not_found(), 2);
}

#[tokio::test]
async fn cache_picks_up_crd_installed_later() {
    let discovery = cluster();
    let cache = DiscoveryCache::new(Arc::clone(&discovery));
    let gv = GroupVersion::new("example.com", "v1");

    // The group is served before the CRD of interest exists.
    discovery.add_resource("example.com", "v1", "Gadget", "gadgets", Scope::Namespaced);
    cache.find_mapping(&gv, "Gadget").await.unwrap();

    discovery.add_resource("example.com", "v1", "Widget", "widgets", Scope::Cluster);
    let mapping = cache.find_mapping(&gv, "Widget").await.unwrap();
    assert_eq!(mapping.resource().resource(), "widgets");
    assert_eq!(cache.stats().stale_retries(), 1);
}

#[tokio::test]
async fn cache_invalidate_then_lookup_fetches_once() {
    let discovery = cluster();
    let cache = DiscoveryCache::new(Arc::clone(&discovery));
    let gv = GroupVersion::new("", "v1");

    cache.find_mapping(&gv, "Pod").await.unwrap();
    let before = discovery.fetch_count();

    cache.invalidate(&gv);
    cache.find_mapping(&gv, "Pod").await.unwrap();
    cache.find_mapping(&gv, "Namespace").await.unwrap();
    assert_eq!(discovery.fetch_count(), before + 1);
}

#[tokio::test]
async fn cache_removed_kind_stays_served_until_invalidated() {
    let discovery = cluster();
    let cache = DiscoveryCache::new(Arc::clone(&discovery));
    let gv = GroupVersion::new("apps", "v1");

    cache.find_mapping(&gv, "DaemonSet").await.unwrap();
    discovery.remove_resource("apps", "v1", "DaemonSet");

    // Entries are not revalidated on hit.
    cache.find_mapping(&gv, "DaemonSet").await.unwrap();

    cache.invalidate(&gv);
    let err = cache.find_mapping(&gv, "DaemonSet").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn cache_caller_deadline_bounds_fetch() {
    let discovery = cluster();
    discovery.set_latency(Some(Duration::from_secs(5)));
    let cache = DiscoveryCache::new(Arc::clone(&discovery));

    let ctx = FetchContext::background().with_timeout(Duration::from_millis(20));
    let err = cache
        .find_mapping_with(&ctx, &GroupVersion::new("", "v1"), "Pod")
        .await
        .unwrap_err();
    assert!(err.is_transport());
    assert!(matches!(err, MapperError::Timeout { .. }));
    assert!(cache.is_empty());
    assert_eq!(cache.stats().fetch_failures(), 1);
}

#[tokio::test]
async fn cache_already_cancelled_context_does_not_fetch() {
    let discovery = cluster();
    let cache = DiscoveryCache::new(Arc::clone(&discovery));

    let handle = CancelHandle::new();
    handle.cancel();
    let ctx = FetchContext::background().with_cancellation(&handle);

    let err = cache
        .find_mapping_with(&ctx, &GroupVersion::new("", "v1"), "Pod")
        .await
        .unwrap_err();
    assert!(matches!(err, MapperError::Cancelled { .. }));
    assert_eq!(discovery.fetch_count(), 0);
}

#[tokio::test]
async fn cache_stats_track_lookups() {
    let discovery = cluster();
    let cache = DiscoveryCache::new(Arc::clone(&discovery));
    let gv = GroupVersion::new("apps", "v1");

    cache.find_mapping(&gv, "Deployment").await.unwrap();
    for _ in 0..3 {
        cache.find_mapping(&gv, "Deployment").await.unwrap();
    }

    let stats = cache.stats();
    assert_eq!(stats.misses(), 1);
    assert_eq!(stats.hits(), 3);
    assert_eq!(stats.fetches(), 1);
    assert_eq!(stats.hit_rate(), 0.75);

    stats.reset();
    assert_eq!(stats.hits(), 0);
}
