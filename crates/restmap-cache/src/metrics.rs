//! Metrics for the discovery cache.
//!
//! Emitted through the `metrics` facade, so they are no-ops until the
//! application installs a recorder (e.g. a Prometheus exporter):
//!
//! - `restmap_cache_hits_total` / `restmap_cache_misses_total`
//! - `restmap_cache_stale_retries_total`
//! - `restmap_discovery_fetches_total` with an `outcome` label
//! - `restmap_discovery_fetch_duration_seconds`
//! - `restmap_cache_invalidations_total`
//! - `restmap_cache_entries`
//!
//! Every series carries a `cache` label naming the cache, so several caches
//! can share one recorder. Every series except `restmap_cache_entries` also
//! carries a `group_version` label.

use std::time::Duration;

use metrics::{counter, gauge, histogram};
use restmap_core::GroupVersion;

/// Metrics recorder handle for one cache.
#[derive(Debug, Clone)]
pub(crate) struct CacheMetrics {
    cache: String,
}

impl CacheMetrics {
    pub(crate) fn new(cache: impl Into<String>) -> Self {
        Self {
            cache: cache.into(),
        }
    }

    /// Record a lookup answered from a cached entry.
    pub(crate) fn cache_hit(&self, group_version: &GroupVersion) {
        counter!(
            "restmap_cache_hits_total",
            "cache" => self.cache.clone(),
            "group_version" => group_version.to_string()
        )
        .increment(1);
    }

    /// Record a lookup with no cached entry.
    pub(crate) fn cache_miss(&self, group_version: &GroupVersion) {
        counter!(
            "restmap_cache_misses_total",
            "cache" => self.cache.clone(),
            "group_version" => group_version.to_string()
        )
        .increment(1);
    }

    /// Record a refetch forced by a kind missing from a cached entry.
    pub(crate) fn stale_retry(&self, group_version: &GroupVersion) {
        counter!(
            "restmap_cache_stale_retries_total",
            "cache" => self.cache.clone(),
            "group_version" => group_version.to_string()
        )
        .increment(1);
    }

    /// Record a finished discovery fetch.
    pub(crate) fn fetch_finished(&self, group_version: &GroupVersion, elapsed: Duration, ok: bool) {
        let outcome = if ok { "success" } else { "failure" };
        counter!(
            "restmap_discovery_fetches_total",
            "cache" => self.cache.clone(),
            "group_version" => group_version.to_string(),
            "outcome" => outcome
        )
        .increment(1);
        histogram!(
            "restmap_discovery_fetch_duration_seconds",
            "cache" => self.cache.clone(),
            "group_version" => group_version.to_string()
        )
        .record(elapsed.as_secs_f64());
    }

    /// Record a removed entry.
    pub(crate) fn invalidated(&self, group_version: &GroupVersion) {
        counter!(
            "restmap_cache_invalidations_total",
            "cache" => self.cache.clone(),
            "group_version" => group_version.to_string()
        )
        .increment(1);
    }

    /// Publish the current number of cached entries.
    pub(crate) fn entries(&self, count: usize) {
        gauge!("restmap_cache_entries", "cache" => self.cache.clone()).set(count as f64);
    }
}
