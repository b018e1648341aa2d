//! DiscoveryCache: the discovery-backed mapping cache.
//!
//! The cache stores one [`GroupVersionEntry`] per group/version and answers
//! kind lookups from it, fetching from the [`DiscoveryTransport`] on miss.
//!
//! ## Lookup protocol
//!
//! 1. Use the cached entry for the group/version, fetching it if absent.
//! 2. Return the mapping for the kind if the entry has it.
//! 3. If the kind is missing from an entry that was already cached before
//!    this lookup, the entry may predate the kind's registration: retire it
//!    and fetch once more. A kind missing from an entry fetched during this
//!    lookup is reported as [`MapperError::KindNotFound`].
//!
//! A lookup therefore performs at most two fetches. Fetch failures are
//! returned as-is and never retried here.
//!
//! ## Invalidation
//!
//! Every group/version carries a generation that invalidation bumps. A
//! fetch records the generation before it starts and only stores its result
//! if the generation is unchanged, so a fetch already in flight when
//! [`DiscoveryCache::invalidate`] is called can never publish data from
//! before the invalidation.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use restmap_core::{
    DiscoveryTransport, FetchContext, GroupVersion, MapperError, RestMapping, Result,
    SharedTransport,
};
use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::config::CacheConfig;
use crate::entry::GroupVersionEntry;
use crate::metrics::CacheMetrics;
use crate::stats::CacheStats;

/// A concurrent cache of discovery results keyed by group/version.
///
/// This cache:
/// - Uses `DashMap` so lookups of different group/versions never contend
/// - Publishes entries as fully built `Arc` handles, never in pieces
/// - Coalesces concurrent fetches of one group/version behind a per-key lock
/// - Tracks statistics for monitoring
///
/// ## Thread Safety
///
/// All operations are thread-safe. Share one instance between resolvers
/// with `Arc<DiscoveryCache>`.
///
/// ## Metrics
///
/// Besides [`CacheStats`], the cache reports through the `metrics` facade:
/// `restmap_cache_hits_total`, `restmap_cache_misses_total`,
/// `restmap_cache_stale_retries_total`, `restmap_discovery_fetches_total`
/// (labelled by `outcome`), `restmap_discovery_fetch_duration_seconds`,
/// `restmap_cache_invalidations_total` and the `restmap_cache_entries`
/// gauge. Every series is labelled with [`CacheConfig::name`].
///
/// ## Important
///
/// All `DashMap` references are dropped before any `.await`.
pub struct DiscoveryCache {
    /// Source of discovery data.
    transport: SharedTransport,
    /// Valid entries keyed by group/version.
    entries: DashMap<GroupVersion, Arc<GroupVersionEntry>>,
    /// Per-key fetch state, present only while a key has fetches in flight.
    slots: DashMap<GroupVersion, Arc<FetchSlot>>,
    /// Configuration.
    config: CacheConfig,
    /// Statistics.
    stats: CacheStats,
    /// Exported metrics.
    metrics: CacheMetrics,
}

impl fmt::Debug for DiscoveryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveryCache")
            .field("entries", &self.entries.len())
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl DiscoveryCache {
    /// Create a cache with default settings.
    pub fn new<T>(transport: T) -> Self
    where
        T: DiscoveryTransport + 'static,
    {
        Self::with_config(transport, CacheConfig::default())
    }

    /// Create a cache with explicit settings.
    pub fn with_config<T>(transport: T, config: CacheConfig) -> Self
    where
        T: DiscoveryTransport + 'static,
    {
        Self::from_shared(Arc::new(transport), config)
    }

    /// Create a cache over an already shared transport.
    pub fn from_shared(transport: SharedTransport, config: CacheConfig) -> Self {
        Self {
            transport,
            entries: DashMap::with_capacity(config.initial_capacity),
            slots: DashMap::with_capacity(config.initial_capacity),
            metrics: CacheMetrics::new(config.name.clone()),
            config,
            stats: CacheStats::new(),
        }
    }

    /// Create a new cache builder.
    pub fn builder() -> CacheBuilder {
        CacheBuilder::new()
    }

    /// Get the active configuration.
    #[inline]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get cache statistics.
    #[inline]
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Find the mapping for `kind` in `group_version`.
    ///
    /// Equivalent to [`find_mapping_with`](Self::find_mapping_with) under
    /// [`FetchContext::background`].
    pub async fn find_mapping(&self, group_version: &GroupVersion, kind: &str) -> Result<RestMapping> {
        self.find_mapping_with(&FetchContext::background(), group_version, kind)
            .await
    }

    /// Find the mapping for `kind` in `group_version`, bounding any
    /// discovery fetch by `ctx`.
    ///
    /// Returns [`MapperError::KindNotFound`] when discovery does not serve
    /// the kind, and transport errors unchanged.
    pub async fn find_mapping_with(
        &self,
        ctx: &FetchContext,
        group_version: &GroupVersion,
        kind: &str,
    ) -> Result<RestMapping> {
        let (entry, fresh) = match self.cached(group_version) {
            Some(entry) => (entry, false),
            None => {
                self.stats.record_miss();
                self.metrics.cache_miss(group_version);
                trace!(group_version = %group_version, kind, "cache miss");
                (self.refresh(ctx, group_version, None).await?, true)
            }
        };

        if let Some(mapping) = entry.get(kind) {
            if !fresh {
                self.stats.record_hit();
                self.metrics.cache_hit(group_version);
                trace!(group_version = %group_version, kind, "cache hit");
            }
            return Ok(mapping.clone());
        }

        if fresh {
            return Err(self.not_found(group_version, kind));
        }

        self.stats.record_stale_retry();
        self.metrics.stale_retry(group_version);
        debug!(
            group_version = %group_version,
            kind,
            "kind missing from cached entry, refetching"
        );

        let entry = self.refresh(ctx, group_version, Some(&entry)).await?;
        match entry.get(kind) {
            Some(mapping) => Ok(mapping.clone()),
            None => Err(self.not_found(group_version, kind)),
        }
    }

    /// Get the cached entry for `group_version` without fetching.
    pub fn entry(&self, group_version: &GroupVersion) -> Option<Arc<GroupVersionEntry>> {
        self.cached(group_version)
    }

    /// Remove the entry for `group_version`, forcing the next lookup to
    /// fetch. Returns whether an entry was removed.
    ///
    /// A fetch of `group_version` that is in flight when this is called
    /// will not store its result.
    pub fn invalidate(&self, group_version: &GroupVersion) -> bool {
        self.bump_generation(group_version);
        let removed = self.remove_entry(group_version);
        self.prune_slot(group_version);
        removed
    }

    fn remove_entry(&self, group_version: &GroupVersion) -> bool {
        match self.entries.remove(group_version) {
            Some((_, entry)) => {
                entry.retire();
                self.stats.record_invalidations(1);
                self.metrics.invalidated(group_version);
                self.metrics.entries(self.entries.len());
                debug!(group_version = %group_version, "invalidated entry");
                true
            }
            None => false,
        }
    }

    /// Remove every entry. Returns the number of entries removed.
    ///
    /// Fetches in flight when this is called will not store their results.
    pub fn clear(&self) -> usize {
        self.slots.iter().for_each(|slot| slot.bump());
        let removed = self
            .group_versions()
            .iter()
            .filter(|gv| self.remove_entry(gv))
            .count();
        self.slots.retain(|_, slot| Arc::strong_count(slot) > 1);
        debug!(removed, "cleared cache");
        removed
    }

    /// Check if an entry is cached for `group_version`.
    pub fn contains(&self, group_version: &GroupVersion) -> bool {
        self.entries.contains_key(group_version)
    }

    /// Get all cached group/versions.
    pub fn group_versions(&self) -> Vec<GroupVersion> {
        self.entries.iter().map(|r| r.key().clone()).collect()
    }

    /// Get the number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no entries are cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn cached(&self, group_version: &GroupVersion) -> Option<Arc<GroupVersionEntry>> {
        // Clone the Arc and drop the shard guard immediately.
        self.entries.get(group_version).map(|r| Arc::clone(r.value()))
    }

    fn slot(&self, group_version: &GroupVersion) -> Arc<FetchSlot> {
        if let Some(slot) = self.slots.get(group_version) {
            return Arc::clone(slot.value());
        }
        Arc::clone(self.slots.entry(group_version.clone()).or_default().value())
    }

    fn bump_generation(&self, group_version: &GroupVersion) {
        // Clone out so the shard guard is released before anything else.
        let slot = self.slots.get(group_version).map(|r| Arc::clone(r.value()));
        if let Some(slot) = slot {
            slot.bump();
        }
    }

    /// Drop the fetch state for `group_version` unless a fetch holds it.
    fn prune_slot(&self, group_version: &GroupVersion) {
        self.slots
            .remove_if(group_version, |_, slot| Arc::strong_count(slot) == 1);
    }

    /// Number of group/versions with fetch state.
    #[cfg(test)]
    fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn not_found(&self, group_version: &GroupVersion, kind: &str) -> MapperError {
        self.stats.record_not_found();
        MapperError::KindNotFound {
            group_version: group_version.clone(),
            kind: kind.to_string(),
        }
    }

    /// Retire `entry` if it is still the one cached under `group_version`.
    fn retire(
        &self,
        slot: &FetchSlot,
        group_version: &GroupVersion,
        entry: &Arc<GroupVersionEntry>,
    ) {
        slot.bump();
        let removed = self
            .entries
            .remove_if(group_version, |_, current| Arc::ptr_eq(current, entry));
        if removed.is_some() {
            entry.retire();
            self.stats.record_invalidations(1);
            self.metrics.invalidated(group_version);
            self.metrics.entries(self.entries.len());
            debug!(group_version = %group_version, "retired stale entry");
        }
    }

    /// Obtain an entry fetched no earlier than this call.
    ///
    /// `stale` is the entry the caller already judged outdated; any other
    /// entry found after acquiring the fetch lock was stored by a
    /// concurrent lookup and is returned without fetching again. Cached
    /// entries are never older than the last invalidation, so such an entry
    /// is current.
    async fn refresh(
        &self,
        ctx: &FetchContext,
        group_version: &GroupVersion,
        stale: Option<&Arc<GroupVersionEntry>>,
    ) -> Result<Arc<GroupVersionEntry>> {
        let slot = self.slot(group_version);
        let result = self.refresh_with(&slot, ctx, group_version, stale).await;
        drop(slot);
        self.prune_slot(group_version);
        result
    }

    async fn refresh_with(
        &self,
        slot: &FetchSlot,
        ctx: &FetchContext,
        group_version: &GroupVersion,
        stale: Option<&Arc<GroupVersionEntry>>,
    ) -> Result<Arc<GroupVersionEntry>> {
        let _guard = if self.config.coalesce_fetches {
            let lock = Arc::clone(&slot.lock);
            let guard = ctx
                .run("waiting for in-flight discovery", async move {
                    Ok(lock.lock_owned().await)
                })
                .await?;
            Some(guard)
        } else {
            None
        };

        if let Some(current) = self.cached(group_version) {
            match stale {
                Some(stale) if Arc::ptr_eq(stale, &current) => {
                    self.retire(slot, group_version, &current)
                }
                _ => {
                    trace!(group_version = %group_version, "entry stored by concurrent lookup");
                    return Ok(current);
                }
            }
        }

        let ctx = match self.config.fetch_timeout {
            Some(timeout) => ctx.clone().with_timeout(timeout),
            None => ctx.clone(),
        };

        let generation = slot.generation();
        self.stats.record_fetch();
        debug!(group_version = %group_version, generation, "fetching discovery");

        let operation = format!("discovery of {group_version}");
        let started = Instant::now();
        let result = ctx
            .run(&operation, self.transport.list_resources_for(group_version))
            .await;
        self.metrics
            .fetch_finished(group_version, started.elapsed(), result.is_ok());
        let resources = match result {
            Ok(resources) => resources,
            Err(err) => {
                self.stats.record_fetch_failure();
                return Err(err);
            }
        };

        let entry = Arc::new(GroupVersionEntry::new(group_version.clone(), resources));

        // Checked under the shard lock so an invalidation either sees the
        // stored entry and removes it, or is seen here.
        let stored = match self.entries.entry(group_version.clone()) {
            _ if slot.generation() != generation => false,
            Entry::Occupied(mut occupied) => {
                occupied.insert(Arc::clone(&entry)).retire();
                true
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Arc::clone(&entry));
                true
            }
        };
        if !stored {
            debug!(
                group_version = %group_version,
                "invalidated during fetch, result not stored"
            );
            return Ok(entry);
        }
        self.metrics.entries(self.entries.len());

        debug!(
            group_version = %group_version,
            resources = entry.len(),
            "stored discovery entry"
        );

        Ok(entry)
    }
}

/// Fetch state for one group/version.
#[derive(Debug, Default)]
struct FetchSlot {
    /// Serializes fetches when coalescing.
    lock: Arc<Mutex<()>>,
    /// Bumped on every invalidation.
    generation: AtomicU64,
}

impl FetchSlot {
    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

/// Builder for creating a configured cache.
#[derive(Debug, Default)]
pub struct CacheBuilder {
    config: CacheConfig,
}

impl CacheBuilder {
    /// Create a new cache builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    /// Name the cache in exported metrics.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Set the initial capacity.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.initial_capacity = capacity;
        self
    }

    /// Bound every discovery fetch by `timeout`.
    pub fn fetch_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config.fetch_timeout = Some(timeout);
        self
    }

    /// Let fetches run as long as the caller's context allows.
    pub fn no_fetch_timeout(mut self) -> Self {
        self.config.fetch_timeout = None;
        self
    }

    /// Enable or disable fetch coalescing.
    pub fn coalesce_fetches(mut self, coalesce: bool) -> Self {
        self.config.coalesce_fetches = coalesce;
        self
    }

    /// Build the cache.
    pub fn build<T>(self, transport: T) -> DiscoveryCache
    where
        T: DiscoveryTransport + 'static,
    {
        DiscoveryCache::with_config(transport, self.config)
    }
}
