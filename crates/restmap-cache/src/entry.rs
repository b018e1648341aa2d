//! GroupVersionEntry: the immutable result of one discovery fetch.
//!
//! An entry holds every mapping enumerated for a group/version at fetch
//! time. Entries are:
//!
//! - **Immutable**: built completely before they are published to the cache
//! - **Wholesale**: a refresh replaces the entry, it is never merged
//! - **Invalidatable**: holders of an old handle can see that it was retired

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use restmap_core::{ApiResourceInfo, GroupVersion, RestMapping};

/// Mappings for one group/version as enumerated by discovery.
#[derive(Debug)]
pub struct GroupVersionEntry {
    /// Key of this entry.
    group_version: GroupVersion,
    /// Mappings in discovery order.
    mappings: Vec<RestMapping>,
    /// Kind to index into `mappings`.
    by_kind: HashMap<String, usize>,
    /// Cleared when the cache retires this entry.
    valid: AtomicBool,
    /// Fetch timestamp.
    fetched_at: Instant,
}

impl GroupVersionEntry {
    /// Build an entry from the resources discovery reported.
    ///
    /// If a kind is reported more than once the first record wins.
    pub fn new(group_version: GroupVersion, resources: Vec<ApiResourceInfo>) -> Self {
        let mut mappings = Vec::with_capacity(resources.len());
        let mut by_kind = HashMap::with_capacity(resources.len());

        for resource in resources {
            if by_kind.contains_key(&resource.kind) {
                continue;
            }
            by_kind.insert(resource.kind.clone(), mappings.len());
            mappings.push(resource.to_mapping(&group_version));
        }

        Self {
            group_version,
            mappings,
            by_kind,
            valid: AtomicBool::new(true),
            fetched_at: Instant::now(),
        }
    }

    /// The group/version this entry enumerates.
    #[inline]
    pub fn group_version(&self) -> &GroupVersion {
        &self.group_version
    }

    /// Look up the mapping for `kind`.
    #[inline]
    pub fn get(&self, kind: &str) -> Option<&RestMapping> {
        self.by_kind.get(kind).map(|idx| &self.mappings[*idx])
    }

    /// Check if this entry contains `kind`.
    #[inline]
    pub fn contains_kind(&self, kind: &str) -> bool {
        self.by_kind.contains_key(kind)
    }

    /// Iterate over all mappings in discovery order.
    #[inline]
    pub fn mappings(&self) -> impl Iterator<Item = &RestMapping> {
        self.mappings.iter()
    }

    /// Get the number of mappings.
    #[inline]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Check if discovery reported no resources.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// When discovery produced this entry.
    #[inline]
    pub fn fetched_at(&self) -> Instant {
        self.fetched_at
    }

    /// Whether the cache still serves this entry.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Acquire)
    }

    pub(crate) fn retire(&self) {
        self.valid.store(false, Ordering::Release);
    }
}
