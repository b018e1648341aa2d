//! In-memory discovery transport for tests.
//!
//! [`StaticDiscovery`] serves a fixed, mutable table of resources and
//! records every fetch, so tests can assert how many round trips a cache
//! performed. Latency and failures can be injected.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::{ApiResourceInfo, DiscoveryTransport, GroupVersion, MapperError, Result, Scope};

/// A [`DiscoveryTransport`] over an in-memory resource table.
///
/// # Example
///
/// ```rust,ignore
/// use restmap_core::fixture::StaticDiscovery;
/// use restmap_core::Scope;
///
/// let discovery = StaticDiscovery::new()
///     .with_resource("apps", "v1", "Deployment", "deployments", Scope::Namespaced)
///     .with_resource("", "v1", "Namespace", "namespaces", Scope::Cluster);
/// assert_eq!(discovery.fetch_count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct StaticDiscovery {
    resources: Mutex<HashMap<GroupVersion, Vec<ApiResourceInfo>>>,
    fetches: Mutex<HashMap<GroupVersion, u64>>,
    total_fetches: AtomicU64,
    latency: Mutex<Option<Duration>>,
    failing: AtomicBool,
}

impl StaticDiscovery {
    /// Create an empty transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`add_resource`](Self::add_resource).
    #[must_use]
    pub fn with_resource(
        self,
        group: &str,
        version: &str,
        kind: &str,
        name: &str,
        scope: Scope,
    ) -> Self {
        self.add_resource(group, version, kind, name, scope);
        self
    }

    /// Serve a resource from now on, e.g. to simulate a CRD installed while
    /// a controller is running.
    pub fn add_resource(&self, group: &str, version: &str, kind: &str, name: &str, scope: Scope) {
        let mut resources = self.resources.lock().expect("resource table poisoned");
        resources
            .entry(GroupVersion::new(group, version))
            .or_default()
            .push(ApiResourceInfo::new(kind, name, scope));
    }

    /// Stop serving a kind.
    pub fn remove_resource(&self, group: &str, version: &str, kind: &str) {
        let mut resources = self.resources.lock().expect("resource table poisoned");
        if let Some(list) = resources.get_mut(&GroupVersion::new(group, version)) {
            list.retain(|r| r.kind != kind);
        }
    }

    /// Delay every fetch by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock().expect("latency poisoned") = latency;
    }

    /// Make every fetch fail with a transport error while `failing` is set.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Total fetches performed, including failed ones.
    pub fn fetch_count(&self) -> u64 {
        self.total_fetches.load(Ordering::SeqCst)
    }

    /// Fetches performed for one group/version.
    pub fn fetch_count_for(&self, group_version: &GroupVersion) -> u64 {
        self.fetches
            .lock()
            .expect("fetch counters poisoned")
            .get(group_version)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl DiscoveryTransport for StaticDiscovery {
    async fn list_resources_for(
        &self,
        group_version: &GroupVersion,
    ) -> Result<Vec<ApiResourceInfo>> {
        self.total_fetches.fetch_add(1, Ordering::SeqCst);
        *self
            .fetches
            .lock()
            .expect("fetch counters poisoned")
            .entry(group_version.clone())
            .or_default() += 1;

        let latency = *self.latency.lock().expect("latency poisoned");
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(MapperError::transport_msg(format!(
                "discovery unavailable for {group_version}"
            )));
        }

        let resources = self.resources.lock().expect("resource table poisoned");
        Ok(resources.get(group_version).cloned().unwrap_or_default())
    }
}
