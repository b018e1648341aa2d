//! Discovery transport abstraction.
//!
//! This module provides the [`DiscoveryTransport`] trait, implemented by
//! anything that can enumerate the resources an API server serves for one
//! group/version, and [`ApiResourceInfo`], the record it returns.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::{GroupVersion, GroupVersionKind, GroupVersionResource, RestMapping, Result, Scope};

/// One resource collection reported by discovery.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiResourceInfo {
    /// Kind of the objects in the collection, e.g. `Deployment`.
    pub kind: String,
    /// Plural collection name, e.g. `deployments`.
    pub name: String,
    /// Scope of the collection.
    pub scope: Scope,
}

impl ApiResourceInfo {
    /// Create a resource record.
    pub fn new(kind: impl Into<String>, name: impl Into<String>, scope: Scope) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            scope,
        }
    }

    /// Shorthand for a namespaced resource.
    pub fn namespaced(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(kind, name, Scope::Namespaced)
    }

    /// Shorthand for a cluster-scoped resource.
    pub fn cluster(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(kind, name, Scope::Cluster)
    }

    /// Qualify this record with the group/version it was enumerated under.
    pub fn to_mapping(&self, group_version: &GroupVersion) -> RestMapping {
        RestMapping::new(
            GroupVersionKind::new(group_version.group(), group_version.version(), &self.kind),
            GroupVersionResource::new(group_version.group(), group_version.version(), &self.name),
            self.scope,
        )
    }
}

impl fmt::Display for ApiResourceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.kind, self.name, self.scope)
    }
}

/// Enumerates the resources served for a group/version.
///
/// Implementations perform the network round trip; callers are expected to
/// cache the result. There is no version-less form: every call is anchored
/// on one group/version.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use restmap_core::{ApiResourceInfo, DiscoveryTransport, GroupVersion, Result};
///
/// struct AppsOnly;
///
/// #[async_trait]
/// impl DiscoveryTransport for AppsOnly {
///     async fn list_resources_for(&self, gv: &GroupVersion) -> Result<Vec<ApiResourceInfo>> {
///         if gv.group() == "apps" && gv.version() == "v1" {
///             Ok(vec![ApiResourceInfo::namespaced("Deployment", "deployments")])
///         } else {
///             Ok(vec![])
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait DiscoveryTransport: Send + Sync {
    /// List the resources served for `group_version`, in server order.
    ///
    /// An unserved group/version may be reported either as an empty list or
    /// as an error; connectivity, authentication, and server failures must
    /// be errors.
    async fn list_resources_for(&self, group_version: &GroupVersion)
        -> Result<Vec<ApiResourceInfo>>;
}

#[async_trait]
impl<T: DiscoveryTransport + ?Sized> DiscoveryTransport for Arc<T> {
    async fn list_resources_for(
        &self,
        group_version: &GroupVersion,
    ) -> Result<Vec<ApiResourceInfo>> {
        (**self).list_resources_for(group_version).await
    }
}

/// Type alias for a shared transport.
pub type SharedTransport = Arc<dyn DiscoveryTransport>;
