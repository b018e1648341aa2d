//! ControllerRestMapper: the resolver controllers use.
//!
//! Controllers mostly need one thing from type mapping: turn a group/kind
//! plus acceptable versions into the resource to talk to. This mapper
//! implements exactly that on top of a shared [`DiscoveryCache`] and
//! declares every other [`RestMapper`] operation unsupported.

use std::sync::Arc;

use async_trait::async_trait;
use restmap_core::{
    Capabilities, FetchContext, GroupKind, GroupVersion, MapperError, Operation, RestMapper,
    RestMapping, Result,
};
use tracing::trace;

use crate::cache::DiscoveryCache;

/// A [`RestMapper`] optimized for controllers.
///
/// Results are served from the shared cache and discovery is only ever
/// queried for the exact group/versions callers ask about.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use restmap_cache::{ControllerRestMapper, DiscoveryCache};
/// use restmap_core::GroupKind;
///
/// let cache = Arc::new(DiscoveryCache::new(transport));
/// let mapper = ControllerRestMapper::new(Arc::clone(&cache));
///
/// let mapping = mapper
///     .resolve(&GroupKind::new("apps", "Deployment"), &["v1"])
///     .await?;
/// assert_eq!(mapping.resource().resource(), "deployments");
/// ```
#[derive(Debug, Clone)]
pub struct ControllerRestMapper {
    cache: Arc<DiscoveryCache>,
    capabilities: Capabilities,
}

impl ControllerRestMapper {
    /// Create a mapper over a shared cache.
    pub fn new(cache: Arc<DiscoveryCache>) -> Self {
        Self {
            cache,
            capabilities: Capabilities::only(&[Operation::RestMapping]),
        }
    }

    /// Get the cache backing this mapper.
    #[inline]
    pub fn cache(&self) -> &Arc<DiscoveryCache> {
        &self.cache
    }

    /// Resolve `group_kind` against `versions`, tried in order.
    ///
    /// Returns the first version's mapping that exists. When none does,
    /// returns [`MapperError::NoKindMatch`] listing every version searched.
    /// A transport failure on any version is returned immediately.
    pub async fn resolve<V>(&self, group_kind: &GroupKind, versions: &[V]) -> Result<RestMapping>
    where
        V: AsRef<str> + Sync,
    {
        self.resolve_with(&FetchContext::background(), group_kind, versions)
            .await
    }

    /// [`resolve`](Self::resolve) with discovery fetches bounded by `ctx`.
    pub async fn resolve_with<V>(
        &self,
        ctx: &FetchContext,
        group_kind: &GroupKind,
        versions: &[V],
    ) -> Result<RestMapping>
    where
        V: AsRef<str> + Sync,
    {
        for version in versions {
            let group_version = GroupVersion::new(group_kind.group(), version.as_ref());
            match self
                .cache
                .find_mapping_with(ctx, &group_version, group_kind.kind())
                .await
            {
                Ok(mapping) => return Ok(mapping),
                Err(err) if err.is_not_found() => {
                    trace!(group_version = %group_version, kind = group_kind.kind(), "version did not match");
                }
                Err(err) => return Err(err),
            }
        }

        Err(MapperError::NoKindMatch {
            group_kind: group_kind.clone(),
            searched_versions: versions.iter().map(|v| v.as_ref().to_string()).collect(),
        })
    }
}

#[async_trait]
impl RestMapper for ControllerRestMapper {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    async fn rest_mapping(&self, group_kind: &GroupKind, versions: &[String]) -> Result<RestMapping> {
        self.resolve(group_kind, versions).await
    }
}
