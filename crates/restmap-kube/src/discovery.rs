//! Discovery transport backed by a live Kubernetes API server.

use std::fmt;

use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIResourceList;
use kube::Client;
use restmap_core::{ApiResourceInfo, DiscoveryTransport, GroupVersion, MapperError, Result, Scope};
use tracing::debug;

/// A [`DiscoveryTransport`] that enumerates one group/version per request.
///
/// The core group is read from `/api/{version}`, named groups from
/// `/apis/{group}/{version}`. Subresources such as `deployments/status`
/// are not mappable and are dropped.
#[derive(Clone)]
pub struct KubeDiscovery {
    client: Client,
}

impl fmt::Debug for KubeDiscovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KubeDiscovery").finish_non_exhaustive()
    }
}

impl KubeDiscovery {
    /// Wrap an existing client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the local kubeconfig or in-cluster environment.
    pub async fn try_default() -> Result<Self> {
        let client = Client::try_default()
            .await
            .map_err(|e| MapperError::transport("failed to create kubernetes client", e))?;
        Ok(Self::new(client))
    }

    /// Get the underlying client.
    #[inline]
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl DiscoveryTransport for KubeDiscovery {
    async fn list_resources_for(
        &self,
        group_version: &GroupVersion,
    ) -> Result<Vec<ApiResourceInfo>> {
        let list = if group_version.is_core() {
            self.client
                .list_core_api_resources(group_version.version())
                .await
        } else {
            self.client
                .list_api_group_resources(&group_version.api_version())
                .await
        };

        match list {
            Ok(list) => {
                let resources = resources_from_list(list);
                debug!(group_version = %group_version, resources = resources.len(), "listed api resources");
                Ok(resources)
            }
            // An unserved group/version enumerates nothing rather than failing.
            Err(kube::Error::Api(response)) if response.code == 404 => {
                debug!(group_version = %group_version, "group/version not served");
                Ok(Vec::new())
            }
            Err(err) => Err(MapperError::transport(
                format!("failed to list resources for {group_version}"),
                err,
            )),
        }
    }
}

/// Convert a discovery document into mappable resources, preserving order.
pub(crate) fn resources_from_list(list: APIResourceList) -> Vec<ApiResourceInfo> {
    list.resources
        .into_iter()
        .filter(|r| !r.name.contains('/'))
        .map(|r| ApiResourceInfo::new(r.kind, r.name, Scope::from_namespaced(r.namespaced)))
        .collect()
}
