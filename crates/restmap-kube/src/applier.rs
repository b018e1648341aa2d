//! Manifest applier built on the type resolver.
//!
//! Applying a manifest happens in two steps:
//!
//! 1. [`plan`] parses the manifest, resolves every object to its resource
//!    through a [`RestMapper`], and fills in the configured namespace on
//!    namespaced objects that do not carry one.
//! 2. An [`Applier`] sends the planned objects to the cluster.
//!    [`DirectApplier`] uses server-side apply, so diffing and field
//!    ownership are left to the API server.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use kube::api::{Api, ApiResource, DynamicObject, Patch, PatchParams};
use kube::Client;
use restmap_core::{MapperError, RestMapper, RestMapping, Result};
use tracing::{debug, info};

use crate::manifest::{parse_manifest, ManifestObject};

/// Field manager recorded on applied fields unless configured otherwise.
pub const DEFAULT_FIELD_MANAGER: &str = "restmap";

/// Options for one apply.
#[derive(Debug, Clone)]
pub struct ApplierOptions {
    /// Multi-document YAML manifest.
    pub manifest: String,
    /// Namespace for namespaced objects that do not set one.
    pub namespace: Option<String>,
    /// Ask the server to reject unknown or duplicate fields.
    pub validate: bool,
    /// Field manager name for server-side apply.
    pub field_manager: String,
    /// Take ownership of fields managed by someone else.
    pub force: bool,
}

impl Default for ApplierOptions {
    fn default() -> Self {
        Self {
            manifest: String::new(),
            namespace: None,
            validate: false,
            field_manager: DEFAULT_FIELD_MANAGER.to_string(),
            force: false,
        }
    }
}

impl ApplierOptions {
    /// Options for applying `manifest` with defaults for everything else.
    pub fn new(manifest: impl Into<String>) -> Self {
        Self {
            manifest: manifest.into(),
            ..Self::default()
        }
    }

    /// Set the default namespace.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Enable or disable strict server-side field validation.
    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Set the field manager.
    pub fn field_manager(mut self, field_manager: impl Into<String>) -> Self {
        self.field_manager = field_manager.into();
        self
    }

    /// Enable or disable forced field ownership.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

/// An object ready to send, paired with the resource it maps to.
#[derive(Debug, Clone)]
pub struct PlannedObject {
    /// Resolved mapping for the object's declared kind.
    pub mapping: RestMapping,
    /// The object, with its namespace filled in where applicable.
    pub object: ManifestObject,
}

impl fmt::Display for PlannedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.object, self.mapping.resource())
    }
}

/// Resolve every object in `options.manifest` against `mapper`.
///
/// Each object is resolved with its single declared version. Namespaced
/// objects without a namespace get `options.namespace` when one is set;
/// cluster-scoped objects are left untouched. The first failure aborts
/// the plan.
pub async fn plan<M>(mapper: &M, options: &ApplierOptions) -> Result<Vec<PlannedObject>>
where
    M: RestMapper + ?Sized,
{
    let objects = parse_manifest(&options.manifest)?;
    let mut planned = Vec::with_capacity(objects.len());

    for mut object in objects {
        let versions = [object.gvk().version().to_string()];
        let mapping = mapper
            .rest_mapping(&object.gvk().group_kind(), &versions)
            .await?;

        if mapping.scope().is_namespaced() && object.namespace().is_none() {
            if let Some(namespace) = options.namespace.as_deref() {
                object.set_namespace(namespace);
            }
        }

        debug!(object = %object, resource = %mapping.resource(), "planned object");
        planned.push(PlannedObject { mapping, object });
    }

    Ok(planned)
}

/// Sends manifests to a cluster.
#[async_trait]
pub trait Applier: Send + Sync {
    /// Apply every object in `options.manifest`, stopping at the first
    /// failure. Returns the objects that were applied.
    async fn apply(&self, options: &ApplierOptions) -> Result<Vec<PlannedObject>>;
}

/// [`Applier`] using server-side apply through a kube client.
#[derive(Clone)]
pub struct DirectApplier {
    client: Client,
    mapper: Arc<dyn RestMapper>,
}

impl fmt::Debug for DirectApplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectApplier")
            .field("capabilities", &self.mapper.capabilities())
            .finish_non_exhaustive()
    }
}

impl DirectApplier {
    /// Create an applier resolving types through `mapper`.
    pub fn new(client: Client, mapper: Arc<dyn RestMapper>) -> Self {
        Self { client, mapper }
    }

    fn api_for(&self, planned: &PlannedObject) -> Api<DynamicObject> {
        let gvk = planned.mapping.gvk();
        let resource = ApiResource {
            group: gvk.group().to_string(),
            version: gvk.version().to_string(),
            api_version: gvk.group_version().api_version(),
            kind: gvk.kind().to_string(),
            plural: planned.mapping.resource().resource().to_string(),
        };

        if !planned.mapping.scope().is_namespaced() {
            return Api::all_with(self.client.clone(), &resource);
        }
        match planned.object.namespace() {
            Some(namespace) => Api::namespaced_with(self.client.clone(), namespace, &resource),
            None => Api::default_namespaced_with(self.client.clone(), &resource),
        }
    }
}

/// Server-side apply parameters for `options`.
pub(crate) fn patch_params(options: &ApplierOptions) -> PatchParams {
    let mut params = PatchParams::apply(&options.field_manager);
    if options.force {
        params = params.force();
    }
    if options.validate {
        params = params.validation_strict();
    }
    params
}

#[async_trait]
impl Applier for DirectApplier {
    async fn apply(&self, options: &ApplierOptions) -> Result<Vec<PlannedObject>> {
        let planned = plan(self.mapper.as_ref(), options).await?;
        let params = patch_params(options);

        for object in &planned {
            let api = self.api_for(object);
            api.patch(
                object.object.name(),
                &params,
                &Patch::Apply(object.object.object()),
            )
            .await
            .map_err(|e| MapperError::Apply {
                object: object.object.to_string(),
                message: e.to_string(),
                source: Some(Box::new(e)),
            })?;
            info!(object = %object, "applied");
        }

        Ok(planned)
    }
}
