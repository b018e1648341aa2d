//! The type-mapping interface and its capability set.
//!
//! [`RestMapper`] models the whole type-mapping surface. Implementations
//! declare which [`Operation`]s they support through [`Capabilities`];
//! every operation left at its default implementation fails with
//! [`MapperError::Unsupported`].

use std::fmt;

use async_trait::async_trait;

use crate::{
    GroupKind, GroupVersionKind, GroupVersionResource, MapperError, RestMapping, Result,
};

/// One operation of the [`RestMapper`] interface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Resource to single kind.
    KindFor,
    /// Resource to candidate kinds.
    KindsFor,
    /// Partial resource to single resource.
    ResourceFor,
    /// Partial resource to candidate resources.
    ResourcesFor,
    /// Group/kind plus versions to the preferred mapping.
    RestMapping,
    /// Group/kind to every mapping.
    RestMappings,
    /// Plural resource name to singular.
    ResourceSingularizer,
}

impl Operation {
    /// Every operation, in declaration order.
    pub const ALL: [Operation; 7] = [
        Operation::KindFor,
        Operation::KindsFor,
        Operation::ResourceFor,
        Operation::ResourcesFor,
        Operation::RestMapping,
        Operation::RestMappings,
        Operation::ResourceSingularizer,
    ];

    /// Operation name as used in error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KindFor => "KindFor",
            Self::KindsFor => "KindsFor",
            Self::ResourceFor => "ResourceFor",
            Self::ResourcesFor => "ResourcesFor",
            Self::RestMapping => "RESTMapping",
            Self::RestMappings => "RESTMappings",
            Self::ResourceSingularizer => "ResourceSingularizer",
        }
    }

    #[inline]
    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of [`Operation`]s a mapper implements.
///
/// # Example
///
/// ```rust
/// use restmap_core::{Capabilities, Operation};
///
/// let caps = Capabilities::only(&[Operation::RestMapping]);
/// assert!(caps.supports(Operation::RestMapping));
/// assert!(!caps.supports(Operation::KindFor));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capabilities(u8);

impl Capabilities {
    /// No operations.
    pub const fn none() -> Self {
        Self(0)
    }

    /// Every operation.
    pub fn all() -> Self {
        Self::only(&Operation::ALL)
    }

    /// Exactly the listed operations.
    pub fn only(operations: &[Operation]) -> Self {
        operations
            .iter()
            .fold(Self::none(), |caps, op| caps.with(*op))
    }

    /// Add one operation.
    #[must_use]
    pub fn with(self, operation: Operation) -> Self {
        Self(self.0 | operation.bit())
    }

    /// Whether `operation` is in the set.
    #[inline]
    pub fn supports(&self, operation: Operation) -> bool {
        self.0 & operation.bit() != 0
    }

    /// Iterate the supported operations.
    pub fn iter(&self) -> impl Iterator<Item = Operation> + '_ {
        Operation::ALL.into_iter().filter(|op| self.supports(*op))
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Resolves API types to the resource collections serving them.
///
/// Implementations override the operations named by
/// [`capabilities`](RestMapper::capabilities) and leave the rest at their
/// defaults, which fail with [`MapperError::Unsupported`] for any input.
#[async_trait]
pub trait RestMapper: Send + Sync {
    /// Operations this mapper implements. Fixed for the mapper's lifetime.
    fn capabilities(&self) -> Capabilities;

    /// Whether `operation` is implemented.
    fn supports(&self, operation: Operation) -> bool {
        self.capabilities().supports(operation)
    }

    /// Resolve a (possibly partial) resource to its single kind.
    async fn kind_for(&self, _resource: &GroupVersionResource) -> Result<GroupVersionKind> {
        Err(MapperError::unsupported(Operation::KindFor))
    }

    /// Resolve a (possibly partial) resource to candidate kinds in priority order.
    async fn kinds_for(&self, _resource: &GroupVersionResource) -> Result<Vec<GroupVersionKind>> {
        Err(MapperError::unsupported(Operation::KindsFor))
    }

    /// Complete a partial resource to its single match.
    async fn resource_for(&self, _input: &GroupVersionResource) -> Result<GroupVersionResource> {
        Err(MapperError::unsupported(Operation::ResourceFor))
    }

    /// Complete a partial resource to candidates in priority order.
    async fn resources_for(
        &self,
        _input: &GroupVersionResource,
    ) -> Result<Vec<GroupVersionResource>> {
        Err(MapperError::unsupported(Operation::ResourcesFor))
    }

    /// Resolve a group/kind to its preferred mapping among `versions`,
    /// tried in order.
    async fn rest_mapping(&self, _group_kind: &GroupKind, _versions: &[String]) -> Result<RestMapping> {
        Err(MapperError::unsupported(Operation::RestMapping))
    }

    /// Resolve a group/kind to every mapping among `versions`.
    async fn rest_mappings(
        &self,
        _group_kind: &GroupKind,
        _versions: &[String],
    ) -> Result<Vec<RestMapping>> {
        Err(MapperError::unsupported(Operation::RestMappings))
    }

    /// Convert a plural resource name to its singular form.
    fn resource_singularizer(&self, _resource: &str) -> Result<String> {
        Err(MapperError::unsupported(Operation::ResourceSingularizer))
    }
}
