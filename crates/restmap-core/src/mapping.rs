//! Resolved type mappings.

use std::fmt;

use crate::{GroupVersionKind, GroupVersionResource};

/// Whether instances of a type live inside a namespace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Objects belong to a namespace.
    Namespaced,
    /// Objects are cluster-global.
    Cluster,
}

impl Scope {
    /// Map the `namespaced` flag reported by discovery.
    #[inline]
    pub fn from_namespaced(namespaced: bool) -> Self {
        if namespaced {
            Self::Namespaced
        } else {
            Self::Cluster
        }
    }

    /// Whether this is [`Scope::Namespaced`].
    #[inline]
    pub fn is_namespaced(&self) -> bool {
        matches!(self, Self::Namespaced)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Namespaced => write!(f, "namespace"),
            Self::Cluster => write!(f, "root"),
        }
    }
}

/// The resolved pairing of a type to the resource collection serving it.
///
/// This is the value handed back to callers; it is never mutated after
/// discovery produced it.
///
/// # Example
///
/// ```rust
/// use restmap_core::{GroupVersionKind, GroupVersionResource, RestMapping, Scope};
///
/// let mapping = RestMapping::new(
///     GroupVersionKind::new("apps", "v1", "Deployment"),
///     GroupVersionResource::new("apps", "v1", "deployments"),
///     Scope::Namespaced,
/// );
/// assert_eq!(mapping.resource().resource(), "deployments");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RestMapping {
    gvk: GroupVersionKind,
    resource: GroupVersionResource,
    scope: Scope,
}

impl RestMapping {
    /// Create a mapping.
    #[must_use]
    pub fn new(gvk: GroupVersionKind, resource: GroupVersionResource, scope: Scope) -> Self {
        Self {
            gvk,
            resource,
            scope,
        }
    }

    /// The mapped type.
    #[inline]
    pub fn gvk(&self) -> &GroupVersionKind {
        &self.gvk
    }

    /// The resource collection serving the type.
    #[inline]
    pub fn resource(&self) -> &GroupVersionResource {
        &self.resource
    }

    /// Scope of the resource.
    #[inline]
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Shorthand for `self.gvk().kind()`.
    #[inline]
    pub fn kind(&self) -> &str {
        self.gvk.kind()
    }
}

impl fmt::Display for RestMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.gvk, self.resource, self.scope)
    }
}
