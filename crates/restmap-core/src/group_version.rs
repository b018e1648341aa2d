//! API type identifiers.
//!
//! The types in this module identify an API type or resource collection by
//! group and version. The core group is represented by the empty string,
//! which renders as a bare version in `apiVersion` form (`"v1"` rather than
//! `"/v1"`).

use std::fmt;

/// An API group at a specific version, e.g. `apps/v1`.
///
/// This is the key discovery is anchored on: the cache fetches and stores
/// one enumeration per `GroupVersion`.
///
/// # Example
///
/// ```rust
/// use restmap_core::GroupVersion;
///
/// let core = GroupVersion::parse_api_version("v1");
/// assert!(core.is_core());
/// assert_eq!(core.api_version(), "v1");
///
/// let apps = GroupVersion::new("apps", "v1");
/// assert_eq!(apps.to_string(), "apps/v1");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupVersion {
    group: String,
    version: String,
}

impl GroupVersion {
    /// Create a group/version pair. Use `""` for the core group.
    #[must_use]
    pub fn new(group: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
        }
    }

    /// Parse an `apiVersion` string as found in object manifests.
    ///
    /// `"apps/v1"` yields group `apps`, `"v1"` yields the core group.
    #[must_use]
    pub fn parse_api_version(api_version: &str) -> Self {
        match api_version.split_once('/') {
            Some((group, version)) => Self::new(group, version),
            None => Self::new("", api_version),
        }
    }

    /// The API group. Empty for the core group.
    #[inline]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// The API version.
    #[inline]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Whether this is the core (legacy, unnamed) group.
    #[inline]
    pub fn is_core(&self) -> bool {
        self.group.is_empty()
    }

    /// Render in `apiVersion` form.
    pub fn api_version(&self) -> String {
        self.to_string()
    }

    /// Qualify a kind with this group/version.
    #[must_use]
    pub fn with_kind(&self, kind: impl Into<String>) -> GroupVersionKind {
        GroupVersionKind::new(self.group.clone(), self.version.clone(), kind)
    }

    /// Qualify a resource name with this group/version.
    #[must_use]
    pub fn with_resource(&self, resource: impl Into<String>) -> GroupVersionResource {
        GroupVersionResource::new(self.group.clone(), self.version.clone(), resource)
    }
}

impl fmt::Display for GroupVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}", self.version)
        } else {
            write!(f, "{}/{}", self.group, self.version)
        }
    }
}

/// An API group and kind with no version, e.g. `apps, Kind=Deployment`.
///
/// This is what callers hold when they know what type they want but accept
/// several versions of it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKind {
    group: String,
    kind: String,
}

impl GroupKind {
    /// Create a group/kind pair. Use `""` for the core group.
    #[must_use]
    pub fn new(group: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            kind: kind.into(),
        }
    }

    /// The API group.
    #[inline]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// The kind name.
    #[inline]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Pin this group/kind to a version.
    #[must_use]
    pub fn with_version(&self, version: impl Into<String>) -> GroupVersionKind {
        GroupVersionKind::new(self.group.clone(), version, self.kind.clone())
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}.{}", self.kind, self.group)
        }
    }
}

/// One API type at one version.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupVersionKind {
    group: String,
    version: String,
    kind: String,
}

impl GroupVersionKind {
    /// Create a fully qualified type reference.
    #[must_use]
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
        }
    }

    /// The API group.
    #[inline]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// The API version.
    #[inline]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The kind name.
    #[inline]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The group/version half of this reference.
    pub fn group_version(&self) -> GroupVersion {
        GroupVersion::new(self.group.clone(), self.version.clone())
    }

    /// The group/kind half of this reference.
    pub fn group_kind(&self) -> GroupKind {
        GroupKind::new(self.group.clone(), self.kind.clone())
    }
}

impl fmt::Display for GroupVersionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Kind={}", self.group_version(), self.kind)
    }
}

/// A resource collection at one version, e.g. `apps/v1, Resource=deployments`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupVersionResource {
    group: String,
    version: String,
    resource: String,
}

impl GroupVersionResource {
    /// Create a fully qualified resource reference.
    #[must_use]
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            resource: resource.into(),
        }
    }

    /// The API group.
    #[inline]
    pub fn group(&self) -> &str {
        &self.group
    }

    /// The API version.
    #[inline]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The plural, lowercase collection name.
    #[inline]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The group/version half of this reference.
    pub fn group_version(&self) -> GroupVersion {
        GroupVersion::new(self.group.clone(), self.version.clone())
    }
}

impl fmt::Display for GroupVersionResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, Resource={}", self.group_version(), self.resource)
    }
}
