//! # restmap
//!
//! Discovery-backed REST mapping for Kubernetes controllers.
//!
//! Controllers need to turn a group/kind plus acceptable versions into the
//! resource path to talk to. This crate answers that from a lazily
//! populated cache of per-group/version discovery results:
//!
//! - Only the group/versions a caller asks about are ever fetched
//! - A kind missing from a cached entry triggers exactly one refetch, so
//!   newly installed CRDs are picked up without restarts
//! - Concurrent lookups of one group/version share a single fetch
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use restmap::prelude::*;
//! use std::sync::Arc;
//!
//! // Create a cache over the cluster's discovery API
//! let cache = Arc::new(DiscoveryCache::new(KubeDiscovery::try_default().await?));
//!
//! // Resolve a kind, falling back from v1beta1 to v1
//! let mapper = ControllerRestMapper::new(cache);
//! let mapping = mapper
//!     .resolve(&GroupKind::new("apps", "Deployment"), &["v1beta1", "v1"])
//!     .await?;
//! assert_eq!(mapping.resource().resource(), "deployments");
//! ```
//!
//! ## Architecture
//!
//! This library is organized into several crates:
//!
//! - `restmap-core` - Core types, traits, and error handling
//! - `restmap-cache` - Mapping cache and controller resolver
//! - `restmap-kube` - Kubernetes discovery transport and manifest applier
//!
//! This crate (`restmap`) re-exports all public APIs for convenience.
//!
//! ## Design Principles
//!
//! 1. **No panics in library code** - All errors are returned as `Result`
//! 2. **No locks held across await points** - Uses DashMap and careful design
//! 3. **Declared capabilities** - Unsupported operations fail with a fixed error
//! 4. **Observable** - Built-in statistics and tracing support
//!
//! ## Features
//!
//! - `kube` - Kubernetes transport and applier (default)

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

// Re-export all sub-crates
pub use restmap_cache as cache;
pub use restmap_core as core;
#[cfg(feature = "kube")]
#[cfg_attr(docsrs, doc(cfg(feature = "kube")))]
pub use restmap_kube as kube;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use restmap::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use restmap_core::{
        ApiResourceInfo, CancelHandle, Capabilities, DiscoveryTransport, FetchContext, GroupKind,
        GroupVersion, GroupVersionKind, GroupVersionResource, MapperError, Operation, RestMapper,
        RestMapping, Scope, SharedTransport,
    };

    // Cache types
    pub use restmap_cache::{
        CacheBuilder, CacheConfig, CacheStats, ControllerRestMapper, DiscoveryCache,
        GroupVersionEntry,
    };

    // Kubernetes types
    #[cfg(feature = "kube")]
    pub use restmap_kube::{
        parse_manifest, plan, Applier, ApplierOptions, DirectApplier, KubeDiscovery,
        ManifestObject, PlannedObject,
    };
}

/// Version information for this crate.
pub mod version {
    /// Crate version.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Minimum supported Rust version.
    pub const MSRV: &str = "1.75";

    /// Get version info as a string.
    pub fn version_string() -> String {
        format!("restmap {} (MSRV {})", VERSION, MSRV)
    }
}
