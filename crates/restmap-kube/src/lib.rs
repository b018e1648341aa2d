//! # restmap-kube
//!
//! Kubernetes integration for restmap.
//!
//! - [`KubeDiscovery`] - [`DiscoveryTransport`](restmap_core::DiscoveryTransport)
//!   over a `kube` client, one request per group/version
//! - [`parse_manifest`] - Multi-document YAML manifest parsing
//! - [`plan`] / [`DirectApplier`] - Resolve manifest objects through a
//!   [`RestMapper`](restmap_core::RestMapper) and server-side apply them
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use restmap_cache::{ControllerRestMapper, DiscoveryCache};
//! use restmap_kube::{Applier, ApplierOptions, DirectApplier, KubeDiscovery};
//!
//! let discovery = KubeDiscovery::try_default().await?;
//! let client = discovery.client().clone();
//! let cache = Arc::new(DiscoveryCache::new(discovery));
//! let mapper = Arc::new(ControllerRestMapper::new(cache));
//!
//! let applier = DirectApplier::new(client, mapper);
//! applier
//!     .apply(&ApplierOptions::new(manifest).namespace("team-a"))
//!     .await?;
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod applier;
mod discovery;
mod manifest;
#[cfg(test)]
mod mock;

pub use applier::{plan, Applier, ApplierOptions, DirectApplier, PlannedObject, DEFAULT_FIELD_MANAGER};
pub use discovery::KubeDiscovery;
pub use manifest::{parse_manifest, ManifestObject};
