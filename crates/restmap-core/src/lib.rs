//! # restmap-core
//!
//! Core types, traits, and error handling for discovery-backed REST mapping.
//!
//! This crate provides the foundational types used across all other restmap crates:
//!
//! - [`MapperError`] - Error taxonomy separating transport failures from negative results
//! - [`GroupVersion`], [`GroupKind`], [`GroupVersionKind`], [`GroupVersionResource`] - API type identifiers
//! - [`RestMapping`] - Resolved pairing of a kind to its resource and [`Scope`]
//! - [`DiscoveryTransport`] - Trait for enumerating the resources served for one group/version
//! - [`RestMapper`] - Capability-set interface for type mapping, see [`Capabilities`]
//! - [`FetchContext`] - Deadline and cancellation carried into discovery fetches
//!
//! ## Example
//!
//! ```rust
//! use restmap_core::{GroupVersion, GroupVersionKind};
//!
//! let gv = GroupVersion::parse_api_version("apps/v1");
//! assert_eq!(gv.group(), "apps");
//!
//! let gvk = gv.with_kind("Deployment");
//! assert_eq!(gvk, GroupVersionKind::new("apps", "v1", "Deployment"));
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod capability;
mod context;
mod discovery;
mod error;
mod group_version;
mod mapping;

#[cfg(any(test, feature = "test-fixture"))]
pub mod fixture;

pub use capability::{Capabilities, Operation, RestMapper};
pub use context::{CancelHandle, FetchContext};
pub use discovery::{ApiResourceInfo, DiscoveryTransport, SharedTransport};
pub use error::MapperError;
pub use group_version::{GroupKind, GroupVersion, GroupVersionKind, GroupVersionResource};
pub use mapping::{RestMapping, Scope};

/// Result type alias using [`MapperError`].
pub type Result<T> = std::result::Result<T, MapperError>;
