//! # restmap-cache
//!
//! Discovery-backed mapping cache for controllers.
//!
//! This crate provides the caching layer between type resolution and the
//! discovery transport:
//!
//! - [`DiscoveryCache`] - DashMap-based concurrent cache of discovery results
//! - [`GroupVersionEntry`] - Immutable enumeration of one group/version
//! - [`ControllerRestMapper`] - Resolver over the cache, supporting only `RESTMapping`
//! - [`CacheStats`] - Hit, miss, fetch, and invalidation counters
//!
//! The same events are exported through the `metrics` facade; see the
//! metric names on [`DiscoveryCache`].
//!
//! ## Key Design Decisions
//!
//! - Uses `DashMap` for concurrent access to the entry table
//! - All `DashMap` references are dropped before any `.await` to prevent deadlocks
//! - Entries are immutable and atomically replaced
//! - A kind missing from a cached entry triggers exactly one refetch
//! - Concurrent fetches of one group/version are coalesced
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use restmap_cache::{ControllerRestMapper, DiscoveryCache};
//! use restmap_core::GroupKind;
//!
//! // Create a cache over a discovery transport
//! let cache = Arc::new(DiscoveryCache::new(transport));
//!
//! // Resolve a kind, preferring v1
//! let mapper = ControllerRestMapper::new(cache);
//! let mapping = mapper
//!     .resolve(&GroupKind::new("apps", "Deployment"), &["v1", "v1beta1"])
//!     .await?;
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod config;
mod controller;
mod entry;
mod metrics;
mod stats;

pub use cache::{CacheBuilder, DiscoveryCache};
pub use config::CacheConfig;
pub use controller::ControllerRestMapper;
pub use entry::GroupVersionEntry;
pub use stats::CacheStats;
