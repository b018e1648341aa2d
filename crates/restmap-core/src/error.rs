//! Error types for REST mapping operations.
//!
//! This module provides [`MapperError`]. Its variants fall into three
//! classes that callers are expected to treat differently:
//!
//! - transport failures ([`MapperError::TransportError`], [`MapperError::Timeout`],
//!   [`MapperError::Cancelled`]), which mean discovery data could not be
//!   obtained at all;
//! - negative results ([`MapperError::KindNotFound`], [`MapperError::NoKindMatch`]),
//!   which are well-formed answers, not faults;
//! - [`MapperError::Unsupported`], returned by mappers for operations they
//!   declared they do not implement.

use crate::{GroupKind, GroupVersion, Operation};

/// Error type for mapping, discovery, and manifest operations.
///
/// # Example
///
/// ```rust
/// use restmap_core::{GroupKind, MapperError};
///
/// let err = MapperError::NoKindMatch {
///     group_kind: GroupKind::new("apps", "Widget"),
///     searched_versions: vec!["v1".to_string()],
/// };
/// assert!(err.is_no_match());
/// assert!(!err.is_transport());
/// ```
#[derive(Debug, thiserror::Error)]
pub enum MapperError {
    /// The group/version is served but does not contain the kind.
    #[error("kind {kind} not found in {group_version}")]
    KindNotFound {
        /// The group/version that was enumerated.
        group_version: GroupVersion,
        /// The kind that was looked up.
        kind: String,
    },

    /// None of the candidate versions served the group/kind.
    #[error("no matches for kind {group_kind} in versions {searched_versions:?}")]
    NoKindMatch {
        /// The group/kind that was resolved.
        group_kind: GroupKind,
        /// Every version that was probed, in probe order.
        searched_versions: Vec<String>,
    },

    /// Discovery could not be reached or returned a failure.
    #[error("transport error: {message}")]
    TransportError {
        /// Error message.
        message: String,
        /// Optional underlying error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A discovery fetch exceeded its deadline.
    #[error("operation timed out: {operation}")]
    Timeout {
        /// Description of the operation that timed out.
        operation: String,
    },

    /// A discovery fetch was cancelled by the caller.
    #[error("operation cancelled: {operation}")]
    Cancelled {
        /// Description of the operation that was cancelled.
        operation: String,
    },

    /// The mapper does not implement the requested operation.
    #[error("operation {operation} is not supported by this mapper")]
    Unsupported {
        /// The rejected operation.
        operation: Operation,
    },

    /// A manifest document could not be interpreted.
    #[error("invalid manifest: {message}")]
    InvalidManifest {
        /// What was wrong with the manifest.
        message: String,
        /// Optional underlying error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The apply backend rejected an object.
    #[error("failed to apply {object}: {message}")]
    Apply {
        /// Human readable identity of the object.
        object: String,
        /// Error message.
        message: String,
        /// Optional underlying error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl MapperError {
    /// Create a transport error from any error type.
    pub fn transport<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::TransportError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a transport error with no underlying cause.
    pub fn transport_msg(message: impl Into<String>) -> Self {
        Self::TransportError {
            message: message.into(),
            source: None,
        }
    }

    /// Create an invalid manifest error with no underlying cause.
    pub fn invalid_manifest(message: impl Into<String>) -> Self {
        Self::InvalidManifest {
            message: message.into(),
            source: None,
        }
    }

    /// Create the fixed error for an operation a mapper does not support.
    #[inline]
    pub fn unsupported(operation: Operation) -> Self {
        Self::Unsupported { operation }
    }

    /// Whether this is a kind missing from one group/version.
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::KindNotFound { .. })
    }

    /// Whether this is a failed multi-version resolution.
    #[inline]
    pub fn is_no_match(&self) -> bool {
        matches!(self, Self::NoKindMatch { .. })
    }

    /// Whether discovery data could not be obtained.
    #[inline]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::TransportError { .. } | Self::Timeout { .. } | Self::Cancelled { .. }
        )
    }

    /// Whether this is the fixed error of an unsupported operation.
    #[inline]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}
