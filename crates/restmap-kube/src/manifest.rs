//! Multi-document YAML manifest parsing.

use std::fmt;

use restmap_core::{GroupVersion, GroupVersionKind, MapperError, Result};
use serde::Deserialize;
use serde_json::Value;

/// One object from a manifest, with its identity extracted.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestObject {
    gvk: GroupVersionKind,
    name: String,
    object: Value,
}

impl ManifestObject {
    /// Interpret a decoded document as a Kubernetes object.
    ///
    /// The document must be a mapping carrying `apiVersion`, `kind`, and
    /// `metadata.name`.
    pub fn from_value(object: Value) -> Result<Self> {
        if !object.is_object() {
            return Err(MapperError::invalid_manifest("document is not a mapping"));
        }

        let api_version = string_at(&object, "/apiVersion")
            .ok_or_else(|| MapperError::invalid_manifest("object is missing apiVersion"))?;
        let kind = string_at(&object, "/kind").ok_or_else(|| {
            MapperError::invalid_manifest(format!("object of {api_version} is missing kind"))
        })?;
        let name = string_at(&object, "/metadata/name").ok_or_else(|| {
            MapperError::invalid_manifest(format!("{kind} object is missing metadata.name"))
        })?;

        let gvk = GroupVersion::parse_api_version(api_version).with_kind(kind);
        let name = name.to_string();
        Ok(Self { gvk, name, object })
    }

    /// Declared group/version/kind.
    #[inline]
    pub fn gvk(&self) -> &GroupVersionKind {
        &self.gvk
    }

    /// `metadata.name`.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `metadata.namespace`, if set and non-empty.
    pub fn namespace(&self) -> Option<&str> {
        string_at(&self.object, "/metadata/namespace")
    }

    /// Set `metadata.namespace`.
    pub fn set_namespace(&mut self, namespace: &str) {
        if let Some(metadata) = self
            .object
            .get_mut("metadata")
            .and_then(Value::as_object_mut)
        {
            metadata.insert("namespace".to_string(), Value::String(namespace.to_string()));
        }
    }

    /// The full object as decoded.
    #[inline]
    pub fn object(&self) -> &Value {
        &self.object
    }

    /// Consume into the decoded object.
    pub fn into_object(self) -> Value {
        self.object
    }
}

impl fmt::Display for ManifestObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.namespace() {
            Some(ns) => write!(f, "{}/{} {}/{}", self.gvk.group_kind(), self.gvk.version(), ns, self.name),
            None => write!(f, "{}/{} {}", self.gvk.group_kind(), self.gvk.version(), self.name),
        }
    }
}

/// Split a multi-document YAML manifest into objects.
///
/// Empty and `null` documents (a trailing `---`, comment-only documents)
/// are skipped. Any other document that is not a well-formed object fails
/// the whole parse.
///
/// # Example
///
/// ```rust
/// use restmap_kube::parse_manifest;
///
/// let objects = parse_manifest(
///     "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: settings\n---\n",
/// )
/// .unwrap();
/// assert_eq!(objects.len(), 1);
/// assert_eq!(objects[0].gvk().kind(), "ConfigMap");
/// ```
pub fn parse_manifest(manifest: &str) -> Result<Vec<ManifestObject>> {
    let mut objects = Vec::new();

    for (index, document) in serde_yaml::Deserializer::from_str(manifest).enumerate() {
        let value = Value::deserialize(document).map_err(|e| MapperError::InvalidManifest {
            message: format!("document {index} is not valid YAML"),
            source: Some(Box::new(e)),
        })?;
        if value.is_null() {
            continue;
        }
        objects.push(ManifestObject::from_value(value)?);
    }

    Ok(objects)
}

fn string_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
