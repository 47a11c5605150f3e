//! # Kubeconfig Document Model
//!
//! This module defines the in-memory representation of a kubeconfig file, used
//! both for each parsed fragment and for the merged result.
//!
//! ## Key Components
//!
//! - **`KubeConfig`**: One document. Holds the three named collections
//!   (`clusters`, `contexts`, `users`), the optional `current-context`, and the
//!   top-level `preferences` mapping.
//!
//! - **`NamedCluster`, `NamedContext`, `NamedUser`**: The collection entries.
//!   Each has a `name`, which is the merge key, and a payload that is carried
//!   through as an opaque `serde_yaml::Value`. Server URLs, certificate data
//!   and credentials are never interpreted by the merge engine.
//!
//! - **`NamedEntry`**: The trait the merge fold is written against, so one
//!   first-wins implementation serves all three collections.
//!
//! Missing or `null` collections deserialize as empty, and `apiVersion`/`kind`
//! default to `v1`/`Config`, so partial fragments are accepted as long as the
//! top level is a mapping and every entry carries a `name`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};

use crate::error::Result;

/// Default `apiVersion` written to merged documents.
pub const API_VERSION: &str = "v1";

/// Default `kind` written to merged documents.
pub const KIND: &str = "Config";

/// A collection entry keyed by its `name`.
pub trait NamedEntry {
    /// The name used for deduplication within the collection.
    fn name(&self) -> &str;
}

/// A named cluster entry (`clusters[]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedCluster {
    pub name: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub cluster: Value,
}

/// A named context entry (`contexts[]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedContext {
    pub name: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub context: Value,
}

/// A named user entry (`users[]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedUser {
    pub name: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub user: Value,
}

impl NamedEntry for NamedCluster {
    fn name(&self) -> &str {
        &self.name
    }
}

impl NamedEntry for NamedContext {
    fn name(&self) -> &str {
        &self.name
    }
}

impl NamedEntry for NamedUser {
    fn name(&self) -> &str {
        &self.name
    }
}

impl NamedContext {
    /// The cluster name this context points at, if the payload names one.
    pub fn cluster_ref(&self) -> Option<&str> {
        self.context.get("cluster").and_then(Value::as_str)
    }

    /// The user name this context points at, if the payload names one.
    pub fn user_ref(&self) -> Option<&str> {
        self.context.get("user").and_then(Value::as_str)
    }
}

/// A kubeconfig document: a parsed fragment or the merged result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KubeConfig {
    #[serde(rename = "apiVersion", default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub clusters: Vec<NamedCluster>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub contexts: Vec<NamedContext>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub users: Vec<NamedUser>,
    /// Empty means no current context is set.
    #[serde(
        rename = "current-context",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub current_context: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Mapping::is_empty"
    )]
    pub preferences: Mapping,
}

impl Default for KubeConfig {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            clusters: Vec::new(),
            contexts: Vec::new(),
            users: Vec::new(),
            current_context: String::new(),
            preferences: Mapping::new(),
        }
    }
}

impl KubeConfig {
    /// True when the document has no entries in any collection.
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty() && self.contexts.is_empty() && self.users.is_empty()
    }

    /// Whether a context with this name is present.
    pub fn has_context(&self, name: &str) -> bool {
        self.contexts.iter().any(|c| c.name == name)
    }

    pub fn has_cluster(&self, name: &str) -> bool {
        self.clusters.iter().any(|c| c.name == name)
    }

    pub fn has_user(&self, name: &str) -> bool {
        self.users.iter().any(|u| u.name == name)
    }

    /// Serialize the document to kubeconfig YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

fn default_api_version() -> String {
    API_VERSION.to_string()
}

fn default_kind() -> String {
    KIND.to_string()
}

/// Treat an explicit `null` (e.g. `users:` with no value) like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
