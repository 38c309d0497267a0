//! Kubernetes-style metadata shared by all Anvil CRDs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Object metadata (name, namespace, labels)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    /// Resource name (required)
    pub name: String,

    /// Namespace, defaults to "default" when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Unique identifier assigned by the store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<Uuid>,

    /// Labels for organizing resources
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,

    /// Creation timestamp set by the store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<chrono::DateTime<chrono::Utc>>,
}

impl ObjectMeta {
    /// Create new metadata with just a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a label
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

/// Type metadata identifying the resource kind
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TypeMeta {
    /// API version, e.g. "anvil.dev/v1alpha1"
    pub api_version: String,

    /// Kind, e.g. "Workflow" or "Template"
    pub kind: String,
}

impl TypeMeta {
    fn for_kind(kind: &str) -> Self {
        Self {
            api_version: crate::API_VERSION.to_string(),
            kind: kind.to_string(),
        }
    }

    /// Type metadata for Workflow resources
    pub fn workflow() -> Self {
        Self::for_kind("Workflow")
    }

    /// Type metadata for Template resources
    pub fn template() -> Self {
        Self::for_kind("Template")
    }
}
