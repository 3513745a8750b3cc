//! Request and response DTOs for the TinyHumans memory API.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::context::{format_context, truncate_items};

/// Namespace used when an item does not name one.
pub const DEFAULT_NAMESPACE: &str = "default";

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

/// A single memory item to ingest. Upserted by (namespace, key) on the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryItem {
    /// Unique key within the namespace.
    pub key: String,
    pub content: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    /// Unix timestamp in seconds.
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<f64>,
    /// Unix timestamp in seconds.
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<f64>,
}

impl MemoryItem {
    pub fn new(key: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            content: content.into(),
            namespace: default_namespace(),
            metadata: HashMap::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, serde_json::Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Insert a single metadata entry.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_created_at(mut self, ts: f64) -> Self {
        self.created_at = Some(ts);
        self
    }

    pub fn with_updated_at(mut self, ts: f64) -> Self {
        self.updated_at = Some(ts);
        self
    }
}

/// Ingest (upsert) request.
#[derive(Debug, Clone, Default)]
pub struct IngestMemoryRequest {
    pub items: Vec<MemoryItem>,
}

impl IntoIterator for IngestMemoryRequest {
    type Item = MemoryItem;
    type IntoIter = std::vec::IntoIter<MemoryItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Ingest response: per-outcome counts, no per-item detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestMemoryResponse {
    pub ingested: u64,
    pub updated: u64,
    pub errors: u64,
}

impl IngestMemoryResponse {
    pub fn total(&self) -> u64 {
        self.ingested + self.updated + self.errors
    }
}

/// Read filter. All fields empty reads every item of the caller.
#[derive(Debug, Clone, Default)]
pub struct ReadMemoryRequest {
    pub key: Option<String>,
    pub keys: Option<Vec<String>>,
    pub namespace: Option<String>,
}

impl ReadMemoryRequest {
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Default::default()
        }
    }

    pub fn keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: Some(keys.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    pub fn namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            ..Default::default()
        }
    }
}

/// Stored item as returned by the service. Timestamps are opaque server strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadMemoryItem {
    pub key: String,
    pub content: String,
    pub namespace: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    #[serde(rename = "createdAt", default)]
    pub created_at: String,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: String,
}

/// Read response; `count` is the server's count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadMemoryResponse {
    pub items: Vec<ReadMemoryItem>,
    pub count: u64,
}

/// Filters and formatting controls for building an LLM context string.
#[derive(Debug, Clone, Default)]
pub struct GetContextRequest {
    pub key: Option<String>,
    pub keys: Option<Vec<String>>,
    pub namespace: Option<String>,
    /// Client-side cap applied after the server responds.
    pub max_items: Option<usize>,
}

impl GetContextRequest {
    pub fn namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            ..Default::default()
        }
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    /// The read filter part of this request.
    pub fn filter(&self) -> ReadMemoryRequest {
        ReadMemoryRequest {
            key: self.key.clone(),
            keys: self.keys.clone(),
            namespace: self.namespace.clone(),
        }
    }
}

/// Relevance-based retrieval within one namespace.
#[derive(Debug, Clone)]
pub struct RecallMemoryRequest {
    pub namespace: String,
    pub prompt: String,
    /// Result limit; also applied client-side to the returned items.
    pub num_chunks: Option<usize>,
}

impl RecallMemoryRequest {
    pub fn new(namespace: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            prompt: prompt.into(),
            num_chunks: None,
        }
    }

    pub fn with_num_chunks(mut self, num_chunks: usize) -> Self {
        self.num_chunks = Some(num_chunks);
        self
    }
}

/// Formatted context plus the items it was built from. Recomputed on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct GetContextResponse {
    pub context: String,
    pub items: Vec<ReadMemoryItem>,
    pub count: usize,
}

impl GetContextResponse {
    /// Truncate to `max_items` (if any) and format.
    pub fn from_items(items: Vec<ReadMemoryItem>, max_items: Option<usize>) -> Self {
        let items = truncate_items(items, max_items);
        Self {
            context: format_context(&items),
            count: items.len(),
            items,
        }
    }
}

/// Delete target. Exactly one of `key`, `keys`, `delete_all` must select something;
/// `namespace` only scopes it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeleteMemoryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(rename = "deleteAll", skip_serializing_if = "std::ops::Not::not")]
    pub delete_all: bool,
}

impl DeleteMemoryRequest {
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            ..Default::default()
        }
    }

    pub fn keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: Some(keys.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    pub fn all() -> Self {
        Self {
            delete_all: true,
            ..Default::default()
        }
    }

    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// True when a key, a non-empty key set, or delete-all is given.
    pub fn has_target(&self) -> bool {
        let has_key = self.key.as_deref().is_some_and(|k| !k.is_empty());
        let has_keys = self.keys.as_ref().is_some_and(|k| !k.is_empty());
        has_key || has_keys || self.delete_all
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteMemoryResponse {
    pub deleted: u64,
}

/// Reply text from an LLM provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmQueryResponse {
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn memory_item_serializes_wire_shape() {
        let item = MemoryItem::new("k", "c").with_created_at(10.0);
        let v = serde_json::to_value(&item).unwrap();
        assert_eq!(
            v,
            json!({"key": "k", "content": "c", "namespace": "default", "metadata": {}, "createdAt": 10.0})
        );
    }

    #[test]
    fn delete_body_omits_unset_fields() {
        let req = DeleteMemoryRequest::all().in_namespace("p");
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v, json!({"namespace": "p", "deleteAll": true}));

        let v = serde_json::to_value(DeleteMemoryRequest::key("a")).unwrap();
        assert_eq!(v, json!({"key": "a"}));
    }

    #[test]
    fn delete_target_requires_key_keys_or_all() {
        assert!(!DeleteMemoryRequest::default().has_target());
        assert!(!DeleteMemoryRequest::default().in_namespace("p").has_target());
        assert!(!DeleteMemoryRequest::key("").has_target());
        assert!(!DeleteMemoryRequest::keys(Vec::<String>::new()).has_target());
        assert!(DeleteMemoryRequest::key("a").has_target());
        assert!(DeleteMemoryRequest::keys(["a", "b"]).has_target());
        assert!(DeleteMemoryRequest::all().has_target());
    }

    #[test]
    fn read_item_defaults_missing_timestamps() {
        let item: ReadMemoryItem =
            serde_json::from_value(json!({"key": "k", "content": "c", "namespace": "n"})).unwrap();
        assert_eq!(item.created_at, "");
        assert!(item.metadata.is_empty());
    }
}
