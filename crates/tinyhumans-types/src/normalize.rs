//! Ingest input normalization: typed items and loose JSON maps collapse into [`MemoryItem`].

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::dto::{MemoryItem, DEFAULT_NAMESPACE};
use crate::error::{Result, TinyHumansError};
use crate::validate::validate_timestamps;

/// One entry passed to ingest: either a typed item or a loosely-typed JSON map.
#[derive(Debug, Clone)]
pub enum IngestItem {
    Typed(MemoryItem),
    Loose(Value),
}

impl From<MemoryItem> for IngestItem {
    fn from(item: MemoryItem) -> Self {
        IngestItem::Typed(item)
    }
}

impl From<Value> for IngestItem {
    fn from(value: Value) -> Self {
        IngestItem::Loose(value)
    }
}

/// Canonical ingest body: `{"items": [...]}`.
#[derive(Debug, Clone, Serialize)]
pub struct IngestPayload {
    pub items: Vec<MemoryItem>,
}

impl MemoryItem {
    /// Build an item from a JSON map with at least `key` and `content`.
    ///
    /// Accepts `created_at`/`createdAt` and `updated_at`/`updatedAt`. A missing
    /// namespace becomes `"default"`.
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| {
            TinyHumansError::invalid(format!(
                "memory item must be a MemoryItem or a JSON object, got {}",
                kind_of(value)
            ))
        })?;

        let key = required_str(map, "key")?;
        let content = required_str(map, "content")?;
        let namespace = match map.get("namespace") {
            None | Some(Value::Null) => DEFAULT_NAMESPACE.to_string(),
            Some(Value::String(ns)) => ns.clone(),
            Some(other) => {
                return Err(TinyHumansError::invalid(format!(
                    "namespace must be a string, got {}",
                    kind_of(other)
                )))
            }
        };
        let metadata = match map.get("metadata") {
            None | Some(Value::Null) => HashMap::new(),
            Some(Value::Object(m)) => m.clone().into_iter().collect(),
            Some(other) => {
                return Err(TinyHumansError::invalid(format!(
                    "metadata must be an object, got {}",
                    kind_of(other)
                )))
            }
        };

        Ok(MemoryItem {
            key,
            content,
            namespace,
            metadata,
            created_at: timestamp(map, "created_at", "createdAt")?,
            updated_at: timestamp(map, "updated_at", "updatedAt")?,
        })
    }
}

impl TryFrom<Value> for MemoryItem {
    type Error = TinyHumansError;

    fn try_from(value: Value) -> Result<Self> {
        MemoryItem::from_value(&value)
    }
}

/// Convert and validate every entry. Fails on an empty sequence or the first bad entry.
pub fn normalize_items<I>(items: I) -> Result<Vec<MemoryItem>>
where
    I: IntoIterator,
    I::Item: Into<IngestItem>,
{
    let mut out = Vec::new();
    for (i, entry) in items.into_iter().enumerate() {
        let item = match entry.into() {
            IngestItem::Typed(item) => item,
            IngestItem::Loose(value) => MemoryItem::from_value(&value)
                .map_err(|e| TinyHumansError::invalid(format!("items[{i}]: {}", strip(e))))?,
        };
        validate_timestamps(item.created_at, item.updated_at)
            .map_err(|e| TinyHumansError::invalid(format!("items[{i}]: {}", strip(e))))?;
        out.push(item);
    }
    if out.is_empty() {
        return Err(TinyHumansError::invalid("items must be a non-empty list"));
    }
    Ok(out)
}

fn strip(e: TinyHumansError) -> String {
    match e {
        TinyHumansError::InvalidArgument(msg) => msg,
        other => other.to_string(),
    }
}

fn required_str(map: &serde_json::Map<String, Value>, field: &str) -> Result<String> {
    match map.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(TinyHumansError::invalid(format!(
            "'{field}' must be a string, got {}",
            kind_of(other)
        ))),
        None => Err(TinyHumansError::invalid(format!(
            "memory item is missing required field '{field}'"
        ))),
    }
}

fn timestamp(
    map: &serde_json::Map<String, Value>,
    snake: &str,
    camel: &str,
) -> Result<Option<f64>> {
    let (name, value) = match (map.get(snake), map.get(camel)) {
        (Some(v), _) if !v.is_null() => (snake, v),
        (_, Some(v)) if !v.is_null() => (camel, v),
        _ => return Ok(None),
    };
    value.as_f64().map(Some).ok_or_else(|| {
        TinyHumansError::invalid(format!(
            "{name} must be a number (Unix timestamp in seconds), got {}",
            kind_of(value)
        ))
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
