//! Pure request construction shared by the async and blocking clients.

use tinyhumans_types::{
    DeleteMemoryRequest, ReadMemoryRequest, RecallMemoryRequest, Result, TinyHumansError,
};

/// Path of the memory resource.
pub(crate) const MEMORY_PATH: &str = "/v1/memory";

/// `key`, repeated `keys[]` and `namespace` parameters; empty values are skipped.
pub(crate) fn read_params(req: &ReadMemoryRequest) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(key) = req.key.as_deref().filter(|k| !k.is_empty()) {
        params.push(("key", key.to_string()));
    }
    for key in req.keys.iter().flatten() {
        params.push(("keys[]", key.clone()));
    }
    if let Some(ns) = req.namespace.as_deref().filter(|n| !n.is_empty()) {
        params.push(("namespace", ns.to_string()));
    }
    params
}

pub(crate) fn recall_params(req: &RecallMemoryRequest) -> Result<Vec<(&'static str, String)>> {
    if req.namespace.trim().is_empty() {
        return Err(TinyHumansError::invalid("namespace is required for recall"));
    }
    if req.prompt.trim().is_empty() {
        return Err(TinyHumansError::invalid("prompt is required for recall"));
    }
    let mut params = vec![
        ("namespace", req.namespace.clone()),
        ("prompt", req.prompt.clone()),
    ];
    if let Some(n) = req.num_chunks {
        params.push(("num_chunks", n.to_string()));
    }
    Ok(params)
}

pub(crate) fn check_delete(req: &DeleteMemoryRequest) -> Result<()> {
    if !req.has_target() {
        return Err(TinyHumansError::invalid(
            "provide \"key\", \"keys\", or set delete_all = true",
        ));
    }
    Ok(())
}
