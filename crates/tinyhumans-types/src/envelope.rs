//! Response envelope parsing: `{"data": ...}` on success, `{"error": "..."}` on failure.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Result, TinyHumansError};

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Decode a memory-service response body and unwrap its `data` field.
pub fn parse_envelope<T: DeserializeOwned>(status: u16, body: &str) -> Result<T> {
    let mut payload: Value = serde_json::from_str(body).map_err(|_| TinyHumansError::Transport {
        message: format!("HTTP {status}: non-JSON response"),
        status: Some(status),
        body: body.to_string(),
    })?;

    if !is_success(status) {
        let message = payload
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {status}"));
        return Err(TinyHumansError::Api {
            message,
            status,
            body: payload,
        });
    }

    let data = payload
        .get_mut("data")
        .map(Value::take)
        .ok_or_else(|| TinyHumansError::Transport {
            message: format!("HTTP {status}: response has no 'data' field"),
            status: Some(status),
            body: body.to_string(),
        })?;
    serde_json::from_value(data).map_err(|e| TinyHumansError::Transport {
        message: format!("HTTP {status}: unexpected response shape: {e}"),
        status: Some(status),
        body: body.to_string(),
    })
}
