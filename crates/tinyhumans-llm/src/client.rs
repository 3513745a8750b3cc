//! Async HTTP client for provider chat endpoints.

use std::time::Duration;

use serde_json::Value;
use tinyhumans_types::{LlmQueryResponse, Result, TinyHumansError};
use tracing::{debug, warn};

use crate::provider::{provider_error, LlmProvider, PreparedRequest};
use crate::query::LlmQuery;

/// Per-request timeout for provider calls.
pub const LLM_TIMEOUT: Duration = Duration::from_secs(60);

pub(crate) fn transport(e: reqwest::Error) -> TinyHumansError {
    TinyHumansError::Transport {
        message: e.to_string(),
        status: e.status().map(|s| s.as_u16()),
        body: String::new(),
    }
}

/// Decode a provider response body, mapping failure statuses to API errors.
pub(crate) fn finish(provider: &LlmProvider, status: u16, text: &str) -> Result<LlmQueryResponse> {
    if !(200..300).contains(&status) {
        warn!(provider = provider.display_name(), status, "LLM provider returned error");
        return Err(provider_error(provider, status, text));
    }
    let body: Value = serde_json::from_str(text).map_err(|_| TinyHumansError::Transport {
        message: format!(
            "HTTP {status}: non-JSON response from {}",
            provider.display_name()
        ),
        status: Some(status),
        body: text.to_string(),
    })?;
    let text = provider.extract_text(body)?;
    Ok(LlmQueryResponse { text })
}

/// Reusable async client; one connection pool for all provider calls.
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: reqwest::Client,
}

impl LlmClient {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(LLM_TIMEOUT)
            .build()
            .map_err(transport)?;
        Ok(Self { http })
    }

    /// Run `query` against the provider it resolves to.
    pub async fn query(&self, query: &LlmQuery) -> Result<LlmQueryResponse> {
        let provider = LlmProvider::resolve(&query.provider, query.url.as_deref())?;
        let prepared = provider.prepare(query)?;
        debug!(provider = provider.display_name(), model = %query.model, "querying LLM");
        self.send(&provider, prepared).await
    }

    async fn send(&self, provider: &LlmProvider, req: PreparedRequest) -> Result<LlmQueryResponse> {
        let mut builder = self.http.post(&req.url).json(&req.body);
        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        for (name, value) in &req.headers {
            builder = builder.header(*name, value.clone());
        }
        let res = builder.send().await.map_err(transport)?;
        let status = res.status().as_u16();
        let text = res.text().await.map_err(transport)?;
        finish(provider, status, &text)
    }
}

/// One-shot query with a fresh client.
pub async fn query_llm(query: &LlmQuery) -> Result<LlmQueryResponse> {
    // Fail on arguments before building a client.
    let provider = LlmProvider::resolve(&query.provider, query.url.as_deref())?;
    provider.prepare(query)?;
    LlmClient::new()?.query(query).await
}
