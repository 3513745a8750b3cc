//! Blocking variant of the LLM bridge, for callers without an async runtime.

use tinyhumans_types::{LlmQueryResponse, Result};
use tracing::debug;

use crate::client::{finish, transport, LLM_TIMEOUT};
use crate::provider::LlmProvider;
use crate::query::LlmQuery;

#[derive(Debug, Clone)]
pub struct LlmClient {
    http: reqwest::blocking::Client,
}

impl LlmClient {
    pub fn new() -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(LLM_TIMEOUT)
            .build()
            .map_err(transport)?;
        Ok(Self { http })
    }

    pub fn query(&self, query: &LlmQuery) -> Result<LlmQueryResponse> {
        let provider = LlmProvider::resolve(&query.provider, query.url.as_deref())?;
        let req = provider.prepare(query)?;
        debug!(provider = provider.display_name(), model = %query.model, "querying LLM");

        let mut builder = self.http.post(&req.url).json(&req.body);
        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        for (name, value) in &req.headers {
            builder = builder.header(*name, value.clone());
        }
        let res = builder.send().map_err(transport)?;
        let status = res.status().as_u16();
        let text = res.text().map_err(transport)?;
        finish(&provider, status, &text)
    }
}

pub fn query_llm(query: &LlmQuery) -> Result<LlmQueryResponse> {
    let provider = LlmProvider::resolve(&query.provider, query.url.as_deref())?;
    provider.prepare(query)?;
    LlmClient::new()?.query(query)
}
