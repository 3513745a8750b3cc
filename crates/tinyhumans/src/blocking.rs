//! Blocking memory client, same contract as [`crate::MemoryClient`].
//!
//! Must not be used from inside an async runtime thread; use the async client there.

use reqwest::blocking::Response;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tinyhumans_llm::blocking::LlmClient;
use tinyhumans_llm::LlmQuery;
use tinyhumans_types::{
    normalize_items, parse_envelope, DeleteMemoryRequest, DeleteMemoryResponse,
    GetContextRequest, GetContextResponse, IngestItem, IngestMemoryResponse, IngestPayload,
    LlmQueryResponse, ReadMemoryRequest, ReadMemoryResponse, RecallMemoryRequest, Result,
};
use tracing::{debug, warn};

use crate::client::{transport, MEMORY_TIMEOUT};
use crate::config::ClientConfig;
use crate::request::{check_delete, read_params, recall_params, MEMORY_PATH};

/// Blocking memory client. Clones share one connection pool.
#[derive(Debug, Clone)]
pub struct MemoryClient {
    http: reqwest::blocking::Client,
    base_url: String,
    llm: LlmClient,
}

impl MemoryClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let http = reqwest::blocking::Client::builder()
            .default_headers(config.default_headers()?)
            .timeout(MEMORY_TIMEOUT)
            .build()
            .map_err(transport)?;
        Ok(Self {
            http,
            base_url: config.resolve_base_url(),
            llm: LlmClient::new()?,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Give up this handle; the pool goes with the last clone.
    pub fn close(self) {
        drop(self);
    }

    pub fn ingest_memory<I>(&self, items: I) -> Result<IngestMemoryResponse>
    where
        I: IntoIterator,
        I::Item: Into<IngestItem>,
    {
        let payload = IngestPayload {
            items: normalize_items(items)?,
        };
        debug!(count = payload.items.len(), "ingesting memory items");
        self.send(Method::POST, &payload)
    }

    pub fn read_memory(&self, request: ReadMemoryRequest) -> Result<ReadMemoryResponse> {
        self.get(&read_params(&request))
    }

    pub fn get_context(&self, request: GetContextRequest) -> Result<GetContextResponse> {
        let data: ReadMemoryResponse = self.get(&read_params(&request.filter()))?;
        Ok(GetContextResponse::from_items(data.items, request.max_items))
    }

    pub fn recall_memory(&self, request: RecallMemoryRequest) -> Result<GetContextResponse> {
        let params = recall_params(&request)?;
        let data: ReadMemoryResponse = self.get(&params)?;
        Ok(GetContextResponse::from_items(data.items, request.num_chunks))
    }

    pub fn delete_memory(&self, request: DeleteMemoryRequest) -> Result<DeleteMemoryResponse> {
        check_delete(&request)?;
        self.send(Method::DELETE, &request)
    }

    pub fn query_llm(&self, query: &LlmQuery) -> Result<LlmQueryResponse> {
        self.llm.query(query)
    }

    fn get<T: DeserializeOwned>(&self, params: &[(&'static str, String)]) -> Result<T> {
        debug!(path = MEMORY_PATH, params = params.len(), "GET memory");
        let res = self
            .http
            .get(format!("{}{MEMORY_PATH}", self.base_url))
            .query(params)
            .send()
            .map_err(transport)?;
        parse(res)
    }

    fn send<B: Serialize, T: DeserializeOwned>(&self, method: Method, body: &B) -> Result<T> {
        debug!(%method, path = MEMORY_PATH, "sending memory request");
        let res = self
            .http
            .request(method, format!("{}{MEMORY_PATH}", self.base_url))
            .json(body)
            .send()
            .map_err(transport)?;
        parse(res)
    }
}

fn parse<T: DeserializeOwned>(res: Response) -> Result<T> {
    let status = res.status().as_u16();
    let text = res.text().map_err(transport)?;
    let parsed = parse_envelope(status, &text);
    if let Err(e) = &parsed {
        warn!(status, error = %e, "memory request failed");
    }
    parsed
}
