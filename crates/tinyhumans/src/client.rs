//! Async client for the TinyHumans memory API.

use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tinyhumans_llm::{LlmClient, LlmQuery};
use tinyhumans_types::{
    normalize_items, parse_envelope, DeleteMemoryRequest, DeleteMemoryResponse,
    GetContextRequest, GetContextResponse, IngestItem, IngestMemoryResponse, IngestPayload,
    LlmQueryResponse, ReadMemoryRequest, ReadMemoryResponse, RecallMemoryRequest, Result,
    TinyHumansError,
};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::request::{check_delete, read_params, recall_params, MEMORY_PATH};

/// Per-request timeout for memory operations.
pub const MEMORY_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn transport(e: reqwest::Error) -> TinyHumansError {
    TinyHumansError::Transport {
        message: e.to_string(),
        status: e.status().map(|s| s.as_u16()),
        body: String::new(),
    }
}

/// Non-blocking memory client. Cheap to clone; clones share one connection pool, which is
/// released once the last clone is closed or dropped.
#[derive(Debug, Clone)]
pub struct MemoryClient {
    http: reqwest::Client,
    base_url: String,
    llm: LlmClient,
}

impl MemoryClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
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

    /// Give up this handle. The pool is freed when the last clone is dropped;
    /// other clones keep working.
    pub fn close(self) {
        drop(self);
    }

    /// Upsert one or more items, deduped server-side by (namespace, key).
    ///
    /// Accepts typed [`MemoryItem`](tinyhumans_types::MemoryItem)s, loose JSON maps, or a mix
    /// via [`IngestItem`]. Nothing is sent if any entry is invalid.
    pub async fn ingest_memory<I>(&self, items: I) -> Result<IngestMemoryResponse>
    where
        I: IntoIterator,
        I::Item: Into<IngestItem>,
    {
        let payload = IngestPayload {
            items: normalize_items(items)?,
        };
        debug!(count = payload.items.len(), "ingesting memory items");
        self.send(Method::POST, &payload).await
    }

    /// Read items by key, keys or namespace; an empty filter reads everything.
    pub async fn read_memory(&self, request: ReadMemoryRequest) -> Result<ReadMemoryResponse> {
        self.get(&read_params(&request)).await
    }

    /// Read items and format them as an LLM context string.
    pub async fn get_context(&self, request: GetContextRequest) -> Result<GetContextResponse> {
        let data: ReadMemoryResponse = self.get(&read_params(&request.filter())).await?;
        Ok(GetContextResponse::from_items(data.items, request.max_items))
    }

    /// Relevance-based retrieval of up to `num_chunks` items for `prompt`.
    pub async fn recall_memory(&self, request: RecallMemoryRequest) -> Result<GetContextResponse> {
        let params = recall_params(&request)?;
        let data: ReadMemoryResponse = self.get(&params).await?;
        Ok(GetContextResponse::from_items(data.items, request.num_chunks))
    }

    pub async fn delete_memory(&self, request: DeleteMemoryRequest) -> Result<DeleteMemoryResponse> {
        check_delete(&request)?;
        self.send(Method::DELETE, &request).await
    }

    /// Run a prompt through a third-party LLM with the caller's own provider key.
    pub async fn query_llm(&self, query: &LlmQuery) -> Result<LlmQueryResponse> {
        self.llm.query(query).await
    }

    async fn get<T: DeserializeOwned>(&self, params: &[(&'static str, String)]) -> Result<T> {
        debug!(path = MEMORY_PATH, params = params.len(), "GET memory");
        let res = self
            .http
            .get(format!("{}{MEMORY_PATH}", self.base_url))
            .query(params)
            .send()
            .await
            .map_err(transport)?;
        parse(res).await
    }

    async fn send<B: Serialize, T: DeserializeOwned>(&self, method: Method, body: &B) -> Result<T> {
        debug!(%method, path = MEMORY_PATH, "sending memory request");
        let res = self
            .http
            .request(method, format!("{}{MEMORY_PATH}", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(transport)?;
        parse(res).await
    }
}

async fn parse<T: DeserializeOwned>(res: reqwest::Response) -> Result<T> {
    let status = res.status().as_u16();
    let text = res.text().await.map_err(transport)?;
    let parsed = parse_envelope(status, &text);
    if let Err(e) = &parsed {
        warn!(status, error = %e, "memory request failed");
    }
    parsed
}
