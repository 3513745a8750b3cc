//! LLM bridge: run a prompt (plus optional memory context) through a third-party provider.
//!
//! Uses the providers' REST APIs directly. The provider API key is the caller's own and is
//! distinct from the TinyHumans token.

pub mod blocking;
mod client;
mod provider;
mod query;

pub use client::{query_llm, LlmClient, LLM_TIMEOUT};
pub use provider::{provider_error, LlmProvider, PreparedRequest, SUPPORTED_LLM_PROVIDERS};
pub use query::LlmQuery;
pub use tinyhumans_types::{LlmQueryResponse, Result, TinyHumansError};
