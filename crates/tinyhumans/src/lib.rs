//! TinyHumans memory SDK.
//!
//! ```no_run
//! use tinyhumans::{ClientConfig, GetContextRequest, MemoryClient, MemoryItem};
//!
//! # async fn run() -> tinyhumans::Result<()> {
//! let client = MemoryClient::new(ClientConfig::new("token").with_model_id("neocortex-mk1"))?;
//! client
//!     .ingest_memory([MemoryItem::new("theme", "User prefers dark mode").with_namespace("preferences")])
//!     .await?;
//! let ctx = client.get_context(GetContextRequest::namespace("preferences")).await?;
//! println!("{}", ctx.context);
//! # Ok(())
//! # }
//! ```

pub mod blocking;
mod client;
pub mod config;
mod request;

pub use client::{MemoryClient, MEMORY_TIMEOUT};
pub use config::{ClientConfig, BASE_URL_ENV, DEFAULT_BASE_URL};
pub use tinyhumans_llm::{LlmProvider, LlmQuery, SUPPORTED_LLM_PROVIDERS};
pub use tinyhumans_types::*;
