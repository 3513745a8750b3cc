//! Demo: ingest a preference, build a context from it, optionally ask an LLM about it.
//!
//! Needs `TINYHUMANS_TOKEN`; `TINYHUMANS_MODEL_ID` and `TINYHUMANS_BASE_URL` are optional.
//! Set `OPENAI_API_KEY` to run the LLM step.

use std::time::{SystemTime, UNIX_EPOCH};

use tinyhumans::{GetContextRequest, LlmQuery, MemoryClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let client = MemoryClient::from_env()?;
    tracing::info!(base_url = client.base_url(), "connected");

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs_f64();
    let result = client
        .ingest_memory([serde_json::json!({
            "key": "user-preference-theme",
            "content": "User prefers dark mode",
            "namespace": "preferences",
            "metadata": {"source": "onboarding"},
            "created_at": now,
            "updated_at": now,
        })])
        .await?;
    tracing::info!(
        ingested = result.ingested,
        updated = result.updated,
        errors = result.errors,
        "ingest finished"
    );

    let ctx = client
        .get_context(GetContextRequest::namespace("preferences"))
        .await?;
    println!("{}", ctx.context);

    if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
        let query = LlmQuery::new(
            "openai",
            "gpt-4o-mini",
            api_key,
            "What is the user's preference for theme?",
        )
        .with_context(ctx.context);
        let reply = client.query_llm(&query).await?;
        println!("{}", reply.text);
    }

    client.close();
    Ok(())
}
