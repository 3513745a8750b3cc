//! Provider-agnostic LLM query.

use std::fmt;

use tinyhumans_types::{Result, TinyHumansError};

/// A prompt to run through an LLM provider.
#[derive(Clone)]
pub struct LlmQuery {
    pub prompt: String,
    /// `openai`, `anthropic` or `google`; ignored when `url` is set.
    pub provider: String,
    pub model: String,
    /// Provider API key (not the TinyHumans token).
    pub api_key: String,
    /// Injected as system/context text when non-empty.
    pub context: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    /// Custom OpenAI-compatible endpoint.
    pub url: Option<String>,
}

impl LlmQuery {
    pub fn new(
        provider: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            provider: provider.into(),
            model: model.into(),
            api_key: api_key.into(),
            context: String::new(),
            max_tokens: None,
            temperature: None,
            url: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Trimmed API key; empty is an error.
    pub(crate) fn checked_api_key(&self) -> Result<&str> {
        let key = self.api_key.trim();
        if key.is_empty() {
            return Err(TinyHumansError::invalid("api_key is required for query_llm"));
        }
        Ok(key)
    }
}

impl fmt::Debug for LlmQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmQuery")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("url", &self.url)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}
