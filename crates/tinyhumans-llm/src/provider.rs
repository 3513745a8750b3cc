//! Provider wire formats: request shaping and reply extraction per provider.

use reqwest::header::HeaderValue;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tinyhumans_types::{Result, TinyHumansError};

use crate::query::LlmQuery;

/// Built-in provider tags accepted when no custom URL is given.
pub const SUPPORTED_LLM_PROVIDERS: [&str; 3] = ["openai", "anthropic", "google"];

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const ANTHROPIC_DEFAULT_MAX_TOKENS: u32 = 1024;
const GOOGLE_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Closed set of supported wire formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAi,
    Anthropic,
    Google,
    /// Any endpoint speaking the OpenAI chat-completions shape.
    Custom { url: String },
}

/// Everything needed to send one provider request.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub url: String,
    /// Query-string parameters (Google carries its key here).
    pub query: Vec<(&'static str, String)>,
    pub headers: Vec<(&'static str, HeaderValue)>,
    pub body: Value,
}

// OpenAI / custom

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

// Anthropic

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicBlock>,
}

#[derive(Debug, Deserialize)]
struct AnthropicBlock {
    text: String,
}

// Google (Gemini)

#[derive(Debug, Serialize, Deserialize)]
struct GooglePart {
    text: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct GoogleContent {
    parts: Vec<GooglePart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GoogleRequest {
    contents: Vec<GoogleContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    candidates: Vec<GoogleCandidate>,
}

#[derive(Debug, Deserialize)]
struct GoogleCandidate {
    content: GoogleContent,
}

impl LlmProvider {
    /// Pick the wire format: a custom `url` always wins, otherwise the tag must be built-in.
    pub fn resolve(provider: &str, url: Option<&str>) -> Result<Self> {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            return Ok(LlmProvider::Custom {
                url: url.trim().to_string(),
            });
        }
        match provider.trim().to_lowercase().as_str() {
            "openai" => Ok(LlmProvider::OpenAi),
            "anthropic" => Ok(LlmProvider::Anthropic),
            "google" => Ok(LlmProvider::Google),
            other => Err(TinyHumansError::invalid(format!(
                "provider must be one of {}, got '{other}'. For custom providers, pass 'url'",
                SUPPORTED_LLM_PROVIDERS.join(", ")
            ))),
        }
    }

    /// Human-readable name used in error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "OpenAI",
            LlmProvider::Anthropic => "Anthropic",
            LlmProvider::Google => "Google",
            LlmProvider::Custom { .. } => "Custom provider",
        }
    }

    /// Build the provider request for `query`.
    pub fn prepare(&self, query: &LlmQuery) -> Result<PreparedRequest> {
        let api_key = query.checked_api_key()?;
        let context = Some(query.context.as_str()).filter(|c| !c.is_empty());

        let prepared = match self {
            LlmProvider::OpenAi | LlmProvider::Custom { .. } => {
                let mut messages = Vec::with_capacity(2);
                if let Some(ctx) = context {
                    messages.push(ChatMessage {
                        role: "system",
                        content: ctx,
                    });
                }
                messages.push(ChatMessage {
                    role: "user",
                    content: &query.prompt,
                });
                let body = ChatCompletionRequest {
                    model: &query.model,
                    messages,
                    max_tokens: query.max_tokens,
                    temperature: query.temperature,
                };
                let url = match self {
                    LlmProvider::Custom { url } => url.clone(),
                    _ => OPENAI_URL.to_string(),
                };
                PreparedRequest {
                    url,
                    query: Vec::new(),
                    headers: vec![(
                        "Authorization",
                        secret_header("api_key", &format!("Bearer {api_key}"))?,
                    )],
                    body: to_body(&body)?,
                }
            }
            LlmProvider::Anthropic => {
                let body = AnthropicRequest {
                    model: &query.model,
                    max_tokens: query.max_tokens.unwrap_or(ANTHROPIC_DEFAULT_MAX_TOKENS),
                    messages: vec![ChatMessage {
                        role: "user",
                        content: &query.prompt,
                    }],
                    system: context,
                    temperature: query.temperature,
                };
                PreparedRequest {
                    url: ANTHROPIC_URL.to_string(),
                    query: Vec::new(),
                    headers: vec![
                        ("x-api-key", secret_header("api_key", api_key)?),
                        ("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION)),
                    ],
                    body: to_body(&body)?,
                }
            }
            LlmProvider::Google => {
                let text = match context {
                    Some(ctx) => format!("Context:\n{ctx}\n\nUser: {}", query.prompt),
                    None => query.prompt.clone(),
                };
                let generation_config = (query.max_tokens.is_some()
                    || query.temperature.is_some())
                .then_some(GenerationConfig {
                    max_output_tokens: query.max_tokens,
                    temperature: query.temperature,
                });
                let body = GoogleRequest {
                    contents: vec![GoogleContent {
                        parts: vec![GooglePart { text }],
                    }],
                    generation_config,
                };
                PreparedRequest {
                    url: google_url(&query.model)?,
                    query: vec![("key", api_key.to_string())],
                    headers: Vec::new(),
                    body: to_body(&body)?,
                }
            }
        };
        Ok(prepared)
    }

    /// Pull the reply text out of a successful provider response.
    pub fn extract_text(&self, body: Value) -> Result<String> {
        let text = match self {
            LlmProvider::OpenAi | LlmProvider::Custom { .. } => {
                serde_json::from_value::<ChatCompletionResponse>(body.clone())
                    .ok()
                    .and_then(|r| r.choices.into_iter().next())
                    .map(|c| c.message.content)
            }
            LlmProvider::Anthropic => serde_json::from_value::<AnthropicResponse>(body.clone())
                .ok()
                .and_then(|r| r.content.into_iter().next())
                .map(|b| b.text),
            LlmProvider::Google => serde_json::from_value::<GoogleResponse>(body.clone())
                .ok()
                .and_then(|r| r.candidates.into_iter().next())
                .and_then(|c| c.content.parts.into_iter().next())
                .map(|p| p.text),
        };
        text.ok_or_else(|| TinyHumansError::Transport {
            message: format!("unexpected {} response shape", self.display_name()),
            status: None,
            body: body.to_string(),
        })
    }
}

/// Header value that is rejected up front instead of failing at send time.
fn secret_header(field: &str, value: &str) -> Result<HeaderValue> {
    let mut header = HeaderValue::from_str(value).map_err(|_| {
        TinyHumansError::invalid(format!("{field} contains invalid header characters"))
    })?;
    header.set_sensitive(true);
    Ok(header)
}

/// `{base}/{model}:generateContent` with the model as a single escaped path segment.
fn google_url(model: &str) -> Result<String> {
    if model.trim().is_empty() {
        return Err(TinyHumansError::invalid("model is required for google"));
    }
    let mut url =
        Url::parse(GOOGLE_BASE_URL).map_err(|e| TinyHumansError::invalid(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| TinyHumansError::invalid("google base url cannot take path segments"))?
        .push(&format!("{model}:generateContent"));
    Ok(url.to_string())
}

fn to_body<T: Serialize>(body: &T) -> Result<Value> {
    serde_json::to_value(body).map_err(|e| TinyHumansError::invalid(e.to_string()))
}

/// Map a provider failure status to an API error with a best-effort message:
/// `error.message`, then `message`, then the raw body.
pub fn provider_error(provider: &LlmProvider, status: u16, text: &str) -> TinyHumansError {
    let parsed: Option<Value> = serde_json::from_str(text).ok();
    let msg = parsed
        .as_ref()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .or_else(|| v.get("message"))
                .and_then(Value::as_str)
        })
        .unwrap_or(text)
        .to_string();
    TinyHumansError::Api {
        message: format!("{} API error: {msg}", provider.display_name()),
        status,
        body: parsed.unwrap_or_else(|| Value::String(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query() -> LlmQuery {
        LlmQuery::new("openai", "m", " sk-test ", "What theme?")
    }

    #[test]
    fn unknown_provider_lists_supported_names() {
        let err = LlmProvider::resolve("unknown", None).unwrap_err();
        assert!(err.is_invalid_argument());
        let msg = err.to_string();
        for name in SUPPORTED_LLM_PROVIDERS {
            assert!(msg.contains(name), "{msg}");
        }
    }

    #[test]
    fn url_selects_custom_regardless_of_tag() {
        let p = LlmProvider::resolve("anthropic", Some("https://llm.example/v1/chat")).unwrap();
        assert_eq!(
            p,
            LlmProvider::Custom {
                url: "https://llm.example/v1/chat".into()
            }
        );
        let p = LlmProvider::resolve("whatever", Some("http://x")).unwrap();
        assert!(matches!(p, LlmProvider::Custom { .. }));
    }

    #[test]
    fn tags_are_case_insensitive() {
        assert_eq!(LlmProvider::resolve(" Google ", None).unwrap(), LlmProvider::Google);
    }

    #[test]
    fn openai_request_has_system_then_user() {
        let q = query().with_context("[p:k]\nA").with_max_tokens(50);
        let req = LlmProvider::OpenAi.prepare(&q).unwrap();
        assert_eq!(req.url, OPENAI_URL);
        assert_eq!(
            req.headers,
            vec![("Authorization", HeaderValue::from_static("Bearer sk-test"))]
        );
        assert_eq!(
            req.body,
            json!({
                "model": "m",
                "messages": [
                    {"role": "system", "content": "[p:k]\nA"},
                    {"role": "user", "content": "What theme?"}
                ],
                "max_tokens": 50
            })
        );
    }

    #[test]
    fn openai_without_context_sends_only_user() {
        let req = LlmProvider::OpenAi.prepare(&query()).unwrap();
        assert_eq!(req.body["messages"].as_array().unwrap().len(), 1);
        assert!(req.body.get("temperature").is_none());
    }

    #[test]
    fn anthropic_defaults_max_tokens_and_uses_system() {
        let q = query().with_context("ctx");
        let req = LlmProvider::Anthropic.prepare(&q).unwrap();
        assert_eq!(req.body["max_tokens"], 1024);
        assert_eq!(req.body["system"], "ctx");
        assert_eq!(req.body["messages"], json!([{"role": "user", "content": "What theme?"}]));
        assert!(req
            .headers
            .contains(&("x-api-key", HeaderValue::from_static("sk-test"))));
        assert!(req
            .headers
            .contains(&("anthropic-version", HeaderValue::from_static("2023-06-01"))));
    }

    #[test]
    fn google_prefixes_context_and_nests_generation_config() {
        let q = query().with_context("ctx").with_temperature(0.5);
        let req = LlmProvider::Google.prepare(&q).unwrap();
        assert!(req.url.ends_with("/models/m:generateContent"));
        assert_eq!(req.query, vec![("key", "sk-test".to_string())]);
        assert_eq!(
            req.body["contents"][0]["parts"][0]["text"],
            "Context:\nctx\n\nUser: What theme?"
        );
        assert_eq!(req.body["generationConfig"], json!({"temperature": 0.5}));

        let req = LlmProvider::Google.prepare(&query()).unwrap();
        assert!(req.body.get("generationConfig").is_none());
        assert_eq!(req.body["contents"][0]["parts"][0]["text"], "What theme?");
    }

    #[test]
    fn temperature_goes_on_the_wire_unchanged() {
        let q = query().with_temperature(0.7);
        let req = LlmProvider::OpenAi.prepare(&q).unwrap();
        assert_eq!(req.body["temperature"], json!(0.7));
        assert!(serde_json::to_string(&req.body)
            .unwrap()
            .contains(r#""temperature":0.7"#));

        let req = LlmProvider::Anthropic.prepare(&q).unwrap();
        assert_eq!(req.body["temperature"], json!(0.7));

        let req = LlmProvider::Google.prepare(&q.with_max_tokens(10)).unwrap();
        assert_eq!(
            req.body["generationConfig"],
            json!({"maxOutputTokens": 10, "temperature": 0.7})
        );
    }

    #[test]
    fn api_key_with_control_characters_is_invalid() {
        let q = LlmQuery::new("openai", "m", "sk-\nbroken", "p");
        for provider in [
            LlmProvider::OpenAi,
            LlmProvider::Anthropic,
            LlmProvider::Custom {
                url: "http://localhost/v1/chat/completions".into(),
            },
        ] {
            let err = provider.prepare(&q).unwrap_err();
            assert!(err.is_invalid_argument(), "{provider:?}: {err:?}");
        }
    }

    #[test]
    fn google_model_stays_one_path_segment() {
        let q = LlmQuery::new("google", "gemini/../x?y", "k", "p");
        let req = LlmProvider::Google.prepare(&q).unwrap();
        assert_eq!(
            req.url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini%2F..%2Fx%3Fy:generateContent"
        );

        let q = LlmQuery::new("google", "gemini-1.5-flash", "k", "p");
        let req = LlmProvider::Google.prepare(&q).unwrap();
        assert_eq!(
            req.url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn empty_api_key_is_invalid() {
        let q = LlmQuery::new("openai", "m", "   ", "p");
        assert!(LlmProvider::OpenAi.prepare(&q).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn extracts_reply_per_provider() {
        let openai = json!({"choices": [{"message": {"role": "assistant", "content": "hi"}}]});
        assert_eq!(LlmProvider::OpenAi.extract_text(openai).unwrap(), "hi");

        let anthropic = json!({"content": [{"type": "text", "text": "hello"}]});
        assert_eq!(LlmProvider::Anthropic.extract_text(anthropic).unwrap(), "hello");

        let google = json!({"candidates": [{"content": {"parts": [{"text": "hey"}]}}]});
        assert_eq!(LlmProvider::Google.extract_text(google).unwrap(), "hey");
    }

    #[test]
    fn missing_reply_is_transport_error() {
        let err = LlmProvider::OpenAi.extract_text(json!({"choices": []})).unwrap_err();
        assert!(matches!(err, TinyHumansError::Transport { .. }));
    }

    #[test]
    fn provider_error_prefers_nested_message() {
        let err = provider_error(
            &LlmProvider::OpenAi,
            401,
            r#"{"error":{"message":"bad key"}}"#,
        );
        assert_eq!(err.to_string(), "OpenAI API error: bad key");
        assert_eq!(err.status(), Some(401));

        let err = provider_error(&LlmProvider::Google, 500, r#"{"message":"boom"}"#);
        assert_eq!(err.to_string(), "Google API error: boom");

        let err = provider_error(&LlmProvider::Anthropic, 502, "gateway down");
        assert_eq!(err.to_string(), "Anthropic API error: gateway down");
    }
}
