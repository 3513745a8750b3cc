//! Client configuration and environment resolution.

use std::fmt;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use tinyhumans_types::{Result, TinyHumansError};

pub const DEFAULT_BASE_URL: &str = "https://api.tinyhumans.ai";

/// Environment variable overriding the base URL.
pub const BASE_URL_ENV: &str = "TINYHUMANS_BASE_URL";
pub const TOKEN_ENV: &str = "TINYHUMANS_TOKEN";
pub const MODEL_ID_ENV: &str = "TINYHUMANS_MODEL_ID";

/// Connection settings. Immutable once a client is built from it.
#[derive(Clone)]
pub struct ClientConfig {
    /// Bearer token (JWT or API key).
    pub token: String,
    /// Sent as `X-Model-Id` when set.
    pub model_id: Option<String>,
    /// Falls back to `TINYHUMANS_BASE_URL`, then [`DEFAULT_BASE_URL`].
    pub base_url: Option<String>,
}

impl ClientConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            model_id: None,
            base_url: None,
        }
    }

    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Read `TINYHUMANS_TOKEN`, `TINYHUMANS_MODEL_ID` and `TINYHUMANS_BASE_URL`.
    /// Blank optional variables count as unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let token = lookup(TOKEN_ENV)
            .ok_or_else(|| TinyHumansError::invalid(format!("{TOKEN_ENV} is not set")))?;
        let non_blank = |name: &str| lookup(name).filter(|v: &String| !v.trim().is_empty());
        Ok(Self {
            token,
            model_id: non_blank(MODEL_ID_ENV),
            base_url: non_blank(BASE_URL_ENV),
        })
    }

    /// Explicit value, then environment, then default; trailing slashes trimmed.
    pub fn resolve_base_url(&self) -> String {
        let base = self
            .base_url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .or_else(|| std::env::var(BASE_URL_ENV).ok().filter(|u| !u.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        base.trim().trim_end_matches('/').to_string()
    }

    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(TinyHumansError::invalid("token is required"));
        }
        if let Some(model_id) = &self.model_id {
            if model_id.trim().is_empty() {
                return Err(TinyHumansError::invalid("model_id must not be empty"));
            }
        }
        Ok(())
    }

    /// Auth headers attached to every memory request.
    pub(crate) fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", self.token.trim()))
            .map_err(|_| TinyHumansError::invalid("token contains invalid header characters"))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        if let Some(model_id) = &self.model_id {
            let value = HeaderValue::from_str(model_id.trim())
                .map_err(|_| TinyHumansError::invalid("model_id contains invalid header characters"))?;
            headers.insert("X-Model-Id", value);
        }
        Ok(headers)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("token", &"<redacted>")
            .field("model_id", &self.model_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}
