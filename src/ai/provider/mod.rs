//! LLM Provider Abstraction
//!
//! Defines the `LlmProvider` trait implemented by each hosted text-generation
//! backend. Two request shapes exist:
//!
//! - `gemini`: single structured "generateContent" call
//! - `chat`: OpenAI-compatible "messages" call with a system/user split
//!   (OpenRouter, xAI Grok, OpenAI)

mod chat;
mod gemini;

pub use chat::ChatProvider;
pub use gemini::GeminiProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

use crate::constants::provider as provider_constants;
use crate::types::{ErrorCategory, ErrorClassifier, ForgeError, LlmError, Result};

// =============================================================================
// Provider Request / Reply
// =============================================================================

/// Binary attachment for document-grounded tasks (e.g. an uploaded PDF resume)
#[derive(Clone, PartialEq)]
pub struct Attachment {
    pub data: Vec<u8>,
    /// Declared media type, e.g. `application/pdf`
    pub mime_type: String,
}

impl Attachment {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("bytes", &self.data.len())
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

/// What a provider is asked to do for one attempt
#[derive(Debug, Clone, Default)]
pub struct ProviderRequest {
    pub prompt: String,
    pub system_instruction: String,
    pub json_mode: bool,
    /// Response schema forwarded to providers that accept one
    pub schema: Option<Value>,
    pub attachment: Option<Attachment>,
    /// Ask the provider to ground the answer in web search
    pub grounding: bool,
}

/// Citation attached by search-grounded providers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub uri: String,
    pub title: Option<String>,
}

/// Raw reply from one provider attempt, before cleaning
#[derive(Debug, Clone, Default)]
pub struct ProviderReply {
    pub text: String,
    pub grounding: Vec<GroundingSource>,
}

impl ProviderReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            grounding: Vec::new(),
        }
    }
}

/// Shared provider type held by the gateway
pub type SharedProvider = Arc<dyn LlmProvider + Send + Sync>;

// =============================================================================
// Provider Configuration
// =============================================================================

/// Backend family; decides the request shape and default endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Gemini,
    OpenRouter,
    Xai,
    OpenAi,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenRouter => "openrouter",
            Self::Xai => "xai",
            Self::OpenAi => "openai",
        }
    }

    pub fn default_api_base(&self) -> &'static str {
        match self {
            Self::Gemini => provider_constants::GEMINI_API_BASE,
            Self::OpenRouter => provider_constants::OPENROUTER_API_BASE,
            Self::Xai => provider_constants::XAI_API_BASE,
            Self::OpenAi => "https://api.openai.com/v1",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => provider_constants::GEMINI_DEFAULT_MODEL,
            Self::OpenRouter => provider_constants::OPENROUTER_DEFAULT_MODEL,
            Self::Xai => provider_constants::XAI_DEFAULT_MODEL,
            Self::OpenAi => "gpt-4o-mini",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Provider descriptor: one hosted backend, its credential and model
///
/// API keys are never serialized and are redacted in debug output.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Name used in logs and attempt records (defaults to the kind)
    pub name: Option<String>,
    pub kind: ProviderKind,
    /// Model name (provider-specific)
    pub model: Option<String>,
    /// API key. Never serialized to output
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Environment variable the key is read from at startup
    pub api_key_env: Option<String>,
    /// API base URL (for custom endpoints)
    pub api_base: Option<String>,
    /// HTTP client timeout in seconds
    pub timeout_secs: u64,
    pub temperature: f32,
    pub max_tokens: usize,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_key_env", &self.api_key_env)
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: None,
            kind: ProviderKind::Gemini,
            model: None,
            api_key: None,
            api_key_env: None,
            api_base: None,
            timeout_secs: 120,
            temperature: 0.7,
            max_tokens: 4096,
        }
    }
}

impl ProviderConfig {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.kind.as_str())
    }

    pub fn model_or_default(&self) -> &str {
        self.model.as_deref().unwrap_or(self.kind.default_model())
    }

    pub fn api_base_or_default(&self) -> &str {
        self.api_base
            .as_deref()
            .unwrap_or(self.kind.default_api_base())
    }

    /// A descriptor with a missing or blank key is unconfigured
    pub fn has_credential(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}

// =============================================================================
// LLM Provider Trait
// =============================================================================

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Issue one request. No retries are made here.
    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderReply>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;

    /// False when the descriptor has no usable credential; the gateway skips it
    fn is_configured(&self) -> bool {
        true
    }
}

/// Create a shared provider from its descriptor
pub fn create_provider(config: &ProviderConfig) -> Result<SharedProvider> {
    match config.kind {
        ProviderKind::Gemini => Ok(Arc::new(GeminiProvider::new(config)?)),
        ProviderKind::OpenRouter | ProviderKind::Xai | ProviderKind::OpenAi => {
            Ok(Arc::new(ChatProvider::new(config)?))
        }
    }
}

/// Validate a base URL and strip its trailing slash.
///
/// Only http/https are accepted; plain http is allowed for local proxies.
pub(crate) fn normalize_endpoint(endpoint: &str) -> Result<String> {
    let url = url::Url::parse(endpoint).map_err(|e| {
        ForgeError::Config(format!("Invalid provider endpoint URL '{}': {}", endpoint, e))
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ForgeError::Config(format!(
            "Provider endpoint must use http or https scheme, got: {}",
            url.scheme()
        )));
    }

    if url.scheme() == "http"
        && let Some(host) = url.host_str()
        && !matches!(host, "localhost" | "127.0.0.1" | "::1")
    {
        warn!(
            "Provider endpoint {} sends credentials over plain http. Ensure this is intentional.",
            host
        );
    }

    let mut result = url.to_string();
    if result.ends_with('/') {
        result.pop();
    }
    Ok(result)
}

/// Classify a failed send: connect and timeout errors are NETWORK by kind,
/// anything else falls back to message classification
pub(crate) fn classify_send_error(err: &reqwest::Error, provider: &str) -> LlmError {
    let message = format!("{} request failed: {}", provider, err);
    if err.is_timeout() || err.is_connect() {
        return LlmError::with_provider(ErrorCategory::Network, message, provider);
    }
    ErrorClassifier::classify(&message, provider)
}

/// Truncate an error body for logs and error messages
pub(crate) fn body_preview(body: &str) -> String {
    const MAX: usize = 300;
    if body.chars().count() <= MAX {
        body.to_string()
    } else {
        let mut preview: String = body.chars().take(MAX).collect();
        preview.push_str("...");
        preview
    }
}
