//! Chat Completions Provider
//!
//! OpenAI-compatible "messages" request shape, used for OpenRouter, xAI and
//! OpenAI itself. The system instruction and the prompt travel as separate
//! `system` and `user` messages.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::{
    LlmProvider, ProviderConfig, ProviderKind, ProviderReply, ProviderRequest, body_preview,
    classify_send_error, normalize_endpoint,
};
use crate::constants::provider as provider_constants;
use crate::types::{ErrorCategory, ErrorClassifier, ForgeError, LlmError, Result};

/// Chat-completions provider with secure API key handling
pub struct ChatProvider {
    name: String,
    kind: ProviderKind,
    /// Never exposed in logs or debug output
    api_key: Option<SecretString>,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for ChatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatProvider")
            .field("name", &self.name)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl ChatProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let api_base = normalize_endpoint(config.api_base_or_default())?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(
                provider_constants::CONNECTION_TIMEOUT_SECS,
            ))
            .build()
            .map_err(|e| ForgeError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let api_key = config
            .has_credential()
            .then(|| config.api_key.clone())
            .flatten()
            .map(SecretString::from);

        Ok(Self {
            name: config.display_name().to_string(),
            kind: config.kind,
            api_key,
            api_base,
            model: config.model_or_default().to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    fn build_request(&self, request: &ProviderRequest) -> ChatCompletionRequest {
        let system_content = match (&request.schema, request.json_mode) {
            (Some(schema), true) => {
                let schema_str =
                    serde_json::to_string_pretty(schema).unwrap_or_else(|_| schema.to_string());
                format!(
                    "{}\n\nRespond ONLY with valid JSON matching this schema:\n{}",
                    request.system_instruction, schema_str
                )
            }
            (None, true) => format!(
                "{}\n\nRespond ONLY with valid JSON.",
                request.system_instruction
            ),
            _ => request.system_instruction.clone(),
        };

        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_content,
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.prompt.clone(),
                },
            ],
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
            response_format: request.json_mode.then(|| ResponseFormat {
                format_type: "json_object".to_string(),
            }),
        }
    }
}

#[async_trait]
impl LlmProvider for ChatProvider {
    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderReply> {
        let Some(api_key) = &self.api_key else {
            return Err(LlmError::with_provider(
                ErrorCategory::Auth,
                "Provider has no API key configured",
                &self.name,
            )
            .into());
        };

        if request.attachment.is_some() {
            return Err(LlmError::with_provider(
                ErrorCategory::BadRequest,
                "Chat providers do not accept file attachments",
                &self.name,
            )
            .into());
        }

        if request.grounding {
            return Err(LlmError::with_provider(
                ErrorCategory::BadRequest,
                "Chat providers cannot ground answers in web search",
                &self.name,
            )
            .into());
        }

        info!(provider = %self.name, model = %self.model, json = request.json_mode, "Generating with chat completions");

        let start_time = Instant::now();
        let body = self.build_request(request);
        let url = format!("{}/chat/completions", self.api_base);

        let mut builder = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", api_key.expose_secret()),
            )
            .header("Content-Type", "application/json");

        if self.kind == ProviderKind::OpenRouter {
            builder = builder.header("X-Title", "Career Forge");
        }

        let response = builder
            .json(&body)
            .send()
            .await
            .map_err(|e| classify_send_error(&e, &self.name))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("API error ({}): {}", status, body_preview(&body)),
                &self.name,
            )
            .into());
        }

        let response_body: ChatCompletionResponse = response.json().await.map_err(|e| {
            LlmError::with_provider(
                ErrorCategory::ParseError,
                format!("Failed to decode response: {}", e),
                &self.name,
            )
        })?;

        debug!(
            provider = %self.name,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Received chat completion"
        );

        let text = extract_text(&response_body).ok_or_else(|| {
            LlmError::with_provider(
                ErrorCategory::EmptyResponse,
                "No content in chat completion",
                &self.name,
            )
        })?;

        Ok(ProviderReply::text(text))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

fn extract_text(response: &ChatCompletionResponse) -> Option<String> {
    response
        .choices
        .first()
        .and_then(|c| c.message.content.as_deref())
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider(kind: ProviderKind) -> ChatProvider {
        ChatProvider::new(&ProviderConfig {
            kind,
            api_key: Some("test-key".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_request_splits_system_and_user() {
        let p = provider(ProviderKind::Xai);
        let body = p.build_request(&ProviderRequest {
            prompt: "list 3 skills".to_string(),
            system_instruction: "You are helpful".to_string(),
            ..Default::default()
        });
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["model"], "grok-3");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "You are helpful");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "list 3 skills");
        assert!(json.get("response_format").is_none());
    }

    #[test]
    fn test_json_mode_sets_response_format_and_schema() {
        let p = provider(ProviderKind::OpenRouter);
        let body = p.build_request(&ProviderRequest {
            prompt: "score".to_string(),
            system_instruction: "ATS".to_string(),
            json_mode: true,
            schema: Some(json!({"type": "object"})),
            ..Default::default()
        });
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["response_format"]["type"], "json_object");
        let system = json["messages"][0]["content"].as_str().unwrap();
        assert!(system.starts_with("ATS"));
        assert!(system.contains("\"type\": \"object\""));
    }

    #[test]
    fn test_extract_text_rejects_blank() {
        let blank: ChatCompletionResponse =
            serde_json::from_value(json!({"choices": [{"message": {"content": "  "}}]})).unwrap();
        assert!(extract_text(&blank).is_none());

        let none: ChatCompletionResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(extract_text(&none).is_none());

        let ok: ChatCompletionResponse =
            serde_json::from_value(json!({"choices": [{"message": {"content": "- Go"}}]}))
                .unwrap();
        assert_eq!(extract_text(&ok).as_deref(), Some("- Go"));
    }

    #[tokio::test]
    async fn test_attachment_is_rejected_without_network() {
        let p = provider(ProviderKind::OpenRouter);
        let err = p
            .generate(&ProviderRequest {
                prompt: "analyze".to_string(),
                attachment: Some(super::super::Attachment::new(vec![1], "application/pdf")),
                ..Default::default()
            })
            .await
            .unwrap_err();
        match err {
            ForgeError::Llm(e) => assert_eq!(e.category, ErrorCategory::BadRequest),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_grounding_is_rejected_without_network() {
        // Unroutable base: a request that got past validation would fail as NETWORK
        let p = ChatProvider::new(&ProviderConfig {
            kind: ProviderKind::OpenRouter,
            api_key: Some("test-key".to_string()),
            api_base: Some("http://127.0.0.1:9".to_string()),
            ..Default::default()
        })
        .unwrap();
        let err = p
            .generate(&ProviderRequest {
                prompt: "find jobs".to_string(),
                json_mode: true,
                grounding: true,
                ..Default::default()
            })
            .await
            .unwrap_err();
        match err {
            ForgeError::Llm(e) => assert_eq!(e.category, ErrorCategory::BadRequest),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unconfigured_provider_fails_fast() {
        let p = ChatProvider::new(&ProviderConfig {
            kind: ProviderKind::Xai,
            ..Default::default()
        })
        .unwrap();
        assert!(!p.is_configured());
        let err = p.generate(&ProviderRequest::default()).await.unwrap_err();
        assert!(matches!(err, ForgeError::Llm(ref e) if e.category == ErrorCategory::Auth));
    }
}
