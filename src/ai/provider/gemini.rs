//! Gemini generateContent Provider
//!
//! Single structured call carrying the system instruction, the prompt parts
//! (with an optional inline base64 attachment) and generation config.
//! Search grounding adds the `googleSearch` tool and surfaces grounding chunks
//! as `GroundingSource`s.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{
    GroundingSource, LlmProvider, ProviderConfig, ProviderReply, ProviderRequest, body_preview,
    classify_send_error, normalize_endpoint,
};
use crate::constants::provider as provider_constants;
use crate::types::{ErrorCategory, ErrorClassifier, ForgeError, LlmError, Result};

pub struct GeminiProvider {
    name: String,
    api_key: Option<SecretString>,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("name", &self.name)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiProvider {
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
            api_key,
            api_base,
            model: config.model_or_default().to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    fn build_request(&self, request: &ProviderRequest) -> Result<GenerateContentRequest> {
        let mut parts = Vec::with_capacity(2);

        if let Some(attachment) = &request.attachment {
            if attachment.data.len() > provider_constants::MAX_ATTACHMENT_BYTES {
                return Err(LlmError::with_provider(
                    ErrorCategory::BadRequest,
                    format!(
                        "Attachment is {} bytes; inline uploads are limited to {} bytes",
                        attachment.data.len(),
                        provider_constants::MAX_ATTACHMENT_BYTES
                    ),
                    &self.name,
                )
                .into());
            }
            parts.push(Part {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: attachment.mime_type.clone(),
                    data: general_purpose::STANDARD.encode(&attachment.data),
                }),
            });
        }

        parts.push(Part {
            text: Some(request.prompt.clone()),
            inline_data: None,
        });

        // Gemini rejects a JSON response mime type combined with the search tool
        let json_output = request.json_mode && !request.grounding;

        Ok(GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
            system_instruction: (!request.system_instruction.is_empty()).then(|| {
                SystemInstruction {
                    parts: vec![Part {
                        text: Some(request.system_instruction.clone()),
                        inline_data: None,
                    }],
                }
            }),
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_tokens,
                response_mime_type: json_output.then(|| "application/json".to_string()),
                response_schema: if json_output {
                    request.schema.clone()
                } else {
                    None
                },
            },
            tools: request.grounding.then(|| {
                vec![Tool {
                    google_search: serde_json::json!({}),
                }]
            }),
        })
    }

    fn map_api_error(&self, status: u16, body: &str) -> LlmError {
        let message = serde_json::from_str::<ApiErrorBody>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body_preview(body));

        if message.contains("Unsupported MIME type") {
            return LlmError::with_provider(
                ErrorCategory::BadRequest,
                "The AI model does not support this file format. Please upload a PDF.",
                &self.name,
            );
        }

        ErrorClassifier::classify_http_status(
            status,
            &format!("API error ({}): {}", status, message),
            &self.name,
        )
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(&self, request: &ProviderRequest) -> Result<ProviderReply> {
        let Some(api_key) = &self.api_key else {
            return Err(LlmError::with_provider(
                ErrorCategory::Auth,
                "Provider has no API key configured",
                &self.name,
            )
            .into());
        };

        info!(
            provider = %self.name,
            model = %self.model,
            json = request.json_mode,
            grounding = request.grounding,
            attachment = request.attachment.is_some(),
            "Generating with Gemini"
        );

        let start_time = Instant::now();
        let body = self.build_request(request)?;
        let url = format!("{}/models/{}:generateContent", self.api_base, self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key.expose_secret())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| classify_send_error(&e, &self.name))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(self.map_api_error(status, &body).into());
        }

        let response_body: Value = response.json().await.map_err(|e| {
            LlmError::with_provider(
                ErrorCategory::ParseError,
                format!("Failed to decode response: {}", e),
                &self.name,
            )
        })?;

        debug!(
            provider = %self.name,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Received Gemini response"
        );

        let parsed: GenerateContentResponse = serde_json::from_value(response_body.clone())
            .map_err(|e| {
                LlmError::with_provider(
                    ErrorCategory::ParseError,
                    format!("Unexpected response shape: {}", e),
                    &self.name,
                )
            })?;

        let text = parsed.text();
        if text.trim().is_empty() {
            let diagnosis = diagnose_empty(&response_body);
            warn!(provider = %self.name, %diagnosis, "Gemini returned no text");
            return Err(LlmError::with_provider(
                ErrorCategory::EmptyResponse,
                format!("Empty response from AI ({})", diagnosis),
                &self.name,
            )
            .into());
        }

        Ok(ProviderReply {
            text,
            grounding: parsed.grounding_sources(),
        })
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

/// Explain why a response carried no text (block reason, finish reason)
fn diagnose_empty(body: &Value) -> String {
    let mut diag = Vec::new();

    if let Some(reason) = body
        .pointer("/promptFeedback/blockReason")
        .and_then(|v| v.as_str())
    {
        diag.push(format!("blockReason={}", reason));
    }

    match body.get("candidates").and_then(|v| v.as_array()) {
        Some(candidates) if candidates.is_empty() => diag.push("no candidates".to_string()),
        Some(candidates) => {
            if let Some(reason) = candidates[0].get("finishReason").and_then(|v| v.as_str()) {
                diag.push(format!("finishReason={}", reason));
            }
        }
        None => diag.push("no candidates".to_string()),
    }

    if diag.is_empty() {
        "unknown".to_string()
    } else {
        diag.join(", ")
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: Value,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Default, Deserialize)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Debug, Default, Deserialize)]
struct WebChunk {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorMessage,
}

#[derive(Debug, Deserialize)]
struct ApiErrorMessage {
    message: String,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    fn grounding_sources(&self) -> Vec<GroundingSource> {
        self.candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(|meta| {
                meta.grounding_chunks
                    .iter()
                    .filter_map(|chunk| chunk.web.as_ref())
                    .filter_map(|web| {
                        web.uri.as_ref().map(|uri| GroundingSource {
                            uri: uri.clone(),
                            title: web.title.clone(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
