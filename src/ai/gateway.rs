//! AI Gateway
//!
//! Sequential failover across an ordered list of hosted providers.
//!
//! ## Strategy
//!
//! 1. Walk the providers in configured order
//! 2. Skip providers without a credential (not counted as failures)
//! 3. Issue exactly one request per configured provider, bounded by the
//!    per-attempt timeout
//! 4. First non-empty reply wins: clean it and return, trying nothing further
//! 5. Any error, timeout or empty reply is recorded and the next provider is tried
//! 6. When the list runs out, fail with `AllProvidersExhausted`
//!
//! There are no retries and no reordering. Error categories are recorded for
//! logs only.

use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::cleaning::ResponseCleaner;
use super::provider::{
    Attachment, GroundingSource, ProviderRequest, SharedProvider, create_provider,
};
use super::timeout::with_timeout;
use crate::config::Config;
use crate::constants::gateway as gateway_constants;
use crate::types::{ErrorCategory, ErrorClassifier, ForgeError, LlmError, Result};

// =============================================================================
// Request
// =============================================================================

/// One task request handed to the gateway
#[derive(Debug, Clone, Default)]
pub struct GatewayRequest {
    pub prompt: String,
    pub json_mode: bool,
    /// Overrides the gateway's default persona
    pub system_instruction: Option<String>,
    pub attachment: Option<Attachment>,
    pub schema: Option<Value>,
    pub grounding: bool,
    /// Skip markdown stripping; `#` and `*` in the reply are content
    pub preserve_markdown: bool,
}

impl GatewayRequest {
    /// Free-text request
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    /// Structured (JSON-mode) request
    pub fn json(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            json_mode: true,
            ..Default::default()
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_grounding(mut self) -> Self {
        self.grounding = true;
        self
    }

    pub fn preserving_markdown(mut self) -> Self {
        self.preserve_markdown = true;
        self
    }

    fn to_provider_request(&self, default_persona: &str) -> ProviderRequest {
        ProviderRequest {
            prompt: self.prompt.clone(),
            system_instruction: self
                .system_instruction
                .clone()
                .unwrap_or_else(|| default_persona.to_string()),
            json_mode: self.json_mode,
            schema: self.schema.clone(),
            attachment: self.attachment.clone(),
            grounding: self.grounding,
        }
    }
}

// =============================================================================
// Response & Outcome
// =============================================================================

/// Cleaned reply from the provider that succeeded
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    pub text: String,
    pub provider: String,
    pub grounding: Vec<GroundingSource>,
    pub json_mode: bool,
}

impl GatewayResponse {
    /// Deserialize a JSON-mode reply
    pub fn parse_json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.text)
            .map_err(|e| ForgeError::response_parse(e.to_string(), &self.text))
    }

    pub fn into_outcome(self) -> AiOutcome {
        if !self.json_mode {
            return AiOutcome::Text(self.text);
        }
        match serde_json::from_str::<Value>(&self.text) {
            Ok(value) => AiOutcome::Structured(value),
            Err(e) => AiOutcome::Failure {
                kind: FailureKind::ResponseParse,
                message: e.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    ResponseParse,
    AllProvidersExhausted,
    Other,
}

/// Tagged result of a gateway call
#[derive(Debug, Clone, PartialEq)]
pub enum AiOutcome {
    Text(String),
    Structured(Value),
    Failure { kind: FailureKind, message: String },
}

impl AiOutcome {
    pub fn from_result(result: Result<GatewayResponse>) -> Self {
        match result {
            Ok(response) => response.into_outcome(),
            Err(err) => {
                let kind = match err {
                    ForgeError::AllProvidersExhausted { .. } => FailureKind::AllProvidersExhausted,
                    ForgeError::ResponseParse { .. } => FailureKind::ResponseParse,
                    _ => FailureKind::Other,
                };
                AiOutcome::Failure {
                    kind,
                    message: err.to_string(),
                }
            }
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }
}

// =============================================================================
// Attempt Ledger
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Success,
    Failed(LlmError),
}

#[derive(Debug, Clone)]
pub struct AttemptRecord {
    pub provider: String,
    pub outcome: AttemptOutcome,
    pub duration_ms: u64,
}

impl AttemptRecord {
    pub fn succeeded(&self) -> bool {
        self.outcome == AttemptOutcome::Success
    }
}

/// Execution statistics for one gateway call
#[derive(Debug, Clone, Default)]
pub struct GatewayStats {
    pub attempts: Vec<AttemptRecord>,
    pub skipped_unconfigured: usize,
    pub successful_provider: Option<String>,
    pub total_duration_ms: u64,
}

impl GatewayStats {
    pub fn total_attempts(&self) -> usize {
        self.attempts.len()
    }

    pub fn failures(&self) -> impl Iterator<Item = &LlmError> {
        self.attempts.iter().filter_map(|a| match &a.outcome {
            AttemptOutcome::Failed(e) => Some(e),
            AttemptOutcome::Success => None,
        })
    }
}

// =============================================================================
// Gateway
// =============================================================================

/// Multi-provider gateway. Cheap to clone: providers are shared.
#[derive(Clone)]
pub struct AiGateway {
    providers: Vec<SharedProvider>,
    cleaner: ResponseCleaner,
    attempt_timeout: Duration,
    default_persona: String,
}

impl std::fmt::Debug for AiGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiGateway")
            .field(
                "providers",
                &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("attempt_timeout", &self.attempt_timeout)
            .finish()
    }
}

impl AiGateway {
    /// Gateway over `providers` (in priority order) with default settings
    pub fn new(providers: Vec<SharedProvider>) -> Self {
        Self {
            providers,
            cleaner: ResponseCleaner::default(),
            attempt_timeout: Duration::from_secs(gateway_constants::ATTEMPT_TIMEOUT_SECS),
            default_persona: gateway_constants::DEFAULT_SYSTEM_INSTRUCTION.to_string(),
        }
    }

    /// Build the gateway from a loaded configuration.
    /// Credentials must already be resolved into the descriptors.
    pub fn from_config(config: &Config) -> Result<Self> {
        let providers = config
            .providers
            .iter()
            .map(create_provider)
            .collect::<Result<Vec<_>>>()?;

        debug!(
            providers = providers.len(),
            configured = config.configured_provider_count(),
            "Gateway built from config"
        );

        Ok(Self::new(providers)
            .with_cleaner(ResponseCleaner::new(config.cleaning.clone()))
            .with_attempt_timeout(Duration::from_secs(config.gateway.attempt_timeout_secs))
            .with_default_persona(config.gateway.default_persona.clone()))
    }

    pub fn with_cleaner(mut self, cleaner: ResponseCleaner) -> Self {
        self.cleaner = cleaner;
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn with_default_persona(mut self, persona: impl Into<String>) -> Self {
        self.default_persona = persona.into();
        self
    }

    pub fn providers(&self) -> &[SharedProvider] {
        &self.providers
    }

    pub fn configured_count(&self) -> usize {
        self.providers.iter().filter(|p| p.is_configured()).count()
    }

    /// Run the failover routine, returning the response and the attempt ledger
    #[instrument(skip(self, request), fields(json = request.json_mode, providers = self.providers.len()))]
    pub async fn execute(&self, request: &GatewayRequest) -> Result<(GatewayResponse, GatewayStats)> {
        let mut stats = GatewayStats::default();
        let start_time = Instant::now();
        let provider_request = request.to_provider_request(&self.default_persona);
        let mut last_error: Option<LlmError> = None;

        for provider in &self.providers {
            let provider_name = provider.name().to_string();

            if !provider.is_configured() {
                debug!(provider = %provider_name, "Skipping provider (no credential)");
                stats.skipped_unconfigured += 1;
                continue;
            }

            let attempt = stats.attempts.len() + 1;
            let attempt_start = Instant::now();
            debug!(provider = %provider_name, attempt, model = %provider.model(), "Gateway attempt");

            let result = with_timeout(
                self.attempt_timeout,
                provider.generate(&provider_request),
                &format!("{} attempt", provider_name),
            )
            .await;
            let duration_ms = attempt_start.elapsed().as_millis() as u64;

            let failure = match result {
                Ok(reply) => {
                    let text = if request.preserve_markdown {
                        self.cleaner
                            .clean_preserving_markdown(&reply.text, request.json_mode)
                    } else {
                        self.cleaner.clean(&reply.text, request.json_mode)
                    };
                    if text.is_empty() {
                        LlmError::with_provider(
                            ErrorCategory::EmptyResponse,
                            "Reply was empty after cleaning",
                            &provider_name,
                        )
                    } else {
                        stats.attempts.push(AttemptRecord {
                            provider: provider_name.clone(),
                            outcome: AttemptOutcome::Success,
                            duration_ms,
                        });
                        stats.successful_provider = Some(provider_name.clone());
                        stats.total_duration_ms = start_time.elapsed().as_millis() as u64;

                        info!(
                            provider = %provider_name,
                            attempts = stats.total_attempts(),
                            skipped = stats.skipped_unconfigured,
                            "Gateway succeeded"
                        );

                        let response = GatewayResponse {
                            text,
                            provider: provider_name,
                            grounding: reply.grounding,
                            json_mode: request.json_mode,
                        };
                        return Ok((response, stats));
                    }
                }
                Err(err) => ErrorClassifier::classify_forge_error(&err, &provider_name),
            };

            warn!(
                provider = %provider_name,
                attempt,
                category = %failure.category,
                error = %failure.message,
                "Provider failed, trying next"
            );

            stats.attempts.push(AttemptRecord {
                provider: provider_name,
                outcome: AttemptOutcome::Failed(failure.clone()),
                duration_ms,
            });
            last_error = Some(failure);
        }

        stats.total_duration_ms = start_time.elapsed().as_millis() as u64;

        warn!(
            attempted = stats.total_attempts(),
            skipped = stats.skipped_unconfigured,
            "All providers exhausted"
        );

        Err(ForgeError::AllProvidersExhausted {
            attempted: stats.total_attempts(),
            skipped: stats.skipped_unconfigured,
            last_error,
        })
    }

    /// Run the failover routine, returning the response only
    pub async fn generate(&self, request: &GatewayRequest) -> Result<GatewayResponse> {
        let (response, _stats) = self.execute(request).await?;
        Ok(response)
    }

    /// Convenience: free-text prompt to cleaned text
    pub async fn generate_text(&self, prompt: impl Into<String>) -> Result<String> {
        Ok(self.generate(&GatewayRequest::text(prompt)).await?.text)
    }
}
