//! Unified Error Type System
//!
//! Centralized error types for the entire crate.
//!
//! ## Error Categories
//!
//! Provider failures are classified into categories so that logs and
//! attempt records say *why* a provider was passed over. Classification
//! never changes gateway routing: any provider failure advances to the next
//! configured provider.
//!
//! - **RateLimit**: API rate limiting
//! - **TokenLimit**: Context too large
//! - **Auth**: Authentication failures
//! - **Network**: Connectivity issues and attempt timeouts
//! - **Unavailable**: Provider or model unavailable
//! - **EmptyResponse**: Provider answered with no text

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Error categories recorded for each failed provider attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limited by the provider
    RateLimit,
    /// Context/token limit exceeded
    TokenLimit,
    /// Authentication failed (bad or revoked key)
    Auth,
    /// Network/connectivity issues, including attempt timeouts
    Network,
    /// Provider or model unavailable
    Unavailable,
    /// Invalid request (including unsupported attachment types)
    BadRequest,
    /// Provider returned a body that could not be decoded
    ParseError,
    /// Provider returned no text
    EmptyResponse,
    /// Temporary server issues
    Transient,
    /// Unknown error
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::TokenLimit => write!(f, "TOKEN_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Network => write!(f, "NETWORK"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::ParseError => write!(f, "PARSE_ERROR"),
            Self::EmptyResponse => write!(f, "EMPTY_RESPONSE"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// =============================================================================
// LLM Error
// =============================================================================

/// A single provider failure with category and provider context
#[derive(Debug, Clone, PartialEq)]
pub struct LlmError {
    /// Error category
    pub category: ErrorCategory,
    /// Detailed error message
    pub message: String,
    /// Provider that produced the error
    pub provider: Option<String>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
        }
    }

    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            provider: Some(provider.into()),
        }
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Error classifier for provider failures
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an error message from any provider
    pub fn classify(message: &str, provider: &str) -> LlmError {
        let lower = message.to_lowercase();

        if lower.contains("rate limit")
            || lower.contains("429")
            || lower.contains("too many requests")
            || lower.contains("quota exceeded")
            || lower.contains("resource_exhausted")
        {
            return LlmError::with_provider(ErrorCategory::RateLimit, message, provider);
        }

        if lower.contains("token")
            && (lower.contains("limit") || lower.contains("exceed") || lower.contains("maximum"))
            || lower.contains("context length")
            || lower.contains("too large")
        {
            return LlmError::with_provider(ErrorCategory::TokenLimit, message, provider);
        }

        if lower.contains("401")
            || lower.contains("403")
            || lower.contains("api key")
            || lower.contains("unauthorized")
            || lower.contains("permission denied")
        {
            return LlmError::with_provider(ErrorCategory::Auth, message, provider);
        }

        if lower.contains("network")
            || lower.contains("connection")
            || lower.contains("dns")
            || lower.contains("timeout")
            || lower.contains("timed out")
        {
            return LlmError::with_provider(ErrorCategory::Network, message, provider);
        }

        if lower.contains("503")
            || lower.contains("502")
            || lower.contains("service unavailable")
            || lower.contains("not found")
        {
            return LlmError::with_provider(ErrorCategory::Unavailable, message, provider);
        }

        if lower.contains("400") || lower.contains("bad request") || lower.contains("unsupported")
        {
            return LlmError::with_provider(ErrorCategory::BadRequest, message, provider);
        }

        if lower.contains("overloaded") || lower.contains("temporary") || lower.contains("500") {
            return LlmError::with_provider(ErrorCategory::Transient, message, provider);
        }

        LlmError::with_provider(ErrorCategory::Unknown, message, provider)
    }

    /// Classify HTTP status code directly (more accurate than string matching)
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        match status {
            429 => LlmError::with_provider(ErrorCategory::RateLimit, message, provider),
            401 | 403 => LlmError::with_provider(ErrorCategory::Auth, message, provider),
            400 | 415 | 422 => LlmError::with_provider(ErrorCategory::BadRequest, message, provider),
            404 => LlmError::with_provider(ErrorCategory::Unavailable, message, provider),
            500 | 502 | 503 | 504 => {
                LlmError::with_provider(ErrorCategory::Transient, message, provider)
            }
            _ => LlmError::with_provider(ErrorCategory::Unknown, message, provider),
        }
    }

    /// Turn any error raised by a provider attempt into a recorded `LlmError`
    pub fn classify_forge_error(err: &ForgeError, provider: &str) -> LlmError {
        match err {
            ForgeError::Llm(llm_err) => {
                let mut recorded = llm_err.clone();
                if recorded.provider.is_none() {
                    recorded.provider = Some(provider.to_string());
                }
                recorded
            }
            ForgeError::Timeout { .. } => {
                LlmError::with_provider(ErrorCategory::Network, err.to_string(), provider)
            }
            ForgeError::Json(_) => {
                LlmError::with_provider(ErrorCategory::ParseError, err.to_string(), provider)
            }
            ForgeError::Config(_) | ForgeError::Validation(_) => {
                LlmError::with_provider(ErrorCategory::BadRequest, err.to_string(), provider)
            }
            _ => Self::classify(&err.to_string(), provider),
        }
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum ForgeError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Gateway Errors
    // -------------------------------------------------------------------------
    /// One provider attempt failed
    #[error("LLM error: {0}")]
    Llm(LlmError),

    /// Every configured provider failed, or none was configured
    #[error(
        "All AI providers exhausted ({attempted} attempted, {skipped} unconfigured){}",
        last_error_suffix(.last_error)
    )]
    AllProvidersExhausted {
        attempted: usize,
        skipped: usize,
        last_error: Option<LlmError>,
    },

    /// JSON-mode output could not be parsed by the caller
    #[error("Failed to parse AI response as JSON: {message} (preview: {preview})")]
    ResponseParse { message: String, preview: String },

    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("Validation failed: {0}")]
    Validation(String),
}

impl From<LlmError> for ForgeError {
    fn from(err: LlmError) -> Self {
        ForgeError::Llm(err)
    }
}

pub type Result<T> = std::result::Result<T, ForgeError>;

fn last_error_suffix(last_error: &Option<LlmError>) -> String {
    last_error
        .as_ref()
        .map(|e| format!(": last error {}", e))
        .unwrap_or_default()
}

impl ForgeError {
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a parse error, keeping a short preview of the offending text
    pub fn response_parse(message: impl Into<String>, raw: &str) -> Self {
        Self::ResponseParse {
            message: message.into(),
            preview: raw.chars().take(200).collect(),
        }
    }
}
