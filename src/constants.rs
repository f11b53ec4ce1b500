//! Global Constants
//!
//! Centralized constants for configuration and tuning.

/// AI gateway constants
pub mod gateway {
    /// Per-attempt timeout applied around each provider call (seconds)
    pub const ATTEMPT_TIMEOUT_SECS: u64 = 60;

    /// Characters removed from responses by markdown stripping
    pub const MARKDOWN_CHARS: &str = "*#";

    /// Default persona used when a request carries no system instruction
    pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are Career Forge AI, an expert resume writer and career strategist. Be precise, professional and concise.";
}

/// Provider endpoint and model defaults
pub mod provider {
    pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
    pub const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";
    pub const XAI_API_BASE: &str = "https://api.x.ai/v1";

    pub const GEMINI_DEFAULT_MODEL: &str = "gemini-2.5-flash";
    pub const OPENROUTER_DEFAULT_MODEL: &str = "google/gemini-2.0-flash-001";
    pub const XAI_DEFAULT_MODEL: &str = "grok-3";

    /// HTTP connect timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 10;

    /// Maximum attachment size accepted for inline upload (bytes)
    pub const MAX_ATTACHMENT_BYTES: usize = 20 * 1024 * 1024;
}

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "CAREERFORGE_";
