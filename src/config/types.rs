//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/careerforge/) and project (.careerforge/) level configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::ai::provider::{ProviderConfig, ProviderKind};
use crate::constants::gateway as gateway_constants;
use crate::types::{ForgeError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Gateway behaviour
    pub gateway: GatewayConfig,

    /// Response post-processing
    pub cleaning: CleaningConfig,

    /// Providers in priority order (first is tried first)
    pub providers: Vec<ProviderConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            gateway: GatewayConfig::default(),
            cleaning: CleaningConfig::default(),
            providers: default_providers(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<()> {
        if self.gateway.attempt_timeout_secs == 0 {
            return Err(ForgeError::Config(
                "gateway.attempt_timeout_secs must be greater than 0".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for provider in &self.providers {
            let name = provider.display_name();
            if !names.insert(name.to_string()) {
                return Err(ForgeError::Config(format!(
                    "Duplicate provider name '{}'. Set a distinct `name` for each entry",
                    name
                )));
            }

            if !(0.0..=2.0).contains(&provider.temperature) {
                return Err(ForgeError::Config(format!(
                    "Provider '{}' temperature must be between 0.0 and 2.0, got {}",
                    name, provider.temperature
                )));
            }

            if provider.timeout_secs == 0 {
                return Err(ForgeError::Config(format!(
                    "Provider '{}' timeout_secs must be greater than 0",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Number of providers holding a usable credential
    pub fn configured_provider_count(&self) -> usize {
        self.providers.iter().filter(|p| p.has_credential()).count()
    }
}

// =============================================================================
// Gateway Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Upper bound on a single provider attempt, in seconds
    pub attempt_timeout_secs: u64,

    /// System instruction used when a request does not carry one
    pub default_persona: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            attempt_timeout_secs: gateway_constants::ATTEMPT_TIMEOUT_SECS,
            default_persona: gateway_constants::DEFAULT_SYSTEM_INSTRUCTION.to_string(),
        }
    }
}

// =============================================================================
// Cleaning Configuration
// =============================================================================

/// Post-processing applied to provider text, per response mode
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CleaningConfig {
    /// Remove markdown emphasis/heading characters from free-text responses
    pub strip_markdown_text: bool,

    /// Remove markdown characters from JSON-mode responses
    pub strip_markdown_json: bool,

    /// Remove ``` code fences from JSON-mode responses
    pub strip_code_fences: bool,

    /// The characters removed by markdown stripping
    pub markdown_chars: String,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            strip_markdown_text: true,
            strip_markdown_json: true,
            strip_code_fences: true,
            markdown_chars: gateway_constants::MARKDOWN_CHARS.to_string(),
        }
    }
}

// =============================================================================
// Default provider order
// =============================================================================

/// OpenRouter first, then xAI Grok, then native Gemini
pub fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig {
            kind: ProviderKind::OpenRouter,
            api_key_env: Some("OPENROUTER_API_KEY".to_string()),
            ..ProviderConfig::default()
        },
        ProviderConfig {
            kind: ProviderKind::Xai,
            api_key_env: Some("XAI_API_KEY".to_string()),
            ..ProviderConfig::default()
        },
        ProviderConfig {
            kind: ProviderKind::Gemini,
            api_key_env: Some("GEMINI_API_KEY".to_string()),
            ..ProviderConfig::default()
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.providers.len(), 3);
        assert_eq!(config.providers[0].kind, ProviderKind::OpenRouter);
        assert_eq!(config.providers[2].kind, ProviderKind::Gemini);
    }

    #[test]
    fn test_defaults_hold_no_credentials() {
        let config = Config::default();
        assert_eq!(config.configured_provider_count(), 0);
    }

    #[test]
    fn test_zero_attempt_timeout_rejected() {
        let mut config = Config::default();
        config.gateway.attempt_timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ForgeError::Config(_))));
    }

    #[test]
    fn test_duplicate_provider_names_rejected() {
        let mut config = Config::default();
        config.providers.push(ProviderConfig {
            kind: ProviderKind::Gemini,
            ..ProviderConfig::default()
        });
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Duplicate provider name 'gemini'"));

        config.providers[3].name = Some("gemini-backup".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_temperature_range() {
        let mut config = Config::default();
        config.providers[0].temperature = 3.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_cleaning_defaults() {
        let cleaning = CleaningConfig::default();
        assert!(cleaning.strip_markdown_text);
        assert!(cleaning.strip_code_fences);
        assert_eq!(cleaning.markdown_chars, "*#");
    }
}
