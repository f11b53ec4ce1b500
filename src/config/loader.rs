//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/careerforge/config.toml)
//! 3. Project config (.careerforge/config.toml)
//! 4. Environment variables (CAREERFORGE_* prefix, `__` separates sections)
//!
//! Provider credentials named by `api_key_env` are resolved here, once, so
//! the gateway never reads the process environment while serving a request.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::constants::ENV_PREFIX;
use crate::types::{ForgeError, Result};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        Self::load_with(None)
    }

    /// Load configuration; an explicit file replaces the project config layer
    pub fn load_with(explicit: Option<&Path>) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ForgeError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                debug!("Loading config from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
            None => {
                let project_path = Self::project_config_path();
                if project_path.exists() {
                    debug!("Loading project config from: {}", project_path.display());
                    figment = figment.merge(Toml::file(&project_path));
                }
            }
        }

        // e.g. CAREERFORGE_GATEWAY__ATTEMPT_TIMEOUT_SECS -> gateway.attempt_timeout_secs
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__").lowercase(true));

        let mut config = Self::extract(figment)?;
        Self::resolve_credentials(&mut config);

        Ok(config)
    }

    /// Extract and validate a merged figment
    fn extract(figment: Figment) -> Result<Config> {
        let config: Config = figment
            .extract()
            .map_err(|e| ForgeError::Config(format!("Configuration error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Fill `api_key` from the variable named by `api_key_env` where no key is set inline
    pub fn resolve_credentials(config: &mut Config) {
        for provider in &mut config.providers {
            if provider.has_credential() {
                continue;
            }
            if let Some(var) = provider.api_key_env.as_deref()
                && let Ok(value) = env::var(var)
                && !value.trim().is_empty()
            {
                debug!(provider = %provider.display_name(), env = var, "Resolved provider credential");
                provider.api_key = Some(value);
            }
        }
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/careerforge/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("careerforge"))
    }

    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    pub fn project_config_path() -> PathBuf {
        PathBuf::from(".careerforge/config.toml")
    }

    pub fn project_dir() -> PathBuf {
        PathBuf::from(".careerforge")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Render the effective configuration as TOML or JSON.
    /// Credentials are never serialized.
    pub fn render_config(config: &Config, as_json: bool) -> Result<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(config)?)
        } else {
            toml::to_string_pretty(config).map_err(|e| ForgeError::Config(e.to_string()))
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Write the default config to `dir/config.toml`, returning its path
    pub fn init_at(dir: &Path, force: bool) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;

        let config_path = dir.join("config.toml");
        if !config_path.exists() || force {
            fs::write(&config_path, Self::default_config_toml())?;
            info!("Created config: {}", config_path.display());
        } else {
            info!("Config exists: {}", config_path.display());
        }

        Ok(config_path)
    }

    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            ForgeError::Config("Cannot determine global config directory".to_string())
        })?;
        Self::init_at(&global_dir, force)
    }

    pub fn init_project(force: bool) -> Result<PathBuf> {
        Self::init_at(&Self::project_dir(), force)
    }

    /// Default config content (TOML)
    fn default_config_toml() -> String {
        r#"# Career Forge Configuration
# Providers are tried in the order listed; the first success wins.
# Keep keys out of this file: name the environment variable in `api_key_env`.

version = "1.0"

[gateway]
attempt_timeout_secs = 60

[cleaning]
strip_markdown_text = true
strip_markdown_json = true
strip_code_fences = true
markdown_chars = "*#"

[[providers]]
kind = "openrouter"
model = "google/gemini-2.0-flash-001"
api_key_env = "OPENROUTER_API_KEY"

[[providers]]
kind = "xai"
model = "grok-3"
api_key_env = "XAI_API_KEY"

[[providers]]
kind = "gemini"
model = "gemini-2.5-flash"
api_key_env = "GEMINI_API_KEY"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::ProviderKind;
    use tempfile::TempDir;

    /// Defaults plus one file, without the global, project or env layers
    fn load_file(path: &Path) -> Result<Config> {
        ConfigLoader::extract(
            Figment::new()
                .merge(Serialized::defaults(Config::default()))
                .merge(Toml::file(path)),
        )
    }

    #[test]
    fn test_default_config_toml_parses() {
        let temp_dir = TempDir::new().unwrap();
        let path = ConfigLoader::init_at(temp_dir.path(), false).unwrap();

        let config = load_file(&path).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.providers.len(), 3);
        assert_eq!(config.providers[1].kind, ProviderKind::Xai);
        assert_eq!(config.providers[1].model.as_deref(), Some("grok-3"));
    }

    #[test]
    fn test_init_does_not_overwrite_without_force() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "version = \"custom\"\n").unwrap();

        ConfigLoader::init_at(temp_dir.path(), false).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("custom"));

        ConfigLoader::init_at(temp_dir.path(), true).unwrap();
        assert!(!fs::read_to_string(&path).unwrap().contains("custom"));
    }

    #[test]
    fn test_provider_order_follows_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[[providers]]
kind = "gemini"
api_key = "inline-key"

[[providers]]
kind = "openrouter"
"#,
        )
        .unwrap();

        let config = load_file(&path).unwrap();
        assert_eq!(config.providers.len(), 2);
        assert_eq!(config.providers[0].kind, ProviderKind::Gemini);
        assert!(config.providers[0].has_credential());
        assert!(!config.providers[1].has_credential());
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[gateway]\nattempt_timeout_secs = 0\n").unwrap();

        assert!(matches!(
            load_file(&path),
            Err(ForgeError::Config(_))
        ));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let err = ConfigLoader::load_with(Some(Path::new("/nonexistent/careerforge.toml")))
            .unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_resolve_credentials_from_named_env() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[[providers]]
kind = "gemini"
api_key_env = "CAREERFORGE_TEST_RESOLVE_GEMINI_KEY"
"#,
        )
        .unwrap();

        // SAFETY: variable name is unique to this test
        unsafe {
            env::set_var("CAREERFORGE_TEST_RESOLVE_GEMINI_KEY", "from-env");
        }
        let mut config = load_file(&path).unwrap();
        ConfigLoader::resolve_credentials(&mut config);
        unsafe {
            env::remove_var("CAREERFORGE_TEST_RESOLVE_GEMINI_KEY");
        }

        assert_eq!(config.providers[0].api_key.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_render_config_hides_keys() {
        let mut config = Config::default();
        config.providers[0].api_key = Some("sk-secret".to_string());

        let toml_out = ConfigLoader::render_config(&config, false).unwrap();
        let json_out = ConfigLoader::render_config(&config, true).unwrap();
        assert!(!toml_out.contains("sk-secret"));
        assert!(!json_out.contains("sk-secret"));
        assert!(toml_out.contains("openrouter"));
    }
}
