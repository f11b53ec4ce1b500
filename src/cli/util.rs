//! CLI Common Utilities
//!
//! Shared initialization and file handling for CLI commands.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::ai::{AiGateway, Attachment};
use crate::career::CareerAssistant;
use crate::config::{Config, ConfigLoader};
use crate::types::{ForgeError, Result, ResumeProfile};

/// Command execution context
///
/// Holds the loaded configuration and a task runner built from it.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: Config,
    pub assistant: CareerAssistant,
}

impl CommandContext {
    /// Load config (explicit file or the usual layers) and build the gateway
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = ConfigLoader::load_with(config_path)?;
        let gateway = AiGateway::from_config(&config)?;

        debug!(
            providers = config.providers.len(),
            configured = config.configured_provider_count(),
            "Command context loaded"
        );

        Ok(Self {
            config,
            assistant: CareerAssistant::new(gateway),
        })
    }
}

/// Read a profile export (JSON); ids are re-established on load
pub fn read_profile(path: &Path) -> Result<ResumeProfile> {
    let content = fs::read_to_string(path).map_err(|e| {
        ForgeError::Validation(format!("Cannot read profile {}: {}", path.display(), e))
    })?;
    ResumeProfile::from_json(&content)
}

pub fn write_profile(path: &Path, profile: &ResumeProfile) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, profile.to_json()?)?;
    Ok(())
}

/// Text given inline or read from a file; exactly one must be present
pub fn read_text_input(inline: Option<String>, file: Option<&PathBuf>, what: &str) -> Result<String> {
    let text = match (inline, file) {
        (Some(_), Some(_)) => {
            return Err(ForgeError::Validation(format!(
                "Give the {} inline or as a file, not both",
                what
            )));
        }
        (Some(text), None) => text,
        (None, Some(path)) => fs::read_to_string(path).map_err(|e| {
            ForgeError::Validation(format!("Cannot read {} from {}: {}", what, path.display(), e))
        })?,
        (None, None) => {
            return Err(ForgeError::Validation(format!("A {} is required", what)));
        }
    };

    if text.trim().is_empty() {
        return Err(ForgeError::Validation(format!("The {} is empty", what)));
    }
    Ok(text)
}

/// Load a resume document as an inline attachment
pub fn read_attachment(path: &Path) -> Result<Attachment> {
    let data = fs::read(path).map_err(|e| {
        ForgeError::Validation(format!("Cannot read {}: {}", path.display(), e))
    })?;
    Ok(Attachment::new(data, mime_type_for(path)))
}

/// Media type from the file extension; unknown types are sent as octet-stream
pub fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("txt") | Some("md") => "text/plain",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}
