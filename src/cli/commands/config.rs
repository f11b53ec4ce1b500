//! Config Command
//!
//! Manage Career Forge configuration.
//!
//! Usage:
//!   careerforge config show [-f json]
//!   careerforge config path
//!   careerforge config init [-g] [--force]
//!   careerforge config check

use std::path::Path;

use crate::ai::{AiGateway, GatewayRequest};
use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::types::Result;

/// Show the effective configuration (merged from all sources); keys are never printed
pub fn show(config_path: Option<&Path>, format: &str) -> Result<()> {
    let config = ConfigLoader::load_with(config_path)?;
    let rendered = ConfigLoader::render_config(&config, format == "json")?;
    println!("{}", rendered);

    let output = Output::new();
    for provider in &config.providers {
        let status = if provider.has_credential() {
            "credential set"
        } else {
            "no credential (skipped)"
        };
        output.info(&format!("{}: {}", provider.display_name(), status));
    }
    Ok(())
}

/// Show configuration file paths
pub fn path(config_path: Option<&Path>) -> Result<()> {
    let output = Output::new();
    output.section("Configuration files");

    if let Some(explicit) = config_path {
        output.key_value("explicit", &describe(explicit));
    }
    match ConfigLoader::global_config_path() {
        Some(global) => output.key_value("global", &describe(&global)),
        None => output.key_value("global", "(cannot determine home directory)"),
    }
    output.key_value("project", &describe(&ConfigLoader::project_config_path()));
    Ok(())
}

fn describe(path: &Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found)", path.display())
    }
}

pub fn init(global: bool, force: bool) -> Result<()> {
    let path = if global {
        ConfigLoader::init_global(force)?
    } else {
        ConfigLoader::init_project(force)?
    };
    let output = Output::new();
    output.success(&format!("Configuration ready at {}", path.display()));
    output.info("Set OPENROUTER_API_KEY, XAI_API_KEY or GEMINI_API_KEY to enable providers");
    Ok(())
}

/// Send a one-line probe through the gateway and show every attempt
pub async fn check(config_path: Option<&Path>) -> Result<()> {
    let config = ConfigLoader::load_with(config_path)?;
    let gateway = AiGateway::from_config(&config)?;
    let output = Output::new();

    if gateway.configured_count() == 0 {
        output.warning("No provider has a credential; every request will fail");
    }

    let request = GatewayRequest::text("Reply with the single word OK.");
    match gateway.execute(&request).await {
        Ok((response, stats)) => {
            output.gateway_stats(&stats);
            output.success(&format!("Gateway answered via {}", response.provider));
            Ok(())
        }
        Err(err) => {
            output.error("No provider answered");
            Err(err)
        }
    }
}
