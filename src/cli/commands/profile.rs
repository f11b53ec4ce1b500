//! Profile Command
//!
//! Create and inspect resume profile exports.
//!
//! Usage:
//!   careerforge profile new <path> [--name N] [--title T] [--force]
//!   careerforge profile check <path> [--output P]
//!   careerforge profile style <path> [--apply S] [--output P]

use std::fs;
use std::path::Path;

use crate::cli::ui::Output;
use crate::cli::util::{read_profile, write_profile};
use crate::types::{ForgeError, Result, ResumeProfile};

pub fn new(path: &Path, name: Option<String>, title: Option<String>, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(ForgeError::Validation(format!(
            "{} already exists. Use --force to overwrite",
            path.display()
        )));
    }

    let mut profile = ResumeProfile::new();
    if let Some(name) = name {
        profile.personal_info.full_name = name;
    }
    if let Some(title) = title {
        profile.personal_info.job_title = title;
    }
    write_profile(path, &profile)?;

    Output::new().success(&format!("Created profile {}", path.display()));
    Ok(())
}

/// Summarize a profile and report id problems; `output` receives a repaired copy
pub fn check(path: &Path, output_path: Option<&Path>) -> Result<()> {
    let content = fs::read_to_string(path)?;
    let raw: ResumeProfile = serde_json::from_str(&content)?;
    let output = Output::new();

    output.section(&format!("Profile: {}", path.display()));
    let info = &raw.personal_info;
    output.key_value("name", or_missing(&info.full_name));
    output.key_value("target role", or_missing(&info.job_title));
    output.key_value("experience", &raw.experience.len().to_string());
    output.key_value("education", &raw.education.len().to_string());
    output.key_value("projects", &raw.projects.len().to_string());
    output.key_value("skills", &raw.skills.len().to_string());
    output.key_value("custom", &raw.custom_sections.len().to_string());

    match raw.validate_ids() {
        Ok(()) => output.success("All entry ids are present and unique"),
        Err(e) => output.warning(&format!("{} (ids are reassigned on load)", e)),
    }

    if info.job_title.trim().is_empty() {
        output.warning("No target job title; insights and job search work best with one");
    }

    if let Some(dest) = output_path {
        let mut repaired = raw;
        repaired.ensure_ids();
        write_profile(dest, &repaired)?;
        output.success(&format!("Wrote normalized profile to {}", dest.display()));
    }
    Ok(())
}

/// Print the style override, or apply a style file
pub fn style(path: &Path, apply: Option<&Path>, output_path: Option<&Path>) -> Result<()> {
    let mut profile = read_profile(path)?;

    match apply {
        None => println!("{}", profile.style_to_json()?),
        Some(style_path) => {
            let style_json = fs::read_to_string(style_path)?;
            profile.apply_style_json(&style_json)?;
            let dest = output_path.unwrap_or(path);
            write_profile(dest, &profile)?;
            Output::new().success(&format!("Applied style to {}", dest.display()));
        }
    }
    Ok(())
}

fn or_missing(value: &str) -> &str {
    if value.trim().is_empty() {
        "(missing)"
    } else {
        value
    }
}
