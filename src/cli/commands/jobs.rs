//! Jobs Command
//!
//! Usage:
//!   careerforge jobs <profile> [--location L] [-f json]

use std::path::Path;

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, read_profile};
use crate::types::{ForgeError, Result};

pub async fn run(
    ctx: &CommandContext,
    profile_path: &Path,
    location: Option<String>,
    format: &str,
) -> Result<()> {
    let profile = read_profile(profile_path)?;
    let location = location.unwrap_or_else(|| profile.personal_info.location.clone());
    if location.trim().is_empty() {
        return Err(ForgeError::Validation(
            "No location: pass --location or set one in the profile".to_string(),
        ));
    }

    let listings = ctx.assistant.search_jobs(&profile, &location).await?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&listings)?);
        return Ok(());
    }

    let output = Output::new();
    if listings.is_empty() {
        output.info("No openings found near that location");
        return Ok(());
    }

    output.header(&format!("{} openings near {}", listings.len(), location));
    for job in &listings {
        let score = job
            .match_score
            .map(|s| format!("{:.0}% match", s))
            .unwrap_or_else(|| "unscored".to_string());
        output.section(&format!("{} at {}", job.title, job.company));
        output.key_value("location", &job.location);
        output.key_value("fit", &score);
        if let Some(posted) = &job.posted_date {
            output.key_value("posted", posted);
        }
        output.key_value(
            "link",
            if job.has_link() {
                job.url.as_deref().unwrap_or_default()
            } else {
                "(not available)"
            },
        );
        if !job.reasoning.is_empty() {
            output.result(&format!("  {}", job.reasoning));
        }
    }
    Ok(())
}
