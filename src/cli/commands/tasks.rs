//! AI Task Commands
//!
//! Thin wrappers over `CareerAssistant`: read inputs, run one task, print the
//! result to stdout.
//!
//! Usage:
//!   careerforge insights <profile>
//!   careerforge summary <profile>
//!   careerforge skills <profile> [--title T]
//!   careerforge section <title> --job-title T
//!   careerforge optimize [TEXT] [--file F]
//!   careerforge letter <profile> --kind cover|referral|thank-you (--jd TEXT | --jd-file F)
//!   careerforge ask <query> [--history F]

use std::fs;
use std::path::{Path, PathBuf};

use crate::career::LetterKind;
use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, read_profile, read_text_input};
use crate::types::{ForgeError, Result};

pub async fn insights(ctx: &CommandContext, profile_path: &Path) -> Result<()> {
    let profile = read_profile(profile_path)?;
    let suggestions = ctx.assistant.insights(&profile).await;

    let output = Output::new();
    output.header("Smart Suggestions");
    output.bullets(&suggestions);
    Ok(())
}

pub async fn summary(ctx: &CommandContext, profile_path: &Path) -> Result<()> {
    let profile = read_profile(profile_path)?;
    let text = ctx.assistant.professional_summary(&profile).await?;
    Output::new().result(&text);
    Ok(())
}

pub async fn skills(ctx: &CommandContext, profile_path: &Path, title: Option<String>) -> Result<()> {
    let profile = read_profile(profile_path)?;
    let job_title = title.unwrap_or_else(|| profile.personal_info.job_title.clone());
    if job_title.trim().is_empty() {
        return Err(ForgeError::Validation(
            "No job title: pass --title or set one in the profile".to_string(),
        ));
    }

    let suggested = ctx.assistant.suggest_skills(&job_title, &profile.skills).await?;

    let output = Output::new();
    if suggested.is_empty() {
        output.info("No new skills suggested");
    } else {
        output.header(&format!("Suggested skills for {}", job_title));
        output.bullets(&suggested);
    }
    Ok(())
}

pub async fn section(ctx: &CommandContext, title: &str, job_title: &str) -> Result<()> {
    let text = ctx.assistant.suggest_section(title, job_title).await?;
    Output::new().result(&text);
    Ok(())
}

pub async fn optimize(ctx: &CommandContext, text: Option<String>, file: Option<&PathBuf>) -> Result<()> {
    let text = read_text_input(text, file, "experience description")?;
    let rewritten = ctx.assistant.optimize_experience(&text).await?;
    Output::new().result(&rewritten);
    Ok(())
}

pub async fn letter(
    ctx: &CommandContext,
    profile_path: &Path,
    kind: LetterKind,
    jd: Option<String>,
    jd_file: Option<&PathBuf>,
) -> Result<()> {
    let profile = read_profile(profile_path)?;
    let job_description = read_text_input(jd, jd_file, "job description")?;
    let letter = ctx
        .assistant
        .generate_letter(&profile, &job_description, kind)
        .await?;
    Output::new().result(&letter);
    Ok(())
}

/// `history` is a text file with one earlier turn per line
pub async fn ask(ctx: &CommandContext, query: &str, history: Option<&Path>) -> Result<()> {
    let turns = match history {
        Some(path) => load_history(path)?,
        None => Vec::new(),
    };
    let answer = ctx.assistant.assistant(query, &turns).await?;
    Output::new().result(&answer);
    Ok(())
}

fn load_history(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
