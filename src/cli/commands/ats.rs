//! ATS Commands
//!
//! Usage:
//!   careerforge ats [PROFILE] [--file RESUME.pdf] (--jd TEXT | --jd-file F) [-f json]
//!   careerforge fix <profile> (--jd TEXT | --jd-file F) --output P

use std::path::{Path, PathBuf};

use crate::career::{AtsReport, AtsSource};
use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, read_attachment, read_profile, read_text_input, write_profile};
use crate::types::{ForgeError, Result};

pub struct AtsArgs {
    pub profile: Option<PathBuf>,
    pub file: Option<PathBuf>,
    pub jd: Option<String>,
    pub jd_file: Option<PathBuf>,
    pub format: String,
}

pub async fn analyze(ctx: &CommandContext, args: AtsArgs) -> Result<()> {
    let job_description = read_text_input(args.jd, args.jd_file.as_ref(), "job description")?;

    let report = match (&args.profile, &args.file) {
        (Some(_), Some(_)) => {
            return Err(ForgeError::Validation(
                "Analyze either a profile or a --file, not both".to_string(),
            ));
        }
        (Some(path), None) => {
            let profile = read_profile(path)?;
            ctx.assistant
                .analyze_ats(AtsSource::Profile(&profile), &job_description)
                .await?
        }
        (None, Some(path)) => {
            let attachment = read_attachment(path)?;
            ctx.assistant
                .analyze_ats(AtsSource::Document(attachment), &job_description)
                .await?
        }
        (None, None) => {
            return Err(ForgeError::Validation(
                "Pass a profile path or --file with a resume document".to_string(),
            ));
        }
    };

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &AtsReport) {
    let output = Output::new();
    output.header(&format!(
        "ATS score: {:.0}/100 ({})",
        report.score,
        report.rating()
    ));
    output.result(&format!("\n{}", report.match_analysis));

    for (title, items) in [
        ("Missing keywords", &report.missing_keywords),
        ("Formatting issues", &report.formatting_issues),
        ("Improvements", &report.improvement_suggestions),
    ] {
        if !items.is_empty() {
            output.section(title);
            output.bullets(items);
        }
    }
}

pub async fn fix(
    ctx: &CommandContext,
    profile_path: &Path,
    jd: Option<String>,
    jd_file: Option<&PathBuf>,
    output_path: &Path,
) -> Result<()> {
    let profile = read_profile(profile_path)?;
    let job_description = read_text_input(jd, jd_file, "job description")?;

    let updated = ctx
        .assistant
        .apply_ats_fixes(&profile, &job_description)
        .await?;
    write_profile(output_path, &updated)?;

    Output::new().success(&format!(
        "Wrote optimized profile to {}",
        output_path.display()
    ));
    Ok(())
}
