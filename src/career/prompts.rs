//! Prompt Builder System
//!
//! Standardized prompt construction for the career tasks, plus the response
//! schemas handed to providers that accept one (Gemini `responseSchema`).

use serde_json::{Value, json};

use crate::types::ResumeProfile;

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    /// Role definition with expertise area
    Role { expertise: String, task: String },
    /// Numbered objectives
    Objectives(Vec<String>),
    /// Ordered key-value context
    Context(Vec<(String, String)>),
    /// Raw text section with optional header
    Text {
        header: Option<String>,
        content: String,
    },
    /// Output format requirement
    Output(String),
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn role(mut self, expertise: &str, task: &str) -> Self {
        self.sections.push(PromptSection::Role {
            expertise: expertise.to_string(),
            task: task.to_string(),
        });
        self
    }

    pub fn objectives(mut self, objectives: Vec<&str>) -> Self {
        self.sections.push(PromptSection::Objectives(
            objectives.into_iter().map(String::from).collect(),
        ));
        self
    }

    /// Add a context item; items share one section in insertion order
    pub fn context_item(mut self, key: &str, value: &str) -> Self {
        if let Some(PromptSection::Context(ctx)) = self
            .sections
            .iter_mut()
            .find(|s| matches!(s, PromptSection::Context(_)))
        {
            ctx.push((key.to_string(), value.to_string()));
        } else {
            self.sections.push(PromptSection::Context(vec![(
                key.to_string(),
                value.to_string(),
            )]));
        }
        self
    }

    pub fn text(mut self, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: None,
            content: content.to_string(),
        });
        self
    }

    pub fn section(mut self, header: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: Some(header.to_string()),
            content: content.to_string(),
        });
        self
    }

    pub fn output(mut self, requirement: &str) -> Self {
        self.sections
            .push(PromptSection::Output(requirement.to_string()));
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Role { expertise, task } => {
                    prompt.push_str(&format!("Act as an expert {} {}.\n\n", expertise, task));
                }
                PromptSection::Objectives(objectives) => {
                    for (i, obj) in objectives.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, obj));
                    }
                    prompt.push('\n');
                }
                PromptSection::Context(ctx) => {
                    for (key, value) in ctx {
                        prompt.push_str(&format!("{}: {}\n", key, value));
                    }
                    prompt.push('\n');
                }
                PromptSection::Text { header, content } => {
                    if let Some(h) = header {
                        prompt.push_str(&format!("{}:\n", h));
                    }
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
                PromptSection::Output(requirement) => {
                    prompt.push_str(&requirement);
                    prompt.push_str("\n\n");
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

fn profile_json(profile: &ResumeProfile) -> String {
    serde_json::to_string(profile).unwrap_or_else(|_| "{}".to_string())
}

/// Preset prompts for each career task
pub struct CareerPrompts;

impl CareerPrompts {
    pub fn insights(profile: &ResumeProfile) -> String {
        PromptBuilder::new()
            .text(&format!(
                "Analyze this resume data and provide 3-4 highly specific, professional \"Smart Suggestions\". Focus on missing sections or skill gaps for \"{}\".",
                profile.personal_info.job_title
            ))
            .output("Return a JSON array of strings.")
            .section("Data", &profile_json(profile))
            .build()
    }

    pub fn section_content(section_title: &str, job_title: &str) -> String {
        format!(
            "Write a professional 2-3 sentence paragraph for a resume section titled \"{}\" for a candidate seeking a \"{}\" role. Use a high-impact, executive tone.",
            section_title, job_title
        )
    }

    pub fn star_rewrite(text: &str) -> String {
        PromptBuilder::new()
            .text("Rewrite the following work experience description using the STAR method (Situation, Task, Action, Result). Use strong active verbs and bullet points.")
            .section("Original text", text)
            .build()
    }

    /// ATS prompt; the resume itself travels as an attachment when `profile` is None
    pub fn ats_analysis(profile: Option<&ResumeProfile>, job_description: &str) -> String {
        let builder = PromptBuilder::new().role("ATS", "(Applicant Tracking System)");
        let builder = match profile {
            Some(profile) => builder
                .text("Analyze this resume JSON against the job description.")
                .section("Job Description", job_description)
                .section("Resume Data", &profile_json(profile)),
            None => builder
                .text("Analyze the provided resume file against the job description. Identify specific deficiencies and missing keywords.")
                .section("Job Description", job_description),
        };
        builder
            .output("Provide a detailed matching report in JSON format. Be critical and specific.")
            .build()
    }

    pub fn ats_fix(profile: &ResumeProfile, job_description: &str) -> String {
        PromptBuilder::new()
            .role("Resume Architect", "rewriting a resume for one job description")
            .objectives(vec![
                "REWRITE the summary and experience descriptions to match the job description",
                "Keep every role 100% truthful to the original",
                "Inject missing keywords from the job description into the bullets",
                "Keep every other field and every id unchanged",
            ])
            .output("Return the UPDATED ResumeData object in JSON format.")
            .section("Job Description", job_description)
            .section("Original Resume Data", &profile_json(profile))
            .build()
    }

    pub fn letter(profile: &ResumeProfile, job_description: &str, kind: &str) -> String {
        let background =
            serde_json::to_string(&profile.experience).unwrap_or_else(|_| "[]".to_string());
        PromptBuilder::new()
            .text(&format!(
                "Generate a high-end, professional {} letter for {}.",
                kind, profile.personal_info.full_name
            ))
            .context_item("Targeted Job Description", job_description)
            .context_item("Professional background context", &background)
            .build()
    }

    /// Prior turns are replayed in order before the new query
    pub fn assistant(query: &str, history: &[String]) -> String {
        let mut builder = PromptBuilder::new();
        for turn in history {
            builder = builder.text(turn);
        }
        builder.text(query).build()
    }

    pub fn professional_summary(profile: &ResumeProfile) -> String {
        PromptBuilder::new()
            .text("Generate a powerful 3-sentence professional summary for a resume. Focus on unique value proposition.")
            .context_item("Candidate", &profile.personal_info.full_name)
            .context_item("Role", &profile.personal_info.job_title)
            .context_item("Core Skills", &profile.skills.join(", "))
            .build()
    }

    pub fn skills(job_title: &str, current: &[String]) -> String {
        format!(
            "Suggest a list of 10 essential high-demand skills for a \"{}\". Return as a comma-separated list. Do not include: {}",
            job_title,
            current.join(", ")
        )
    }

    pub fn job_search(profile: &ResumeProfile, location: &str) -> String {
        let skills = profile.skills.join(", ");
        PromptBuilder::new()
            .role("technical recruiter", "scouting live job openings")
            .objectives(vec![
                "Search the web for currently open positions matching the candidate",
                "Prefer postings near the location given",
                "Score each posting 0-100 for how well it matches the candidate",
            ])
            .context_item("Target role", &profile.personal_info.job_title)
            .context_item("Skills", &skills)
            .context_item("Location", location)
            .output("Return ONLY a JSON array of objects with keys: title, company, location, matchScore, postedDate, reasoning, url.")
            .build()
    }
}

/// Response schemas (Gemini OpenAPI subset)
pub struct Schemas;

impl Schemas {
    pub fn string_array() -> Value {
        json!({
            "type": "ARRAY",
            "items": { "type": "STRING" }
        })
    }

    pub fn ats_report() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "score": { "type": "NUMBER", "description": "Matching score from 0 to 100" },
                "matchAnalysis": { "type": "STRING", "description": "Qualitative summary of the match" },
                "missingKeywords": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" },
                    "description": "Specific industry terms or skills missing"
                },
                "formattingIssues": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" },
                    "description": "Potential ATS reading hurdles"
                },
                "improvementSuggestions": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" },
                    "description": "Actionable steps to reach a 90+ score"
                }
            },
            "required": ["score", "matchAnalysis", "missingKeywords", "formattingIssues", "improvementSuggestions"]
        })
    }
}
