//! Career Tasks
//!
//! The product's AI features built on top of the gateway. Each task builds a
//! prompt, calls the gateway once and post-processes the cleaned reply.

pub mod ats;
pub mod extract;
pub mod jobs;
pub mod prompts;

pub use ats::{AtsRating, AtsReport, AtsSource};
pub use jobs::JobListing;
pub use prompts::{CareerPrompts, PromptBuilder, Schemas};

use serde_json::Value;
use std::str::FromStr;
use tracing::{info, instrument, warn};

use crate::ai::{AiGateway, GatewayRequest};
use crate::types::{ForgeError, Result, ResumeProfile};

/// Persona for the free-form assistant chat
pub const ASSISTANT_PERSONA: &str = "You are the Career Forge AI, a world-class career strategist and resume architect. Help the user with job search advice, resume tips, or interview prep. Keep responses concise and high-impact.";

/// Returned by `insights` whenever the gateway or parsing fails
pub const FALLBACK_INSIGHTS: [&str; 3] = [
    "Quantify your achievements with numbers.",
    "Add a certifications section.",
    "Refine your executive summary for keywords.",
];

/// Letter flavours offered by the letter generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LetterKind {
    #[default]
    Cover,
    Referral,
    ThankYou,
}

impl LetterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cover => "cover",
            Self::Referral => "referral",
            Self::ThankYou => "thank-you",
        }
    }
}

impl std::fmt::Display for LetterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LetterKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cover" => Ok(Self::Cover),
            "referral" => Ok(Self::Referral),
            "thank-you" | "thankyou" | "thank_you" => Ok(Self::ThankYou),
            _ => Err(format!(
                "Invalid letter kind '{}'. Valid values: cover, referral, thank-you",
                s
            )),
        }
    }
}

/// Career task runner over a shared gateway
#[derive(Debug, Clone)]
pub struct CareerAssistant {
    gateway: AiGateway,
}

impl CareerAssistant {
    pub fn new(gateway: AiGateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &AiGateway {
        &self.gateway
    }

    /// 3-4 targeted suggestions; never fails
    #[instrument(skip_all)]
    pub async fn insights(&self, profile: &ResumeProfile) -> Vec<String> {
        let request = GatewayRequest::json(CareerPrompts::insights(profile))
            .with_schema(Schemas::string_array());

        let parsed = match self.gateway.generate(&request).await {
            Ok(response) => extract::parse_reply::<Value>(&response.text).map(string_list),
            Err(e) => Err(e),
        };

        match parsed {
            Ok(list) if !list.is_empty() => list,
            Ok(_) => {
                warn!("Insights reply held no suggestions, using defaults");
                fallback_insights()
            }
            Err(e) => {
                warn!(error = %e, "Insights failed, using defaults");
                fallback_insights()
            }
        }
    }

    pub async fn suggest_section(&self, section_title: &str, job_title: &str) -> Result<String> {
        self.gateway
            .generate_text(CareerPrompts::section_content(section_title, job_title))
            .await
    }

    /// STAR-method rewrite of an experience description
    pub async fn optimize_experience(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(ForgeError::Validation(
                "Experience description is empty".to_string(),
            ));
        }
        self.gateway
            .generate_text(CareerPrompts::star_rewrite(text))
            .await
    }

    #[instrument(skip_all)]
    pub async fn analyze_ats(
        &self,
        source: AtsSource<'_>,
        job_description: &str,
    ) -> Result<AtsReport> {
        if job_description.trim().is_empty() {
            return Err(ForgeError::Validation(
                "A job description is required for ATS analysis".to_string(),
            ));
        }

        let request = match source {
            AtsSource::Profile(profile) => {
                GatewayRequest::json(CareerPrompts::ats_analysis(Some(profile), job_description))
            }
            AtsSource::Document(attachment) => {
                GatewayRequest::json(CareerPrompts::ats_analysis(None, job_description))
                    .with_attachment(attachment)
            }
        }
        .with_schema(Schemas::ats_report());

        let response = self.gateway.generate(&request).await?;
        let report = extract::parse_reply::<AtsReport>(&response.text)?.normalized();

        info!(score = report.score, provider = %response.provider, "ATS analysis complete");
        Ok(report)
    }

    /// Rewrite summary and experience against a job description.
    /// The returned profile has unique ids even if the model dropped or duplicated them.
    #[instrument(skip_all)]
    pub async fn apply_ats_fixes(
        &self,
        profile: &ResumeProfile,
        job_description: &str,
    ) -> Result<ResumeProfile> {
        let request = GatewayRequest::json(CareerPrompts::ats_fix(profile, job_description))
            .preserving_markdown();
        let response = self.gateway.generate(&request).await?;

        let mut updated = extract::parse_reply::<ResumeProfile>(&response.text)?;
        // Content rewrite only; styling is never the model's to change
        updated.custom_style = profile.custom_style.clone();
        updated.ensure_ids();
        Ok(updated)
    }

    pub async fn generate_letter(
        &self,
        profile: &ResumeProfile,
        job_description: &str,
        kind: LetterKind,
    ) -> Result<String> {
        self.gateway
            .generate_text(CareerPrompts::letter(profile, job_description, kind.as_str()))
            .await
    }

    /// Assistant chat; `history` holds earlier turns, oldest first
    pub async fn assistant(&self, query: &str, history: &[String]) -> Result<String> {
        let request = GatewayRequest::text(CareerPrompts::assistant(query, history))
            .with_system_instruction(ASSISTANT_PERSONA);
        Ok(self.gateway.generate(&request).await?.text)
    }

    pub async fn professional_summary(&self, profile: &ResumeProfile) -> Result<String> {
        self.gateway
            .generate_text(CareerPrompts::professional_summary(profile))
            .await
    }

    /// New skills for `job_title`, excluding ones already held (case-insensitive)
    pub async fn suggest_skills(&self, job_title: &str, current: &[String]) -> Result<Vec<String>> {
        let reply = self
            .gateway
            .generate_text(CareerPrompts::skills(job_title, current))
            .await?;
        Ok(split_skills(&reply, current))
    }

    /// Search-grounded job scan around `location`
    #[instrument(skip(self, profile))]
    pub async fn search_jobs(
        &self,
        profile: &ResumeProfile,
        location: &str,
    ) -> Result<Vec<JobListing>> {
        if profile.personal_info.job_title.trim().is_empty() {
            return Err(ForgeError::Validation(
                "Set a target job title in the profile before searching".to_string(),
            ));
        }

        let request =
            GatewayRequest::json(CareerPrompts::job_search(profile, location)).with_grounding();
        let response = self.gateway.generate(&request).await?;

        let value = extract::parse_reply::<Value>(&response.text)?;
        let mut listings = jobs::listings_from_value(value);
        jobs::attach_sources(&mut listings, &response.grounding);

        info!(
            listings = listings.len(),
            sources = response.grounding.len(),
            "Job search complete"
        );
        Ok(listings)
    }
}

fn fallback_insights() -> Vec<String> {
    FALLBACK_INSIGHTS.iter().map(|s| s.to_string()).collect()
}

/// Strings from an array, or from the first array inside an object
fn string_list(value: Value) -> Vec<String> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => map
            .into_iter()
            .find_map(|(_, v)| match v {
                Value::Array(items) => Some(items),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        })
        .collect()
}

fn split_skills(reply: &str, current: &[String]) -> Vec<String> {
    let existing: Vec<String> = current.iter().map(|s| s.trim().to_lowercase()).collect();
    reply
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| !existing.contains(&s.to_lowercase()))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::{MockBehavior, MockProvider};
    use crate::ai::{Attachment, GroundingSource, SharedProvider};
    use crate::types::{ErrorCategory, Experience};
    use std::sync::Arc;

    fn assistant_with(providers: Vec<Arc<MockProvider>>) -> CareerAssistant {
        let shared: Vec<SharedProvider> = providers
            .into_iter()
            .map(|p| p as SharedProvider)
            .collect();
        CareerAssistant::new(AiGateway::new(shared))
    }

    fn sample_profile() -> ResumeProfile {
        let mut profile = ResumeProfile::new();
        profile.personal_info.full_name = "Ada Lovelace".to_string();
        profile.personal_info.job_title = "Data Engineer".to_string();
        profile.skills = vec!["SQL".to_string(), "Python".to_string()];
        profile.add_experience(Experience {
            company: "Analytical Engines".to_string(),
            role: "Engineer".to_string(),
            description: "Built pipelines".to_string(),
            ..Default::default()
        });
        profile
    }

    #[tokio::test]
    async fn test_insights_parses_fenced_array() {
        let provider = Arc::new(MockProvider::replying(
            "a",
            "```json\n[\"Add metrics to each role\", \"List Airflow\", \"Add a projects section\"]\n```",
        ));
        let assistant = assistant_with(vec![provider.clone()]);

        let insights = assistant.insights(&sample_profile()).await;

        assert_eq!(insights.len(), 3);
        assert_eq!(insights[1], "List Airflow");
        let seen = provider.last_request().unwrap();
        assert!(seen.json_mode);
        assert!(seen.prompt.contains("\"Data Engineer\""));
    }

    #[tokio::test]
    async fn test_insights_falls_back_when_exhausted() {
        let assistant = assistant_with(vec![Arc::new(MockProvider::failing(
            "a",
            ErrorCategory::RateLimit,
        ))]);
        let insights = assistant.insights(&sample_profile()).await;
        assert_eq!(insights, fallback_insights());
    }

    #[tokio::test]
    async fn test_insights_falls_back_on_unparseable_reply() {
        let assistant =
            assistant_with(vec![Arc::new(MockProvider::replying("a", "I think you are great"))]);
        let insights = assistant.insights(&sample_profile()).await;
        assert_eq!(insights.len(), 3);
        assert_eq!(insights[0], FALLBACK_INSIGHTS[0]);
    }

    #[tokio::test]
    async fn test_insights_accepts_wrapped_object() {
        let assistant = assistant_with(vec![Arc::new(MockProvider::replying(
            "a",
            r#"{"suggestions": ["One", "Two", "Three", "Four"]}"#,
        ))]);
        assert_eq!(assistant.insights(&sample_profile()).await.len(), 4);
    }

    #[tokio::test]
    async fn test_suggest_skills_filters_existing() {
        let assistant = assistant_with(vec![Arc::new(MockProvider::replying(
            "a",
            "Spark, sql , Airflow,, dbt, PYTHON, Kafka",
        ))]);

        let skills = assistant
            .suggest_skills("Data Engineer", &["SQL".to_string(), "Python".to_string()])
            .await
            .unwrap();

        assert_eq!(skills, vec!["Spark", "Airflow", "dbt", "Kafka"]);
    }

    #[tokio::test]
    async fn test_analyze_ats_clamps_score() {
        let provider = Arc::new(MockProvider::replying(
            "a",
            r#"{"score": 130, "matchAnalysis": "Great", "missingKeywords": ["Go"], "formattingIssues": [], "improvementSuggestions": []}"#,
        ));
        let assistant = assistant_with(vec![provider.clone()]);
        let profile = sample_profile();

        let report = assistant
            .analyze_ats(AtsSource::Profile(&profile), "Backend role using Go")
            .await
            .unwrap();

        assert_eq!(report.score, 100.0);
        assert_eq!(report.missing_keywords, vec!["Go"]);
        assert!(provider.last_request().unwrap().schema.is_some());
    }

    #[tokio::test]
    async fn test_analyze_ats_document_sends_attachment() {
        let provider = Arc::new(MockProvider::replying(
            "a",
            r#"{"score": 55, "matchAnalysis": "Partial"}"#,
        ));
        let assistant = assistant_with(vec![provider.clone()]);

        let report = assistant
            .analyze_ats(
                AtsSource::Document(Attachment::new(b"%PDF-1.7".to_vec(), "application/pdf")),
                "Analyst",
            )
            .await
            .unwrap();

        assert_eq!(report.rating(), AtsRating::Weak);
        let seen = provider.last_request().unwrap();
        assert_eq!(seen.attachment.unwrap().mime_type, "application/pdf");
        assert!(!seen.prompt.contains("fullName"));
    }

    #[tokio::test]
    async fn test_analyze_ats_propagates_failures() {
        let assistant =
            assistant_with(vec![Arc::new(MockProvider::replying("a", "score is high"))]);
        let profile = sample_profile();
        let err = assistant
            .analyze_ats(AtsSource::Profile(&profile), "Analyst")
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::ResponseParse { .. }));

        let exhausted = assistant_with(vec![]);
        let err = exhausted
            .analyze_ats(AtsSource::Profile(&profile), "Analyst")
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::AllProvidersExhausted { .. }));
    }

    #[tokio::test]
    async fn test_analyze_ats_requires_job_description() {
        let provider = Arc::new(MockProvider::replying("a", "{}"));
        let assistant = assistant_with(vec![provider.clone()]);
        let profile = sample_profile();
        let err = assistant
            .analyze_ats(AtsSource::Profile(&profile), "  ")
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::Validation(_)));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_apply_ats_fixes_reestablishes_ids() {
        let reply = r#"{
            "personalInfo": {"fullName": "Ada Lovelace", "jobTitle": "Data Engineer"},
            "summary": "Data engineer with Airflow and Spark",
            "experience": [
                {"id": "", "company": "Analytical Engines", "role": "Engineer", "description": "Built Airflow pipelines"},
                {"id": "dup", "company": "B", "role": "Dev"},
                {"id": "dup", "company": "C", "role": "Dev"}
            ],
            "skills": ["SQL", "Python", "Airflow"]
        }"#;
        let assistant = assistant_with(vec![Arc::new(MockProvider::replying("a", reply))]);

        let updated = assistant
            .apply_ats_fixes(&sample_profile(), "Airflow role")
            .await
            .unwrap();

        assert_eq!(updated.summary, "Data engineer with Airflow and Spark");
        assert_eq!(updated.experience.len(), 3);
        assert!(updated.validate_ids().is_ok());
        assert!(updated.experience.iter().all(|e| !e.id.is_empty()));
    }

    #[tokio::test]
    async fn test_apply_ats_fixes_keeps_hash_content_and_style() {
        let mut profile = sample_profile();
        profile.skills = vec!["C#".to_string(), "Rust".to_string()];
        profile.custom_style = Some(crate::types::CustomStyle::default());
        let reply = format!("```json\n{}\n```", profile.to_json().unwrap());
        let assistant = assistant_with(vec![Arc::new(MockProvider::replying("a", &reply))]);

        let updated = assistant
            .apply_ats_fixes(&profile, "C# backend role")
            .await
            .unwrap();

        assert_eq!(updated.skills, vec!["C#".to_string(), "Rust".to_string()]);
        assert_eq!(updated.custom_style.unwrap().primary_color, "#4f46e5");
    }

    #[tokio::test]
    async fn test_apply_ats_fixes_ignores_model_style_changes() {
        let mut profile = sample_profile();
        profile.custom_style = Some(crate::types::CustomStyle::default());
        let mut rewritten = profile.clone();
        if let Some(style) = rewritten.custom_style.as_mut() {
            style.primary_color = "#000000".to_string();
        }
        let reply = rewritten.to_json().unwrap();
        let assistant = assistant_with(vec![Arc::new(MockProvider::replying("a", &reply))]);

        let updated = assistant.apply_ats_fixes(&profile, "Any role").await.unwrap();

        assert_eq!(updated.custom_style, profile.custom_style);
    }

    #[tokio::test]
    async fn test_generate_letter_names_kind() {
        let provider = Arc::new(MockProvider::replying("a", "Dear Hiring Manager,"));
        let assistant = assistant_with(vec![provider.clone()]);

        let letter = assistant
            .generate_letter(&sample_profile(), "Data role", LetterKind::ThankYou)
            .await
            .unwrap();

        assert_eq!(letter, "Dear Hiring Manager,");
        let prompt = provider.last_request().unwrap().prompt;
        assert!(prompt.contains("thank-you letter for Ada Lovelace"));
        assert!(prompt.contains("Analytical Engines"));
    }

    #[tokio::test]
    async fn test_assistant_uses_persona() {
        let provider = Arc::new(MockProvider::replying("a", "Practice STAR stories."));
        let assistant = assistant_with(vec![provider.clone()]);

        let answer = assistant
            .assistant("How do I prepare?", &["I have an interview".to_string()])
            .await
            .unwrap();

        assert_eq!(answer, "Practice STAR stories.");
        let seen = provider.last_request().unwrap();
        assert_eq!(seen.system_instruction, ASSISTANT_PERSONA);
        assert!(seen.prompt.starts_with("I have an interview"));
    }

    #[tokio::test]
    async fn test_optimize_experience_rejects_empty_text() {
        let provider = Arc::new(MockProvider::replying("a", "- Led"));
        let assistant = assistant_with(vec![provider.clone()]);
        assert!(assistant.optimize_experience("   ").await.is_err());
        assert_eq!(provider.calls(), 0);

        let rewritten = assistant.optimize_experience("Led a team").await.unwrap();
        assert_eq!(rewritten, "- Led");
    }

    #[tokio::test]
    async fn test_search_jobs_skips_chat_provider_for_grounding() {
        use crate::ai::{ChatProvider, ProviderConfig, ProviderKind};

        let chat: SharedProvider = Arc::new(
            ChatProvider::new(&ProviderConfig {
                kind: ProviderKind::OpenRouter,
                api_key: Some("test-key".to_string()),
                api_base: Some("http://127.0.0.1:9".to_string()),
                ..Default::default()
            })
            .unwrap(),
        );
        let gemini = Arc::new(MockProvider::new(
            "gemini",
            MockBehavior::Grounded(
                r#"[{"title": "Data Engineer", "company": "Acme"}]"#.to_string(),
                vec![GroundingSource {
                    uri: "https://acme.example/careers/1".to_string(),
                    title: None,
                }],
            ),
        ));
        let gemini_shared: SharedProvider = gemini.clone();
        let assistant = CareerAssistant::new(AiGateway::new(vec![chat, gemini_shared]));

        let listings = assistant
            .search_jobs(&sample_profile(), "Berlin")
            .await
            .unwrap();

        assert_eq!(gemini.calls(), 1);
        assert_eq!(listings.len(), 1);
        assert_eq!(
            listings[0].url.as_deref(),
            Some("https://acme.example/careers/1")
        );
    }

    #[tokio::test]
    async fn test_search_jobs_fills_links_from_grounding() {
        let reply = r##"Found these:
[
  {"title": "Data Engineer", "company": "Acme", "location": "Berlin", "matchScore": 88},
  {"title": "Analytics Engineer", "company": "Globex", "url": "https://globex.example/jobs/7"},
  {"title": "ML Engineer", "company": "Initech", "url": "#"}
]"##;
        let provider = Arc::new(MockProvider::new(
            "gemini",
            MockBehavior::Grounded(
                reply.to_string(),
                vec![
                    GroundingSource {
                        uri: "https://acme.example/careers/1".to_string(),
                        title: Some("Acme".to_string()),
                    },
                    GroundingSource {
                        uri: "https://initech.example/ml".to_string(),
                        title: None,
                    },
                ],
            ),
        ));
        let assistant = assistant_with(vec![provider.clone()]);

        let listings = assistant
            .search_jobs(&sample_profile(), "Berlin")
            .await
            .unwrap();

        assert_eq!(listings.len(), 3);
        assert_eq!(
            listings[0].url.as_deref(),
            Some("https://acme.example/careers/1")
        );
        assert_eq!(
            listings[1].url.as_deref(),
            Some("https://globex.example/jobs/7")
        );
        assert_eq!(listings[2].url.as_deref(), Some("https://initech.example/ml"));
        assert!(provider.last_request().unwrap().grounding);
    }

    #[tokio::test]
    async fn test_search_jobs_requires_job_title() {
        let assistant = assistant_with(vec![Arc::new(MockProvider::replying("a", "[]"))]);
        let err = assistant
            .search_jobs(&ResumeProfile::new(), "Berlin")
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::Validation(_)));
    }

    #[test]
    fn test_letter_kind_from_str() {
        assert_eq!("cover".parse::<LetterKind>().unwrap(), LetterKind::Cover);
        assert_eq!(
            "Thank-You".parse::<LetterKind>().unwrap(),
            LetterKind::ThankYou
        );
        assert!("memo".parse::<LetterKind>().is_err());
    }
}
