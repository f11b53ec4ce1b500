//! ATS match report

use serde::{Deserialize, Serialize};

use crate::ai::Attachment;
use crate::types::ResumeProfile;

/// What the ATS check reads the resume from
#[derive(Debug, Clone)]
pub enum AtsSource<'a> {
    /// Structured profile, embedded in the prompt as JSON
    Profile(&'a ResumeProfile),
    /// Uploaded resume file sent inline (e.g. a PDF)
    Document(Attachment),
}

/// Applicant-tracking-system match report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AtsReport {
    /// Match score, 0-100
    pub score: f64,
    pub match_analysis: String,
    pub missing_keywords: Vec<String>,
    pub formatting_issues: Vec<String>,
    pub improvement_suggestions: Vec<String>,
}

impl AtsReport {
    /// Clamp the score into 0-100; a non-finite score becomes 0
    pub fn normalized(mut self) -> Self {
        self.score = if self.score.is_finite() {
            self.score.clamp(0.0, 100.0)
        } else {
            0.0
        };
        self
    }

    pub fn rating(&self) -> AtsRating {
        match self.score {
            s if s >= 80.0 => AtsRating::Strong,
            s if s >= 60.0 => AtsRating::Fair,
            _ => AtsRating::Weak,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtsRating {
    Strong,
    Fair,
    Weak,
}

impl std::fmt::Display for AtsRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strong => write!(f, "strong match"),
            Self::Fair => write!(f, "fair match"),
            Self::Weak => write!(f, "weak match"),
        }
    }
}
