//! Resume Profile
//!
//! The user's structured career data. The profile is passed into AI prompts
//! as serialized JSON context and is never persisted by the library.
//!
//! Field names serialize in camelCase so exported profiles interoperate with
//! the Career Forge web application's JSON export.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::EntryId;
use crate::types::{ForgeError, Result};

/// Personal identity and contact fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalInfo {
    pub full_name: String,
    /// Target role
    pub job_title: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub linkedin: String,
    pub github: String,
    pub website: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Experience {
    pub id: EntryId,
    pub company: String,
    pub role: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    /// Open-ended position; `end_date` is display text only when set
    pub current: bool,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Education {
    pub id: EntryId,
    pub institution: String,
    pub degree: String,
    pub field: String,
    pub location: String,
    pub graduation_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Project {
    pub id: EntryId,
    pub name: String,
    pub description: String,
    pub link: String,
    pub technologies: Vec<String>,
}

/// Arbitrary titled section (volunteering, publications, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomSection {
    pub id: EntryId,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    #[default]
    Sans,
    Serif,
    Mono,
}

/// Visual style override used by the custom template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomStyle {
    pub primary_color: String,
    pub accent_color: String,
    pub font_family: FontFamily,
    pub font_size: String,
    pub spacing: String,
    pub border_radius: String,
}

impl Default for CustomStyle {
    fn default() -> Self {
        Self {
            primary_color: "#4f46e5".to_string(),
            accent_color: "#0f172a".to_string(),
            font_family: FontFamily::Sans,
            font_size: "14px".to_string(),
            spacing: "1.5".to_string(),
            border_radius: "8px".to_string(),
        }
    }
}

/// Complete resume profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResumeProfile {
    pub personal_info: PersonalInfo,
    pub summary: String,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Vec<String>,
    pub projects: Vec<Project>,
    pub certifications: Vec<String>,
    pub achievements: Vec<String>,
    pub languages: Vec<String>,
    pub custom_sections: Vec<CustomSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_style: Option<CustomStyle>,
}

impl ResumeProfile {
    /// Empty profile, as at the start of a session
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an exported profile, assigning ids to entries that lack them
    pub fn from_json(json: &str) -> Result<Self> {
        let mut profile: ResumeProfile = serde_json::from_str(json)?;
        profile.ensure_ids();
        Ok(profile)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    // =========================================================================
    // Entry management
    // =========================================================================

    pub fn add_experience(&mut self, mut entry: Experience) -> EntryId {
        entry.id = EntryId::generate();
        let id = entry.id.clone();
        self.experience.push(entry);
        id
    }

    pub fn add_education(&mut self, mut entry: Education) -> EntryId {
        entry.id = EntryId::generate();
        let id = entry.id.clone();
        self.education.push(entry);
        id
    }

    pub fn add_project(&mut self, mut entry: Project) -> EntryId {
        entry.id = EntryId::generate();
        let id = entry.id.clone();
        self.projects.push(entry);
        id
    }

    pub fn add_custom_section(&mut self, title: impl Into<String>, content: impl Into<String>) -> EntryId {
        let id = EntryId::generate();
        self.custom_sections.push(CustomSection {
            id: id.clone(),
            title: title.into(),
            content: content.into(),
        });
        id
    }

    /// Returns true if an entry was removed
    pub fn remove_experience(&mut self, id: &EntryId) -> bool {
        remove_by_id(&mut self.experience, id, |e| &e.id)
    }

    pub fn remove_education(&mut self, id: &EntryId) -> bool {
        remove_by_id(&mut self.education, id, |e| &e.id)
    }

    pub fn remove_project(&mut self, id: &EntryId) -> bool {
        remove_by_id(&mut self.projects, id, |e| &e.id)
    }

    pub fn remove_custom_section(&mut self, id: &EntryId) -> bool {
        remove_by_id(&mut self.custom_sections, id, |e| &e.id)
    }

    /// Assign fresh ids to entries with an empty or duplicated id.
    ///
    /// Profiles coming back from an AI rewrite or a hand-edited export may
    /// repeat or drop ids; the first occurrence of an id keeps it.
    pub fn ensure_ids(&mut self) {
        let mut seen = HashSet::new();
        for entry in &mut self.experience {
            rekey(&mut entry.id, &mut seen);
        }
        for entry in &mut self.education {
            rekey(&mut entry.id, &mut seen);
        }
        for entry in &mut self.projects {
            rekey(&mut entry.id, &mut seen);
        }
        for entry in &mut self.custom_sections {
            rekey(&mut entry.id, &mut seen);
        }
    }

    /// Check the id invariant without modifying the profile
    pub fn validate_ids(&self) -> Result<()> {
        let mut seen = HashSet::new();
        let ids = self
            .experience
            .iter()
            .map(|e| &e.id)
            .chain(self.education.iter().map(|e| &e.id))
            .chain(self.projects.iter().map(|e| &e.id))
            .chain(self.custom_sections.iter().map(|e| &e.id));

        for id in ids {
            if id.is_empty() {
                return Err(ForgeError::Validation("entry without id".to_string()));
            }
            if !seen.insert(id.as_str()) {
                return Err(ForgeError::Validation(format!("duplicate entry id '{}'", id)));
            }
        }
        Ok(())
    }

    // =========================================================================
    // Style export/import
    // =========================================================================

    /// Export the style override, or the default style if none is set
    pub fn style_to_json(&self) -> Result<String> {
        let style = self.custom_style.clone().unwrap_or_default();
        Ok(serde_json::to_string_pretty(&style)?)
    }

    /// Import a style file; missing fields take default values
    pub fn apply_style_json(&mut self, json: &str) -> Result<()> {
        let style: CustomStyle = serde_json::from_str(json)?;
        self.custom_style = Some(style);
        Ok(())
    }
}

fn remove_by_id<T>(items: &mut Vec<T>, id: &EntryId, key: impl Fn(&T) -> &EntryId) -> bool {
    let before = items.len();
    items.retain(|item| key(item) != id);
    items.len() != before
}

fn rekey(id: &mut EntryId, seen: &mut HashSet<String>) {
    if id.is_empty() || seen.contains(id.as_str()) {
        *id = EntryId::generate();
    }
    seen.insert(id.as_str().to_string());
}
