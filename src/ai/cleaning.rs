//! Response Cleaning
//!
//! Post-processing applied to provider text before it reaches the caller.
//! What gets removed depends on the response mode:
//!
//! - free text: markdown emphasis/heading characters
//! - JSON mode: markdown characters and code fences (with their language tag)
//!
//! Cleaning is idempotent: `clean(clean(x)) == clean(x)` for every input.

use crate::config::CleaningConfig;

const FENCE: char = '`';

/// Strips formatting artifacts according to a `CleaningConfig`
#[derive(Debug, Clone)]
pub struct ResponseCleaner {
    config: CleaningConfig,
}

impl Default for ResponseCleaner {
    fn default() -> Self {
        Self::new(CleaningConfig::default())
    }
}

impl ResponseCleaner {
    pub fn new(config: CleaningConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Clean a provider reply for the given response mode
    pub fn clean(&self, text: &str, json_mode: bool) -> String {
        let strip_markdown = if json_mode {
            self.config.strip_markdown_json
        } else {
            self.config.strip_markdown_text
        };
        self.clean_with(text, json_mode, strip_markdown)
    }

    /// Like `clean`, but `#` and `*` survive. For payloads where they are
    /// content (colors, `C#`, URL fragments).
    pub fn clean_preserving_markdown(&self, text: &str, json_mode: bool) -> String {
        self.clean_with(text, json_mode, false)
    }

    fn clean_with(&self, text: &str, json_mode: bool, strip_markdown: bool) -> String {
        let mut cleaned = if strip_markdown {
            self.strip_markdown(text)
        } else {
            text.to_string()
        };

        if json_mode && self.config.strip_code_fences {
            cleaned = strip_code_fences(&cleaned);
        }

        cleaned.trim().to_string()
    }

    fn strip_markdown(&self, text: &str) -> String {
        text.chars()
            .filter(|c| !self.config.markdown_chars.contains(*c))
            .collect()
    }
}

/// Remove every backtick; a run of three or more also takes the language
/// tag that follows it (```json).
///
/// JSON has no backtick syntax, so dropping single backticks too keeps the
/// pass idempotent: removing a fence can never join leftovers into a new one.
fn strip_code_fences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != FENCE {
            out.push(c);
            continue;
        }

        let mut run = 1;
        while chars.next_if_eq(&FENCE).is_some() {
            run += 1;
        }

        if run >= 3 {
            while chars
                .next_if(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
                .is_some()
            {}
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_text_mode_strips_markdown_only() {
        let cleaner = ResponseCleaner::default();
        assert_eq!(
            cleaner.clean("## Summary\n**Led** a team of `5`", false),
            "Summary\nLed a team of `5`"
        );
    }

    #[test]
    fn test_list_reply_is_unchanged() {
        let cleaner = ResponseCleaner::default();
        assert_eq!(
            cleaner.clean("- Python\n- Go\n- SQL", false),
            "- Python\n- Go\n- SQL"
        );
    }

    #[test]
    fn test_json_mode_fence_stripping_yields_valid_json() {
        let cleaner = ResponseCleaner::default();
        let raw = "```json\n{\"score\": 82, \"missingKeywords\": [\"Kubernetes\"]}\n```";
        let cleaned = cleaner.clean(raw, true);
        let value: serde_json::Value = serde_json::from_str(&cleaned).unwrap();
        assert_eq!(value["score"], 82);
    }

    #[test]
    fn test_bare_fence_without_tag() {
        let cleaner = ResponseCleaner::default();
        assert_eq!(cleaner.clean("```\n[\"a\", \"b\"]\n```", true), "[\"a\", \"b\"]");
    }

    #[test]
    fn test_fences_kept_in_text_mode() {
        let cleaner = ResponseCleaner::default();
        assert_eq!(cleaner.clean("```rust```", false), "```rust```");
    }

    #[test]
    fn test_json_markdown_stripping_is_configurable() {
        let cleaner = ResponseCleaner::new(CleaningConfig {
            strip_markdown_json: false,
            ..CleaningConfig::default()
        });
        assert_eq!(
            cleaner.clean("```json\n[\"C#\", \"F*\"]\n```", true),
            "[\"C#\", \"F*\"]"
        );
    }

    #[test]
    fn test_preserving_markdown_still_strips_fences() {
        let cleaner = ResponseCleaner::default();
        let raw = "```json\n{\"primaryColor\": \"#4f46e5\", \"skills\": [\"C#\"]}\n```";
        assert_eq!(
            cleaner.clean_preserving_markdown(raw, true),
            "{\"primaryColor\": \"#4f46e5\", \"skills\": [\"C#\"]}"
        );
        assert_eq!(
            cleaner.clean(raw, true),
            "{\"primaryColor\": \"4f46e5\", \"skills\": [\"C\"]}"
        );
    }

    #[test]
    fn test_custom_markdown_chars() {
        let cleaner = ResponseCleaner::new(CleaningConfig {
            markdown_chars: "_".to_string(),
            ..CleaningConfig::default()
        });
        assert_eq!(cleaner.clean("__bold__ *kept*", false), "bold *kept*");
    }

    #[test]
    fn test_all_stripping_disabled_only_trims() {
        let cleaner = ResponseCleaner::new(CleaningConfig {
            strip_markdown_text: false,
            strip_markdown_json: false,
            strip_code_fences: false,
            ..CleaningConfig::default()
        });
        assert_eq!(cleaner.clean("  **x** ", false), "**x**");
        assert_eq!(cleaner.clean("```json{}```", true), "```json{}```");
    }

    proptest! {
        #[test]
        fn prop_clean_is_idempotent(text in "[a-zA-Z0-9 *#`\\n{}\\[\\]\":,_-]{0,64}", json_mode: bool) {
            let cleaner = ResponseCleaner::default();
            let once = cleaner.clean(&text, json_mode);
            let twice = cleaner.clean(&once, json_mode);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_clean_removes_configured_chars(text in "\\PC{0,64}") {
            let cleaner = ResponseCleaner::default();
            let cleaned = cleaner.clean(&text, false);
            prop_assert!(!cleaned.contains('*'));
            prop_assert!(!cleaned.contains('#'));
        }

        #[test]
        fn prop_json_mode_leaves_no_backticks(text in "\\PC{0,64}") {
            let cleaner = ResponseCleaner::default();
            prop_assert!(!cleaner.clean(&text, true).contains('`'));
        }
    }
}
