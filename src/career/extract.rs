//! JSON extraction for task replies
//!
//! Providers without a native JSON mode (or with search grounding enabled)
//! may wrap the payload in prose. Parsing tries the whole reply first, then
//! the first balanced `{...}` or `[...]` block inside it.

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::types::{ForgeError, Result};

/// Parse a reply as `T`, falling back to the JSON embedded in surrounding text
pub fn parse_reply<T: DeserializeOwned>(text: &str) -> Result<T> {
    let direct_err = match serde_json::from_str::<T>(text) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    if let Some(block) = embedded_json(text) {
        let block = strip_trailing_commas(block);
        if let Ok(value) = serde_json::from_str::<T>(&block) {
            debug!("JSON extracted from mixed reply");
            return Ok(value);
        }
    }

    Err(ForgeError::response_parse(direct_err.to_string(), text))
}

/// First balanced JSON object or array in `s`
fn embedded_json(s: &str) -> Option<&str> {
    let start = s.find(['{', '['])?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape = false;

    for (i, ch) in s[start..].char_indices() {
        if escape {
            escape = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            '{' | '[' if !in_string => depth += 1,
            '}' | ']' if !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&s[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Drop commas directly before `]` or `}` (outside strings)
fn strip_trailing_commas(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len());
    let mut in_string = false;
    let mut escape = false;

    for (i, &ch) in chars.iter().enumerate() {
        if escape {
            escape = false;
            result.push(ch);
            continue;
        }
        match ch {
            '\\' if in_string => escape = true,
            '"' => in_string = !in_string,
            ',' if !in_string => {
                let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                if matches!(next, Some(']') | Some('}')) {
                    continue;
                }
            }
            _ => {}
        }
        result.push(ch);
    }

    result
}
