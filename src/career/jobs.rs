//! Grounded job search results

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::ai::GroundingSource;

/// One job posting found by a search-grounded request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JobListing {
    pub title: String,
    pub company: String,
    pub location: String,
    /// 0-100 fit against the profile
    pub match_score: Option<f64>,
    pub posted_date: Option<String>,
    pub distance: Option<String>,
    pub reasoning: String,
    pub url: Option<String>,
}

impl JobListing {
    /// "#" is the placeholder models emit when they have no link
    pub fn has_link(&self) -> bool {
        self.url
            .as_deref()
            .map(str::trim)
            .is_some_and(|url| !url.is_empty() && url != "#")
    }
}

/// Give each listing without a link the next unused grounding source, in order
pub fn attach_sources(listings: &mut [JobListing], sources: &[GroundingSource]) {
    let linked: HashSet<String> = listings
        .iter()
        .filter_map(|l| l.url.clone())
        .collect();
    let mut unused = sources
        .iter()
        .filter(|source| !linked.contains(&source.uri));

    for listing in listings.iter_mut().filter(|l| !l.has_link()) {
        match unused.next() {
            Some(source) => listing.url = Some(source.uri.clone()),
            None => break,
        }
    }
}

/// Listings from a model reply: a bare array, or an object wrapping one
pub fn listings_from_value(value: Value) -> Vec<JobListing> {
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
        .filter_map(|item| serde_json::from_value::<JobListing>(item).ok())
        .filter(|listing| !listing.title.trim().is_empty())
        .map(|mut listing| {
            listing.match_score = listing.match_score.map(|s| s.clamp(0.0, 100.0));
            listing
        })
        .collect()
}
