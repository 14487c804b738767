//! Score and skill presentation helpers for the results view. Pure functions.
//!
//! `tier_of` and `display_of` read the same raw score on different scales:
//! `tier_of` shrinks scores above 100 by 1000 and buckets against 50/30, while
//! `display_of` treats scores at or below 100 as fractions. A fractional
//! score like 0.95 therefore displays as 95 but tiers as low. Both are kept
//! as-is until the score domain is settled upstream.

use serde::{Deserialize, Serialize};

pub const DESCRIPTION_PREVIEW_CHARS: usize = 200;

/// Color bucket for a recommendation score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreTier {
    High,
    Medium,
    Low,
}

pub fn tier_of(score: f64) -> ScoreTier {
    let normalized = if score > 100.0 { score / 1000.0 } else { score };
    if normalized >= 50.0 {
        ScoreTier::High
    } else if normalized >= 30.0 {
        ScoreTier::Medium
    } else {
        ScoreTier::Low
    }
}

/// Percentage shown next to a recommendation.
pub fn display_of(score: f64) -> i64 {
    if score > 100.0 {
        score.round() as i64
    } else {
        (score * 100.0).round() as i64
    }
}

/// Human label for a skill level string; unknown levels pass through.
pub fn level_label(level: &str) -> &str {
    match level {
        "CollegeResearch" => "College Research",
        other => other,
    }
}

/// `"2y 3m"` from 27 months, `"5m"` under a year.
pub fn format_experience(months: u32) -> String {
    let years = months / 12;
    if years > 0 {
        format!("{years}y {}m", months % 12)
    } else {
        format!("{months}m")
    }
}

/// Collapsed project descriptions show the first `limit` characters plus `...`.
pub fn truncate_description(text: &str, expanded: bool, limit: usize) -> String {
    if expanded || text.chars().count() <= limit {
        return text.to_string();
    }
    let mut preview: String = text.chars().take(limit).collect();
    preview.push_str("...");
    preview
}
