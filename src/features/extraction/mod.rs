//! Extraction module - turns free-text meeting notes into action item candidates
//!
//! The extractor only proposes candidates; every candidate still goes through
//! `ActionItemStore::add`, so malformed output is rejected per item.

pub mod gemini;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;
use tracing::warn;

use crate::features::action_items::ActionItemCandidate;

pub use gemini::{GeminiExtractor, GeminiExtractorConfig};

/// Source of action item candidates
#[async_trait]
pub trait ActionItemExtractor: Send + Sync {
    /// Extract candidates from notes; an unparseable reply yields an empty list
    async fn extract(&self, notes: &str) -> Result<Vec<ActionItemCandidate>>;
}

/// Instruction sent alongside the notes
pub fn build_prompt(notes: &str, today: NaiveDate, default_due_days: u32) -> String {
    let default_due = today + chrono::Duration::days(i64::from(default_due_days));
    format!(
        "Extract action items from these meeting notes. For each action item, identify the task \
         title, the person responsible (owner), and a likely due date (use YYYY-MM-DD format, \
         defaulting to {default_due} if none specified). Today is {today}. Notes: {notes}"
    )
}

fn code_fence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)^\s*```[a-zA-Z]*\s*(.*?)\s*```\s*$").expect("valid code fence regex")
    })
}

/// Parse the model's reply as a JSON array of candidates
///
/// Entries that are not objects are dropped; any other parse failure gives
/// an empty list.
pub fn parse_candidates(text: &str) -> Vec<ActionItemCandidate> {
    let body = code_fence_pattern()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map_or(text, |m| m.as_str());

    let values: Vec<serde_json::Value> = match serde_json::from_str(body) {
        Ok(values) => values,
        Err(e) => {
            warn!("failed to parse extractor response: {e}");
            return Vec::new();
        }
    };

    values
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_array() {
        let text = r#"[
            {"title": "Book venue", "owner": "Priya", "dueDate": "2025-03-10"},
            {"title": "Send invites", "owner": "Sam", "dueDate": "2025-03-05"}
        ]"#;

        let candidates = parse_candidates(text);
        assert_eq!(candidates.len(), 2);
        assert_eq!(
            candidates[0],
            ActionItemCandidate::new("Book venue", "Priya", "2025-03-10")
        );
        assert_eq!(candidates[1].owner, "Sam");
    }

    #[test]
    fn test_parse_fenced_array() {
        let text = "```json\n[{\"title\": \"Fix CI\", \"owner\": \"Lee\", \"dueDate\": \"2025-01-20\"}]\n```";
        let candidates = parse_candidates(text);
        assert_eq!(
            candidates,
            vec![ActionItemCandidate::new("Fix CI", "Lee", "2025-01-20")]
        );
    }

    #[test]
    fn test_parse_keeps_incomplete_entries_for_store_validation() {
        let text = r#"[{"title": "No owner", "dueDate": "2025-01-20"}, 42, "text"]"#;
        let candidates = parse_candidates(text);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].owner, "");
    }

    #[test]
    fn test_parse_garbage_is_empty() {
        assert!(parse_candidates("I could not find any action items.").is_empty());
        assert!(parse_candidates("").is_empty());
        assert!(parse_candidates(r#"{"title": "not an array"}"#).is_empty());
    }

    #[test]
    fn test_build_prompt_mentions_default_due_date() {
        let today = NaiveDate::from_ymd_opt(2025, 12, 29).unwrap();
        let prompt = build_prompt("Alex to send the deck", today, 7);

        assert!(prompt.contains("2026-01-05"));
        assert!(prompt.contains("Today is 2025-12-29"));
        assert!(prompt.ends_with("Notes: Alex to send the deck"));
    }
}
