use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Action item status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ActionItemStatus {
    #[default]
    Pending,
    Done,
}

impl ActionItemStatus {
    /// The other status
    pub fn toggled(self) -> Self {
        match self {
            ActionItemStatus::Pending => ActionItemStatus::Done,
            ActionItemStatus::Done => ActionItemStatus::Pending,
        }
    }
}

impl std::fmt::Display for ActionItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionItemStatus::Pending => write!(f, "Pending"),
            ActionItemStatus::Done => write!(f, "Done"),
        }
    }
}

/// Store-assigned identifier, never reused
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionItemId(pub u64);

impl std::fmt::Display for ActionItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A tracked action item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionItem {
    pub id: ActionItemId,
    pub title: String,
    pub owner: String,
    pub due_date: NaiveDate,
    pub status: ActionItemStatus,
}

impl ActionItem {
    /// Pending and due strictly before `today`
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        self.status == ActionItemStatus::Pending && self.due_date < today
    }

    /// Done items reject field edits
    pub fn is_read_only(&self) -> bool {
        self.status == ActionItemStatus::Done
    }
}

/// Raw input for a new action item, from a form or the extractor
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ActionItemCandidate {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub owner: String,
    #[serde(rename = "dueDate", default)]
    pub due_date: String,
}

impl ActionItemCandidate {
    pub fn new(
        title: impl Into<String>,
        owner: impl Into<String>,
        due_date: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            owner: owner.into(),
            due_date: due_date.into(),
        }
    }
}

/// Partial edit of a pending action item; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionItemUpdate {
    pub title: Option<String>,
    pub owner: Option<String>,
    pub due_date: Option<String>,
}

impl ActionItemUpdate {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.owner.is_none() && self.due_date.is_none()
    }

    /// Names of the fields this update sets
    pub fn supplied_fields(&self) -> Vec<&'static str> {
        [
            ("title", self.title.is_some()),
            ("owner", self.owner.is_some()),
            ("due", self.due_date.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }

    /// Names of the supplied fields the store will skip as invalid
    pub fn invalid_fields(&self) -> Vec<&'static str> {
        let mut invalid = Vec::new();
        if self.title.as_deref().is_some_and(|t| normalize_text(t).is_none()) {
            invalid.push("title");
        }
        if self.owner.as_deref().is_some_and(|o| normalize_text(o).is_none()) {
            invalid.push("owner");
        }
        if self.due_date.as_deref().is_some_and(|d| parse_due_date(d).is_none()) {
            invalid.push("due");
        }
        invalid
    }
}

/// Store-wide counts
#[derive(Debug, Clone, PartialEq)]
pub struct ActionItemStats {
    pub total: usize,
    pub pending: usize,
    pub done: usize,
    pub overdue: usize,
    pub completion_percentage: f64,
}

/// Outcome of feeding a batch of candidates through `add`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    pub rejected: usize,
}

fn iso_date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid date regex"))
}

/// Parse a strict `YYYY-MM-DD` calendar date
///
/// chrono alone accepts unpadded fields like `2025-1-1`, so the shape is
/// checked first.
pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if !iso_date_pattern().is_match(raw) {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Trimmed text, or `None` when nothing is left
pub fn normalize_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Key used for the uniqueness check: trimmed, case-insensitive
pub fn title_key(title: &str) -> String {
    title.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn item(due: &str, status: ActionItemStatus) -> ActionItem {
        ActionItem {
            id: ActionItemId(1),
            title: "Ship release notes".to_string(),
            owner: "Sam".to_string(),
            due_date: date(due),
            status,
        }
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ActionItemStatus::Pending.to_string(), "Pending");
        assert_eq!(ActionItemStatus::Done.to_string(), "Done");
    }

    #[test]
    fn test_status_toggled() {
        assert_eq!(ActionItemStatus::Pending.toggled(), ActionItemStatus::Done);
        assert_eq!(ActionItemStatus::Done.toggled(), ActionItemStatus::Pending);
        assert_eq!(ActionItemStatus::default(), ActionItemStatus::Pending);
    }

    #[test]
    fn test_id_display() {
        assert_eq!(ActionItemId(42).to_string(), "#42");
    }

    #[test]
    fn test_parse_due_date() {
        assert_eq!(parse_due_date("2025-01-01"), Some(date("2025-01-01")));
        assert_eq!(parse_due_date(" 2024-02-29 "), Some(date("2024-02-29")));
        assert_eq!(parse_due_date("2025-1-1"), None);
        assert_eq!(parse_due_date("2025-02-30"), None);
        assert_eq!(parse_due_date("2025-13-01"), None);
        assert_eq!(parse_due_date("01/02/2025"), None);
        assert_eq!(parse_due_date("2025-01-01T10:00:00"), None);
        // Non-ASCII digits
        assert_eq!(parse_due_date("٢٠٢٥-٠١-٠١"), None);
        assert_eq!(parse_due_date("２０２５-０１-０１"), None);
        assert_eq!(parse_due_date(""), None);
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Alex "), Some("Alex".to_string()));
        assert_eq!(normalize_text("   "), None);
        assert_eq!(normalize_text(""), None);
    }

    #[test]
    fn test_title_key_ignores_case_and_padding() {
        assert_eq!(title_key("  Review Q4 Goals "), title_key("review q4 goals"));
        assert_ne!(title_key("Review Q4 Goals"), title_key("Review Q4  Goals"));
    }

    #[test]
    fn test_overdue_on() {
        let today = date("2025-06-15");

        assert!(item("2025-06-14", ActionItemStatus::Pending).is_overdue_on(today));
        assert!(!item("2025-06-15", ActionItemStatus::Pending).is_overdue_on(today));
        assert!(!item("2025-06-16", ActionItemStatus::Pending).is_overdue_on(today));
        assert!(!item("2025-06-14", ActionItemStatus::Done).is_overdue_on(today));
    }

    #[test]
    fn test_read_only() {
        assert!(!item("2025-06-14", ActionItemStatus::Pending).is_read_only());
        assert!(item("2025-06-14", ActionItemStatus::Done).is_read_only());
    }

    #[test]
    fn test_candidate_deserializes_extractor_shape() {
        let json = r#"{"title":"Book venue","owner":"Priya","dueDate":"2025-03-10"}"#;
        let candidate: ActionItemCandidate = serde_json::from_str(json).unwrap();
        assert_eq!(
            candidate,
            ActionItemCandidate::new("Book venue", "Priya", "2025-03-10")
        );
    }

    #[test]
    fn test_candidate_missing_fields_default_to_empty() {
        let candidate: ActionItemCandidate = serde_json::from_str(r#"{"title":"Orphan"}"#).unwrap();
        assert_eq!(candidate.owner, "");
        assert_eq!(candidate.due_date, "");
    }

    #[test]
    fn test_update_builder() {
        let update = ActionItemUpdate::default();
        assert!(update.is_empty());

        let update = update.with_title("New").with_due_date("2025-01-02");
        assert_eq!(update.title.as_deref(), Some("New"));
        assert_eq!(update.owner, None);
        assert_eq!(update.due_date.as_deref(), Some("2025-01-02"));
        assert!(!update.is_empty());
        assert_eq!(update.supplied_fields(), vec!["title", "due"]);
    }

    #[test]
    fn test_update_invalid_fields() {
        let update = ActionItemUpdate::default()
            .with_title(" ")
            .with_owner("Kim")
            .with_due_date("2025-02-30");
        assert_eq!(update.invalid_fields(), vec!["title", "due"]);

        let update = ActionItemUpdate::default().with_owner("").with_due_date("2025-02-28");
        assert_eq!(update.invalid_fields(), vec!["owner"]);

        assert!(ActionItemUpdate::default().invalid_fields().is_empty());
    }
}
