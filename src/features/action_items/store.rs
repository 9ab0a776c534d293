use chrono::NaiveDate;
use tracing::debug;

use super::data::{
    normalize_text, parse_due_date, title_key, ActionItem, ActionItemCandidate, ActionItemId,
    ActionItemStats, ActionItemStatus, ActionItemUpdate, ImportSummary,
};

/// In-memory owner of all action items
///
/// Every operation is total: `add` reports rejection through its return
/// value, `update` and `toggle_status` silently ignore unknown ids and
/// read-only items.
#[derive(Debug, Default)]
pub struct ActionItemStore {
    items: Vec<ActionItem>,
    next_id: u64,
}

impl ActionItemStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new pending item
    ///
    /// Returns `false` without touching the store when a field is blank,
    /// the date is not a strict `YYYY-MM-DD` calendar date, or an item with
    /// the same title and due date already exists.
    pub fn add(&mut self, candidate: ActionItemCandidate) -> bool {
        let (Some(title), Some(owner), Some(due_date)) = (
            normalize_text(&candidate.title),
            normalize_text(&candidate.owner),
            parse_due_date(&candidate.due_date),
        ) else {
            debug!(?candidate, "rejected invalid action item");
            return false;
        };

        if self.has_duplicate(&title, due_date) {
            debug!(%title, %due_date, "rejected duplicate action item");
            return false;
        }

        self.next_id += 1;
        let id = ActionItemId(self.next_id);
        self.items.push(ActionItem {
            id,
            title,
            owner,
            due_date,
            status: ActionItemStatus::Pending,
        });
        debug!(%id, "added action item");

        true
    }

    /// Merge the supplied fields into a pending item
    ///
    /// Invalid fields are skipped individually. Uniqueness against other
    /// items is not re-checked.
    pub fn update(&mut self, id: ActionItemId, update: ActionItemUpdate) {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return;
        };
        if item.is_read_only() {
            debug!(%id, "ignored edit of read-only action item");
            return;
        }

        if let Some(title) = update.title.as_deref().and_then(normalize_text) {
            item.title = title;
        }
        if let Some(owner) = update.owner.as_deref().and_then(normalize_text) {
            item.owner = owner;
        }
        if let Some(due_date) = update.due_date.as_deref().and_then(parse_due_date) {
            item.due_date = due_date;
        }
    }

    /// Flip an item between Pending and Done
    pub fn toggle_status(&mut self, id: ActionItemId) {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.status = item.status.toggled();
            debug!(%id, status = %item.status, "toggled action item");
        }
    }

    /// Snapshot sorted by due date, earliest first; ties keep insertion order
    pub fn list(&self) -> Vec<ActionItem> {
        let mut items = self.items.clone();
        // sort_by_key is stable
        items.sort_by_key(|item| item.due_date);
        items
    }

    pub fn get(&self, id: ActionItemId) -> Option<&ActionItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: ActionItemId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Feed each candidate through `add` in order
    pub fn import<I>(&mut self, candidates: I) -> ImportSummary
    where
        I: IntoIterator<Item = ActionItemCandidate>,
    {
        let mut summary = ImportSummary::default();
        for candidate in candidates {
            if self.add(candidate) {
                summary.added += 1;
            } else {
                summary.rejected += 1;
            }
        }
        summary
    }

    /// Count items by status and overdue state as of `today`
    pub fn stats(&self, today: NaiveDate) -> ActionItemStats {
        let mut pending = 0;
        let mut done = 0;
        let mut overdue = 0;

        for item in &self.items {
            match item.status {
                ActionItemStatus::Done => done += 1,
                ActionItemStatus::Pending => {
                    pending += 1;
                    if item.is_overdue_on(today) {
                        overdue += 1;
                    }
                }
            }
        }

        let total = self.items.len();
        let completion_percentage = if total > 0 {
            (done as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        ActionItemStats {
            total,
            pending,
            done,
            overdue,
            completion_percentage,
        }
    }

    fn has_duplicate(&self, title: &str, due_date: NaiveDate) -> bool {
        let key = title_key(title);
        self.items
            .iter()
            .any(|item| item.due_date == due_date && title_key(&item.title) == key)
    }
}
