//! Action items module - the in-memory tracker core
//!
//! This module provides:
//! - The action item model with its Pending/Done lifecycle
//! - Strict date and non-blank validation for new items and edits
//! - A store enforcing unique (title, due date) pairs and date-sorted listing

pub mod data;
pub mod store;

// Re-export commonly used types
pub use data::{ActionItem, ActionItemCandidate, ActionItemId, ActionItemUpdate};
pub use store::ActionItemStore;
