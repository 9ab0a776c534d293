//! Feature modules
//!
//! - `action_items`: the tracker core (model, validation, store)
//! - `extraction`: AI-assisted candidate extraction from meeting notes

pub mod action_items;
pub mod extraction;
