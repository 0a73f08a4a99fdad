//! Outline item model.
//!
//! # Responsibility
//! - Hold the scalar fields of one list item and its ordered child ids.
//! - Expose read-only accessors; structural fields change only through
//!   `Outline` so the indices stay consistent.
//!
//! # Invariants
//! - `level` is the distance from the synthetic root (root is 0).
//! - `completed_time == 0` means the item is not completed.
//! - Child order is sibling priority order.

use serde::Serialize;

/// Identifier of one outline item.
///
/// Kept as a type alias: ids are opaque server tokens, and the synthetic
/// root uses the empty string.
pub type ItemId = String;

/// Id reserved for the synthetic root item.
pub const ROOT_ID: &str = "";

/// One outline item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineItem {
    pub(crate) id: ItemId,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) level: u32,
    /// Unix seconds; 0 when unknown.
    pub(crate) creation_time: i64,
    /// Unix seconds; 0 when unknown.
    pub(crate) last_modified_time: i64,
    /// Unix seconds; 0 when not completed.
    pub(crate) completed_time: i64,
    pub(crate) children: Vec<ItemId>,
}

impl OutlineItem {
    /// Creates the synthetic root.
    pub(crate) fn root() -> Self {
        Self::blank(ROOT_ID.to_string(), 0)
    }

    /// Creates an item with zeroed timestamps and no children.
    pub(crate) fn blank(id: ItemId, level: u32) -> Self {
        Self {
            id,
            name: String::new(),
            description: String::new(),
            level,
            creation_time: 0,
            last_modified_time: 0,
            completed_time: 0,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn creation_time(&self) -> i64 {
        self.creation_time
    }

    pub fn last_modified_time(&self) -> i64 {
        self.last_modified_time
    }

    pub fn completed_time(&self) -> i64 {
        self.completed_time
    }

    /// Child ids in sibling order.
    pub fn children(&self) -> &[ItemId] {
        &self.children
    }

    pub fn is_completed(&self) -> bool {
        self.completed_time != 0
    }

    pub fn is_root(&self) -> bool {
        self.level == 0
    }
}
