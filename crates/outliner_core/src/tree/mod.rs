//! Outline tree aggregate.
//!
//! # Responsibility
//! - Own every item of one account's outline, keyed by id.
//! - Keep the id index, the parent index and the child lists consistent
//!   across build, move, create and delete.
//! - Mirror every structural mutation to the remote service.
//!
//! # Invariants
//! - `items` and the set of ids reachable from the root are identical.
//! - `parent_of[x] == p` iff `x` appears in exactly `p.children`.
//! - `level(x) == level(parent(x)) + 1` for every non-root item.
//! - Local state changes only after the remote call returned `Ok`.
//! - Callers serialize mutations; `&mut self` enforces a single writer.

mod build;
mod index;
mod mutate;
mod search;

use crate::error::{OutlineError, OutlineResult};
use crate::ids::{IdGenerator, RandomIdGenerator};
use crate::model::item::{ItemId, OutlineItem, ROOT_ID};
use crate::transport::Transport;
use std::collections::{HashMap, HashSet};

pub use mutate::NewItem;
pub use search::SearchOptions;

/// In-memory outline bound to a transport.
pub struct Outline<T: Transport> {
    transport: T,
    id_generator: Box<dyn IdGenerator>,
    items: HashMap<ItemId, OutlineItem>,
    parent_of: HashMap<ItemId, ItemId>,
    joined_epoch_seconds: i64,
}

impl<T: Transport> Outline<T> {
    fn empty(transport: T, joined_epoch_seconds: i64) -> Self {
        let mut items = HashMap::new();
        items.insert(ROOT_ID.to_string(), OutlineItem::root());
        Self {
            transport,
            id_generator: Box::new(RandomIdGenerator),
            items,
            parent_of: HashMap::new(),
            joined_epoch_seconds,
        }
    }

    /// Replaces the generator used for client-created ids.
    pub fn with_id_generator(mut self, generator: impl IdGenerator + 'static) -> Self {
        self.id_generator = Box::new(generator);
        self
    }

    /// The synthetic root (level 0, empty id).
    pub fn root(&self) -> &OutlineItem {
        // Root is inserted at construction and can never be deleted.
        &self.items[ROOT_ID]
    }

    pub fn get(&self, id: &str) -> Option<&OutlineItem> {
        self.items.get(id)
    }

    /// Like [`Outline::get`] but unknown ids are an error.
    pub fn item(&self, id: &str) -> OutlineResult<&OutlineItem> {
        self.items
            .get(id)
            .ok_or_else(|| OutlineError::NotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    /// Parent of `id`; `None` for the root and for unknown ids.
    pub fn parent(&self, id: &str) -> Option<&OutlineItem> {
        self.parent_id(id).and_then(|parent_id| self.items.get(parent_id))
    }

    pub fn parent_id(&self, id: &str) -> Option<&str> {
        self.parent_of.get(id).map(String::as_str)
    }

    /// Children of `id` in sibling order.
    pub fn children(&self, id: &str) -> OutlineResult<Vec<&OutlineItem>> {
        let item = self.item(id)?;
        Ok(item
            .children
            .iter()
            .filter_map(|child_id| self.items.get(child_id))
            .collect())
    }

    /// Items of the subtree rooted at `id`, pre-order, `id` first.
    pub fn subtree(&self, id: &str) -> OutlineResult<Vec<&OutlineItem>> {
        self.item(id)?;
        Ok(self
            .subtree_ids(id)
            .iter()
            .filter_map(|item_id| self.items.get(item_id))
            .collect())
    }

    /// Number of indexed items, root included.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the outline holds nothing but the root.
    pub fn is_empty(&self) -> bool {
        self.items.len() == 1
    }

    pub fn joined_epoch_seconds(&self) -> i64 {
        self.joined_epoch_seconds
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Verifies every index invariant; returns the first violation found.
    pub fn check_consistency(&self) -> Result<(), String> {
        let root = self.root();
        if root.level != 0 {
            return Err(format!("root level is {}", root.level));
        }
        if self.parent_of.contains_key(ROOT_ID) {
            return Err("root has a parent entry".to_string());
        }

        let mut reachable = HashSet::new();
        let mut stack = vec![ROOT_ID];
        while let Some(id) = stack.pop() {
            if !reachable.insert(id) {
                return Err(format!("item {id} is reachable twice"));
            }
            let item = self
                .items
                .get(id)
                .ok_or_else(|| format!("reachable item {id} is not indexed"))?;
            for child_id in &item.children {
                let child = self
                    .items
                    .get(child_id)
                    .ok_or_else(|| format!("child {child_id} of {id} is not indexed"))?;
                if self.parent_id(child_id) != Some(id) {
                    return Err(format!("parent index of {child_id} does not point to {id}"));
                }
                if child.level != item.level + 1 {
                    return Err(format!(
                        "item {child_id} has level {} under parent level {}",
                        child.level, item.level
                    ));
                }
                stack.push(child_id.as_str());
            }
        }

        if reachable.len() != self.items.len() {
            return Err(format!(
                "{} items indexed but {} reachable",
                self.items.len(),
                reachable.len()
            ));
        }
        if self.parent_of.len() + 1 != self.items.len() {
            return Err(format!(
                "{} parent entries for {} items",
                self.parent_of.len(),
                self.items.len()
            ));
        }
        Ok(())
    }
}
