//! Index maintenance primitives.
//!
//! Only mutation methods call these, and only after the remote call
//! succeeded. Each primitive leaves all invariants intact on return.

use super::Outline;
use crate::model::item::{ItemId, OutlineItem};
use crate::transport::Transport;

impl<T: Transport> Outline<T> {
    /// Ids of the subtree rooted at `id`, pre-order, `id` first.
    pub(super) fn subtree_ids(&self, id: &str) -> Vec<ItemId> {
        let mut ids = Vec::new();
        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            if let Some(item) = self.items.get(&current) {
                stack.extend(item.children.iter().rev().cloned());
                ids.push(current);
            }
        }
        ids
    }

    /// Rewrites levels of `id` and its descendants as `new_level`,
    /// `new_level + 1`, ...
    pub(super) fn reindex_subtree(&mut self, id: &str, new_level: u32) {
        let mut stack = vec![(id.to_string(), new_level)];
        while let Some((current, level)) = stack.pop() {
            if let Some(item) = self.items.get_mut(&current) {
                item.level = level;
                stack.extend(
                    item.children
                        .iter()
                        .rev()
                        .map(|child_id| (child_id.clone(), level + 1)),
                );
            }
        }
    }

    /// Indexes a new leaf item and links it under `parent_id`.
    pub(super) fn register_create(&mut self, item: OutlineItem, parent_id: &str, priority: usize) {
        let id = item.id.clone();
        if let Some(parent) = self.items.get_mut(parent_id) {
            insert_child(&mut parent.children, id.clone(), priority);
        }
        self.parent_of.insert(id.clone(), parent_id.to_string());
        self.items.insert(id, item);
    }

    /// Unlinks `id` from its parent and purges its whole subtree from
    /// both indices. Returns the number of items removed.
    pub(super) fn register_delete(&mut self, id: &str) -> usize {
        self.detach_from_parent(id);
        let removed = self.subtree_ids(id);
        for item_id in &removed {
            self.items.remove(item_id);
            self.parent_of.remove(item_id);
        }
        removed.len()
    }

    /// Moves `id` under `new_parent_id` at `priority` and fixes levels.
    pub(super) fn reparent(&mut self, id: &str, new_parent_id: &str, priority: usize) {
        let Some(new_parent_level) = self.items.get(new_parent_id).map(|parent| parent.level)
        else {
            return;
        };
        self.detach_from_parent(id);
        if let Some(parent) = self.items.get_mut(new_parent_id) {
            insert_child(&mut parent.children, id.to_string(), priority);
        }
        self.parent_of
            .insert(id.to_string(), new_parent_id.to_string());
        self.reindex_subtree(id, new_parent_level + 1);
    }

    fn detach_from_parent(&mut self, id: &str) {
        let Some(parent_id) = self.parent_of.get(id).cloned() else {
            return;
        };
        if let Some(parent) = self.items.get_mut(&parent_id) {
            parent.children.retain(|child_id| child_id != id);
        }
    }
}

/// Inserts at `priority`, clamped to the end of the list.
fn insert_child(children: &mut Vec<ItemId>, id: ItemId, priority: usize) {
    let index = priority.min(children.len());
    children.insert(index, id);
}

#[cfg(test)]
mod tests {
    use super::insert_child;
    use crate::transport::MemoryTransport;
    use crate::tree::Outline;
    use serde_json::json;

    fn outline() -> Outline<MemoryTransport> {
        let transport = MemoryTransport::from_json(json!({
            "projectTreeData": { "mainProjectTreeInfo": { "rootProjectChildren": [
                { "id": "a", "ch": [
                    { "id": "b", "ch": [{ "id": "c" }] },
                    { "id": "d" }
                ]},
                { "id": "e" }
            ]}}
        }))
        .unwrap();
        Outline::build(transport).unwrap()
    }

    #[test]
    fn insert_child_clamps_priority() {
        let mut children = vec!["x".to_string(), "y".to_string()];
        insert_child(&mut children, "z".to_string(), 99);
        insert_child(&mut children, "w".to_string(), 0);
        assert_eq!(children, vec!["w", "x", "y", "z"]);
    }

    #[test]
    fn subtree_ids_are_pre_order() {
        let outline = outline();
        assert_eq!(outline.subtree_ids("a"), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn register_delete_purges_descendants() {
        let mut outline = outline();
        assert_eq!(outline.register_delete("b"), 2);
        assert!(!outline.contains("b"));
        assert!(!outline.contains("c"));
        assert_eq!(outline.parent_id("c"), None);
        assert_eq!(outline.root().children().len(), 2);
        outline.check_consistency().unwrap();
    }

    #[test]
    fn reparent_recomputes_levels() {
        let mut outline = outline();
        outline.reparent("b", "e", 0);
        assert_eq!(outline.item("b").unwrap().level(), 2);
        assert_eq!(outline.item("c").unwrap().level(), 3);
        assert_eq!(outline.parent_id("b"), Some("e"));
        outline.check_consistency().unwrap();

        outline.reparent("e", "d", 5);
        assert_eq!(outline.item("e").unwrap().level(), 3);
        assert_eq!(outline.item("b").unwrap().level(), 4);
        assert_eq!(outline.item("c").unwrap().level(), 5);
        outline.check_consistency().unwrap();
    }
}
